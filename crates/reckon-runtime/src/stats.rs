//! Statistics and regression over the sigma registers.
//!
//! The running sums live in a window of a matrix variable (`Config::
//! sigma_var` at offset `Config::sigma_reg`) and are re-read on every
//! operation; nothing here is cached across commands. Four regression
//! models share one linear fit through log transforms of x and/or y.

use log::debug;
use reckon_values::{CalcError, RealCell, Result, Value};

use crate::context::FitModel;
use crate::elementwise::map_unary_real;
use crate::range;
use crate::stack::OperandStack;
use crate::workspace::VariableStore;
use crate::Session;

/// The thirteen running sums. The log-transformed cross sums are only
/// populated in all-sums mode and read as zero otherwise.
#[derive(Debug, Clone, Copy, Default)]
struct Summation {
    x: f64,
    x2: f64,
    y: f64,
    y2: f64,
    xy: f64,
    n: f64,
    lnx: f64,
    lnx2: f64,
    lny: f64,
    lny2: f64,
    lnxlny: f64,
    xlny: f64,
    ylnx: f64,
}

/// Sums transformed for one regression model, plus the fitted line once
/// [`fit_line`] has run. Built at the start of a command, dropped at the
/// end.
#[derive(Debug, Clone, Copy)]
struct Model {
    x: f64,
    x2: f64,
    y: f64,
    y2: f64,
    xy: f64,
    n: f64,
    ln_before: bool,
    exp_after: bool,
    slope: f64,
    yint: f64,
}

fn fit_line(m: &mut Model) -> Result<()> {
    if m.n == 0.0 || m.n == 1.0 {
        return Err(CalcError::StatMathError);
    }
    let cov = m.xy - m.x * m.y / m.n;
    let varx = m.x2 - m.x * m.x / m.n;
    if varx == 0.0 {
        return Err(CalcError::StatMathError);
    }
    m.slope = range::saturate(cov / varx);
    let meanx = m.x / m.n;
    let meany = m.y / m.n;
    m.yint = range::saturate(meany - m.slope * meanx);
    Ok(())
}

fn correlation(m: &Model) -> Result<f64> {
    if m.n == 0.0 || m.n == 1.0 {
        return Err(CalcError::StatMathError);
    }
    let cov = m.xy - m.x * m.y / m.n;
    let varx = m.x2 - m.x * m.x / m.n;
    let vary = m.y2 - m.y * m.y / m.n;
    if varx <= 0.0 || vary <= 0.0 {
        return Err(CalcError::StatMathError);
    }
    let v = varx * vary;
    if v == 0.0 {
        return Err(CalcError::StatMathError);
    }
    Ok((cov / v.sqrt()).clamp(-1.0, 1.0))
}

impl<S: OperandStack, V: VariableStore> Session<S, V> {
    fn summation(&self) -> Result<Summation> {
        let first = self.config.sigma_reg;
        let count = if self.config.flags.all_sigma { 13 } else { 6 };
        let regs = self
            .vars
            .recall(&self.config.sigma_var)
            .ok_or(CalcError::SizeError)?;
        let m = match &regs {
            Value::RealMatrix(m) => m,
            _ => return Err(CalcError::InvalidType),
        };
        if first + count > m.len() {
            return Err(CalcError::SizeError);
        }
        let window = &m.cells()[first..first + count];
        if window.iter().any(RealCell::is_text) {
            return Err(CalcError::AlphaDataInvalid);
        }

        let mut s = Summation {
            x: window[0].number()?,
            x2: window[1].number()?,
            y: window[2].number()?,
            y2: window[3].number()?,
            xy: window[4].number()?,
            n: window[5].number()?,
            ..Summation::default()
        };
        if self.config.flags.all_sigma {
            s.lnx = window[6].number()?;
            s.lnx2 = window[7].number()?;
            s.lny = window[8].number()?;
            s.lny2 = window[9].number()?;
            s.lnxlny = window[10].number()?;
            s.xlny = window[11].number()?;
            s.ylnx = window[12].number()?;
        }
        Ok(s)
    }

    fn model_summation(&self, model: FitModel) -> Result<Model> {
        let sum = self.summation()?;
        let flags = self.config.flags;
        let (xy, ln_before, exp_after) = match model {
            FitModel::Linear => (sum.xy, false, false),
            FitModel::Log => {
                if flags.log_fit_invalid {
                    return Err(CalcError::InvalidForecastModel);
                }
                (sum.ylnx, true, false)
            }
            FitModel::Exp => {
                if flags.exp_fit_invalid {
                    return Err(CalcError::InvalidForecastModel);
                }
                (sum.xlny, false, true)
            }
            FitModel::Power => {
                if flags.pwr_fit_invalid {
                    return Err(CalcError::InvalidForecastModel);
                }
                (sum.lnxlny, true, true)
            }
        };
        let (x, x2) = if ln_before {
            (sum.lnx, sum.lnx2)
        } else {
            (sum.x, sum.x2)
        };
        let (y, y2) = if exp_after {
            (sum.lny, sum.lny2)
        } else {
            (sum.y, sum.y2)
        };
        Ok(Model {
            x,
            x2,
            y,
            y2,
            xy,
            n: sum.n,
            ln_before,
            exp_after,
            slope: 0.0,
            yint: 0.0,
        })
    }

    fn fitted_model(&self) -> Result<Model> {
        let mut m = self.model_summation(self.config.fit)?;
        fit_line(&mut m)?;
        Ok(m)
    }

    /// Means of x and y, into X and Y.
    pub fn mean(&mut self) -> Result<()> {
        let s = self.summation()?;
        if s.n == 0.0 {
            return Err(CalcError::StatMathError);
        }
        let mx = range::saturate(s.x / s.n);
        let my = range::saturate(s.y / s.n);
        self.stack.xy_result(Value::Real(mx), Value::Real(my));
        Ok(())
    }

    /// Mean of x weighted by y.
    pub fn weighted_mean(&mut self) -> Result<()> {
        let s = self.summation()?;
        if s.y == 0.0 {
            return Err(CalcError::StatMathError);
        }
        let wm = range::saturate(s.xy / s.y);
        self.stack.recall_result(Value::Real(wm));
        Ok(())
    }

    /// Sample standard deviations of x and y, into X and Y.
    pub fn sdev(&mut self) -> Result<()> {
        let s = self.summation()?;
        if s.n == 0.0 || s.n == 1.0 {
            return Err(CalcError::StatMathError);
        }
        let var_x = (s.x2 - s.x * s.x / s.n) / (s.n - 1.0);
        if var_x < 0.0 {
            return Err(CalcError::StatMathError);
        }
        let sx = if var_x.is_infinite() {
            range::HUGE
        } else {
            var_x.sqrt()
        };
        let var_y = (s.y2 - s.y * s.y / s.n) / (s.n - 1.0);
        if var_y < 0.0 {
            return Err(CalcError::StatMathError);
        }
        let sy = if var_y.is_infinite() {
            range::HUGE
        } else {
            var_y.sqrt()
        };
        self.stack.xy_result(Value::Real(sx), Value::Real(sy));
        Ok(())
    }

    /// Sums of x and y, into X and Y.
    pub fn sum(&mut self) -> Result<()> {
        let s = self.summation()?;
        self.stack.xy_result(Value::Real(s.x), Value::Real(s.y));
        Ok(())
    }

    /// Correlation coefficient for the selected model.
    pub fn corr(&mut self) -> Result<()> {
        let m = self.model_summation(self.config.fit)?;
        let r = correlation(&m)?;
        self.stack.recall_result(Value::Real(r));
        Ok(())
    }

    /// Slope of the fitted line for the selected model.
    pub fn slope(&mut self) -> Result<()> {
        let m = self.fitted_model()?;
        self.stack.recall_result(Value::Real(m.slope));
        Ok(())
    }

    /// Intercept of the fitted line; models that transform y exponentiate
    /// it back.
    pub fn yint(&mut self) -> Result<()> {
        let m = self.fitted_model()?;
        let yint = if m.exp_after {
            let y = m.yint.exp();
            if y.is_infinite() {
                range::HUGE
            } else {
                y
            }
        } else {
            m.yint
        };
        self.stack.recall_result(Value::Real(yint));
        Ok(())
    }

    /// Select the model with the largest correlation magnitude. Models that
    /// fail are skipped; ties keep the earlier model (strict comparison in
    /// declaration order). When every model fails, Linear is selected and no
    /// error surfaces.
    pub fn best_fit(&mut self) -> Result<()> {
        let mut best: Option<FitModel> = None;
        let mut best_r = 0.0;
        for model in FitModel::ALL {
            if let Ok(r) = self.model_summation(model).and_then(|m| correlation(&m)) {
                let r = r.abs();
                if r > best_r {
                    best = Some(model);
                    best_r = r;
                }
            }
        }
        let chosen = best.unwrap_or(FitModel::Linear);
        debug!("best fit: {chosen:?} (|r| = {best_r})");
        self.config.fit = chosen;
        Ok(())
    }

    /// Forecast x from the y in X, through the inverse transform chain.
    pub fn forecast_x(&mut self) -> Result<()> {
        let model = self.fitted_model()?;
        let v = map_unary_real(self.stack.x(), move |mut x| {
            if model.exp_after {
                if x <= 0.0 {
                    return Err(CalcError::InvalidForecastModel);
                }
                x = x.ln();
            }
            if model.slope == 0.0 {
                return Err(CalcError::StatMathError);
            }
            x = (x - model.yint) / model.slope;
            if model.ln_before {
                x = x.exp();
            }
            Ok(range::saturate(x))
        })?;
        self.stack.push_result(v);
        Ok(())
    }

    /// Forecast y from the x in X.
    pub fn forecast_y(&mut self) -> Result<()> {
        let model = self.fitted_model()?;
        let v = map_unary_real(self.stack.x(), move |mut x| {
            if model.ln_before {
                if x <= 0.0 {
                    return Err(CalcError::InvalidForecastModel);
                }
                x = x.ln();
            }
            x = x * model.slope + model.yint;
            if model.exp_after {
                x = x.exp();
            }
            Ok(range::saturate(x))
        })?;
        self.stack.push_result(v);
        Ok(())
    }
}
