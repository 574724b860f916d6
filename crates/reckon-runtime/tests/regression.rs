//! Statistics and regression against hand-computed register contents.

use reckon_runtime::{
    CalcError, FitModel, OperandStack, RealCell, RealMatrix, RpnStack, Session, Value,
    VariableStore, Workspace,
};

fn session() -> Session<RpnStack, Workspace> {
    Session::new(RpnStack::new(), Workspace::new())
}

/// Load the register variable with the six running sums at the default
/// offset, zero elsewhere.
fn load_sums(s: &mut Session<RpnStack, Workspace>, sums: &[f64]) {
    let mut cells = vec![RealCell::Num(0.0); 25];
    for (k, v) in sums.iter().enumerate() {
        cells[s.config.sigma_reg + k] = RealCell::Num(*v);
    }
    let m = RealMatrix::from_cells(1, 25, cells).unwrap();
    s.vars.store("REGS", Value::RealMatrix(m)).unwrap();
}

/// Points (1,2), (2,4), (3,6): a perfect y = 2x line.
fn perfect_line(s: &mut Session<RpnStack, Workspace>) {
    load_sums(s, &[6.0, 14.0, 12.0, 56.0, 28.0, 3.0]);
}

#[test]
fn linear_fit_of_a_perfect_line() {
    let mut s = session();
    perfect_line(&mut s);

    s.slope().unwrap();
    assert_eq!(s.stack.x(), &Value::Real(2.0));

    s.yint().unwrap();
    assert_eq!(s.stack.x(), &Value::Real(0.0));

    s.corr().unwrap();
    assert_eq!(s.stack.x(), &Value::Real(1.0));
}

#[test]
fn forecasts_invert_each_other() {
    let mut s = session();
    perfect_line(&mut s);

    s.stack.replace_x(Value::Real(5.0));
    s.forecast_y().unwrap();
    assert_eq!(s.stack.x(), &Value::Real(10.0));

    s.forecast_x().unwrap();
    assert_eq!(s.stack.x(), &Value::Real(5.0));
}

#[test]
fn forecast_maps_over_matrices() {
    let mut s = session();
    perfect_line(&mut s);

    let m = RealMatrix::from_data(1, 3, vec![1.0, 2.0, 3.0]).unwrap();
    s.stack.replace_x(Value::RealMatrix(m));
    s.forecast_y().unwrap();
    match s.stack.x() {
        Value::RealMatrix(r) => assert_eq!(
            r.cells(),
            &[RealCell::Num(2.0), RealCell::Num(4.0), RealCell::Num(6.0)]
        ),
        _ => unreachable!(),
    }
}

#[test]
fn mean_sdev_sum_and_weighted_mean() {
    let mut s = session();
    perfect_line(&mut s);

    s.mean().unwrap();
    assert_eq!(s.stack.x(), &Value::Real(2.0));
    assert_eq!(s.stack.y(), &Value::Real(4.0));

    s.sdev().unwrap();
    assert_eq!(s.stack.x(), &Value::Real(1.0));
    assert_eq!(s.stack.y(), &Value::Real(2.0));

    s.sum().unwrap();
    assert_eq!(s.stack.x(), &Value::Real(6.0));
    assert_eq!(s.stack.y(), &Value::Real(12.0));

    s.weighted_mean().unwrap();
    let wm = s.stack.x().real().unwrap();
    assert!((wm - 28.0 / 12.0).abs() < 1e-15);
}

#[test]
fn degenerate_samples_are_stat_math_errors() {
    let mut s = session();
    load_sums(&mut s, &[0.0, 0.0, 0.0, 0.0, 0.0, 0.0]); // n = 0
    assert_eq!(s.mean().unwrap_err(), CalcError::StatMathError);
    assert_eq!(s.slope().unwrap_err(), CalcError::StatMathError);

    load_sums(&mut s, &[1.0, 1.0, 2.0, 4.0, 2.0, 1.0]); // n = 1
    assert_eq!(s.sdev().unwrap_err(), CalcError::StatMathError);
    assert_eq!(s.corr().unwrap_err(), CalcError::StatMathError);
}

#[test]
fn register_window_validation() {
    let mut s = session();
    assert_eq!(s.mean().unwrap_err(), CalcError::SizeError);

    s.vars.store("REGS", Value::Real(1.0)).unwrap();
    assert_eq!(s.mean().unwrap_err(), CalcError::InvalidType);

    perfect_line(&mut s);
    s.config.sigma_reg = 20; // window runs past the 25 registers
    assert_eq!(s.mean().unwrap_err(), CalcError::SizeError);

    s.config.sigma_reg = 11;
    let mut cells = vec![RealCell::Num(0.0); 25];
    cells[13] = RealCell::text("AB");
    let m = RealMatrix::from_cells(1, 25, cells).unwrap();
    s.vars.store("REGS", Value::RealMatrix(m)).unwrap();
    assert_eq!(s.mean().unwrap_err(), CalcError::AlphaDataInvalid);
}

#[test]
fn disabled_models_fail_forecasting() {
    let mut s = session();
    perfect_line(&mut s);
    s.config.fit = FitModel::Log;
    s.config.flags.log_fit_invalid = true;
    assert_eq!(s.slope().unwrap_err(), CalcError::InvalidForecastModel);
}

/// Points (1,0), (e,2), (e^2,4): y = 2 ln x exactly.
fn log_line(s: &mut Session<RpnStack, Workspace>) {
    use std::f64::consts::E;
    let x1 = 1.0;
    let x2 = E;
    let x3 = E * E;
    s.config.flags.all_sigma = true;
    let sums = [
        x1 + x2 + x3,
        x1 * x1 + x2 * x2 + x3 * x3,
        6.0,  // y
        20.0, // y^2
        2.0 * x2 + 4.0 * x3,
        3.0,
        3.0,  // ln x
        5.0,  // (ln x)^2
        0.0,  // ln y sums unavailable: y = 0 has no logarithm
        0.0,
        0.0,
        0.0,
        10.0, // y ln x
    ];
    let mut cells = vec![RealCell::Num(0.0); 25];
    for (k, v) in sums.iter().enumerate() {
        cells[s.config.sigma_reg + k] = RealCell::Num(*v);
    }
    let m = RealMatrix::from_cells(1, 25, cells).unwrap();
    s.vars.store("REGS", Value::RealMatrix(m)).unwrap();
}

#[test]
fn best_fit_picks_the_log_model() {
    let mut s = session();
    log_line(&mut s);

    s.best_fit().unwrap();
    assert_eq!(s.config.fit, FitModel::Log);

    s.slope().unwrap();
    assert_eq!(s.stack.x(), &Value::Real(2.0));
    s.yint().unwrap();
    assert_eq!(s.stack.x(), &Value::Real(0.0));

    // Forecast through the inverse transform chain: y = 4 maps back to e^2.
    s.stack.replace_x(Value::Real(4.0));
    s.forecast_x().unwrap();
    let got = s.stack.x().real().unwrap();
    assert!((got - (std::f64::consts::E * std::f64::consts::E)).abs() < 1e-12);
}

#[test]
fn best_fit_ties_keep_the_earlier_model() {
    // Two distinct points correlate perfectly under every usable model;
    // the strict comparison keeps Linear, the first in iteration order.
    let mut s = session();
    s.config.flags.all_sigma = true;
    let (x1, y1): (f64, f64) = (1.0, 1.0);
    let (x2, y2): (f64, f64) = (2.0, 3.0);
    let sums = [
        x1 + x2,
        x1 * x1 + x2 * x2,
        y1 + y2,
        y1 * y1 + y2 * y2,
        x1 * y1 + x2 * y2,
        2.0,
        x1.ln() + x2.ln(),
        x1.ln().powi(2) + x2.ln().powi(2),
        y1.ln() + y2.ln(),
        y1.ln().powi(2) + y2.ln().powi(2),
        x1.ln() * y1.ln() + x2.ln() * y2.ln(),
        x1 * y1.ln() + x2 * y2.ln(),
        y1 * x1.ln() + y2 * x2.ln(),
    ];
    let mut cells = vec![RealCell::Num(0.0); 25];
    for (k, v) in sums.iter().enumerate() {
        cells[s.config.sigma_reg + k] = RealCell::Num(*v);
    }
    let m = RealMatrix::from_cells(1, 25, cells).unwrap();
    s.vars.store("REGS", Value::RealMatrix(m)).unwrap();

    s.best_fit().unwrap();
    assert_eq!(s.config.fit, FitModel::Linear);
}

#[test]
fn best_fit_defaults_to_linear_when_every_model_fails() {
    let mut s = session();
    load_sums(&mut s, &[0.0; 6]); // n = 0 everywhere
    s.config.fit = FitModel::Exp;

    s.best_fit().unwrap();
    assert_eq!(s.config.fit, FitModel::Linear);
}
