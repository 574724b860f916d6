//! Hyperbolic and exponential operations, mapped elementwise.
//!
//! Real inputs outside a function's real domain fall back to a complex
//! scalar result unless the real-result-only flag forbids it; inside a
//! matrix there is no complex fallback and the offending element fails the
//! whole map.

use num_complex::Complex64;
use reckon_values::{CalcError, Result, Value};

use crate::elementwise::{map_unary, map_unary_real};
use crate::range;
use crate::stack::OperandStack;
use crate::workspace::VariableStore;
use crate::Session;

impl<S: OperandStack, V: VariableStore> Session<S, V> {
    pub fn asinh(&mut self) -> Result<()> {
        let v = map_unary(self.stack.x(), |x| Ok(x.asinh()), |z| Ok(z.asinh()))?;
        self.stack.push_result(v);
        Ok(())
    }

    pub fn acosh(&mut self) -> Result<()> {
        let v = match self.stack.x() {
            Value::Text(_) => return Err(CalcError::AlphaDataInvalid),
            Value::Real(x) if *x < 1.0 => {
                if self.config.flags.real_result_only {
                    return Err(CalcError::InvalidData);
                }
                let w = Complex64::new(*x, 0.0).acosh();
                Value::Complex(w.re, w.im)
            }
            x => map_unary(
                x,
                |r| {
                    if r >= 1.0 {
                        Ok(r.acosh())
                    } else {
                        Err(CalcError::InvalidData)
                    }
                },
                |z| Ok(z.acosh()),
            )?,
        };
        self.stack.push_result(v);
        Ok(())
    }

    pub fn atanh(&mut self) -> Result<()> {
        let v = match self.stack.x() {
            Value::Text(_) => return Err(CalcError::AlphaDataInvalid),
            Value::Real(x) => {
                let x = *x;
                if x == 1.0 || x == -1.0 {
                    return Err(CalcError::InvalidData);
                }
                if !(-1.0..=1.0).contains(&x) {
                    if self.config.flags.real_result_only {
                        return Err(CalcError::InvalidData);
                    }
                    let w = Complex64::new(x, 0.0).atanh();
                    Value::Complex(w.re, w.im)
                } else {
                    Value::Real(x.atanh())
                }
            }
            x => map_unary(
                x,
                |r| {
                    if r == 1.0 || r == -1.0 {
                        Err(CalcError::InvalidData)
                    } else {
                        Ok(r.atanh())
                    }
                },
                |z| Ok(z.atanh()),
            )?,
        };
        self.stack.push_result(v);
        Ok(())
    }

    pub fn sinh(&mut self) -> Result<()> {
        let flags = self.config.flags;
        let v = map_unary(
            self.stack.x(),
            move |x| range::checked(flags, x.sinh()),
            move |z| clamp_complex(flags, z.sinh()),
        )?;
        self.stack.push_result(v);
        Ok(())
    }

    pub fn cosh(&mut self) -> Result<()> {
        let flags = self.config.flags;
        let v = map_unary(
            self.stack.x(),
            move |x| range::checked(flags, x.cosh()),
            move |z| clamp_complex(flags, z.cosh()),
        )?;
        self.stack.push_result(v);
        Ok(())
    }

    pub fn tanh(&mut self) -> Result<()> {
        let flags = self.config.flags;
        let v = map_unary(
            self.stack.x(),
            |x| Ok(x.tanh()),
            move |z| clamp_complex(flags, z.tanh()),
        )?;
        self.stack.push_result(v);
        Ok(())
    }

    /// `e^x - 1`, accurate near zero. Real operands only.
    pub fn expm1(&mut self) -> Result<()> {
        let flags = self.config.flags;
        let v = map_unary_real(self.stack.x(), move |x| {
            let y = x.exp_m1();
            if y.is_infinite() {
                if flags.range_error_ignore {
                    Ok(range::HUGE)
                } else {
                    Err(CalcError::OutOfRange)
                }
            } else {
                Ok(y)
            }
        })?;
        self.stack.push_result(v);
        Ok(())
    }
}

fn clamp_complex(flags: crate::Flags, z: Complex64) -> Result<Complex64> {
    Ok(Complex64::new(
        range::checked(flags, z.re)?,
        range::checked(flags, z.im)?,
    ))
}
