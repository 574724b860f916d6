//! Bounded-width integer arithmetic for the programmer's base modes.
//!
//! Operands are signed integers in the 36-bit range [-2^35, 2^35 - 1],
//! carried on the stack as real values. Results outside the range either
//! saturate to the nearest bound (when range errors are ignored) or fail
//! `OutOfRange`.

use reckon_values::{CalcError, Result, Value};

use crate::context::Flags;
use crate::stack::OperandStack;
use crate::workspace::VariableStore;
use crate::Session;

pub const BASE_MIN: i64 = -(1 << 35);
pub const BASE_MAX: i64 = (1 << 35) - 1;

/// Outcome of a bit test: control flow, not a data value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitTest {
    Set,
    Clear,
}

fn to_base_int(v: &Value) -> Result<i64> {
    let x = v.real()?;
    if !(BASE_MIN as f64..=BASE_MAX as f64).contains(&x) {
        return Err(CalcError::InvalidData);
    }
    Ok(x.trunc() as i64)
}

fn range_check(flags: Flags, v: i64) -> Result<i64> {
    if v < BASE_MIN {
        if flags.range_error_ignore {
            Ok(BASE_MIN)
        } else {
            Err(CalcError::OutOfRange)
        }
    } else if v > BASE_MAX {
        if flags.range_error_ignore {
            Ok(BASE_MAX)
        } else {
            Err(CalcError::OutOfRange)
        }
    } else {
        Ok(v)
    }
}

impl<S: OperandStack, V: VariableStore> Session<S, V> {
    pub fn base_add(&mut self) -> Result<()> {
        let x = to_base_int(self.stack.x())?;
        let y = to_base_int(self.stack.y())?;
        let res = range_check(self.config.flags, x + y)?;
        self.stack.binary_result(Value::Real(res as f64));
        Ok(())
    }

    pub fn base_sub(&mut self) -> Result<()> {
        let x = to_base_int(self.stack.x())?;
        let y = to_base_int(self.stack.y())?;
        let res = range_check(self.config.flags, y - x)?;
        self.stack.binary_result(Value::Real(res as f64));
        Ok(())
    }

    pub fn base_mul(&mut self) -> Result<()> {
        let x = to_base_int(self.stack.x())?;
        let y = to_base_int(self.stack.y())?;
        // The product is formed in floating point: 36-bit operands can
        // overflow an i64 product's usable range silently, a double cannot.
        let res = (x as f64) * (y as f64);
        let flags = self.config.flags;
        let res = if res < BASE_MIN as f64 {
            if flags.range_error_ignore {
                BASE_MIN as f64
            } else {
                return Err(CalcError::OutOfRange);
            }
        } else if res > BASE_MAX as f64 {
            if flags.range_error_ignore {
                BASE_MAX as f64
            } else {
                return Err(CalcError::OutOfRange);
            }
        } else {
            res
        };
        self.stack.binary_result(Value::Real(res));
        Ok(())
    }

    pub fn base_div(&mut self) -> Result<()> {
        let x = to_base_int(self.stack.x())?;
        let y = to_base_int(self.stack.y())?;
        if x == 0 {
            return Err(CalcError::DivideByZero);
        }
        let res = range_check(self.config.flags, y / x)?;
        self.stack.binary_result(Value::Real(res as f64));
        Ok(())
    }

    /// Negate X in place. Negating the minimum representable value is the
    /// one overflow this can produce.
    pub fn base_neg(&mut self) -> Result<()> {
        let x = to_base_int(self.stack.x())?;
        let res = if x == BASE_MIN {
            if self.config.flags.range_error_ignore {
                BASE_MAX
            } else {
                return Err(CalcError::OutOfRange);
            }
        } else {
            -x
        };
        self.stack.replace_x(Value::Real(res as f64));
        Ok(())
    }

    /// Bitwise AND of the two's-complement patterns of Y and X.
    pub fn bit_and(&mut self) -> Result<()> {
        let x = to_base_int(self.stack.x())?;
        let y = to_base_int(self.stack.y())?;
        self.stack.binary_result(Value::Real((x & y) as f64));
        Ok(())
    }

    /// Test bit X (0..=35) of Y.
    pub fn bit_test(&mut self) -> Result<BitTest> {
        let x = to_base_int(self.stack.x())?;
        let y = to_base_int(self.stack.y())?;
        if !(0..=35).contains(&x) {
            return Err(CalcError::InvalidData);
        }
        if y & (1i64 << x) != 0 {
            Ok(BitTest::Set)
        } else {
            Ok(BitTest::Clear)
        }
    }
}
