//! Sexagesimal (H.MMSSssssssss) addition and subtraction.
//!
//! The fractional part is carried in scaled 64-bit integer arithmetic: one
//! hour is 360_000_000_000 units, one minute 6_000_000_000, one second
//! 100_000_000. Doing this in binary floating point instead would turn an
//! entry like 0.45 (45 minutes) into 44 minutes 59.99... seconds.

use reckon_values::{Result, Value};

use crate::range;
use crate::stack::OperandStack;
use crate::workspace::VariableStore;
use crate::Session;

const HOUR: i64 = 360_000_000_000;
const MINUTE: i64 = 6_000_000_000;
/// Width of the SSssssssss digit field in the scaled fraction.
const SECONDS_FIELD: i64 = 10_000_000_000;
const SCALE: f64 = 1_000_000_000_000.0;

/// Combine two sign-normalized HMS values in integer arithmetic and repair
/// any 60-minute/60-second artifact introduced by the final rounding back
/// to a double.
fn hms_combine(y: f64, x: f64, add: bool) -> f64 {
    let mut add = add;
    let mut x = x;
    let mut y = y;
    if x < 0.0 {
        x = -x;
        add = !add;
    }
    let neg = y < 0.0;
    if neg {
        y = -y;
        add = !add;
    }

    let rx = x.floor();
    let ry = y.floor();
    let mut res = if add { ry + rx } else { ry - rx };

    // Split H.MMSSssss fractions into sub-hour units: the low ten digits are
    // the sub-second fraction, the next two pairs are seconds and minutes.
    let mut ix = ((x - rx) * SCALE + 0.5) as i64;
    let mut iy = ((y - ry) * SCALE + 0.5) as i64;
    let mut ixhr = ix % SECONDS_FIELD;
    let mut iyhr = iy % SECONDS_FIELD;
    ix /= SECONDS_FIELD;
    iy /= SECONDS_FIELD;
    ixhr += (ix % 100) * MINUTE;
    iyhr += (iy % 100) * MINUTE;
    ixhr += (ix / 100) * HOUR;
    iyhr += (iy / 100) * HOUR;

    let mut ireshr = if add { iyhr + ixhr } else { iyhr - ixhr };
    while ireshr < 0 && res > 0.0 {
        ireshr += HOUR;
        res -= 1.0;
    }
    while ireshr > 0 && res < 0.0 {
        ireshr -= HOUR;
        res += 1.0;
    }

    // Reassemble into H.MMSSssss digit positions.
    let mut ires = ireshr % MINUTE;
    ireshr /= MINUTE;
    ires += (ireshr % 60) * SECONDS_FIELD;
    ires += (ireshr / 60) * (SCALE as i64);
    res += ires as f64 / SCALE;

    res = fix_hms(res);
    if neg {
        -res
    } else {
        res
    }
}

/// Rounding the reassembled double can leave a 60 in the seconds or minutes
/// position; push it over into the next unit.
fn fix_hms(x: f64) -> f64 {
    let neg = x < 0.0;
    let mut x = x.abs();
    if x == x + 1.0 {
        return if neg { -x } else { x };
    }
    if ((x * 10000.0) as i64) % 100 == 60 {
        x += 0.004;
    }
    if ((x * 100.0) as i64) % 100 == 60 {
        x += 0.4;
    }
    if neg {
        -x
    } else {
        x
    }
}

impl<S: OperandStack, V: VariableStore> Session<S, V> {
    pub fn hms_add(&mut self) -> Result<()> {
        self.hms_add_or_sub(true)
    }

    pub fn hms_sub(&mut self) -> Result<()> {
        self.hms_add_or_sub(false)
    }

    fn hms_add_or_sub(&mut self, add: bool) -> Result<()> {
        let x = self.stack.x().real()?;
        let y = self.stack.y().real()?;
        let res = range::checked(self.config.flags, hms_combine(y, x, add))?;
        self.stack.binary_result(Value::Real(res));
        Ok(())
    }
}
