//! Vector operations and matrix dimensioning commands.

use reckon_values::{CalcError, RealCell, RealMatrix, Result, Value};

use crate::context::Flags;
use crate::range;
use crate::stack::OperandStack;
use crate::workspace::VariableStore;
use crate::Session;

/// Read a matrix extent from a scalar operand: magnitude is taken, fractions
/// truncate, zero is a dimension error, and anything at or above 2^31 fails
/// with `huge_err` (the two commands that share this disagree on the kind).
pub(crate) fn extent_arg(v: &Value, huge_err: CalcError) -> Result<usize> {
    let x = v.real()?;
    if x == 0.0 {
        return Err(CalcError::DimensionError);
    }
    let x = x.abs();
    if x >= 2147483648.0 {
        return Err(huge_err);
    }
    Ok(x.trunc() as usize)
}

fn ensure_numeric(m: &RealMatrix) -> Result<()> {
    if m.cells().iter().any(RealCell::is_text) {
        return Err(CalcError::AlphaDataInvalid);
    }
    Ok(())
}

/// First three components of a short vector, missing trailing components
/// defaulting to zero.
fn vector3(m: &RealMatrix) -> Result<(f64, f64, f64)> {
    if m.len() > 3 {
        return Err(CalcError::DimensionError);
    }
    ensure_numeric(m)?;
    let mut c = [0.0; 3];
    for (slot, cell) in c.iter_mut().zip(m.cells()) {
        *slot = cell.number()?;
    }
    match m.len() {
        1 => Ok((c[0], 0.0, 0.0)),
        2 => Ok((c[0], c[1], 0.0)),
        _ => Ok((c[0], c[1], c[2])),
    }
}

fn frobenius(flags: Flags, v: &Value) -> Result<f64> {
    match v {
        Value::RealMatrix(m) => {
            ensure_numeric(m)?;
            let mut nrm = 0.0;
            for cell in m.cells() {
                let x = cell.number()?;
                nrm += x * x;
            }
            if nrm.is_infinite() {
                if flags.range_error_ignore {
                    Ok(range::HUGE)
                } else {
                    Err(CalcError::OutOfRange)
                }
            } else {
                Ok(nrm.sqrt())
            }
        }
        Value::ComplexMatrix(m) => {
            let mut nrm = 0.0;
            for &(re, im) in m.data() {
                nrm += re * re + im * im;
            }
            if nrm.is_infinite() {
                if flags.range_error_ignore {
                    Ok(range::HUGE)
                } else {
                    Err(CalcError::OutOfRange)
                }
            } else {
                Ok(nrm.sqrt())
            }
        }
        Value::Text(_) => Err(CalcError::AlphaDataInvalid),
        _ => Err(CalcError::InvalidType),
    }
}

impl<S: OperandStack, V: VariableStore> Session<S, V> {
    /// Dot product of Y and X: matching-length matrix pairs in any real or
    /// complex combination, or a pair of complex scalars.
    pub fn dot(&mut self) -> Result<()> {
        let flags = self.config.flags;
        let v = match (self.stack.y(), self.stack.x()) {
            (Value::Text(_), _) | (_, Value::Text(_)) => {
                return Err(CalcError::AlphaDataInvalid)
            }
            (Value::RealMatrix(my), Value::RealMatrix(mx)) => {
                if my.len() != mx.len() {
                    return Err(CalcError::DimensionError);
                }
                ensure_numeric(my)?;
                ensure_numeric(mx)?;
                let mut dot = 0.0;
                for (a, b) in my.cells().iter().zip(mx.cells()) {
                    dot += a.number()? * b.number()?;
                }
                Value::Real(range::checked(flags, dot)?)
            }
            (Value::RealMatrix(rm), Value::ComplexMatrix(cm))
            | (Value::ComplexMatrix(cm), Value::RealMatrix(rm)) => {
                if rm.len() != cm.len() {
                    return Err(CalcError::DimensionError);
                }
                ensure_numeric(rm)?;
                let mut dot_re = 0.0;
                let mut dot_im = 0.0;
                for (a, &(re, im)) in rm.cells().iter().zip(cm.data()) {
                    let a = a.number()?;
                    dot_re += a * re;
                    dot_im += a * im;
                }
                Value::Complex(range::checked(flags, dot_re)?, range::checked(flags, dot_im)?)
            }
            (Value::ComplexMatrix(my), Value::ComplexMatrix(mx)) => {
                if my.len() != mx.len() {
                    return Err(CalcError::DimensionError);
                }
                let mut dot_re = 0.0;
                let mut dot_im = 0.0;
                for (&(re1, im1), &(re2, im2)) in my.data().iter().zip(mx.data()) {
                    dot_re += re1 * re2 - im1 * im2;
                    dot_im += re1 * im2 + re2 * im1;
                }
                Value::Complex(range::checked(flags, dot_re)?, range::checked(flags, dot_im)?)
            }
            (Value::Complex(yre, yim), Value::Complex(xre, xim)) => {
                Value::Real(range::checked(flags, yre * xre + yim * xim)?)
            }
            _ => return Err(CalcError::InvalidType),
        };
        self.stack.binary_result(v);
        Ok(())
    }

    /// Cross product of Y and X. Vectors of up to three elements produce a
    /// 1x3 vector; a pair of complex scalars produces the scalar z-component.
    pub fn cross(&mut self) -> Result<()> {
        let flags = self.config.flags;
        let v = match (self.stack.y(), self.stack.x()) {
            (Value::Text(_), _) | (_, Value::Text(_)) => {
                return Err(CalcError::AlphaDataInvalid)
            }
            (Value::Complex(yre, yim), Value::Complex(xre, xim)) => {
                Value::Real(range::checked(flags, yre * xim - yim * xre)?)
            }
            (Value::RealMatrix(my), Value::RealMatrix(mx)) => {
                let (xl, yl, zl) = vector3(my)?;
                let (xr, yr, zr) = vector3(mx)?;
                let data = vec![
                    range::checked(flags, yl * zr - zl * yr)?,
                    range::checked(flags, zl * xr - xl * zr)?,
                    range::checked(flags, xl * yr - yl * xr)?,
                ];
                Value::RealMatrix(RealMatrix::from_data(1, 3, data)?)
            }
            _ => return Err(CalcError::InvalidType),
        };
        self.stack.binary_result(v);
        Ok(())
    }

    /// Frobenius norm of the matrix in X.
    pub fn frobenius_norm(&mut self) -> Result<()> {
        let flags = self.config.flags;
        let nrm = frobenius(flags, self.stack.x())?;
        self.stack.push_result(Value::Real(nrm));
        Ok(())
    }

    /// Scale the real matrix in X to unit Frobenius norm. A zero vector is
    /// returned unchanged.
    pub fn unit_vector(&mut self) -> Result<()> {
        let flags = self.config.flags;
        if matches!(self.stack.x(), Value::ComplexMatrix(_)) {
            return Err(CalcError::InvalidType);
        }
        let norm = frobenius(flags, self.stack.x())?;
        let v = match self.stack.x() {
            Value::RealMatrix(m) if norm == 0.0 => Value::RealMatrix(m.clone()),
            Value::RealMatrix(m) => {
                let mut data = reckon_values::alloc::try_vec(m.len(), 0.0)?;
                for (slot, cell) in data.iter_mut().zip(m.cells()) {
                    *slot = cell.number()? / norm;
                }
                Value::RealMatrix(RealMatrix::from_data(m.rows(), m.cols(), data)?)
            }
            _ => return Err(CalcError::InvalidType),
        };
        self.stack.push_result(v);
        Ok(())
    }

    /// Create or reshape the matrix variable `name`; row count comes from Y,
    /// column count from X.
    pub fn dimension_var(&mut self, name: &str) -> Result<()> {
        let cols = extent_arg(self.stack.x(), CalcError::InsufficientMemory)?;
        let rows = extent_arg(self.stack.y(), CalcError::InsufficientMemory)?;
        self.vars.dimension(name, rows, cols)
    }
}
