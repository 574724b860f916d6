//! Runtime value model for the reckon calculator engine.
//!
//! Five kinds of value flow through the engine: real and complex scalars,
//! short text, and real and complex matrices. Matrix payloads are handles
//! onto shared, reference-counted backing arrays with copy-on-write
//! mutation; duplicating a matrix value is O(1), duplicating a scalar or
//! text value is a full copy. Equality is structural on kind and content,
//! never on array identity.

use std::fmt;

pub mod alloc;
pub mod array;
pub mod error;
pub mod matrix;

pub use array::{ComplexArray, RealArray, RealCell, MAX_CELL_TEXT};
pub use error::{CalcError, Result};
pub use matrix::{ComplexMatrix, RealMatrix};

/// Upper bound on a free-standing text value (the alpha register width).
pub const MAX_TEXT: usize = 44;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Real(f64),
    Complex(f64, f64),
    Text(String),
    RealMatrix(RealMatrix),
    ComplexMatrix(ComplexMatrix),
}

impl Value {
    /// Text value, truncated to [`MAX_TEXT`] bytes.
    pub fn text(s: impl Into<String>) -> Self {
        let mut s = s.into();
        s.truncate(MAX_TEXT);
        Value::Text(s)
    }

    pub fn is_matrix(&self) -> bool {
        matches!(self, Value::RealMatrix(_) | Value::ComplexMatrix(_))
    }

    /// Real scalar content. Text fails `AlphaDataInvalid`, every other kind
    /// `InvalidType`; this is the standard classification every arithmetic
    /// consumer performs.
    pub fn real(&self) -> Result<f64> {
        match self {
            Value::Real(x) => Ok(*x),
            Value::Text(_) => Err(CalcError::AlphaDataInvalid),
            _ => Err(CalcError::InvalidType),
        }
    }

    /// Matrix shape, if this is a matrix.
    pub fn dims(&self) -> Option<(usize, usize)> {
        match self {
            Value::RealMatrix(m) => Some((m.rows(), m.cols())),
            Value::ComplexMatrix(m) => Some((m.rows(), m.cols())),
            _ => None,
        }
    }

    /// Single element of a matrix value, as a lone scalar/text value.
    pub fn element(&self, i: usize, j: usize) -> Result<Value> {
        match self {
            Value::RealMatrix(m) => Ok(match m.cell(i, j)? {
                RealCell::Num(x) => Value::Real(*x),
                RealCell::Text(s) => Value::Text(s.clone()),
            }),
            Value::ComplexMatrix(m) => {
                let (re, im) = m.get(i, j)?;
                Ok(Value::Complex(re, im))
            }
            _ => Err(CalcError::InvalidType),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Real(0.0)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Real(x)
    }
}

impl From<RealMatrix> for Value {
    fn from(m: RealMatrix) -> Self {
        Value::RealMatrix(m)
    }
}

impl From<ComplexMatrix> for Value {
    fn from(m: ComplexMatrix) -> Self {
        Value::ComplexMatrix(m)
    }
}

fn fmt_complex(f: &mut fmt::Formatter<'_>, re: f64, im: f64) -> fmt::Result {
    if im < 0.0 {
        write!(f, "{re}-{}i", -im)
    } else {
        write!(f, "{re}+{im}i")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Real(x) => write!(f, "{x}"),
            Value::Complex(re, im) => fmt_complex(f, *re, *im),
            Value::Text(s) => write!(f, "\"{s}\""),
            Value::RealMatrix(m) => {
                write!(f, "[")?;
                for i in 0..m.rows() {
                    for j in 0..m.cols() {
                        if j > 0 {
                            write!(f, " ")?;
                        }
                        match &m.cells()[i * m.cols() + j] {
                            RealCell::Num(x) => write!(f, "{x}")?,
                            RealCell::Text(s) => write!(f, "\"{s}\"")?,
                        }
                    }
                    if i + 1 < m.rows() {
                        write!(f, "; ")?;
                    }
                }
                write!(f, "]")
            }
            Value::ComplexMatrix(m) => {
                write!(f, "[")?;
                for i in 0..m.rows() {
                    for j in 0..m.cols() {
                        if j > 0 {
                            write!(f, " ")?;
                        }
                        let (re, im) = m.data()[i * m.cols() + j];
                        fmt_complex(f, re, im)?;
                    }
                    if i + 1 < m.rows() {
                        write!(f, "; ")?;
                    }
                }
                write!(f, "]")
            }
        }
    }
}
