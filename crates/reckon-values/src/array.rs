//! Backing stores shared by matrix values.
//!
//! An array is owned by every matrix handle whose `Rc` points at it; the
//! strong count is the holder count. Mutation goes through the handles in
//! `matrix`, which enforce the copy-on-write discipline.

use std::cmp::Ordering;

use crate::alloc;
use crate::error::{CalcError, Result};

/// Upper bound on text stored in a single real-matrix cell.
pub const MAX_CELL_TEXT: usize = 6;

/// One element of a real matrix: either a number or a short text tag.
/// Text cells are rejected by every arithmetic consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum RealCell {
    Num(f64),
    Text(String),
}

impl RealCell {
    /// Short text tag, truncated to [`MAX_CELL_TEXT`] bytes.
    pub fn text(s: impl Into<String>) -> Self {
        let mut s = s.into();
        s.truncate(MAX_CELL_TEXT);
        RealCell::Text(s)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, RealCell::Text(_))
    }

    /// Numeric content, failing on text cells.
    pub fn number(&self) -> Result<f64> {
        match self {
            RealCell::Num(x) => Ok(*x),
            RealCell::Text(_) => Err(CalcError::AlphaDataInvalid),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RealArray {
    pub data: Vec<RealCell>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComplexArray {
    /// `(re, im)` pairs.
    pub data: Vec<(f64, f64)>,
}

impl RealArray {
    pub fn zeros(len: usize) -> Result<Self> {
        Ok(RealArray {
            data: alloc::try_vec(len, RealCell::Num(0.0))?,
        })
    }

    /// Resize the flat buffer, zero-filling new cells. On failure the buffer
    /// is untouched.
    pub(crate) fn resize(&mut self, new_len: usize) -> Result<()> {
        match new_len.cmp(&self.data.len()) {
            Ordering::Greater => {
                let extra = new_len - self.data.len();
                alloc::try_grow(&mut self.data, extra)?;
                self.data.resize(new_len, RealCell::Num(0.0));
            }
            Ordering::Less => {
                alloc::shrink_check()?;
                self.data.truncate(new_len);
                self.data.shrink_to_fit();
            }
            Ordering::Equal => {}
        }
        Ok(())
    }
}

impl ComplexArray {
    pub fn zeros(len: usize) -> Result<Self> {
        Ok(ComplexArray {
            data: alloc::try_vec(len, (0.0, 0.0))?,
        })
    }

    pub(crate) fn resize(&mut self, new_len: usize) -> Result<()> {
        match new_len.cmp(&self.data.len()) {
            Ordering::Greater => {
                let extra = new_len - self.data.len();
                alloc::try_grow(&mut self.data, extra)?;
                self.data.resize(new_len, (0.0, 0.0));
            }
            Ordering::Less => {
                alloc::shrink_check()?;
                self.data.truncate(new_len);
                self.data.shrink_to_fit();
            }
            Ordering::Equal => {}
        }
        Ok(())
    }
}
