//! Matrix value handles over the shared backing stores.
//!
//! A handle is `{rows, cols, Rc<array>}` with `rows * cols` equal to the
//! array's element count at all times. Cloning a handle is O(1) and bumps
//! the holder count; mutation is copy-on-write: exclusively held arrays are
//! edited in place, shared arrays are replaced by a freshly allocated copy
//! before the edit ("disentangling" the holders from each other).

use std::rc::Rc;

use log::debug;

use crate::alloc;
use crate::array::{ComplexArray, RealArray, RealCell};
use crate::error::{CalcError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct RealMatrix {
    rows: usize,
    cols: usize,
    array: Rc<RealArray>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComplexMatrix {
    rows: usize,
    cols: usize,
    array: Rc<ComplexArray>,
}

fn checked_extent(rows: usize, cols: usize) -> Result<usize> {
    if rows == 0 || cols == 0 {
        return Err(CalcError::DimensionError);
    }
    rows.checked_mul(cols).ok_or(CalcError::InsufficientMemory)
}

/// Bubble the cells of `row` to the bottom, one column at a time, by
/// swapping within the existing buffer. Reversible with [`rotate_row_up`];
/// no scratch storage.
fn rotate_row_down<T>(data: &mut [T], rows: usize, cols: usize, row: usize) {
    for j in 0..cols {
        for i in row..rows - 1 {
            data.swap(i * cols + j, (i + 1) * cols + j);
        }
    }
}

fn rotate_row_up<T>(data: &mut [T], rows: usize, cols: usize, row: usize) {
    for j in 0..cols {
        for i in (row..rows - 1).rev() {
            data.swap(i * cols + j, (i + 1) * cols + j);
        }
    }
}

impl RealMatrix {
    /// Zero-filled `rows x cols` matrix.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        let len = checked_extent(rows, cols)?;
        Ok(RealMatrix {
            rows,
            cols,
            array: Rc::new(RealArray::zeros(len)?),
        })
    }

    pub fn from_cells(rows: usize, cols: usize, cells: Vec<RealCell>) -> Result<Self> {
        if checked_extent(rows, cols)? != cells.len() {
            return Err(CalcError::DimensionError);
        }
        Ok(RealMatrix {
            rows,
            cols,
            array: Rc::new(RealArray { data: cells }),
        })
    }

    pub fn from_data(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        Self::from_cells(rows, cols, data.into_iter().map(RealCell::Num).collect())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        false // rows >= 1 and cols >= 1 by construction
    }

    /// Number of handles currently sharing the backing array.
    pub fn holders(&self) -> usize {
        Rc::strong_count(&self.array)
    }

    pub fn cells(&self) -> &[RealCell] {
        &self.array.data
    }

    // Row-major linearization: lin = row * cols + col.
    fn index(&self, i: usize, j: usize) -> Result<usize> {
        if i >= self.rows || j >= self.cols {
            return Err(CalcError::DimensionError);
        }
        Ok(i * self.cols + j)
    }

    pub fn cell(&self, i: usize, j: usize) -> Result<&RealCell> {
        Ok(&self.array.data[self.index(i, j)?])
    }

    /// Exclusive access to the backing array, copying it first if shared.
    fn make_mut(&mut self) -> Result<&mut RealArray> {
        if Rc::strong_count(&self.array) > 1 {
            debug!(
                "disentangling real array shared by {} holders",
                Rc::strong_count(&self.array)
            );
            let copy = RealArray {
                data: alloc::try_clone(&self.array.data)?,
            };
            self.array = Rc::new(copy);
        }
        Rc::get_mut(&mut self.array).ok_or(CalcError::InternalError)
    }

    /// Copy-on-write single-cell store.
    pub fn set_cell(&mut self, i: usize, j: usize, cell: RealCell) -> Result<()> {
        let idx = self.index(i, j)?;
        self.make_mut()?.data[idx] = cell;
        Ok(())
    }

    /// Change the shape to `rows x cols`, keeping the flat element order and
    /// zero-filling any growth. Shared arrays are replaced, exclusive arrays
    /// are resized in place; failure leaves the value untouched either way.
    pub fn redimension(&mut self, rows: usize, cols: usize) -> Result<()> {
        let new_len = checked_extent(rows, cols)?;
        if Rc::strong_count(&self.array) == 1 {
            Rc::get_mut(&mut self.array)
                .ok_or(CalcError::InternalError)?
                .resize(new_len)?;
        } else {
            let keep = new_len.min(self.len());
            let mut data = alloc::try_vec(new_len, RealCell::Num(0.0))?;
            data[..keep].clone_from_slice(&self.array.data[..keep]);
            self.array = Rc::new(RealArray { data });
        }
        self.rows = rows;
        self.cols = cols;
        Ok(())
    }

    /// Remove one row. On an exclusively held array the doomed row is
    /// rotated to the bottom and the buffer shrunk; if the shrink fails the
    /// rotation is reversed in place and the value is exactly as it was.
    /// On a shared array a fresh `(rows-1) x cols` copy is built first, so
    /// the other holders never observe the edit.
    pub fn remove_row(&mut self, row: usize) -> Result<()> {
        if self.rows <= 1 || row >= self.rows {
            return Err(CalcError::DimensionError);
        }
        let (rows, cols) = (self.rows, self.cols);
        if Rc::strong_count(&self.array) == 1 {
            let arr = Rc::get_mut(&mut self.array).ok_or(CalcError::InternalError)?;
            rotate_row_down(&mut arr.data, rows, cols, row);
            if let Err(e) = arr.resize((rows - 1) * cols) {
                debug!("row removal shrink failed; reversing rotation");
                rotate_row_up(&mut arr.data, rows, cols, row);
                return Err(e);
            }
        } else {
            let split = row * cols;
            let mut data = alloc::try_vec((rows - 1) * cols, RealCell::Num(0.0))?;
            data[..split].clone_from_slice(&self.array.data[..split]);
            data[split..].clone_from_slice(&self.array.data[split + cols..]);
            self.array = Rc::new(RealArray { data });
        }
        self.rows -= 1;
        Ok(())
    }

    /// Freshly allocated copy of the `rows x cols` block at
    /// `(origin_i, origin_j)`. Never shares storage with `self`.
    pub fn submatrix(
        &self,
        origin_i: usize,
        origin_j: usize,
        rows: usize,
        cols: usize,
    ) -> Result<RealMatrix> {
        checked_extent(rows, cols)?;
        if origin_i + rows > self.rows || origin_j + cols > self.cols {
            return Err(CalcError::DimensionError);
        }
        let mut data = alloc::try_vec(rows * cols, RealCell::Num(0.0))?;
        for i in 0..rows {
            for j in 0..cols {
                data[i * cols + j] =
                    self.array.data[(origin_i + i) * self.cols + origin_j + j].clone();
            }
        }
        RealMatrix::from_cells(rows, cols, data)
    }
}

impl ComplexMatrix {
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        let len = checked_extent(rows, cols)?;
        Ok(ComplexMatrix {
            rows,
            cols,
            array: Rc::new(ComplexArray::zeros(len)?),
        })
    }

    pub fn from_data(rows: usize, cols: usize, data: Vec<(f64, f64)>) -> Result<Self> {
        if checked_extent(rows, cols)? != data.len() {
            return Err(CalcError::DimensionError);
        }
        Ok(ComplexMatrix {
            rows,
            cols,
            array: Rc::new(ComplexArray { data }),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn holders(&self) -> usize {
        Rc::strong_count(&self.array)
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.array.data
    }

    fn index(&self, i: usize, j: usize) -> Result<usize> {
        if i >= self.rows || j >= self.cols {
            return Err(CalcError::DimensionError);
        }
        Ok(i * self.cols + j)
    }

    pub fn get(&self, i: usize, j: usize) -> Result<(f64, f64)> {
        Ok(self.array.data[self.index(i, j)?])
    }

    fn make_mut(&mut self) -> Result<&mut ComplexArray> {
        if Rc::strong_count(&self.array) > 1 {
            debug!(
                "disentangling complex array shared by {} holders",
                Rc::strong_count(&self.array)
            );
            let copy = ComplexArray {
                data: alloc::try_clone(&self.array.data)?,
            };
            self.array = Rc::new(copy);
        }
        Rc::get_mut(&mut self.array).ok_or(CalcError::InternalError)
    }

    pub fn set(&mut self, i: usize, j: usize, value: (f64, f64)) -> Result<()> {
        let idx = self.index(i, j)?;
        self.make_mut()?.data[idx] = value;
        Ok(())
    }

    pub fn redimension(&mut self, rows: usize, cols: usize) -> Result<()> {
        let new_len = checked_extent(rows, cols)?;
        if Rc::strong_count(&self.array) == 1 {
            Rc::get_mut(&mut self.array)
                .ok_or(CalcError::InternalError)?
                .resize(new_len)?;
        } else {
            let keep = new_len.min(self.len());
            let mut data = alloc::try_vec(new_len, (0.0, 0.0))?;
            data[..keep].copy_from_slice(&self.array.data[..keep]);
            self.array = Rc::new(ComplexArray { data });
        }
        self.rows = rows;
        self.cols = cols;
        Ok(())
    }

    pub fn remove_row(&mut self, row: usize) -> Result<()> {
        if self.rows <= 1 || row >= self.rows {
            return Err(CalcError::DimensionError);
        }
        let (rows, cols) = (self.rows, self.cols);
        if Rc::strong_count(&self.array) == 1 {
            let arr = Rc::get_mut(&mut self.array).ok_or(CalcError::InternalError)?;
            rotate_row_down(&mut arr.data, rows, cols, row);
            if let Err(e) = arr.resize((rows - 1) * cols) {
                debug!("row removal shrink failed; reversing rotation");
                rotate_row_up(&mut arr.data, rows, cols, row);
                return Err(e);
            }
        } else {
            let split = row * cols;
            let mut data = alloc::try_vec((rows - 1) * cols, (0.0, 0.0))?;
            data[..split].copy_from_slice(&self.array.data[..split]);
            data[split..].copy_from_slice(&self.array.data[split + cols..]);
            self.array = Rc::new(ComplexArray { data });
        }
        self.rows -= 1;
        Ok(())
    }

    pub fn submatrix(
        &self,
        origin_i: usize,
        origin_j: usize,
        rows: usize,
        cols: usize,
    ) -> Result<ComplexMatrix> {
        checked_extent(rows, cols)?;
        if origin_i + rows > self.rows || origin_j + cols > self.cols {
            return Err(CalcError::DimensionError);
        }
        let mut data = alloc::try_vec(rows * cols, (0.0, 0.0))?;
        for i in 0..rows {
            for j in 0..cols {
                data[i * cols + j] = self.array.data[(origin_i + i) * self.cols + origin_j + j];
            }
        }
        ComplexMatrix::from_data(rows, cols, data)
    }
}
