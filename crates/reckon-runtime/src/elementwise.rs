//! Elementwise kernel mapping over scalars and matrices.
//!
//! An operation supplies a real-valued kernel and (when it has a complex
//! form) a complex-valued kernel; the dispatcher applies the right one per
//! element and produces a result shaped like the operand. The operand is
//! fully validated before the result buffer is allocated: a text cell
//! anywhere in a real matrix aborts the map with the source untouched, and
//! a kernel failure discards the partial result without ever rebinding the
//! operand.

use num_complex::Complex64;
use reckon_values::{alloc, CalcError, ComplexMatrix, RealCell, RealMatrix, Result, Value};

fn ensure_numeric(m: &RealMatrix) -> Result<()> {
    if m.cells().iter().any(RealCell::is_text) {
        return Err(CalcError::AlphaDataInvalid);
    }
    Ok(())
}

fn same_shape(a: (usize, usize), b: (usize, usize)) -> Result<()> {
    if a != b {
        return Err(CalcError::DimensionError);
    }
    Ok(())
}

fn map_real_matrix<R>(m: &RealMatrix, real: &R) -> Result<Value>
where
    R: Fn(f64) -> Result<f64>,
{
    ensure_numeric(m)?;
    let mut data = alloc::try_vec(m.len(), RealCell::Num(0.0))?;
    for (slot, cell) in data.iter_mut().zip(m.cells()) {
        *slot = RealCell::Num(real(cell.number()?)?);
    }
    Ok(Value::RealMatrix(RealMatrix::from_cells(
        m.rows(),
        m.cols(),
        data,
    )?))
}

fn map_complex_matrix<C>(m: &ComplexMatrix, complex: &C) -> Result<Value>
where
    C: Fn(Complex64) -> Result<Complex64>,
{
    let mut data = alloc::try_vec(m.len(), (0.0, 0.0))?;
    for (slot, &(re, im)) in data.iter_mut().zip(m.data()) {
        let w = complex(Complex64::new(re, im))?;
        *slot = (w.re, w.im);
    }
    Ok(Value::ComplexMatrix(ComplexMatrix::from_data(
        m.rows(),
        m.cols(),
        data,
    )?))
}

/// Apply a kernel pair across any operand kind.
pub fn map_unary<R, C>(x: &Value, real: R, complex: C) -> Result<Value>
where
    R: Fn(f64) -> Result<f64>,
    C: Fn(Complex64) -> Result<Complex64>,
{
    match x {
        Value::Real(a) => Ok(Value::Real(real(*a)?)),
        Value::Complex(re, im) => {
            let w = complex(Complex64::new(*re, *im))?;
            Ok(Value::Complex(w.re, w.im))
        }
        Value::Text(_) => Err(CalcError::AlphaDataInvalid),
        Value::RealMatrix(m) => map_real_matrix(m, &real),
        Value::ComplexMatrix(m) => map_complex_matrix(m, &complex),
    }
}

/// Apply a real-only kernel; complex operands fail `InvalidType`.
pub fn map_unary_real<R>(x: &Value, real: R) -> Result<Value>
where
    R: Fn(f64) -> Result<f64>,
{
    match x {
        Value::Real(a) => Ok(Value::Real(real(*a)?)),
        Value::Text(_) => Err(CalcError::AlphaDataInvalid),
        Value::RealMatrix(m) => map_real_matrix(m, &real),
        _ => Err(CalcError::InvalidType),
    }
}

fn as_complex(v: &Value) -> Complex64 {
    match v {
        Value::Real(x) => Complex64::new(*x, 0.0),
        Value::Complex(re, im) => Complex64::new(*re, *im),
        // Callers only promote scalar operands.
        _ => Complex64::new(0.0, 0.0),
    }
}

fn zip_complex<C>(
    rows: usize,
    cols: usize,
    ys: impl Iterator<Item = Complex64>,
    xs: impl Iterator<Item = Complex64>,
    complex: &C,
) -> Result<Value>
where
    C: Fn(Complex64, Complex64) -> Result<Complex64>,
{
    let mut data = alloc::try_vec(rows * cols, (0.0, 0.0))?;
    for (slot, (a, b)) in data.iter_mut().zip(ys.zip(xs)) {
        let w = complex(a, b)?;
        *slot = (w.re, w.im);
    }
    Ok(Value::ComplexMatrix(ComplexMatrix::from_data(
        rows, cols, data,
    )?))
}

fn real_matrix_complex_iter(m: &RealMatrix) -> impl Iterator<Item = Complex64> + '_ {
    m.cells().iter().map(|c| match c {
        RealCell::Num(x) => Complex64::new(*x, 0.0),
        RealCell::Text(_) => Complex64::new(0.0, 0.0), // excluded by ensure_numeric
    })
}

fn complex_matrix_iter(m: &ComplexMatrix) -> impl Iterator<Item = Complex64> + '_ {
    m.data().iter().map(|&(re, im)| Complex64::new(re, im))
}

/// Binary equivalent of [`map_unary`], with matrix-scalar broadcasting in
/// both directions and real-to-complex promotion for mixed operands. The
/// kernel argument order is `(y, x)`.
pub fn map_binary<RB, CB>(y: &Value, x: &Value, real: RB, complex: CB) -> Result<Value>
where
    RB: Fn(f64, f64) -> Result<f64>,
    CB: Fn(Complex64, Complex64) -> Result<Complex64>,
{
    match (y, x) {
        (Value::Text(_), _) | (_, Value::Text(_)) => Err(CalcError::AlphaDataInvalid),

        // Scalar cases.
        (Value::Real(a), Value::Real(b)) => Ok(Value::Real(real(*a, *b)?)),
        (Value::Complex(..), Value::Real(_) | Value::Complex(..))
        | (Value::Real(_), Value::Complex(..)) => {
            let w = complex(as_complex(y), as_complex(x))?;
            Ok(Value::Complex(w.re, w.im))
        }

        // Matrix against matrix, shape checked.
        (Value::RealMatrix(my), Value::RealMatrix(mx)) => {
            same_shape((my.rows(), my.cols()), (mx.rows(), mx.cols()))?;
            ensure_numeric(my)?;
            ensure_numeric(mx)?;
            let mut data = alloc::try_vec(my.len(), RealCell::Num(0.0))?;
            for (slot, (a, b)) in data.iter_mut().zip(my.cells().iter().zip(mx.cells())) {
                *slot = RealCell::Num(real(a.number()?, b.number()?)?);
            }
            Ok(Value::RealMatrix(RealMatrix::from_cells(
                my.rows(),
                my.cols(),
                data,
            )?))
        }
        (Value::ComplexMatrix(my), Value::ComplexMatrix(mx)) => {
            same_shape((my.rows(), my.cols()), (mx.rows(), mx.cols()))?;
            zip_complex(
                my.rows(),
                my.cols(),
                complex_matrix_iter(my),
                complex_matrix_iter(mx),
                &complex,
            )
        }
        (Value::RealMatrix(my), Value::ComplexMatrix(mx)) => {
            same_shape((my.rows(), my.cols()), (mx.rows(), mx.cols()))?;
            ensure_numeric(my)?;
            zip_complex(
                my.rows(),
                my.cols(),
                real_matrix_complex_iter(my),
                complex_matrix_iter(mx),
                &complex,
            )
        }
        (Value::ComplexMatrix(my), Value::RealMatrix(mx)) => {
            same_shape((my.rows(), my.cols()), (mx.rows(), mx.cols()))?;
            ensure_numeric(mx)?;
            zip_complex(
                my.rows(),
                my.cols(),
                complex_matrix_iter(my),
                real_matrix_complex_iter(mx),
                &complex,
            )
        }

        // Matrix-scalar broadcasting.
        (Value::RealMatrix(m), Value::Real(b)) => map_real_matrix(m, &|a| real(a, *b)),
        (Value::Real(a), Value::RealMatrix(m)) => map_real_matrix(m, &|b| real(*a, b)),
        (Value::RealMatrix(m), Value::Complex(..)) => {
            ensure_numeric(m)?;
            let b = as_complex(x);
            let n = m.len();
            zip_complex(
                m.rows(),
                m.cols(),
                real_matrix_complex_iter(m),
                std::iter::repeat(b).take(n),
                &complex,
            )
        }
        (Value::Complex(..), Value::RealMatrix(m)) => {
            ensure_numeric(m)?;
            let a = as_complex(y);
            let n = m.len();
            zip_complex(
                m.rows(),
                m.cols(),
                std::iter::repeat(a).take(n),
                real_matrix_complex_iter(m),
                &complex,
            )
        }
        (Value::ComplexMatrix(m), Value::Real(_) | Value::Complex(..)) => {
            let b = as_complex(x);
            let n = m.len();
            zip_complex(
                m.rows(),
                m.cols(),
                complex_matrix_iter(m),
                std::iter::repeat(b).take(n),
                &complex,
            )
        }
        (Value::Real(_) | Value::Complex(..), Value::ComplexMatrix(m)) => {
            let a = as_complex(y);
            let n = m.len();
            zip_complex(
                m.rows(),
                m.cols(),
                std::iter::repeat(a).take(n),
                complex_matrix_iter(m),
                &complex,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn double(x: f64) -> Result<f64> {
        Ok(2.0 * x)
    }

    fn cdouble(z: Complex64) -> Result<Complex64> {
        Ok(2.0 * z)
    }

    #[test]
    fn unary_dispatch_over_kinds() {
        assert_eq!(
            map_unary(&Value::Real(3.0), double, cdouble).unwrap(),
            Value::Real(6.0)
        );
        assert_eq!(
            map_unary(&Value::Complex(1.0, -2.0), double, cdouble).unwrap(),
            Value::Complex(2.0, -4.0)
        );

        let m = RealMatrix::from_data(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        match map_unary(&Value::RealMatrix(m), double, cdouble).unwrap() {
            Value::RealMatrix(r) => assert_eq!(
                r.cells(),
                &[
                    RealCell::Num(2.0),
                    RealCell::Num(4.0),
                    RealCell::Num(6.0),
                    RealCell::Num(8.0)
                ]
            ),
            _ => unreachable!(),
        }
    }

    #[test]
    fn text_cell_short_circuits_and_source_survives() {
        let m = RealMatrix::from_cells(
            2,
            2,
            vec![
                RealCell::Num(1.0),
                RealCell::Num(2.0),
                RealCell::text("AB"),
                RealCell::Num(4.0),
            ],
        )
        .unwrap();
        let v = Value::RealMatrix(m.clone());
        assert_eq!(
            map_unary(&v, double, cdouble).unwrap_err(),
            CalcError::AlphaDataInvalid
        );
        assert_eq!(v, Value::RealMatrix(m));
    }

    #[test]
    fn kernel_failure_discards_result() {
        let m = RealMatrix::from_data(1, 3, vec![1.0, -1.0, 2.0]).unwrap();
        let err = map_unary_real(&Value::RealMatrix(m), |x| {
            if x < 0.0 {
                Err(CalcError::InvalidData)
            } else {
                Ok(x)
            }
        })
        .unwrap_err();
        assert_eq!(err, CalcError::InvalidData);
    }

    #[test]
    fn real_only_mapping_rejects_complex() {
        assert_eq!(
            map_unary_real(&Value::Complex(1.0, 1.0), double).unwrap_err(),
            CalcError::InvalidType
        );
    }

    #[test]
    fn binary_broadcast_and_promotion() {
        let add = |a: f64, b: f64| Ok(a + b);
        let cadd = |a: Complex64, b: Complex64| Ok(a + b);

        let m = RealMatrix::from_data(1, 3, vec![1.0, 2.0, 3.0]).unwrap();
        match map_binary(&Value::RealMatrix(m.clone()), &Value::Real(10.0), add, cadd).unwrap() {
            Value::RealMatrix(r) => assert_eq!(
                r.cells(),
                &[RealCell::Num(11.0), RealCell::Num(12.0), RealCell::Num(13.0)]
            ),
            _ => unreachable!(),
        }

        match map_binary(
            &Value::RealMatrix(m),
            &Value::Complex(0.0, 1.0),
            add,
            cadd,
        )
        .unwrap()
        {
            Value::ComplexMatrix(r) => {
                assert_eq!(r.data(), &[(1.0, 1.0), (2.0, 1.0), (3.0, 1.0)])
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn binary_shape_mismatch() {
        let a = RealMatrix::from_data(1, 2, vec![1.0, 2.0]).unwrap();
        let b = RealMatrix::from_data(2, 1, vec![1.0, 2.0]).unwrap();
        assert_eq!(
            map_binary(
                &Value::RealMatrix(a),
                &Value::RealMatrix(b),
                |a, b| Ok(a + b),
                |a, b| Ok(a + b),
            )
            .unwrap_err(),
            CalcError::DimensionError
        );
    }
}
