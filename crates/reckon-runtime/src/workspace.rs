//! Named-variable store contract and a map-backed implementation.

use std::collections::HashMap;

use reckon_values::{CalcError, RealMatrix, Result, Value};

pub trait VariableStore {
    /// Look up a variable. Matrix values come back as O(1) handle clones,
    /// so the returned value shares (and pins) the stored backing array.
    fn recall(&self, name: &str) -> Option<Value>;

    fn store(&mut self, name: &str, v: Value) -> Result<()>;

    /// Create `name` as a zero-filled real matrix, or reshape an existing
    /// matrix variable in place (copy-on-write), keeping flat element order.
    fn dimension(&mut self, name: &str, rows: usize, cols: usize) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct Workspace {
    vars: HashMap<String, Value>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VariableStore for Workspace {
    fn recall(&self, name: &str) -> Option<Value> {
        self.vars.get(name).cloned()
    }

    fn store(&mut self, name: &str, v: Value) -> Result<()> {
        self.vars.insert(name.to_string(), v);
        Ok(())
    }

    fn dimension(&mut self, name: &str, rows: usize, cols: usize) -> Result<()> {
        match self.vars.get_mut(name) {
            None => {
                let m = RealMatrix::new(rows, cols)?;
                self.vars.insert(name.to_string(), Value::RealMatrix(m));
                Ok(())
            }
            Some(Value::RealMatrix(m)) => m.redimension(rows, cols),
            Some(Value::ComplexMatrix(m)) => m.redimension(rows, cols),
            Some(_) => Err(CalcError::InvalidType),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_creates_then_reshapes() {
        let mut ws = Workspace::new();
        ws.dimension("M", 2, 2).unwrap();
        match ws.recall("M").unwrap() {
            Value::RealMatrix(m) => assert_eq!((m.rows(), m.cols()), (2, 2)),
            _ => unreachable!(),
        }

        ws.dimension("M", 3, 1).unwrap();
        match ws.recall("M").unwrap() {
            Value::RealMatrix(m) => assert_eq!((m.rows(), m.cols()), (3, 1)),
            _ => unreachable!(),
        }
    }

    #[test]
    fn dimension_rejects_scalars() {
        let mut ws = Workspace::new();
        ws.store("X", Value::Real(1.0)).unwrap();
        assert_eq!(ws.dimension("X", 2, 2).unwrap_err(), CalcError::InvalidType);
    }
}
