//! Interactive matrix navigation and editing.
//!
//! A session binds the cursor either to a named matrix variable (`Indexed`,
//! `EditingNamed`) or to a held-aside snapshot of the matrix that was on the
//! stack (`EditingCopy`). While editing, X carries the current cell as a
//! lone scalar; leaving the editor commits X back into the bound cell. An
//! allocation failure on that final store is tolerated so the user is never
//! trapped inside the editor; every other failure keeps the session open.

use log::debug;
use reckon_values::{CalcError, RealCell, Result, Value};

use crate::matrix::extent_arg;
use crate::stack::OperandStack;
use crate::workspace::VariableStore;
use crate::Session;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditorState {
    #[default]
    Inactive,
    /// Cursor bound to a named matrix variable, no edit in progress.
    Indexed(String),
    /// Editing a snapshot taken from the stack; the snapshot is the only
    /// holder of its matrix until commit.
    EditingCopy(Value),
    /// Editing a named matrix variable in place.
    EditingNamed(String),
}

#[derive(Debug, Default)]
pub struct Editor {
    pub(crate) state: EditorState,
    pub(crate) i: usize,
    pub(crate) j: usize,
}

impl Editor {
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.i, self.j)
    }

    pub fn is_active(&self) -> bool {
        self.state != EditorState::Inactive
    }

    fn is_editing(&self) -> bool {
        matches!(
            self.state,
            EditorState::EditingCopy(_) | EditorState::EditingNamed(_)
        )
    }
}

fn remove_row_value(v: &mut Value, row: usize) -> Result<()> {
    match v {
        Value::RealMatrix(m) => m.remove_row(row),
        Value::ComplexMatrix(m) => m.remove_row(row),
        _ => Err(CalcError::InvalidType),
    }
}

fn store_into(target: &mut Value, i: usize, j: usize, x: Value) -> Result<()> {
    let (rows, cols) = target.dims().ok_or(CalcError::InvalidType)?;
    // The cursor is forced into bounds just before use, so a session
    // survives its target being reshaped underneath it.
    let i = i.min(rows - 1);
    let j = j.min(cols - 1);
    match (target, x) {
        (Value::RealMatrix(m), Value::Real(v)) => m.set_cell(i, j, RealCell::Num(v)),
        (Value::RealMatrix(m), Value::Text(s)) => m.set_cell(i, j, RealCell::text(s)),
        (Value::ComplexMatrix(m), Value::Real(v)) => m.set(i, j, (v, 0.0)),
        (Value::ComplexMatrix(m), Value::Complex(re, im)) => m.set(i, j, (re, im)),
        (Value::ComplexMatrix(_), Value::Text(_)) => Err(CalcError::AlphaDataInvalid),
        _ => Err(CalcError::InvalidType),
    }
}

impl<S: OperandStack, V: VariableStore> Session<S, V> {
    /// The matrix the navigation session is bound to. Named bindings come
    /// back as handle clones; the snapshot comes back as a handle clone of
    /// the held value.
    fn editor_target(&self) -> Result<Value> {
        match &self.editor.state {
            EditorState::Inactive => Err(CalcError::Nonexistent),
            EditorState::Indexed(name) | EditorState::EditingNamed(name) => {
                self.vars.recall(name).ok_or(CalcError::Nonexistent)
            }
            EditorState::EditingCopy(held) => Ok(held.clone()),
        }
    }

    /// Shape of the bound matrix.
    pub fn editor_dims(&self) -> Result<(usize, usize)> {
        self.editor_target()?.dims().ok_or(CalcError::InvalidType)
    }

    /// Bind the cursor to a named matrix variable and reset it to (0, 0).
    pub fn index(&mut self, name: &str) -> Result<()> {
        if self.editor.is_editing() {
            return Err(CalcError::RestrictedOperation);
        }
        let m = self.vars.recall(name).ok_or(CalcError::Nonexistent)?;
        if !m.is_matrix() {
            return Err(CalcError::InvalidType);
        }
        debug!("indexing matrix variable {name}");
        self.editor = Editor {
            state: EditorState::Indexed(name.to_string()),
            i: 0,
            j: 0,
        };
        Ok(())
    }

    /// Start editing the matrix in X: the matrix moves aside as a held
    /// snapshot and its first element takes its place on the stack.
    pub fn edit(&mut self) -> Result<()> {
        self.exit_editor()?;
        let x = self.stack.x().clone();
        if !x.is_matrix() {
            return Err(CalcError::InvalidType);
        }
        let first = x.element(0, 0)?;
        self.stack.replace_x(first);
        debug!("editing stack matrix");
        self.editor = Editor {
            state: EditorState::EditingCopy(x),
            i: 0,
            j: 0,
        };
        self.config.flags.grow = false;
        Ok(())
    }

    /// Start editing a named matrix variable; X is replaced by its first
    /// element.
    pub fn edit_named(&mut self, name: &str) -> Result<()> {
        self.exit_editor()?;
        let m = self.vars.recall(name).ok_or(CalcError::Nonexistent)?;
        if !m.is_matrix() {
            return Err(CalcError::InvalidType);
        }
        let first = m.element(0, 0)?;
        self.stack.replace_x(first);
        debug!("editing matrix variable {name}");
        self.editor = Editor {
            state: EditorState::EditingNamed(name.to_string()),
            i: 0,
            j: 0,
        };
        self.config.flags.grow = false;
        Ok(())
    }

    /// Move the cursor down one row, row-major. Wrapping past the last row
    /// sets the edge-wrap flag and steps to the next column; wrapping past
    /// the last column additionally sets the end-wrap flag.
    pub fn advance_row(&mut self) -> Result<()> {
        let (rows, cols) = self.editor_dims()?;
        let flags = &mut self.config.flags;
        self.editor.i += 1;
        if self.editor.i >= rows {
            flags.matrix_edge_wrap = true;
            self.editor.i = 0;
            self.editor.j += 1;
            if self.editor.j >= cols {
                flags.matrix_end_wrap = true;
                self.editor.j = 0;
            } else {
                flags.matrix_end_wrap = false;
            }
        } else {
            flags.matrix_edge_wrap = false;
            flags.matrix_end_wrap = false;
        }
        Ok(())
    }

    /// Move the cursor up one row, the inverse of [`advance_row`].
    pub fn retreat_row(&mut self) -> Result<()> {
        let (rows, cols) = self.editor_dims()?;
        let flags = &mut self.config.flags;
        if self.editor.i == 0 {
            flags.matrix_edge_wrap = true;
            self.editor.i = rows - 1;
            if self.editor.j == 0 {
                flags.matrix_end_wrap = true;
                self.editor.j = cols - 1;
            } else {
                flags.matrix_end_wrap = false;
                self.editor.j -= 1;
            }
        } else {
            self.editor.i -= 1;
            flags.matrix_edge_wrap = false;
            flags.matrix_end_wrap = false;
        }
        Ok(())
    }

    /// Jump the cursor to `(i, j)` and recall that cell into X.
    pub fn goto_cell(&mut self, i: usize, j: usize) -> Result<()> {
        let target = self.editor_target()?;
        let (rows, cols) = target.dims().ok_or(CalcError::InvalidType)?;
        if i >= rows || j >= cols {
            return Err(CalcError::DimensionError);
        }
        self.editor.i = i;
        self.editor.j = j;
        self.stack.replace_x(target.element(i, j)?);
        Ok(())
    }

    /// Delete the cursor's row from the bound matrix. Deleting the bottom
    /// row moves the cursor up one; the replacement X in the editing modes
    /// is the cell the user sees after the delete, which for a bottom-row
    /// delete comes from two rows above the doomed one.
    pub fn delete_row(&mut self) -> Result<()> {
        let (rows, cols) = self.editor_dims()?;
        if rows == 1 {
            return Err(CalcError::DimensionError);
        }
        let i = self.editor.i.min(rows - 1);
        let j = self.editor.j.min(cols - 1);
        let interactive = self.editor.is_editing();

        let (new_i, fetch_row) = if i == rows - 1 {
            (i - 1, i - 1)
        } else {
            (i, i + 1)
        };

        let mut replacement = None;
        let named = match &self.editor.state {
            EditorState::Inactive => return Err(CalcError::Nonexistent),
            EditorState::Indexed(n) | EditorState::EditingNamed(n) => Some(n.clone()),
            EditorState::EditingCopy(_) => None,
        };
        match named {
            Some(name) => {
                let mut m = self.vars.recall(&name).ok_or(CalcError::Nonexistent)?;
                if interactive {
                    replacement = Some(m.element(fetch_row, j)?);
                }
                remove_row_value(&mut m, i)?;
                self.vars.store(&name, m)?;
            }
            None => {
                if let EditorState::EditingCopy(held) = &mut self.editor.state {
                    if interactive {
                        replacement = Some(held.element(fetch_row, j)?);
                    }
                    remove_row_value(held, i)?;
                }
            }
        }
        if let Some(v) = replacement {
            self.stack.replace_x(v);
        }
        self.editor.i = new_i;
        self.editor.j = j;
        Ok(())
    }

    /// Copy the block at the cursor into a fresh matrix on the stack; row
    /// count comes from Y, column count from X.
    pub fn get_submatrix(&mut self) -> Result<()> {
        let target = self.editor_target()?;
        if !target.is_matrix() {
            return Err(CalcError::InvalidType);
        }
        let cols = extent_arg(self.stack.x(), CalcError::DimensionError)?;
        let rows = extent_arg(self.stack.y(), CalcError::DimensionError)?;
        let sub = match &target {
            Value::RealMatrix(m) => {
                Value::RealMatrix(m.submatrix(self.editor.i, self.editor.j, rows, cols)?)
            }
            Value::ComplexMatrix(m) => {
                Value::ComplexMatrix(m.submatrix(self.editor.i, self.editor.j, rows, cols)?)
            }
            _ => return Err(CalcError::InvalidType),
        };
        self.stack.binary_result(sub);
        Ok(())
    }

    /// Store X into the bound cell without leaving the editor.
    pub fn store_element(&mut self) -> Result<()> {
        let x = self.stack.x().clone();
        let (i, j) = (self.editor.i, self.editor.j);
        match &mut self.editor.state {
            EditorState::Inactive => Err(CalcError::Nonexistent),
            EditorState::EditingCopy(held) => store_into(held, i, j, x),
            EditorState::Indexed(name) | EditorState::EditingNamed(name) => {
                let name = name.clone();
                let mut m = self.vars.recall(&name).ok_or(CalcError::Nonexistent)?;
                store_into(&mut m, i, j, x)?;
                self.vars.store(&name, m)
            }
        }
    }

    /// Leave the editor, committing the current X into the bound cell. An
    /// allocation failure on that store must not trap the user in the
    /// editor; it is logged and the exit proceeds. Any other failure keeps
    /// the session active.
    pub fn exit_editor(&mut self) -> Result<()> {
        if !self.editor.is_editing() {
            return Ok(());
        }
        match self.store_element() {
            Ok(()) => {}
            Err(CalcError::InsufficientMemory) => {
                debug!("element store failed on editor exit; leaving anyway");
            }
            Err(e) => return Err(e),
        }
        let state = std::mem::take(&mut self.editor.state);
        if let EditorState::EditingCopy(held) = state {
            self.stack.replace_x(held);
        }
        self.editor.i = 0;
        self.editor.j = 0;
        self.config.flags.grow = false;
        Ok(())
    }
}
