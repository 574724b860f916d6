//! Numeric operation engine for the reckon RPN calculator.
//!
//! The engine is a synchronous library: the command dispatcher owns a
//! [`Session`] and invokes one operation at a time; each operation reads its
//! operands from the stack, fans scalar kernels out over matrices through
//! the elementwise dispatcher, applies the shared range policy to floating
//! results, and writes back to the stack or a named variable. A failed
//! operation leaves every visible value exactly as it was, with the two
//! documented exceptions (best-fit model selection and the editor's
//! commit-time allocation failure).

pub mod basen;
pub mod context;
pub mod editor;
pub mod elementwise;
pub mod hms;
pub mod mathematics;
pub mod matrix;
pub mod range;
pub mod stack;
pub mod stats;
pub mod workspace;

pub use basen::BitTest;
pub use context::{Config, FitModel, Flags};
pub use editor::{Editor, EditorState};
pub use elementwise::{map_binary, map_unary, map_unary_real};
pub use reckon_values::{
    CalcError, ComplexMatrix, RealCell, RealMatrix, Result, Value,
};
pub use stack::{OperandStack, RpnStack};
pub use workspace::{VariableStore, Workspace};

/// One calculator session: configuration, operand stack, variable store and
/// the matrix-editor state. Operations are methods, grouped by module.
pub struct Session<S, V> {
    pub config: Config,
    pub stack: S,
    pub vars: V,
    pub(crate) editor: Editor,
}

impl<S: OperandStack, V: VariableStore> Session<S, V> {
    pub fn new(stack: S, vars: V) -> Self {
        Session {
            config: Config::default(),
            stack,
            vars,
            editor: Editor::default(),
        }
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }
}
