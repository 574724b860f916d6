//! Engine configuration carried explicitly by the session. There is no
//! process-wide flag state; every operation reads the switches it needs from
//! here.

/// Regression model selection. The variants are ordered; best-fit iterates
/// them in declaration order and keeps the first strict maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitModel {
    Linear,
    Log,
    Exp,
    Power,
}

impl FitModel {
    pub const ALL: [FitModel; 4] = [
        FitModel::Linear,
        FitModel::Log,
        FitModel::Exp,
        FitModel::Power,
    ];
}

/// The calculator's boolean switches consumed by this engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    /// Clamp infinite results to the `HUGE` sentinel instead of failing
    /// `OutOfRange`.
    pub range_error_ignore: bool,
    /// Refuse complex results for real inputs outside a function's real
    /// domain.
    pub real_result_only: bool,
    /// Statistics accumulate all thirteen sums instead of the first six.
    pub all_sigma: bool,
    pub log_fit_invalid: bool,
    pub exp_fit_invalid: bool,
    pub pwr_fit_invalid: bool,
    /// Set by a cell advance that wrapped past a column edge.
    pub matrix_edge_wrap: bool,
    /// Set by a cell advance that wrapped past the whole matrix.
    pub matrix_end_wrap: bool,
    /// Editor grows the matrix instead of wrapping; reset on editor exit.
    pub grow: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub flags: Flags,
    /// Currently selected regression model.
    pub fit: FitModel,
    /// Variable holding the statistics registers.
    pub sigma_var: String,
    /// Offset of the first statistics register inside that variable.
    pub sigma_reg: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            flags: Flags::default(),
            fit: FitModel::Linear,
            sigma_var: "REGS".to_string(),
            sigma_reg: 11,
        }
    }
}
