use thiserror::Error;

pub type Result<T> = std::result::Result<T, CalcError>;

/// Errors surfaced by the value engine. The display strings are the
/// calculator's user-visible error messages; the dispatcher reports them
/// verbatim and aborts the in-flight command.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcError {
    #[error("Invalid Type")]
    InvalidType,

    #[error("Alpha Data Is Invalid")]
    AlphaDataInvalid,

    #[error("Dimension Error")]
    DimensionError,

    #[error("Size Error")]
    SizeError,

    #[error("Insufficient Memory")]
    InsufficientMemory,

    #[error("Out of Range")]
    OutOfRange,

    #[error("Divide by 0")]
    DivideByZero,

    #[error("Stat Math Error")]
    StatMathError,

    #[error("Invalid Forecast Model")]
    InvalidForecastModel,

    #[error("Invalid Data")]
    InvalidData,

    #[error("Nonexistent")]
    Nonexistent,

    #[error("Restricted Operation")]
    RestrictedOperation,

    /// Invariant violation; unreachable in a correct build.
    #[error("Internal Error")]
    InternalError,
}
