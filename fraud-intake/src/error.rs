use thiserror::Error;

/// Errors raised by the intake contract
#[derive(Debug, Error)]
pub enum IntakeError {
    /// Rejected input; the message is shown to the caller as-is
    #[error("{0}")]
    InputError(String),

    #[error("Inconsistent fraud decision: {0}")]
    InconsistentDecision(String),
}

pub type Result<T> = std::result::Result<T, IntakeError>;
