use thiserror::Error;

// Unified error type for pod2g

#[derive(Error, Debug)]
pub enum Pod2gError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("inconsistent training data: {0}")]
    InconsistentTrainingData(String),
    #[error("precondition violation: {0}")]
    PreconditionViolation(&'static str),
    #[error("indefinite matrix detected (p^T A p <= 0)")]
    IndefiniteMatrix,
    #[error("indefinite preconditioner detected (beta < 0)")]
    IndefinitePreconditioner,
    #[error("zero pivot at row {0}")]
    ZeroPivot(usize),
    #[error("i/o error reading problem data: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed problem file at line {line}: {reason}")]
    Parse { line: usize, reason: String },
}
