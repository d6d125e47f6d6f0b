use thiserror::Error;

#[derive(Debug, Error)]
pub enum AngelSimError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Convergence failure: {function} did not converge after {iterations} iterations (delta: {last_delta})")]
    ConvergenceFailure {
        function: String,
        iterations: u32,
        last_delta: f64,
    },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl AngelSimError {
    /// True for the recoverable per-trial failure mode: the IRR solver
    /// not finding a root. Everything else is fatal to the batch.
    pub fn is_convergence_failure(&self) -> bool {
        matches!(self, AngelSimError::ConvergenceFailure { .. })
    }
}

impl From<serde_json::Error> for AngelSimError {
    fn from(e: serde_json::Error) -> Self {
        AngelSimError::SerializationError(e.to_string())
    }
}
