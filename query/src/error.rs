use pulse_types::ClaimError;
use thiserror::Error;

/// A read that could not be completed within the retry budget.
///
/// Carries no value: callers must treat it as "unknown", never as zero.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("{operation} failed after {attempts} attempts: {last_error}")]
    Exhausted {
        operation: &'static str,
        attempts: u32,
        last_error: String,
    },

    #[error("{operation} timed out after {attempts} attempts")]
    TimedOut {
        operation: &'static str,
        attempts: u32,
    },
}

impl QueryError {
    pub fn operation(&self) -> &'static str {
        match self {
            QueryError::Exhausted { operation, .. } | QueryError::TimedOut { operation, .. } => {
                operation
            }
        }
    }
}

impl From<QueryError> for ClaimError {
    fn from(e: QueryError) -> Self {
        ClaimError::Query(e.to_string())
    }
}
