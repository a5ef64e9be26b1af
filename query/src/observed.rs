//! Values read from untrusted sources that may not be available.

use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// The outcome of a read after retries: either a value or an explicit
/// "unknown". There is no default; a failed balance read is never zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Observed<T> {
    Known { value: T },
    Unknown { reason: String },
}

impl<T> Observed<T> {
    pub fn known(value: T) -> Self {
        Observed::Known { value }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Observed::Known { .. })
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Observed::Known { value } => Some(value),
            Observed::Unknown { .. } => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Observed::Known { value } => Some(value),
            Observed::Unknown { .. } => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Observed<U> {
        match self {
            Observed::Known { value } => Observed::Known { value: f(value) },
            Observed::Unknown { reason } => Observed::Unknown { reason },
        }
    }
}

impl<T> From<Result<T, QueryError>> for Observed<T> {
    fn from(result: Result<T, QueryError>) -> Self {
        match result {
            Ok(value) => Observed::Known { value },
            Err(e) => Observed::Unknown {
                reason: e.to_string(),
            },
        }
    }
}
