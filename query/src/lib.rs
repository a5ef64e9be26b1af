//! Resilient query layer.
//!
//! Every external read (balances, transaction counts, claim status) runs
//! under an injected [`RetryPolicy`]. A read that keeps failing yields a
//! typed [`QueryError`], which display code turns into
//! [`Observed::Unknown`], so outages never look like "zero" or "not
//! eligible".

pub mod error;
pub mod observed;
pub mod reader;
pub mod retry;

pub use error::QueryError;
pub use observed::Observed;
pub use reader::ResilientReader;
pub use retry::{with_retry, RetryPolicy};
