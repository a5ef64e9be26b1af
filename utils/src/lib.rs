//! Shared utilities for the PulseWallet workspace.

pub mod logging;
pub mod time;

pub use logging::{init_tracing, LogFormat};
pub use time::{format_duration, Clock, SystemClock};
