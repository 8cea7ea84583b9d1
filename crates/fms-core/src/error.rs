//! Framework error type.
//!
//! Raised by [`SimConfig::validate`](crate::SimConfig::validate); the
//! dispatcher wraps it in its own error enum.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum FmsError {
    #[error("invalid config field `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

/// Shorthand result type for `fms-core`.
pub type FmsResult<T> = Result<T, FmsError>;
