//! Station error type.

use thiserror::Error;

/// Errors produced while validating station definitions.
#[derive(Debug, Error)]
pub enum StationError {
    #[error("station '{name}': {reason}")]
    InvalidSpec { name: String, reason: String },
}

pub type StationResult<T> = Result<T, StationError>;
