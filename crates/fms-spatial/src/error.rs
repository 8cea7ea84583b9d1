//! Spatial-subsystem error type.

use thiserror::Error;

use fms_core::NodeId;

/// Errors produced by `fms-spatial` while building or loading a network.
///
/// Routing itself never fails; see [`Route`](crate::Route).
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("node name '{0}' is already in use")]
    DuplicateNode(String),

    #[error("node {0} not found in network")]
    DanglingNode(NodeId),

    #[error("segment '{from}' -> '{to}' already exists")]
    DuplicateSegment { from: String, to: String },

    #[error("invalid segment '{from}' -> '{to}': {reason}")]
    InvalidSegment { from: String, to: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
