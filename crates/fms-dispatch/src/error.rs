use fms_core::FmsError;
use fms_fleet::FleetError;
use fms_spatial::SpatialError;
use fms_station::StationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("dispatcher configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] FmsError),

    #[error("{what} node '{name}' is not in the network")]
    UnknownNode { what: &'static str, name: String },

    #[error("network error: {0}")]
    Spatial(#[from] SpatialError),

    #[error("invalid truck: {0}")]
    Fleet(#[from] FleetError),

    #[error("invalid station: {0}")]
    Station(#[from] StationError),
}

pub type DispatchResult<T> = Result<T, DispatchError>;
