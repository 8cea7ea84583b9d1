use fms_core::TruckId;
use thiserror::Error;

use crate::TruckTask;

#[derive(Debug, Error)]
pub enum FleetError {
    #[error("truck {truck}: illegal transition {from} -> {to}")]
    IllegalTransition { truck: TruckId, from: TruckTask, to: TruckTask },

    #[error("truck {truck}: cannot arrive while {task}")]
    NotMoving { truck: TruckId, task: TruckTask },

    #[error("truck {truck}: {reason}")]
    InvalidTruck { truck: TruckId, reason: &'static str },
}

pub type FleetResult<T> = Result<T, FleetError>;
