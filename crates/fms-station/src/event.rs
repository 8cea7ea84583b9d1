//! Events emitted by [`Station::update`](crate::Station::update).

use fms_core::{Material, StationId, TruckId};

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StationEvent {
    /// First bucket dropped.  `tons` is the truck's load afterwards.
    LoadStarted { station: StationId, truck: TruckId, tons: f64 },
    /// A further bucket added `tons`.
    PassLoaded { station: StationId, truck: TruckId, tons: f64 },
    /// Loading complete; `tons` is the final payload.
    LoadFinished { station: StationId, truck: TruckId, tons: f64, material: Material },
    DumpStarted { station: StationId, truck: TruckId },
    /// Payload delivered.  `correct` is false for mineral at the dump or
    /// waste at the crusher.
    DumpFinished {
        station:  StationId,
        truck:    TruckId,
        tons:     f64,
        material: Option<Material>,
        correct:  bool,
    },
}

impl StationEvent {
    pub fn station(&self) -> StationId {
        match *self {
            StationEvent::LoadStarted { station, .. }
            | StationEvent::PassLoaded { station, .. }
            | StationEvent::LoadFinished { station, .. }
            | StationEvent::DumpStarted { station, .. }
            | StationEvent::DumpFinished { station, .. } => station,
        }
    }

    pub fn truck(&self) -> TruckId {
        match *self {
            StationEvent::LoadStarted { truck, .. }
            | StationEvent::PassLoaded { truck, .. }
            | StationEvent::LoadFinished { truck, .. }
            | StationEvent::DumpStarted { truck, .. }
            | StationEvent::DumpFinished { truck, .. } => truck,
        }
    }
}
