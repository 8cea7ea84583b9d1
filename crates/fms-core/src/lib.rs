//! `fms-core` — foundational types for the open-pit fleet management simulator.
//!
//! This crate is a dependency of every other `fms-*` crate.  It intentionally
//! has no `fms-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `TruckId`, `StationId`, `NodeId`, `SegmentId`         |
//! | [`geo`]         | `Point` (planar map coordinates)                      |
//! | [`time`]        | `Tick`                                                |
//! | [`config`]      | `SimConfig`, `AdmissionPolicy`                        |
//! | [`rng`]         | `EquipmentRng` (per-station), `SimRng` (global)       |
//! | [`material`]    | `Material` enum (mineral / waste)                     |
//! | [`error`]       | `FmsError`, `FmsResult`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod material;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{AdmissionPolicy, SimConfig};
pub use error::{FmsError, FmsResult};
pub use geo::Point;
pub use ids::{NodeId, SegmentId, StationId, TruckId};
pub use material::Material;
pub use rng::{EquipmentRng, SimRng};
pub use time::Tick;
