//! `fms-fleet` — haul-truck state machine and traffic-aware movement.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                        |
//! |--------------|-----------------------------------------------------------------|
//! | [`truck`]    | `Truck`, `TruckTask` (checked state machine), `Leg`             |
//! | [`movement`] | `MovementEngine` — one tick of driving for the whole fleet      |
//! | [`traffic`]  | following-distance caps over shared segments                    |
//! | [`error`]    | `FleetError`, `FleetResult<T>`                                  |
//!
//! # Movement model (progress along segments)
//!
//! A truck follows its route hop by hop.  Crossing a segment nominally takes
//!
//! ```text
//! distance / speed(loaded) / (efficiency + 0.3)
//! ```
//!
//! ticks; each tick adds the reciprocal to the truck's fractional progress,
//! unless a truck ahead on the same segment holds it back.  Position is
//! interpolated linearly between the segment's end nodes for visualization.
//!
//! Re-routing is not continuous: a new route discards progress on the
//! current leg and the truck restarts from the last node it settled on.

pub mod error;
pub mod movement;
pub mod traffic;
pub mod truck;

#[cfg(test)]
mod tests;

pub use error::{FleetError, FleetResult};
pub use movement::{MoveOutcome, MovementEngine, ticks_to_cross};
pub use truck::{Leg, Truck, TruckTask};
