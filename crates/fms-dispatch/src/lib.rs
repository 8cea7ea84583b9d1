//! `fms-dispatch` — fleet dispatcher for the open-pit simulator.
//!
//! # Three-phase tick
//!
//! ```text
//! each Dispatcher::update():
//!   ① Stations  — every shovel, crusher and dump advances its queue and
//!                 service timer; finished loads/dumps update the totals.
//!   ② Movement  — travelling trucks advance along their routes, throttled
//!                 by the following distance to the truck ahead.
//!   ③ Decisions — for each truck in fleet order:
//!                   stranded             → Returning to the fallback node
//!                   WaitingShovel/Dump   → join the queue at its node
//!                                          (fallback node if none/refused)
//!                   WaitingAssignment    → DispatchPolicy::assign, then route
//! ```
//!
//! # Crate layout
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`dispatcher`]  | `Dispatcher` — tick loop, commands, queries               |
//! | [`builder`]     | `DispatcherBuilder`, `TruckSpec`                          |
//! | [`policy`]      | `DispatchPolicy`, `GreedyPolicy`, `ExternalPolicy`, `FleetView` |
//! | [`stats`]       | `ProductionTotals`, `TickSummary`, `FleetStats`           |
//! | [`observation`] | flattened observation vectors, `ObservationLayout`        |
//! | [`observer`]    | `DispatchObserver` hooks, `NoopObserver`                  |
//! | [`layout`]      | the standard open-pit mine                                |
//! | [`parallel`]    | `run_independent` batch runner                            |
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | `run_independent` uses Rayon's thread pool.            |
//! | `serde`    | Serialize/Deserialize on stats and spec types.         |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use fms_core::SimConfig;
//! use fms_dispatch::{standard_mine, NoopObserver};
//!
//! let mut dispatcher = standard_mine(SimConfig::default())?;
//! dispatcher.run(&mut NoopObserver);
//! println!("{:?}", dispatcher.totals());
//! ```

pub mod builder;
pub mod dispatcher;
pub mod error;
pub mod layout;
pub mod observation;
pub mod observer;
pub mod parallel;
pub mod policy;
pub mod stats;

#[cfg(test)]
mod tests;

pub use builder::{DispatcherBuilder, TruckSpec};
pub use dispatcher::Dispatcher;
pub use error::{DispatchError, DispatchResult};
pub use layout::{standard_builder, standard_mine, standard_network, standard_stations, standard_trucks};
pub use observation::{ObservationLayout, TRUCK_OBSERVATION_LEN, UNREACHABLE};
pub use observer::{DispatchObserver, NoopObserver};
pub use parallel::run_independent;
pub use policy::{DispatchPolicy, ExternalPolicy, FleetView, GreedyPolicy};
pub use stats::{FleetStats, ProductionTotals, StationStatus, TickSummary, TruckStatus};
