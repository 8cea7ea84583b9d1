//! `fms-station` — shovel, crusher and dump service model.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`station`] | `Station` (FIFO queue + single server + timer), counters    |
//! | [`spec`]    | `StationSpec`, `StationKind`, default capacities and timings |
//! | [`event`]   | `StationEvent` — what happened during one `update()`        |
//! | [`error`]   | `StationError`, `StationResult<T>`                          |
//!
//! # Service model
//!
//! Each tick an idle station pops its queue head and starts serving it; the
//! timer then counts down, and the tick the service starts already counts.
//!
//! * **Shovel**: `ceil(capacity / (ton_per_pass × shovel eff × truck eff))`
//!   passes of `service_ticks` each.  Buckets vary ±10 % around nominal;
//!   the last pass tops the truck up.  Loading stops early once the truck is
//!   full.
//! * **Crusher / Dump**: one operation of `service_ticks`.  The payload is
//!   credited as correct or wrong material, never refused.

pub mod error;
pub mod event;
pub mod spec;
pub mod station;


pub use error::{StationError, StationResult};
pub use event::StationEvent;
pub use spec::{StationKind, StationSpec};
pub use station::{InService, Station, StationCounters, PASS_SPREAD};
