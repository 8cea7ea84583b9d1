//! `fms-output` — run output writers for the open-pit fleet simulator.
//!
//! | Backend | Files created                                 |
//! |---------|-----------------------------------------------|
//! | CSV     | `truck_snapshots.csv`, `tick_summaries.csv`   |
//!
//! Backends implement [`OutputWriter`] and are driven by
//! [`FleetOutputObserver`], which implements
//! `fms_dispatch::DispatchObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use fms_output::{CsvWriter, FleetOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = FleetOutputObserver::new(writer);
//! dispatcher.run(&mut obs);
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::FleetOutputObserver;
pub use row::{TickSummaryRow, TruckSnapshotRow};
pub use writer::OutputWriter;
