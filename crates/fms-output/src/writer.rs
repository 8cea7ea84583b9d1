//! The `OutputWriter` trait implemented by backend writers.

use crate::{OutputResult, TickSummaryRow, TruckSnapshotRow};

/// Sink for snapshot and summary rows.
///
/// All methods are infallible from the observer's perspective: errors are
/// stored internally and retrieved with
/// [`FleetOutputObserver::take_error`][crate::FleetOutputObserver::take_error].
pub trait OutputWriter {
    /// Write a batch of truck snapshots.
    fn write_snapshots(&mut self, rows: &[TruckSnapshotRow]) -> OutputResult<()>;

    /// Write one tick summary row.
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
