//! `FleetOutputObserver<W>` — bridges `DispatchObserver` to an `OutputWriter`.

use fms_core::Tick;
use fms_dispatch::{DispatchObserver, FleetStats, TickSummary};
use fms_fleet::Truck;
use fms_spatial::MineNetwork;
use fms_station::Station;

use crate::row::{TickSummaryRow, TruckSnapshotRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`DispatchObserver`] that writes truck snapshots and tick summaries to
/// any [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `DispatchObserver`
/// methods have no return value.  After `dispatcher.run()` returns, check
/// for errors with [`take_error`][Self::take_error].
pub struct FleetOutputObserver<W: OutputWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> FleetOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error (if any) after `dispatcher.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                log::warn!("output writer failed: {e}");
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> DispatchObserver for FleetOutputObserver<W> {
    fn on_tick_end(&mut self, tick: Tick, summary: &TickSummary) {
        let row = TickSummaryRow {
            tick:              tick.0,
            arrivals:          summary.arrivals,
            enqueued:          summary.enqueued,
            assigned:          summary.assigned,
            sent_to_fallback:  summary.sent_to_fallback,
            loads_finished:    summary.loads_finished,
            dumps_finished:    summary.dumps_finished,
            mineral_processed: summary.totals.mineral_processed,
            waste_dumped:      summary.totals.waste_dumped,
            mineral_misrouted: summary.totals.mineral_misrouted,
            waste_misrouted:   summary.totals.waste_misrouted,
        };
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }

    fn on_snapshot(
        &mut self,
        tick:      Tick,
        _network:  &MineNetwork,
        trucks:    &[Truck],
        _stations: &[Station],
    ) {
        let rows: Vec<TruckSnapshotRow> = trucks
            .iter()
            .map(|t| TruckSnapshotRow {
                truck_id: t.id.0,
                tick:     tick.0,
                task:     t.task().as_str(),
                node:     t.position.0,
                x:        t.xy.x,
                y:        t.xy.y,
                load:     t.current_load,
                material: t.material.map_or("", |m| m.as_str()),
                speed:    t.speed,
                station:  t.station.map_or(u32::MAX, |s| s.0),
            })
            .collect();

        if !rows.is_empty() {
            let result = self.writer.write_snapshots(&rows);
            self.store_err(result);
        }
    }

    fn on_run_end(&mut self, _final_tick: Tick, _stats: &FleetStats) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
