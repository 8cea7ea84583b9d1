//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `truck_snapshots.csv`
//! - `tick_summaries.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::{OutputResult, TickSummaryRow, TruckSnapshotRow};
use crate::writer::OutputWriter;

pub const TRUCK_SNAPSHOT_HEADER: [&str; 10] =
    ["truck_id", "tick", "task", "node", "x", "y", "load", "material", "speed", "station"];

pub const TICK_SUMMARY_HEADER: [&str; 11] = [
    "tick",
    "arrivals",
    "enqueued",
    "assigned",
    "sent_to_fallback",
    "loads_finished",
    "dumps_finished",
    "mineral_processed",
    "waste_dumped",
    "mineral_misrouted",
    "waste_misrouted",
];

/// Writes simulation output to two CSV files.
pub struct CsvWriter {
    snapshots: Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create `dir` if needed, open the two CSV files and write the header
    /// rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;

        let mut snapshots = Writer::from_path(dir.join("truck_snapshots.csv"))?;
        snapshots.write_record(TRUCK_SNAPSHOT_HEADER)?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record(TICK_SUMMARY_HEADER)?;

        Ok(Self {
            snapshots,
            summaries,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_snapshots(&mut self, rows: &[TruckSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.snapshots.write_record(&[
                row.truck_id.to_string(),
                row.tick.to_string(),
                row.task.to_owned(),
                row.node.to_string(),
                format!("{:.3}", row.x),
                format!("{:.3}", row.y),
                format!("{:.3}", row.load),
                row.material.to_owned(),
                format!("{:.3}", row.speed),
                row.station.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.arrivals.to_string(),
            row.enqueued.to_string(),
            row.assigned.to_string(),
            row.sent_to_fallback.to_string(),
            row.loads_finished.to_string(),
            row.dumps_finished.to_string(),
            format!("{:.3}", row.mineral_processed),
            format!("{:.3}", row.waste_dumped),
            format!("{:.3}", row.mineral_misrouted),
            format!("{:.3}", row.waste_misrouted),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.snapshots.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
