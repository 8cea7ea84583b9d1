//! Plain data row types written by output backends.

/// One truck's state at a snapshot tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TruckSnapshotRow {
    pub truck_id: u32,
    pub tick:     u64,
    /// `TruckTask::as_str()`.
    pub task:     &'static str,
    /// Last node the truck settled on.
    pub node:     u32,
    pub x:        f64,
    pub y:        f64,
    pub load:     f64,
    /// `"mineral"`, `"waste"`, or empty when unloaded.
    pub material: &'static str,
    pub speed:    f64,
    /// Station the truck is queued at or served by; `u32::MAX` if none.
    pub station:  u32,
}

/// Per-tick activity counts and cumulative production.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSummaryRow {
    pub tick:              u64,
    pub arrivals:          u32,
    pub enqueued:          u32,
    pub assigned:          u32,
    pub sent_to_fallback:  u32,
    pub loads_finished:    u32,
    pub dumps_finished:    u32,
    pub mineral_processed: f64,
    pub waste_dumped:      f64,
    pub mineral_misrouted: f64,
    pub waste_misrouted:   f64,
}
