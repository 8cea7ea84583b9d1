//! Dispatcher observer trait for progress reporting and data collection.

use fms_core::Tick;
use fms_fleet::Truck;
use fms_spatial::MineNetwork;
use fms_station::Station;

use crate::stats::{FleetStats, TickSummary};

/// Callbacks invoked by [`Dispatcher::run`][crate::Dispatcher::run] and
/// [`Dispatcher::run_ticks`][crate::Dispatcher::run_ticks].
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example — progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl DispatchObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, tick: Tick, summary: &TickSummary) {
///         if tick.is_multiple_of(self.interval) {
///             println!("{tick}: {:.0} t delivered", summary.totals.delivered());
///         }
///     }
/// }
/// ```
pub trait DispatchObserver {
    /// Called before the tick is processed.  `tick` is the tick about to run.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called after the tick is processed.
    fn on_tick_end(&mut self, _tick: Tick, _summary: &TickSummary) {}

    /// Called at snapshot intervals (every `config.output_interval_ticks`
    /// ticks) with read-only access to the full fleet state.
    fn on_snapshot(
        &mut self,
        _tick:     Tick,
        _network:  &MineNetwork,
        _trucks:   &[Truck],
        _stations: &[Station],
    ) {}

    /// Called once after the final tick of `run`.
    fn on_run_end(&mut self, _final_tick: Tick, _stats: &FleetStats) {}
}

/// A [`DispatchObserver`] that does nothing.
pub struct NoopObserver;

impl DispatchObserver for NoopObserver {}
