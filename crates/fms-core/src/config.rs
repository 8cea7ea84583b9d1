//! Run configuration.

use crate::{FmsError, FmsResult};

/// How strictly station queue capacity is enforced.
///
/// The dispatcher always checks `can_accept_truck()` before routing a truck
/// towards a station; this only controls what happens when the truck
/// *arrives* and the queue has filled up in the meantime.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AdmissionPolicy {
    /// Arriving trucks always join the queue; capacity is admission guidance
    /// only and may be exceeded when several trucks were routed to the same
    /// station before any of them arrived.
    #[default]
    Soft,
    /// Arriving trucks are turned away from a full queue and sent to the
    /// fallback node.  `len(queue) <= capacity` then holds unconditionally.
    Strict,
}

/// Top-level simulation configuration.
///
/// Typically built in code or loaded from JSON by the application crate
/// (with the `serde` feature) and handed to `DispatcherBuilder`.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Ticks simulated by `Dispatcher::run`.
    pub total_ticks: u64,

    /// Minimum along-segment gap (map units) a trailing truck keeps behind
    /// the truck ahead of it on the same segment.
    pub follow_distance: f64,

    /// Name of the parking node trucks retreat to when they cannot join a
    /// queue where they stand.
    pub fallback_node: String,

    /// Queue admission contract at arrival time.
    pub admission: AdmissionPolicy,

    /// Emit a fleet summary at `info` level every N ticks.  0 disables it.
    pub log_interval_ticks: u64,

    /// Call `DispatchObserver::on_snapshot` every N ticks.  0 disables it.
    pub output_interval_ticks: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed:                  42,
            total_ticks:           10_000,
            follow_distance:       20.0,
            fallback_node:         "parking".to_owned(),
            admission:             AdmissionPolicy::Soft,
            log_interval_ticks:    100,
            output_interval_ticks: 1,
        }
    }
}

impl SimConfig {
    /// The tick at which `Dispatcher::run` stops (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> crate::Tick {
        crate::Tick(self.total_ticks)
    }

    /// Reject values the dispatcher cannot run with.
    pub fn validate(&self) -> FmsResult<()> {
        if self.follow_distance.is_nan() || self.follow_distance < 0.0 {
            return Err(FmsError::InvalidConfig {
                field:  "follow_distance",
                reason: format!("must be non-negative, got {}", self.follow_distance),
            });
        }
        if self.fallback_node.trim().is_empty() {
            return Err(FmsError::InvalidConfig {
                field:  "fallback_node",
                reason: "must name a node".to_owned(),
            });
        }
        Ok(())
    }
}
