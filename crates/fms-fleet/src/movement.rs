//! Per-tick truck movement.
//!
//! One call to [`MovementEngine::step`] is one tick of driving for the whole
//! fleet, in three phases:
//!
//! 1. **Legs.**  Every moving truck without a leg resolves the segment from
//!    its settled node to its next hop.  A missing segment strands the truck.
//! 2. **Snapshot.**  Following-distance caps are computed from the progress
//!    of every truck on a leg *before* anyone moves, so the result does not
//!    depend on which truck is processed first.
//! 3. **Advance.**  Each truck gains `1 / total_ticks` of progress, throttled
//!    by its cap.  Reaching the end of a leg settles the truck on the hop;
//!    the next leg starts on the following tick.

use fms_core::NodeId;
use fms_spatial::MineNetwork;

use crate::traffic::{progress_caps, throttle_progress};
use crate::{Leg, Truck, TruckTask};

/// Efficiency floor added to every truck's speed factor.
pub const SPEED_FACTOR_FLOOR: f64 = 0.3;

/// Progress within this of 1.0 counts as the end of the leg.
const ARRIVAL_EPSILON: f64 = 1e-9;

/// What happened to one truck during a movement tick.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MoveOutcome {
    /// Not travelling.
    Idle,
    /// Still on its leg (possibly held in place by traffic).
    Advanced,
    /// Settled on an intermediate hop.
    Waypoint(NodeId),
    /// Reached the end of its route.  Carries the task held before arrival.
    Arrived(TruckTask),
    /// No segment from the settled node to the next hop; the route was
    /// dropped and the truck is stopped at `at`.
    Stranded { at: NodeId, next: NodeId },
}

/// Nominal ticks to cross `distance` at `speed` with the given efficiency.
#[inline]
pub fn ticks_to_cross(distance: f64, speed: f64, efficiency: f64) -> f64 {
    distance / speed / (efficiency + SPEED_FACTOR_FLOOR)
}

/// Drives the fleet over the road network.
#[derive(Clone, Debug)]
pub struct MovementEngine {
    /// Minimum along-segment gap between trucks, in map units.
    pub follow_distance: f64,
}

impl MovementEngine {
    pub fn new(follow_distance: f64) -> Self {
        Self { follow_distance: follow_distance.max(0.0) }
    }

    /// Advance every truck by one tick.  Returns one outcome per truck, in
    /// fleet order.
    pub fn step(&self, trucks: &mut [Truck], network: &MineNetwork) -> Vec<MoveOutcome> {
        let mut outcomes = vec![MoveOutcome::Idle; trucks.len()];

        // ── Phase 1: resolve legs ─────────────────────────────────────────
        for (i, truck) in trucks.iter_mut().enumerate() {
            if !truck.is_moving() {
                truck.speed = 0.0;
                continue;
            }
            if truck.leg().is_some() {
                continue;
            }
            let Some(&next) = truck.route().front() else {
                truck.speed = 0.0;
                continue;
            };
            match network.segment_between(truck.position, next) {
                Some(seg) => {
                    let s = network.segment(seg);
                    truck.set_leg(Some(Leg {
                        segment:     seg,
                        from:        s.from,
                        to:          s.to,
                        total_ticks: ticks_to_cross(s.distance, s.speed(truck.loaded), truck.efficiency),
                        progress:    0.0,
                    }));
                }
                None => {
                    log::warn!(
                        "truck {} stranded at '{}': no segment to '{}'",
                        truck.id,
                        network.node_name(truck.position),
                        network.node_name(next)
                    );
                    truck.clear_route();
                    outcomes[i] = MoveOutcome::Stranded { at: truck.position, next };
                }
            }
        }

        // ── Phase 2: traffic snapshot ─────────────────────────────────────
        let caps = progress_caps(trucks, network, self.follow_distance);

        // ── Phase 3: advance ──────────────────────────────────────────────
        for (i, truck) in trucks.iter_mut().enumerate() {
            let Some(leg) = truck.leg_mut() else {
                continue;
            };
            let before = leg.progress;
            let after = throttle_progress(before, leg.nominal_step(), caps[i]);
            leg.progress = after;
            let leg = *leg;

            let distance = network.segment(leg.segment).distance;
            let speed = (after - before) * distance;

            if after >= 1.0 - ARRIVAL_EPSILON {
                let at = network.node_pos(leg.to);
                let route_done = truck.settle(leg.to, at);
                if route_done {
                    match truck.arrive() {
                        Ok(prev) => outcomes[i] = MoveOutcome::Arrived(prev),
                        Err(e) => {
                            log::warn!("{e}");
                            outcomes[i] = MoveOutcome::Waypoint(leg.to);
                        }
                    }
                } else {
                    outcomes[i] = MoveOutcome::Waypoint(leg.to);
                }
            } else {
                truck.xy = network.node_pos(leg.from).lerp(network.node_pos(leg.to), after);
                outcomes[i] = MoveOutcome::Advanced;
            }
            truck.speed = speed;
        }

        outcomes
    }
}
