//! Flattened numeric observation vectors for external controllers.
//!
//! Both functions are pure snapshots of the current state.
//!
//! # Fleet observation layout
//!
//! | Block        | Len                | Features                                             |
//! |--------------|--------------------|------------------------------------------------------|
//! | global       | 5                  | tick, mineral processed, waste dumped, mineral misrouted, waste misrouted |
//! | equipment    | 4 + 2 × n_shovels  | crusher queue, crusher busy, dump queue, dump busy, then (queue, busy) per shovel |
//! | trucks       | 2 × n_trucks       | task code, load ratio per truck                      |
//! | aggregates   | 3                  | idle trucks, moving trucks, total shovel hang time   |
//!
//! # Per-truck observation layout (25 values)
//!
//! | Block        | Len | Features                                                      |
//! |--------------|-----|---------------------------------------------------------------|
//! | local        | 12  | x, y, load ratio, loaded, task code, material code, road distance to nearest shovel / crusher / dump, speed, waiting, efficiency |
//! | coordination | 8   | trucks on same segment, trucks at same node, crusher queue, dump queue, congestion, first three shovel queues |
//! | global       | 5   | tons delivered correctly, idle trucks, busy shovels, crusher busy, dump busy |
//!
//! Unreachable distances are encoded as [`UNREACHABLE`].  Booleans are 0/1.

use std::ops::Range;

use fms_core::{Material, TruckId};
use fms_fleet::traffic::segment_peers;
use fms_spatial::Router;
use fms_station::{Station, StationKind};

use crate::dispatcher::Dispatcher;
use crate::policy::DispatchPolicy;

/// Distance feature for a station that cannot be reached.
pub const UNREACHABLE: f64 = -1.0;

pub const TRUCK_LOCAL_LEN: usize = 12;
pub const TRUCK_COORDINATION_LEN: usize = 8;
pub const TRUCK_GLOBAL_LEN: usize = 5;
pub const TRUCK_OBSERVATION_LEN: usize = TRUCK_LOCAL_LEN + TRUCK_COORDINATION_LEN + TRUCK_GLOBAL_LEN;

/// Block offsets of the fleet observation vector.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ObservationLayout {
    pub n_shovels: usize,
    pub n_trucks:  usize,
}

impl ObservationLayout {
    pub const GLOBAL_LEN: usize = 5;
    pub const AGGREGATE_LEN: usize = 3;

    pub fn global(&self) -> Range<usize> {
        0..Self::GLOBAL_LEN
    }

    pub fn equipment(&self) -> Range<usize> {
        let start = self.global().end;
        start..start + 4 + 2 * self.n_shovels
    }

    pub fn trucks(&self) -> Range<usize> {
        let start = self.equipment().end;
        start..start + 2 * self.n_trucks
    }

    pub fn aggregates(&self) -> Range<usize> {
        let start = self.trucks().end;
        start..start + Self::AGGREGATE_LEN
    }

    /// Total vector length.
    pub fn len(&self) -> usize {
        self.aggregates().end
    }
}

#[inline]
fn flag(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

/// `(queue length, busy)` of a station, zeros when absent.
fn queue_and_busy(station: Option<&Station>) -> (f64, f64) {
    station.map_or((0.0, 0.0), |s| (s.queue_len() as f64, flag(s.is_busy())))
}

impl<R: Router, P: DispatchPolicy> Dispatcher<R, P> {
    fn first_of(&self, kind: StationKind) -> Option<&Station> {
        self.stations().iter().find(|s| s.kind == kind)
    }

    pub fn observation_layout(&self) -> ObservationLayout {
        ObservationLayout {
            n_shovels: self.stations().iter().filter(|s| s.kind.is_loader()).count(),
            n_trucks:  self.trucks().len(),
        }
    }

    /// The fleet observation vector.  See the module docs for the layout.
    pub fn observation(&self) -> Vec<f64> {
        let layout = self.observation_layout();
        let mut obs = Vec::with_capacity(layout.len());

        let t = self.totals();
        obs.extend([
            self.tick().0 as f64,
            t.mineral_processed,
            t.waste_dumped,
            t.mineral_misrouted,
            t.waste_misrouted,
        ]);

        let (crusher_q, crusher_busy) = queue_and_busy(self.first_of(StationKind::Crusher));
        let (dump_q, dump_busy) = queue_and_busy(self.first_of(StationKind::Dump));
        obs.extend([crusher_q, crusher_busy, dump_q, dump_busy]);
        for shovel in self.stations().iter().filter(|s| s.kind.is_loader()) {
            obs.extend([shovel.queue_len() as f64, flag(shovel.is_busy())]);
        }

        for truck in self.trucks() {
            obs.extend([truck.task().code(), truck.load_ratio()]);
        }

        let idle = self.trucks().iter().filter(|t| t.is_available()).count();
        let moving = self.trucks().iter().filter(|t| t.is_moving()).count();
        let hang: u64 = self
            .stations()
            .iter()
            .filter(|s| s.kind.is_loader())
            .map(|s| s.counters.hang_time)
            .sum();
        obs.extend([idle as f64, moving as f64, hang as f64]);

        debug_assert_eq!(obs.len(), layout.len());
        obs
    }

    /// Observation for a single truck, or `None` for an unknown id.
    pub fn truck_observation(&self, id: TruckId) -> Option<Vec<f64>> {
        let truck = self.truck(id)?;
        let stations = self.stations();
        let mut obs = Vec::with_capacity(TRUCK_OBSERVATION_LEN);

        // ── Local ─────────────────────────────────────────────────────────
        let tree = self.router().shortest_paths(self.network(), truck.position);
        let distance_to = |s: &Station| tree.distance_to(s.node);
        let nearest_shovel = stations
            .iter()
            .filter(|s| s.kind.is_loader())
            .filter_map(distance_to)
            .fold(None, |best: Option<f64>, d| Some(best.map_or(d, |b| b.min(d))));
        let crusher = self.first_of(StationKind::Crusher).and_then(distance_to);
        let dump = self.first_of(StationKind::Dump).and_then(distance_to);

        obs.extend([
            truck.xy.x,
            truck.xy.y,
            truck.load_ratio(),
            flag(truck.loaded),
            truck.task().code(),
            Material::code(truck.material),
            nearest_shovel.unwrap_or(UNREACHABLE),
            crusher.unwrap_or(UNREACHABLE),
            dump.unwrap_or(UNREACHABLE),
            truck.speed,
            flag(truck.task().is_waiting()),
            truck.efficiency,
        ]);

        // ── Coordination ──────────────────────────────────────────────────
        let same_segment = segment_peers(self.trucks(), id.index());
        let same_node = self
            .trucks()
            .iter()
            .filter(|t| t.id != id && t.leg().is_none() && t.position == truck.position)
            .count();
        let (crusher_q, _) = queue_and_busy(self.first_of(StationKind::Crusher));
        let (dump_q, _) = queue_and_busy(self.first_of(StationKind::Dump));
        obs.extend([
            same_segment as f64,
            same_node as f64,
            crusher_q,
            dump_q,
            (same_segment + same_node) as f64,
        ]);
        let mut shovel_queues = stations
            .iter()
            .filter(|s| s.kind.is_loader())
            .map(|s| s.queue_len() as f64);
        for _ in 0..3 {
            obs.push(shovel_queues.next().unwrap_or(0.0));
        }

        // ── Global ────────────────────────────────────────────────────────
        let t = self.totals();
        let idle = self.trucks().iter().filter(|t| t.is_available()).count();
        let busy_shovels = stations.iter().filter(|s| s.kind.is_loader() && s.is_busy()).count();
        obs.extend([
            t.mineral_processed + t.waste_dumped,
            idle as f64,
            busy_shovels as f64,
            queue_and_busy(self.first_of(StationKind::Crusher)).1,
            queue_and_busy(self.first_of(StationKind::Dump)).1,
        ]);

        debug_assert_eq!(obs.len(), TRUCK_OBSERVATION_LEN);
        Some(obs)
    }
}
