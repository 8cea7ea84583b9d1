//! Following-distance model.
//!
//! Trucks sharing a segment are ordered by progress (furthest first, fleet
//! index breaking ties).  Each trailing truck may advance at most to
//!
//! ```text
//! allowed = lead_progress - follow_distance / segment_distance
//! ```
//!
//! where `lead_progress` is the truck directly ahead, measured at the start
//! of the movement phase.  A truck already inside that gap simply holds; it
//! never moves backwards.

use rustc_hash::FxHashMap;

use fms_core::SegmentId;
use fms_spatial::MineNetwork;

use crate::Truck;

/// Progress ceiling for a truck following one at `lead_progress`.
#[inline]
pub fn follow_cap(lead_progress: f64, follow_distance: f64, segment_distance: f64) -> f64 {
    if segment_distance > 0.0 {
        lead_progress - follow_distance / segment_distance
    } else {
        lead_progress
    }
}

/// Progress after one tick: `current + step`, clamped to `[current, 1]` and
/// to `cap` when the truck is following another.
#[inline]
pub fn throttle_progress(current: f64, step: f64, cap: Option<f64>) -> f64 {
    let mut next = (current + step).min(1.0);
    if let Some(cap) = cap {
        next = next.min(cap);
    }
    next.max(current)
}

/// Per-truck progress caps for this tick, indexed like `trucks`.
///
/// `None` means the truck leads its segment (or is not on one).
pub fn progress_caps(trucks: &[Truck], network: &MineNetwork, follow_distance: f64) -> Vec<Option<f64>> {
    let mut occupancy: FxHashMap<SegmentId, Vec<(f64, usize)>> = FxHashMap::default();
    for (i, t) in trucks.iter().enumerate() {
        if let Some(leg) = t.leg() {
            occupancy.entry(leg.segment).or_default().push((leg.progress, i));
        }
    }

    let mut caps = vec![None; trucks.len()];
    for (segment, mut group) in occupancy {
        if group.len() < 2 {
            continue;
        }
        group.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
        let distance = network.segment(segment).distance;
        for pair in group.windows(2) {
            let (lead_progress, _) = pair[0];
            let (_, follower) = pair[1];
            caps[follower] = Some(follow_cap(lead_progress, follow_distance, distance));
        }
    }
    caps
}

/// Number of *other* trucks on the same segment as `trucks[index]`.
pub fn segment_peers(trucks: &[Truck], index: usize) -> usize {
    let Some(seg) = trucks.get(index).and_then(Truck::current_segment) else {
        return 0;
    };
    trucks
        .iter()
        .enumerate()
        .filter(|&(i, t)| i != index && t.current_segment() == Some(seg))
        .count()
}
