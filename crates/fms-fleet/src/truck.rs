//! The haul truck: identity, load state, route, and task state machine.

use std::collections::VecDeque;
use std::fmt;

use fms_core::{Material, NodeId, Point, SegmentId, StationId, TruckId};

use crate::{FleetError, FleetResult};

// ── TruckTask ─────────────────────────────────────────────────────────────────

/// What a truck is doing.  Closed set; transitions are checked by
/// [`TruckTask::can_transition_to`].
///
/// ```text
/// WaitingAssignment ─► MovingToShovel ─► WaitingShovel ─► Loading ─┐
///        ▲                                                         │
///        ├──────────────────────────────────────────────────────────┘
///        │
///        ├─► MovingToDump ─► WaitingDump ─► Dumping ─► WaitingAssignment
///        │
///        └── Returning ◄── (any moving or waiting-at-station state)
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TruckTask {
    #[default]
    WaitingAssignment,
    MovingToShovel,
    WaitingShovel,
    Loading,
    MovingToDump,
    WaitingDump,
    Dumping,
    /// Heading to the fallback node after failing to join a queue.
    Returning,
}

impl TruckTask {
    pub const ALL: [TruckTask; 8] = [
        TruckTask::WaitingAssignment,
        TruckTask::MovingToShovel,
        TruckTask::WaitingShovel,
        TruckTask::Loading,
        TruckTask::MovingToDump,
        TruckTask::WaitingDump,
        TruckTask::Dumping,
        TruckTask::Returning,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TruckTask::WaitingAssignment => "waiting_assignment",
            TruckTask::MovingToShovel    => "moving_to_shovel",
            TruckTask::WaitingShovel     => "waiting_shovel",
            TruckTask::Loading           => "loading",
            TruckTask::MovingToDump      => "moving_to_dump",
            TruckTask::WaitingDump       => "waiting_dump",
            TruckTask::Dumping           => "dumping",
            TruckTask::Returning         => "returning",
        }
    }

    /// Stable numeric encoding for observation vectors (declaration order).
    #[inline]
    pub fn code(self) -> f64 {
        self as u8 as f64
    }

    /// `true` for the three travelling states.
    #[inline]
    pub fn is_moving(self) -> bool {
        matches!(
            self,
            TruckTask::MovingToShovel | TruckTask::MovingToDump | TruckTask::Returning
        )
    }

    /// `true` while the truck is queued at or being served by a station.
    #[inline]
    pub fn is_station_bound(self) -> bool {
        matches!(
            self,
            TruckTask::WaitingShovel | TruckTask::Loading | TruckTask::WaitingDump | TruckTask::Dumping
        )
    }

    /// `true` for any of the waiting states, including `WaitingAssignment`.
    #[inline]
    pub fn is_waiting(self) -> bool {
        matches!(
            self,
            TruckTask::WaitingAssignment | TruckTask::WaitingShovel | TruckTask::WaitingDump
        )
    }

    /// The legal edge set of the truck state machine.
    ///
    /// Re-routing while already moving towards the same kind of target is a
    /// legal self-edge (`MovingToShovel → MovingToShovel` etc.).
    pub fn can_transition_to(self, next: TruckTask) -> bool {
        use TruckTask::*;
        matches!(
            (self, next),
            (WaitingAssignment, MovingToShovel | MovingToDump | Returning)
                | (MovingToShovel, WaitingShovel | MovingToShovel | Returning)
                | (WaitingShovel, Loading | Returning)
                | (Loading, WaitingAssignment)
                | (MovingToDump, WaitingDump | MovingToDump | Returning)
                | (WaitingDump, Dumping | Returning)
                | (Dumping, WaitingAssignment)
                | (Returning, WaitingAssignment | MovingToShovel | MovingToDump | Returning)
        )
    }
}

impl fmt::Display for TruckTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Leg ───────────────────────────────────────────────────────────────────────

/// The segment a truck is currently driving.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Leg {
    pub segment:     SegmentId,
    pub from:        NodeId,
    pub to:          NodeId,
    /// Nominal ticks to cross the segment at the truck's speed factor.
    pub total_ticks: f64,
    /// Fraction of the segment covered, in `[0, 1)`.
    pub progress:    f64,
}

impl Leg {
    /// Nominal ticks still needed to reach `to`.
    #[inline]
    pub fn remaining_ticks(&self) -> f64 {
        (1.0 - self.progress) * self.total_ticks
    }

    /// Progress gained per unthrottled tick.
    #[inline]
    pub fn nominal_step(&self) -> f64 {
        if self.total_ticks > 0.0 { 1.0 / self.total_ticks } else { 1.0 }
    }
}

// ── Truck ─────────────────────────────────────────────────────────────────────

/// A haul truck.
///
/// `task`, `route` and `leg` are private so every task change goes through
/// the checked state machine; everything else is plain data.
#[derive(Clone, Debug)]
pub struct Truck {
    pub id:           TruckId,
    /// Payload capacity in tons.
    pub capacity:     f64,
    /// Operator/vehicle efficiency factor (> 0).  Scales pass tonnage and
    /// travel speed.
    pub efficiency:   f64,
    /// Last node the truck settled on.  While driving a leg this is the
    /// leg's origin.
    pub position:     NodeId,
    /// Set when loading completes, cleared when dumping completes.
    pub loaded:       bool,
    pub current_load: f64,
    pub material:     Option<Material>,
    /// Realized speed over the last tick (map units per tick).
    pub speed:        f64,
    /// Continuously interpolated map position.
    pub xy:           Point,
    /// Station whose queue or service slot the truck currently occupies.
    pub station:      Option<StationId>,
    /// Station the truck has been dispatched to.
    pub destination:  Option<StationId>,

    task:  TruckTask,
    route: VecDeque<NodeId>,
    leg:   Option<Leg>,
}

impl Truck {
    /// Create an empty truck parked at `position`.
    pub fn new(
        id:         TruckId,
        capacity:   f64,
        efficiency: f64,
        position:   NodeId,
        xy:         Point,
    ) -> FleetResult<Self> {
        if !(capacity.is_finite() && capacity > 0.0) {
            return Err(FleetError::InvalidTruck { truck: id, reason: "capacity must be positive" });
        }
        if !(efficiency.is_finite() && efficiency > 0.0) {
            return Err(FleetError::InvalidTruck { truck: id, reason: "efficiency must be positive" });
        }
        Ok(Self {
            id,
            capacity,
            efficiency,
            position,
            loaded:       false,
            current_load: 0.0,
            material:     None,
            speed:        0.0,
            xy,
            station:      None,
            destination:  None,
            task:         TruckTask::WaitingAssignment,
            route:        VecDeque::new(),
            leg:          None,
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn task(&self) -> TruckTask {
        self.task
    }

    /// Remaining hops, excluding the node the truck last settled on.
    #[inline]
    pub fn route(&self) -> &VecDeque<NodeId> {
        &self.route
    }

    #[inline]
    pub fn leg(&self) -> Option<&Leg> {
        self.leg.as_ref()
    }

    /// The segment being driven, if any.
    #[inline]
    pub fn current_segment(&self) -> Option<SegmentId> {
        self.leg.map(|l| l.segment)
    }

    /// Final node of the current route, if any.
    pub fn route_target(&self) -> Option<NodeId> {
        self.route.back().copied()
    }

    /// `current_load / capacity`.
    #[inline]
    pub fn load_ratio(&self) -> f64 {
        self.current_load / self.capacity
    }

    #[inline]
    pub fn is_available(&self) -> bool {
        self.task == TruckTask::WaitingAssignment
    }

    #[inline]
    pub fn is_moving(&self) -> bool {
        self.task.is_moving()
    }

    // ── State machine ─────────────────────────────────────────────────────

    /// Move to `next`, returning the previous task.  Illegal edges are
    /// refused and leave the truck untouched.
    pub fn set_task(&mut self, next: TruckTask) -> FleetResult<TruckTask> {
        let prev = self.task;
        if !prev.can_transition_to(next) {
            return Err(FleetError::IllegalTransition { truck: self.id, from: prev, to: next });
        }
        self.task = next;
        Ok(prev)
    }

    /// Replace the route with `nodes` (which should start at the truck's
    /// settled position).
    ///
    /// Routes with fewer than two nodes are ignored and `false` is returned.
    /// An accepted route discards any progress along the current leg; the
    /// truck restarts from its last settled node.
    pub fn assign_route(&mut self, nodes: &[NodeId]) -> bool {
        if nodes.len() <= 1 {
            return false;
        }
        self.route = nodes[1..].iter().copied().collect();
        self.leg = None;
        true
    }

    /// Drop the route and any leg in progress.
    pub fn clear_route(&mut self) {
        self.route.clear();
        self.leg = None;
        self.speed = 0.0;
    }

    /// Route end reached: `MovingToShovel → WaitingShovel`,
    /// `MovingToDump → WaitingDump`, `Returning → WaitingAssignment`.
    /// Returns the task held before arrival.
    pub fn arrive(&mut self) -> FleetResult<TruckTask> {
        let next = match self.task {
            TruckTask::MovingToShovel => TruckTask::WaitingShovel,
            TruckTask::MovingToDump   => TruckTask::WaitingDump,
            TruckTask::Returning      => TruckTask::WaitingAssignment,
            other => {
                return Err(FleetError::NotMoving { truck: self.id, task: other });
            }
        };
        self.clear_route();
        self.set_task(next)
    }

    // ── Station callbacks ─────────────────────────────────────────────────

    /// First bucket: load = `min(nominal × efficiency, capacity)`.
    pub fn start_loading(&mut self, material: Material, nominal_load: f64) -> FleetResult<()> {
        self.set_task(TruckTask::Loading)?;
        self.material = Some(material);
        self.current_load = (nominal_load * self.efficiency).min(self.capacity);
        Ok(())
    }

    /// Add a further bucket of `tons`, capped at capacity (a bucket covering
    /// the remaining room fills the truck exactly).  Returns the tons actually
    /// added.
    pub fn add_pass(&mut self, tons: f64) -> f64 {
        let before = self.current_load;
        let room = self.capacity - before;
        self.current_load = if tons >= room { self.capacity } else { before + tons.max(0.0) };
        self.current_load - before
    }

    pub fn finish_loading(&mut self) -> FleetResult<()> {
        self.set_task(TruckTask::WaitingAssignment)?;
        self.loaded = true;
        self.destination = None;
        Ok(())
    }

    pub fn start_dumping(&mut self) -> FleetResult<()> {
        self.set_task(TruckTask::Dumping)?;
        Ok(())
    }

    /// Empty the truck.  Returns the tons and material that were carried.
    pub fn finish_dumping(&mut self) -> FleetResult<(f64, Option<Material>)> {
        self.set_task(TruckTask::WaitingAssignment)?;
        let dumped = (self.current_load, self.material.take());
        self.loaded = false;
        self.current_load = 0.0;
        self.destination = None;
        Ok(dumped)
    }

    // ── Movement internals ────────────────────────────────────────────────

    pub(crate) fn set_leg(&mut self, leg: Option<Leg>) {
        self.leg = leg;
    }

    pub(crate) fn leg_mut(&mut self) -> Option<&mut Leg> {
        self.leg.as_mut()
    }

    /// Settle on the next hop.  Returns `true` if that was the last one.
    pub(crate) fn settle(&mut self, node: NodeId, at: Point) -> bool {
        self.position = node;
        self.xy = at;
        self.leg = None;
        if self.route.front() == Some(&node) {
            self.route.pop_front();
        }
        self.route.is_empty()
    }
}
