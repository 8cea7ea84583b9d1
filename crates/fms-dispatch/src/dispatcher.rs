//! The `Dispatcher` struct and its tick loop.

use log::{debug, info, warn};
use rustc_hash::FxHashMap;

use fms_core::{AdmissionPolicy, NodeId, Point, SimConfig, StationId, Tick, TruckId};
use fms_fleet::{MoveOutcome, MovementEngine, Truck, TruckTask};
use fms_spatial::{DijkstraRouter, MineNetwork, Router};
use fms_station::{Station, StationEvent, StationKind};

use crate::observer::DispatchObserver;
use crate::policy::{DispatchPolicy, FleetView, GreedyPolicy};
use crate::stats::{FleetStats, ProductionTotals, StationStatus, TickSummary, TruckStatus};

/// Owns the network, the fleet and the stations, and advances them one tick
/// at a time.
///
/// Create via [`DispatcherBuilder`][crate::DispatcherBuilder].
///
/// # Type parameters
///
/// - `R`: routing engine (default [`DijkstraRouter`]).
/// - `P`: assignment heuristic (default [`GreedyPolicy`]).
pub struct Dispatcher<R: Router = DijkstraRouter, P: DispatchPolicy = GreedyPolicy> {
    pub config: SimConfig,

    tick:     Tick,
    network:  MineNetwork,
    router:   R,
    policy:   P,
    trucks:   Vec<Truck>,
    stations: Vec<Station>,
    by_name:  FxHashMap<String, StationId>,
    movement: MovementEngine,
    totals:   ProductionTotals,
    /// Parking node for trucks that cannot join a queue.
    fallback: NodeId,
    /// Station events of the most recent tick.
    events:   Vec<StationEvent>,
}

impl<R: Router, P: DispatchPolicy> Dispatcher<R, P> {
    pub(crate) fn from_parts(
        config:   SimConfig,
        network:  MineNetwork,
        router:   R,
        policy:   P,
        trucks:   Vec<Truck>,
        stations: Vec<Station>,
        fallback: NodeId,
    ) -> Self {
        let movement = MovementEngine::new(config.follow_distance);
        let by_name = stations.iter().map(|s| (s.name.clone(), s.id)).collect();
        Self {
            config,
            tick: Tick::ZERO,
            network,
            router,
            policy,
            trucks,
            stations,
            by_name,
            movement,
            totals: ProductionTotals::default(),
            fallback,
            events: Vec::new(),
        }
    }

    // ── Main loop ─────────────────────────────────────────────────────────

    /// Run until `config.end_tick()`, calling observer hooks along the way.
    pub fn run<O: DispatchObserver>(&mut self, observer: &mut O) {
        while self.tick < self.config.end_tick() {
            self.step_observed(observer);
        }
        observer.on_run_end(self.tick, &self.stats());
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    ///
    /// Does not call `on_run_end`.
    pub fn run_ticks<O: DispatchObserver>(&mut self, n: u64, observer: &mut O) {
        for _ in 0..n {
            self.step_observed(observer);
        }
    }

    fn step_observed<O: DispatchObserver>(&mut self, observer: &mut O) {
        observer.on_tick_start(self.tick.next());
        let summary = self.update();
        observer.on_tick_end(summary.tick, &summary);
        if summary.tick.is_multiple_of(self.config.output_interval_ticks) {
            observer.on_snapshot(summary.tick, &self.network, &self.trucks, &self.stations);
        }
    }

    /// Advance the whole simulation by one tick.
    ///
    /// ```text
    /// ① Stations  — each station starts/continues/finishes service.
    /// ② Movement  — every travelling truck advances along its route.
    /// ③ Decisions — per truck, in fleet order:
    ///                 stranded            → fallback node
    ///                 waiting at station  → join the queue there (or fallback)
    ///                 waiting assignment  → policy picks a station, route it
    /// ```
    pub fn update(&mut self) -> TickSummary {
        self.tick = self.tick.next();
        let mut summary = TickSummary { tick: self.tick, ..TickSummary::default() };

        // ── Phase 1: stations ─────────────────────────────────────────────
        self.events.clear();
        for station in &mut self.stations {
            let events = station.update(&mut self.trucks);
            self.events.extend(events);
        }
        for event in &self.events {
            self.totals.record(event);
            match event {
                StationEvent::LoadFinished { .. } => summary.loads_finished += 1,
                StationEvent::DumpFinished { .. } => summary.dumps_finished += 1,
                _ => {}
            }
        }

        // ── Phase 2: movement ─────────────────────────────────────────────
        let outcomes = self.movement.step(&mut self.trucks, &self.network);

        // ── Phase 3: per-truck decisions ──────────────────────────────────
        for (i, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                MoveOutcome::Stranded { .. } => {
                    self.send_to_fallback(i);
                    summary.sent_to_fallback += 1;
                    continue;
                }
                MoveOutcome::Arrived(_) => summary.arrivals += 1,
                _ => {}
            }

            match self.trucks[i].task() {
                TruckTask::WaitingShovel | TruckTask::WaitingDump => {
                    if self.trucks[i].station.is_some() {
                        continue;
                    }
                    if self.join_queue(i) {
                        summary.enqueued += 1;
                    } else {
                        self.send_to_fallback(i);
                        summary.sent_to_fallback += 1;
                    }
                }
                TruckTask::WaitingAssignment => {
                    let choice = {
                        let view = self.view();
                        self.policy.assign(&self.trucks[i], &view)
                    };
                    if let Some(station) = choice {
                        if self.route_truck(i, station) {
                            summary.assigned += 1;
                        }
                    }
                }
                _ => {}
            }
        }

        summary.totals = self.totals;
        if self.tick.is_multiple_of(self.config.log_interval_ticks) {
            self.log_summary();
        }
        summary
    }

    // ── Commands ──────────────────────────────────────────────────────────

    /// Send `truck` to `station`.
    ///
    /// The truck must be idle or travelling (a travelling truck is re-routed
    /// from its last settled node), empty for a shovel and loaded for a
    /// crusher or dump, and the station must be reachable.  Returns `false`
    /// and changes nothing otherwise.  Queue capacity is not checked.
    pub fn dispatch_to_station(&mut self, truck: TruckId, station: StationId) -> bool {
        let (Some(t), Some(s)) = (self.trucks.get(truck.index()), self.stations.get(station.index()))
        else {
            return false;
        };
        if !(t.is_available() || t.is_moving()) {
            return false;
        }
        if s.kind.is_loader() == t.loaded {
            return false;
        }
        self.route_truck(truck.index(), station)
    }

    /// Send a loaded `truck` to the first crusher (`to_crusher`) or the first
    /// dump.  Same rules as [`dispatch_to_station`](Self::dispatch_to_station).
    pub fn dispatch_to_unload(&mut self, truck: TruckId, to_crusher: bool) -> bool {
        let wanted = |k: &StationKind| match k {
            StationKind::Crusher => to_crusher,
            StationKind::Dump    => !to_crusher,
            StationKind::Shovel { .. } => false,
        };
        match self.stations.iter().find(|s| wanted(&s.kind)).map(|s| s.id) {
            Some(station) => self.dispatch_to_station(truck, station),
            None => false,
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    #[inline]
    pub fn tick(&self) -> Tick {
        self.tick
    }

    #[inline]
    pub fn network(&self) -> &MineNetwork {
        &self.network
    }

    #[inline]
    pub fn router(&self) -> &R {
        &self.router
    }

    #[inline]
    pub fn trucks(&self) -> &[Truck] {
        &self.trucks
    }

    #[inline]
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn truck(&self, id: TruckId) -> Option<&Truck> {
        self.trucks.get(id.index())
    }

    pub fn station(&self, id: StationId) -> Option<&Station> {
        self.stations.get(id.index())
    }

    /// Station by name.
    pub fn station_named(&self, name: &str) -> Option<&Station> {
        self.by_name.get(name).and_then(|&id| self.station(id))
    }

    #[inline]
    pub fn totals(&self) -> &ProductionTotals {
        &self.totals
    }

    #[inline]
    pub fn fallback_node(&self) -> NodeId {
        self.fallback
    }

    /// Station events emitted during the most recent tick.
    #[inline]
    pub fn events(&self) -> &[StationEvent] {
        &self.events
    }

    /// Last settled node and interpolated map position of `truck`.
    pub fn truck_position(&self, truck: TruckId) -> Option<(NodeId, Point)> {
        self.truck(truck).map(|t| (t.position, t.xy))
    }

    /// Shortest road distance from `a` to `b`; `None` when unreachable.
    pub fn distance_between(&self, a: NodeId, b: NodeId) -> Option<f64> {
        let route = self.router.shortest_path(&self.network, a, b);
        (!route.is_empty()).then_some(route.distance)
    }

    /// Every `(truck, station)` pair an external controller could issue
    /// right now: idle empty trucks × accepting shovels, idle loaded trucks ×
    /// accepting unloaders.
    pub fn available_dispatches(&self) -> Vec<(TruckId, StationId)> {
        let mut pairs = Vec::new();
        for truck in self.trucks.iter().filter(|t| t.is_available()) {
            for station in &self.stations {
                if station.kind.is_loader() != truck.loaded && station.can_accept_truck() {
                    pairs.push((truck.id, station.id));
                }
            }
        }
        pairs
    }

    /// Trucks currently headed to an unloader that does not take the
    /// material they carry.
    pub fn wrong_unload_assignments(&self) -> Vec<TruckId> {
        self.trucks
            .iter()
            .filter(|t| {
                let Some(dest) = t.destination.and_then(|d| self.station(d)) else {
                    return false;
                };
                dest.kind.is_unloader()
                    && t.material.is_some_and(|m| m != dest.kind.material())
            })
            .map(|t| t.id)
            .collect()
    }

    /// Owned snapshot of totals, per-truck and per-station status.
    pub fn stats(&self) -> FleetStats {
        FleetStats {
            tick:     self.tick,
            totals:   self.totals,
            trucks:   self.trucks.iter().map(|t| TruckStatus::of(t, &self.network)).collect(),
            stations: self.stations.iter().map(StationStatus::of).collect(),
        }
    }

    /// Read-only view handed to the dispatch policy.
    pub fn view(&self) -> FleetView<'_> {
        FleetView {
            tick:     self.tick,
            network:  &self.network,
            trucks:   &self.trucks,
            stations: &self.stations,
            totals:   &self.totals,
        }
    }

    // ── Internals ─────────────────────────────────────────────────────────

    /// Route truck `i` to `station`.  Leaves the truck untouched and returns
    /// `false` if the transition is illegal or there is no usable route.
    fn route_truck(&mut self, i: usize, station: StationId) -> bool {
        let Some(target) = self.stations.get(station.index()) else {
            return false;
        };
        let next = if target.kind.is_loader() {
            TruckTask::MovingToShovel
        } else {
            TruckTask::MovingToDump
        };
        let truck = &self.trucks[i];
        if !truck.task().can_transition_to(next) {
            return false;
        }

        let route = self.router.shortest_path(&self.network, truck.position, target.node);
        if !route.is_assignable() {
            debug!(
                "{}: no route for {} from '{}' to '{}'",
                self.tick,
                truck.id,
                self.network.node_name(truck.position),
                target.name,
            );
            return false;
        }

        let truck = &mut self.trucks[i];
        truck.assign_route(&route.nodes);
        if let Err(e) = truck.set_task(next) {
            warn!("{}: {e}", self.tick);
            truck.clear_route();
            return false;
        }
        truck.destination = Some(station);
        debug!(
            "{}: {} → '{}' ({} hops, {:.0} m)",
            self.tick,
            truck.id,
            target.name,
            route.len() - 1,
            route.distance,
        );
        true
    }

    /// Put waiting truck `i` into the queue of the matching station at its
    /// node, preferring the one it was dispatched to.
    fn join_queue(&mut self, i: usize) -> bool {
        let truck = &self.trucks[i];
        let wants_loader = truck.task() == TruckTask::WaitingShovel;
        let at = truck.position;
        let fits = |s: &Station| s.node == at && s.kind.is_loader() == wants_loader;

        let target = truck
            .destination
            .and_then(|d| self.stations.get(d.index()))
            .filter(|&s| fits(s))
            .or_else(|| self.stations.iter().find(|&s| fits(s)))
            .map(|s| s.id);
        let Some(target) = target else {
            debug!(
                "{}: {} found no {} at '{}'",
                self.tick,
                truck.id,
                if wants_loader { "shovel" } else { "unloader" },
                self.network.node_name(at),
            );
            return false;
        };

        let station = &mut self.stations[target.index()];
        if self.config.admission == AdmissionPolicy::Strict && !station.can_accept_truck() {
            debug!("{}: '{}' full, turning {} away", self.tick, station.name, self.trucks[i].id);
            return false;
        }
        station.request_enqueue(&mut self.trucks[i])
    }

    /// Head truck `i` for the fallback node.  A truck already there (or with
    /// no way to get there) goes straight back to `WaitingAssignment`.
    fn send_to_fallback(&mut self, i: usize) {
        let truck = &self.trucks[i];
        let route = self.router.shortest_path(&self.network, truck.position, self.fallback);
        if route.is_empty() {
            warn!(
                "{}: {} cannot reach fallback node '{}' from '{}'",
                self.tick,
                truck.id,
                self.network.node_name(self.fallback),
                self.network.node_name(truck.position),
            );
        }

        let truck = &mut self.trucks[i];
        truck.destination = None;
        if let Err(e) = truck.set_task(TruckTask::Returning) {
            warn!("{}: {e}", self.tick);
            return;
        }
        if truck.assign_route(&route.nodes) {
            debug!("{}: {} returning to fallback node", self.tick, truck.id);
            return;
        }
        truck.clear_route();
        if let Err(e) = truck.arrive() {
            warn!("{}: {e}", self.tick);
        }
    }

    fn log_summary(&self) {
        let counts = self.stats().task_counts();
        let idle = counts[TruckTask::WaitingAssignment as usize];
        let moving: usize = TruckTask::ALL.iter().filter(|t| t.is_moving()).map(|&t| counts[t as usize]).sum();
        let queued = counts[TruckTask::WaitingShovel as usize] + counts[TruckTask::WaitingDump as usize];
        let serving = counts[TruckTask::Loading as usize] + counts[TruckTask::Dumping as usize];
        info!(
            "{}: trucks idle={idle} moving={moving} queued={queued} in_service={serving} | \
             mineral={:.0}t waste={:.0}t misrouted={:.0}t",
            self.tick,
            self.totals.mineral_processed,
            self.totals.waste_dumped,
            self.totals.mineral_misrouted + self.totals.waste_misrouted,
        );
    }
}
