//! Integration tests for fms-dispatch.

use fms_core::{AdmissionPolicy, FmsError, Material, NodeId, Point, SimConfig, StationId, Tick, TruckId};
use fms_fleet::{Truck, TruckTask};
use fms_spatial::{DijkstraRouter, MineNetwork, MineNetworkBuilder};
use fms_station::{StationEvent, StationSpec};

use crate::{
    standard_builder, standard_mine, DispatchError, DispatchObserver, Dispatcher,
    DispatcherBuilder, ExternalPolicy, FleetStats, FleetView, GreedyPolicy, NoopObserver,
    TickSummary, TruckSpec,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

const T0: TruckId = TruckId(0);

fn quiet_config() -> SimConfig {
    SimConfig { log_interval_ticks: 0, ..SimConfig::default() }
}

/// ```text
/// parking ── pit ── crusher
///             │
///            dump          island (disconnected)
/// ```
fn pit_network() -> MineNetwork {
    let mut b = MineNetworkBuilder::new();
    let parking = b.add_node("parking", Point::new(0.0, 0.0)).unwrap();
    let pit = b.add_node("pit", Point::new(100.0, 0.0)).unwrap();
    let crusher = b.add_node("crusher", Point::new(200.0, 0.0)).unwrap();
    let dump = b.add_node("dump", Point::new(100.0, 100.0)).unwrap();
    b.add_node("island", Point::new(500.0, 500.0)).unwrap();
    b.add_road(parking, pit, 50.0, 30.0).unwrap();
    b.add_road(pit, crusher, 50.0, 30.0).unwrap();
    b.add_road(pit, dump, 50.0, 30.0).unwrap();
    b.build()
}

/// One 100 t truck at `parking`; a mineral shovel at `pit` (S0, 50 t
/// passes), crusher (S1), dump (S2), and a waste shovel on the island (S3).
fn pit_dispatcher(config: SimConfig, unloader_capacity: usize) -> Dispatcher<DijkstraRouter, ExternalPolicy> {
    DispatcherBuilder::new(config, pit_network())
        .policy(ExternalPolicy)
        .truck(TruckSpec::new(100.0, 1.0, "parking"))
        .station(StationSpec::shovel("pit", "pit", Material::Mineral, 50.0, 1.0))
        .station(StationSpec::crusher("crusher").with_capacity(unloader_capacity))
        .station(StationSpec::dump("dump").with_capacity(unloader_capacity))
        .station(StationSpec::shovel("far", "island", Material::Waste, 40.0, 1.0))
        .build()
        .unwrap()
}

/// Step until `done` holds, failing after `limit` ticks.
fn run_until<R, P>(d: &mut Dispatcher<R, P>, limit: u64, mut done: impl FnMut(&Dispatcher<R, P>) -> bool)
where
    R: fms_spatial::Router,
    P: crate::DispatchPolicy,
{
    for _ in 0..limit {
        if done(&*d) {
            return;
        }
        d.update();
    }
    assert!(done(&*d), "condition not reached within {limit} ticks");
}

fn load_at_pit(d: &mut Dispatcher<DijkstraRouter, ExternalPolicy>) {
    assert!(d.dispatch_to_station(T0, StationId(0)));
    run_until(d, 100, |d| d.trucks()[0].loaded);
}

fn external_standard() -> Dispatcher<DijkstraRouter, ExternalPolicy> {
    standard_builder(quiet_config()).unwrap().policy(ExternalPolicy).build().unwrap()
}

// ── Builder ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn standard_mine_builds() {
        let d = standard_mine(quiet_config()).unwrap();
        assert_eq!(d.trucks().len(), 6);
        assert_eq!(d.stations().len(), 8);
        assert_eq!(d.network().node_count(), 25);
        assert_eq!(d.network().segment_count(), 48);
        assert!(d.trucks().iter().all(|t| t.position == d.fallback_node() && t.is_available()));
        assert_eq!(d.station_named("crusher").map(|s| s.id), Some(StationId(6)));
        assert_eq!(d.tick(), Tick::ZERO);
    }

    #[test]
    fn unknown_fallback_errors() {
        let config = SimConfig { fallback_node: "garage".into(), ..quiet_config() };
        let err = DispatcherBuilder::new(config, pit_network()).build().err();
        assert!(matches!(err, Some(DispatchError::UnknownNode { what: "fallback", .. })));
    }

    #[test]
    fn invalid_config_errors() {
        let config = SimConfig { follow_distance: -5.0, ..quiet_config() };
        let err = DispatcherBuilder::new(config, pit_network()).build().err();
        assert!(matches!(
            err,
            Some(DispatchError::Core(FmsError::InvalidConfig { field: "follow_distance", .. }))
        ));
    }

    #[test]
    fn unknown_station_node_errors() {
        let err = DispatcherBuilder::new(quiet_config(), pit_network())
            .station(StationSpec::dump("nowhere"))
            .build()
            .err();
        assert!(matches!(err, Some(DispatchError::UnknownNode { what: "station", .. })));
    }

    #[test]
    fn invalid_truck_errors() {
        let err = DispatcherBuilder::new(quiet_config(), pit_network())
            .truck(TruckSpec::new(0.0, 0.8, "parking"))
            .build()
            .err();
        assert!(matches!(err, Some(DispatchError::Fleet(_))));
    }

    #[test]
    fn duplicate_station_name_errors() {
        let err = DispatcherBuilder::new(quiet_config(), pit_network())
            .station(StationSpec::dump("dump"))
            .station(StationSpec::dump("pit"))
            .build()
            .err();
        assert!(matches!(err, Some(DispatchError::Config(_))));
    }

    #[test]
    fn unreachable_station_only_warns() {
        let d = pit_dispatcher(quiet_config(), 2);
        assert_eq!(d.stations().len(), 4);
    }
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod scenarios {
    use super::*;

    #[test]
    fn two_pass_load_through_dispatcher() {
        let mut d = pit_dispatcher(quiet_config(), 2);
        assert!(d.dispatch_to_station(T0, StationId(0)));
        assert_eq!(d.trucks()[0].task(), TruckTask::MovingToShovel);
        assert_eq!(d.trucks()[0].destination, Some(StationId(0)));

        let mut finished = None;
        for _ in 0..40 {
            d.update();
            for e in d.events() {
                if let StationEvent::LoadFinished { tons, material, .. } = *e {
                    finished = Some((d.tick(), tons, material));
                }
            }
            if finished.is_some() {
                break;
            }
        }
        let (_, tons, material) = finished.expect("load never finished");
        assert_eq!(tons, 100.0);
        assert_eq!(material, Material::Mineral);
        let t = &d.trucks()[0];
        assert!(t.loaded && t.is_available());
        assert_eq!(t.current_load, 100.0);
        assert_eq!(d.totals().tons_loaded, 100.0);
    }

    #[test]
    fn strict_full_unloader_sends_truck_to_fallback() {
        let config = SimConfig { admission: AdmissionPolicy::Strict, ..quiet_config() };
        let mut d = pit_dispatcher(config, 0);
        load_at_pit(&mut d);

        // Capacity is not a command precondition.
        assert!(d.dispatch_to_station(T0, StationId(1)));
        run_until(&mut d, 100, |d| d.trucks()[0].task() != TruckTask::MovingToDump);

        let crusher = d.network().node_id("crusher").unwrap();
        let parking = d.network().node_id("parking").unwrap();
        let t = &d.trucks()[0];
        assert_eq!(t.task(), TruckTask::Returning);
        assert_eq!(t.position, crusher);
        assert_eq!(t.route_target(), Some(parking));
        assert_eq!(t.station, None);
        assert_eq!(t.destination, None);
        assert!(t.loaded);
        assert_eq!(d.stations()[1].queue_len(), 0);

        run_until(&mut d, 100, |d| d.trucks()[0].is_available());
        assert_eq!(d.trucks()[0].position, parking);
    }

    #[test]
    fn soft_admission_exceeds_capacity_on_arrival() {
        let mut d = pit_dispatcher(quiet_config(), 0);
        load_at_pit(&mut d);
        assert!(d.dispatch_to_station(T0, StationId(1)));
        run_until(&mut d, 100, |d| d.trucks()[0].task() != TruckTask::MovingToDump);
        assert_eq!(d.trucks()[0].task(), TruckTask::WaitingDump);
        assert_eq!(d.trucks()[0].station, Some(StationId(1)));
        assert_eq!(d.stations()[1].queue_len(), 1);

        run_until(&mut d, 20, |d| !d.trucks()[0].loaded);
        assert_eq!(d.totals().mineral_processed, 100.0);
    }

    /// Two trucks routed to a one-slot crusher in the same tick both see it
    /// open, arrive together on separate roads, and both join the queue.
    #[test]
    fn soft_admission_enqueues_both_trucks_routed_together() {
        let mut b = MineNetworkBuilder::new();
        let west = b.add_node("west", Point::new(0.0, 0.0)).unwrap();
        let hub = b.add_node("hub", Point::new(100.0, 0.0)).unwrap();
        let east = b.add_node("east", Point::new(200.0, 0.0)).unwrap();
        b.add_road(west, hub, 50.0, 25.0).unwrap();
        b.add_road(hub, east, 50.0, 25.0).unwrap();

        let config = SimConfig { fallback_node: "hub".into(), ..quiet_config() };
        let mut d = DispatcherBuilder::new(config, b.build())
            .policy(ExternalPolicy)
            .trucks([TruckSpec::new(100.0, 1.0, "hub"), TruckSpec::new(100.0, 1.0, "hub")])
            .station(StationSpec::shovel("west", "west", Material::Mineral, 50.0, 1.0))
            .station(StationSpec::shovel("east", "east", Material::Mineral, 50.0, 1.0))
            .station(StationSpec::crusher("hub").with_capacity(1))
            .build()
            .unwrap();

        assert!(d.dispatch_to_station(TruckId(0), StationId(0)));
        assert!(d.dispatch_to_station(TruckId(1), StationId(1)));
        run_until(&mut d, 200, |d| d.trucks().iter().all(|t| t.loaded && t.is_available()));

        let crusher = StationId(2);
        assert!(d.stations()[2].can_accept_truck());
        assert!(d.dispatch_to_station(TruckId(0), crusher));
        assert!(d.dispatch_to_station(TruckId(1), crusher));
        run_until(&mut d, 200, |d| d.trucks().iter().all(|t| t.station == Some(crusher)));

        let station = &d.stations()[2];
        assert_eq!(station.capacity, 1);
        assert_eq!(station.queue_len(), 2);
        assert!(!station.is_busy());
        assert!(d.trucks().iter().all(|t| t.task() == TruckTask::WaitingDump));
    }

    #[test]
    fn disconnected_station_is_refused_without_side_effects() {
        let mut d = pit_dispatcher(quiet_config(), 2);
        assert!(!d.dispatch_to_station(T0, StationId(3)));
        let t = &d.trucks()[0];
        assert_eq!(t.task(), TruckTask::WaitingAssignment);
        assert!(t.route().is_empty());
        assert_eq!(t.destination, None);

        let island = d.network().node_id("island").unwrap();
        assert_eq!(d.distance_between(t.position, island), None);
        assert_eq!(d.distance_between(t.position, t.position), Some(0.0));
    }

    #[test]
    fn misrouted_mineral_is_tracked() {
        let mut d = pit_dispatcher(quiet_config(), 2);
        load_at_pit(&mut d);
        assert!(d.dispatch_to_unload(T0, false));
        assert_eq!(d.wrong_unload_assignments(), vec![T0]);

        run_until(&mut d, 100, |d| !d.trucks()[0].loaded);
        assert!(d.wrong_unload_assignments().is_empty());
        assert_eq!(d.totals().mineral_misrouted, 100.0);
        assert_eq!(d.totals().mineral_processed, 0.0);
        assert_eq!(d.stations()[2].counters.wrong_material_tons, 100.0);
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod commands {
    use super::*;

    #[test]
    fn unknown_ids_refused() {
        let mut d = external_standard();
        assert!(!d.dispatch_to_station(TruckId(99), StationId(0)));
        assert!(!d.dispatch_to_station(T0, StationId(99)));
        assert!(d.trucks()[0].is_available());
    }

    #[test]
    fn load_state_must_match_station() {
        let mut d = external_standard();
        assert!(!d.dispatch_to_station(T0, StationId(6)));
        assert!(!d.dispatch_to_unload(T0, true));
        assert!(!d.dispatch_to_unload(T0, false));
        assert_eq!(d.trucks()[0].task(), TruckTask::WaitingAssignment);
    }

    #[test]
    fn moving_truck_can_be_rerouted() {
        let mut d = external_standard();
        let c1 = d.network().node_id("c1").unwrap();
        let c5 = d.network().node_id("c5").unwrap();

        assert!(d.dispatch_to_station(T0, StationId(0)));
        assert_eq!(d.trucks()[0].route_target(), Some(c1));
        d.update();
        assert!(d.trucks()[0].leg().is_some());

        assert!(d.dispatch_to_station(T0, StationId(4)));
        let t = &d.trucks()[0];
        assert_eq!(t.task(), TruckTask::MovingToShovel);
        assert_eq!(t.destination, Some(StationId(4)));
        assert_eq!(t.route_target(), Some(c5));
        assert!(t.leg().is_none());
    }

    #[test]
    fn station_bound_truck_refused() {
        let mut d = external_standard();
        assert!(d.dispatch_to_station(T0, StationId(0)));
        run_until(&mut d, 200, |d| d.trucks()[0].task() == TruckTask::Loading);
        let before = d.trucks()[0].route().clone();
        assert!(!d.dispatch_to_station(T0, StationId(1)));
        assert_eq!(d.trucks()[0].task(), TruckTask::Loading);
        assert_eq!(d.trucks()[0].route(), &before);
    }

    #[test]
    fn available_dispatches_pairs_idle_trucks_with_open_shovels() {
        let d = external_standard();
        let pairs = d.available_dispatches();
        assert_eq!(pairs.len(), 6 * 6);
        assert!(pairs.iter().all(|&(_, s)| d.station(s).is_some_and(|s| s.kind.is_loader())));
    }

    #[test]
    fn external_policy_never_moves_trucks() {
        let mut d = external_standard();
        d.run_ticks(50, &mut NoopObserver);
        assert!(d.trucks().iter().all(|t| t.is_available() && t.position == d.fallback_node()));
    }
}

// ── Policy ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod policy {
    use super::*;
    use crate::{DispatchPolicy, ProductionTotals};

    fn loaded_truck(material: Material) -> Truck {
        let mut t = Truck::new(T0, 200.0, 0.8, NodeId(0), Point::default()).unwrap();
        t.loaded = true;
        t.current_load = 180.0;
        t.material = Some(material);
        t
    }

    #[test]
    fn empty_trucks_start_at_first_shortest_queue() {
        let mut d = standard_mine(quiet_config()).unwrap();
        d.update();
        assert!(d.trucks().iter().all(|t| t.destination == Some(StationId(0))));
        assert!(d.trucks().iter().all(|t| t.task() == TruckTask::MovingToShovel));
    }

    #[test]
    fn mineral_preferred_while_lagging_waste() {
        let d = standard_mine(quiet_config()).unwrap();
        let totals = ProductionTotals { waste_dumped: 100.0, ..ProductionTotals::default() };
        let view = FleetView { totals: &totals, ..d.view() };
        assert_eq!(GreedyPolicy.assign(&d.trucks()[0], &view), Some(StationId(4)));
    }

    #[test]
    fn full_shovels_are_skipped() {
        let d = standard_mine(quiet_config()).unwrap();
        let mut stations = d.stations().to_vec();
        stations[0].capacity = 0;
        let view = FleetView { stations: &stations, ..d.view() };
        assert_eq!(GreedyPolicy.assign(&d.trucks()[0], &view), Some(StationId(1)));

        for s in stations.iter_mut().filter(|s| s.kind.is_loader()) {
            s.capacity = 0;
        }
        let view = FleetView { stations: &stations, ..d.view() };
        assert_eq!(GreedyPolicy.assign(&d.trucks()[0], &view), None);
    }

    #[test]
    fn loaded_trucks_go_to_matching_unloader() {
        let d = standard_mine(quiet_config()).unwrap();
        let view = d.view();
        assert_eq!(GreedyPolicy.assign(&loaded_truck(Material::Mineral), &view), Some(StationId(6)));
        assert_eq!(GreedyPolicy.assign(&loaded_truck(Material::Waste), &view), Some(StationId(7)));
    }

    #[test]
    fn mineral_overflows_to_dump_when_crusher_full() {
        let d = standard_mine(quiet_config()).unwrap();
        let mut stations = d.stations().to_vec();
        stations[6].capacity = 0;
        let view = FleetView { stations: &stations, ..d.view() };
        assert_eq!(GreedyPolicy.assign(&loaded_truck(Material::Mineral), &view), Some(StationId(7)));

        stations[7].capacity = 0;
        let view = FleetView { stations: &stations, ..d.view() };
        assert_eq!(GreedyPolicy.assign(&loaded_truck(Material::Mineral), &view), None);
    }

    #[test]
    fn external_policy_assigns_nothing() {
        let d = standard_mine(quiet_config()).unwrap();
        assert_eq!(ExternalPolicy.assign(&d.trucks()[0], &d.view()), None);
    }
}

// ── Invariants over full runs ─────────────────────────────────────────────────

#[cfg(test)]
mod invariants {
    use super::*;

    fn reachable_within_two(prev: TruckTask, next: TruckTask) -> bool {
        prev == next
            || prev.can_transition_to(next)
            || TruckTask::ALL.iter().any(|&m| prev.can_transition_to(m) && m.can_transition_to(next))
    }

    #[test]
    fn standard_mine_produces_both_materials() {
        let mut d = standard_mine(quiet_config()).unwrap();
        d.run_ticks(3_000, &mut NoopObserver);
        assert!(d.totals().mineral_processed > 0.0);
        assert!(d.totals().waste_dumped > 0.0);
        assert_eq!(d.tick(), Tick(3_000));
    }

    #[test]
    fn membership_and_task_consistency() {
        let mut d = standard_mine(quiet_config()).unwrap();
        let mut prev: Vec<TruckTask> = d.trucks().iter().map(Truck::task).collect();
        for _ in 0..1_500 {
            d.update();
            for (t, &p) in d.trucks().iter().zip(&prev) {
                assert!(reachable_within_two(p, t.task()), "{}: {p} → {}", t.id, t.task());
                assert!(t.current_load <= t.capacity);
                if let Some(s) = t.station {
                    assert!(d.stations()[s.index()].holds(t.id));
                    assert!(t.task().is_station_bound());
                }
            }
            for s in d.stations() {
                for &id in s.queue() {
                    let t = &d.trucks()[id.index()];
                    assert_eq!(t.station, Some(s.id));
                    let expected = if s.kind.is_loader() { TruckTask::WaitingShovel } else { TruckTask::WaitingDump };
                    assert_eq!(t.task(), expected);
                }
                if let Some(svc) = s.in_service() {
                    assert!(!s.queue().contains(&svc.truck));
                    let t = &d.trucks()[svc.truck.index()];
                    assert!(matches!(t.task(), TruckTask::Loading | TruckTask::Dumping));
                }
            }
            prev = d.trucks().iter().map(Truck::task).collect();
        }
    }

    #[test]
    fn strict_admission_bounds_queues() {
        let config = SimConfig { admission: AdmissionPolicy::Strict, ..quiet_config() };
        let mut d = standard_mine(config).unwrap();
        for _ in 0..1_500 {
            d.update();
            for s in d.stations() {
                assert!(s.queue_len() <= s.capacity, "{} queue {} > {}", s.name, s.queue_len(), s.capacity);
            }
        }
    }

    #[test]
    fn mass_is_conserved() {
        let mut d = standard_mine(quiet_config()).unwrap();
        let mut last = d.totals().delivered();
        for _ in 0..2_000 {
            d.update();
            let totals = d.totals();
            assert!(totals.delivered() >= last);
            last = totals.delivered();
            let in_transit: f64 = d.trucks().iter().filter(|t| t.loaded).map(|t| t.current_load).sum();
            assert!((totals.tons_loaded - totals.delivered() - in_transit).abs() < 1e-6);
        }
    }

    #[test]
    fn same_seed_same_run() {
        let run = || {
            let mut d = standard_mine(quiet_config()).unwrap();
            d.run_ticks(800, &mut NoopObserver);
            d.observation()
        };
        assert_eq!(run(), run());
    }
}

// ── Observation ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod observation {
    use super::*;
    use crate::TRUCK_OBSERVATION_LEN;

    #[test]
    fn fleet_layout_lengths() {
        let mut d = standard_mine(quiet_config()).unwrap();
        let layout = d.observation_layout();
        assert_eq!(layout.len(), 5 + (4 + 2 * 6) + 2 * 6 + 3);
        assert_eq!(layout.equipment(), 5..21);
        assert_eq!(layout.trucks(), 21..33);

        d.update();
        let obs = d.observation();
        assert_eq!(obs.len(), layout.len());
        assert_eq!(obs[0], 1.0);
        // Every truck is moving to a shovel after the first tick.
        assert_eq!(obs[layout.trucks().start], TruckTask::MovingToShovel.code());
        assert_eq!(obs[layout.aggregates().start + 1], 6.0);
    }

    #[test]
    fn observation_is_pure() {
        let mut d = standard_mine(quiet_config()).unwrap();
        d.run_ticks(200, &mut NoopObserver);
        let tick = d.tick();
        assert_eq!(d.observation(), d.observation());
        assert_eq!(d.truck_observation(T0), d.truck_observation(T0));
        assert_eq!(d.tick(), tick);
    }

    #[test]
    fn truck_observation_features() {
        let d = standard_mine(quiet_config()).unwrap();
        let obs = d.truck_observation(T0).unwrap();
        assert_eq!(obs.len(), TRUCK_OBSERVATION_LEN);
        assert_eq!((obs[0], obs[1]), (91.0, 926.0));
        assert_eq!(obs[2], 0.0);
        assert_eq!(obs[4], TruckTask::WaitingAssignment.code());
        assert!(obs[6] > 0.0 && obs[7] > 0.0 && obs[8] > 0.0);
        // Five other trucks parked at the same node.
        assert_eq!(obs[13], 5.0);
        assert_eq!(obs[21], 6.0);
        assert_eq!(d.truck_observation(TruckId(42)), None);
    }

    #[test]
    fn unreachable_distances_are_flagged() {
        let d = pit_dispatcher(quiet_config(), 2);
        let obs = d.truck_observation(T0).unwrap();
        // Nearest shovel is the reachable one at `pit`.
        assert_eq!(obs[6], 100.0);
        assert_eq!(obs[7], 200.0);
    }
}

// ── Observer / batch ──────────────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        starts:     u64,
        ends:       u64,
        snapshots:  u64,
        last_end:   Option<Tick>,
        final_tick: Option<Tick>,
    }

    impl DispatchObserver for Counter {
        fn on_tick_start(&mut self, _tick: Tick) {
            self.starts += 1;
        }
        fn on_tick_end(&mut self, tick: Tick, summary: &TickSummary) {
            assert_eq!(summary.tick, tick);
            self.ends += 1;
            self.last_end = Some(tick);
        }
        fn on_snapshot(&mut self, _tick: Tick, _n: &MineNetwork, trucks: &[Truck], _s: &[fms_station::Station]) {
            assert_eq!(trucks.len(), 6);
            self.snapshots += 1;
        }
        fn on_run_end(&mut self, final_tick: Tick, stats: &FleetStats) {
            assert_eq!(stats.tick, final_tick);
            self.final_tick = Some(final_tick);
        }
    }

    #[test]
    fn run_calls_hooks() {
        let config = SimConfig { total_ticks: 50, output_interval_ticks: 10, ..quiet_config() };
        let mut d = standard_mine(config).unwrap();
        let mut obs = Counter::default();
        d.run(&mut obs);
        assert_eq!((obs.starts, obs.ends, obs.snapshots), (50, 50, 5));
        assert_eq!(obs.last_end, Some(Tick(50)));
        assert_eq!(obs.final_tick, Some(Tick(50)));
    }

    #[test]
    fn run_independent_returns_stats_in_order() {
        let mut batch: Vec<Dispatcher> = [1, 2, 3]
            .into_iter()
            .map(|seed| standard_mine(SimConfig { seed, ..quiet_config() }).unwrap())
            .collect();
        let stats = crate::run_independent(&mut batch, 100);
        assert_eq!(stats.len(), 3);
        assert!(stats.iter().all(|s| s.tick == Tick(100) && s.trucks.len() == 6));
        assert_eq!(stats[1], batch[1].stats());
    }

    #[test]
    fn stats_snapshot() {
        let mut d = standard_mine(quiet_config()).unwrap();
        d.update();
        let stats = d.stats();
        assert_eq!(stats.task_counts()[TruckTask::MovingToShovel as usize], 6);
        assert_eq!(stats.queue_lengths(), vec![0; 8]);
        assert_eq!(stats.trucks[0].node_name, "parking");
        assert_eq!(stats.stations[6].kind, "crusher");
    }
}
