//! Unit tests for fms-fleet.

use fms_core::{Material, NodeId, Point, TruckId};
use fms_spatial::{DijkstraRouter, MineNetwork, MineNetworkBuilder, Router};

use crate::{MoveOutcome, MovementEngine, Truck, TruckTask};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// `A — B`, distance 100, empty speed 50, loaded speed 25.
fn two_node_network() -> MineNetwork {
    let mut b = MineNetworkBuilder::new();
    let a = b.add_node("A", Point::new(0.0, 0.0)).unwrap();
    let c = b.add_node("B", Point::new(100.0, 0.0)).unwrap();
    b.add_road(a, c, 50.0, 25.0).unwrap();
    b.build()
}

/// `A — B — C` in a line, 1000 units per segment, speed 10 both ways, plus
/// an isolated node `Z`.
fn long_network() -> MineNetwork {
    let mut b = MineNetworkBuilder::new();
    let a = b.add_node("A", Point::new(0.0, 0.0)).unwrap();
    let m = b.add_node("B", Point::new(1000.0, 0.0)).unwrap();
    let c = b.add_node("C", Point::new(2000.0, 0.0)).unwrap();
    b.add_node("Z", Point::new(0.0, 5000.0)).unwrap();
    b.add_road(a, m, 10.0, 10.0).unwrap();
    b.add_road(m, c, 10.0, 10.0).unwrap();
    b.build()
}

fn truck(id: u32, efficiency: f64, net: &MineNetwork, at: &str) -> Truck {
    let node = net.node_id(at).unwrap();
    Truck::new(TruckId(id), 100.0, efficiency, node, net.node_pos(node)).unwrap()
}

fn send(t: &mut Truck, net: &MineNetwork, to: &str, task: TruckTask) {
    let route = DijkstraRouter.shortest_path_by_name(net, net.node_name(t.position), to);
    assert!(t.assign_route(&route.nodes));
    t.set_task(task).unwrap();
}

// ── State machine ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod state_machine {
    use super::*;

    #[test]
    fn full_cycle_is_legal() {
        use TruckTask::*;
        let cycle = [
            WaitingAssignment, MovingToShovel, WaitingShovel, Loading,
            WaitingAssignment, MovingToDump, WaitingDump, Dumping, WaitingAssignment,
        ];
        for w in cycle.windows(2) {
            assert!(w[0].can_transition_to(w[1]), "{} -> {}", w[0], w[1]);
        }
    }

    #[test]
    fn returning_edges() {
        use TruckTask::*;
        for from in [WaitingAssignment, MovingToShovel, WaitingShovel, MovingToDump, WaitingDump, Returning] {
            assert!(from.can_transition_to(Returning), "{from} -> returning");
        }
        assert!(!Loading.can_transition_to(Returning));
        assert!(!Dumping.can_transition_to(Returning));
        assert!(Returning.can_transition_to(WaitingAssignment));
    }

    #[test]
    fn illegal_edges_rejected() {
        use TruckTask::*;
        assert!(!WaitingAssignment.can_transition_to(Loading));
        assert!(!MovingToShovel.can_transition_to(MovingToDump));
        assert!(!Loading.can_transition_to(Dumping));
        assert!(!WaitingShovel.can_transition_to(WaitingAssignment));
        assert!(!Dumping.can_transition_to(Dumping));
    }

    #[test]
    fn set_task_refuses_and_leaves_state() {
        let net = two_node_network();
        let mut t = truck(0, 1.0, &net, "A");
        assert!(t.set_task(TruckTask::Dumping).is_err());
        assert_eq!(t.task(), TruckTask::WaitingAssignment);
        assert_eq!(t.set_task(TruckTask::MovingToDump).unwrap(), TruckTask::WaitingAssignment);
    }

    #[test]
    fn codes_follow_declaration_order() {
        for (i, task) in TruckTask::ALL.iter().enumerate() {
            assert_eq!(task.code(), i as f64);
        }
        assert!(TruckTask::Returning.is_moving());
        assert!(TruckTask::Loading.is_station_bound());
        assert!(!TruckTask::WaitingAssignment.is_station_bound());
    }

    #[test]
    fn rejects_invalid_truck() {
        assert!(Truck::new(TruckId(0), 0.0, 1.0, NodeId(0), Point::default()).is_err());
        assert!(Truck::new(TruckId(0), 100.0, -0.1, NodeId(0), Point::default()).is_err());
    }
}

// ── Load / dump callbacks ─────────────────────────────────────────────────────

#[cfg(test)]
mod callbacks {
    use super::*;

    fn at_shovel(eff: f64) -> Truck {
        let net = two_node_network();
        let mut t = truck(0, eff, &net, "A");
        send(&mut t, &net, "B", TruckTask::MovingToShovel);
        t.arrive().unwrap();
        t
    }

    #[test]
    fn start_loading_scales_by_efficiency() {
        let mut t = at_shovel(0.8);
        t.start_loading(Material::Mineral, 50.0).unwrap();
        assert_eq!(t.task(), TruckTask::Loading);
        assert_eq!(t.current_load, 40.0);
        assert_eq!(t.material, Some(Material::Mineral));
        assert!(!t.loaded);
    }

    #[test]
    fn start_loading_caps_at_capacity() {
        let mut t = at_shovel(1.0);
        t.start_loading(Material::Waste, 500.0).unwrap();
        assert_eq!(t.current_load, 100.0);
    }

    #[test]
    fn add_pass_caps_and_reports() {
        let mut t = at_shovel(1.0);
        t.start_loading(Material::Waste, 70.0).unwrap();
        assert_eq!(t.add_pass(50.0), 30.0);
        assert_eq!(t.current_load, 100.0);
        assert_eq!(t.add_pass(10.0), 0.0);
    }

    #[test]
    fn dump_cycle_clears_load() {
        let net = two_node_network();
        let mut t = at_shovel(1.0);
        t.start_loading(Material::Mineral, 100.0).unwrap();
        t.finish_loading().unwrap();
        assert!(t.loaded && t.is_available());

        send(&mut t, &net, "B", TruckTask::MovingToDump);
        t.arrive().unwrap();
        assert_eq!(t.task(), TruckTask::WaitingDump);
        t.start_dumping().unwrap();
        let (tons, material) = t.finish_dumping().unwrap();
        assert_eq!((tons, material), (100.0, Some(Material::Mineral)));
        assert!(!t.loaded);
        assert_eq!(t.current_load, 0.0);
        assert_eq!(t.material, None);
        assert!(t.is_available());
    }

    #[test]
    fn loading_out_of_order_is_refused() {
        let net = two_node_network();
        let mut t = truck(0, 1.0, &net, "A");
        assert!(t.start_loading(Material::Waste, 10.0).is_err());
        assert_eq!(t.current_load, 0.0);
        assert!(t.arrive().is_err());
    }
}

// ── Routes ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod routes {
    use super::*;

    #[test]
    fn single_node_route_is_noop() {
        let net = long_network();
        let mut t = truck(0, 0.7, &net, "A");
        send(&mut t, &net, "C", TruckTask::MovingToShovel);
        let before = t.route().clone();
        assert!(!t.assign_route(&[t.position]));
        assert!(!t.assign_route(&[]));
        assert_eq!(t.route(), &before);
    }

    #[test]
    fn reroute_discards_leg_progress() {
        let net = long_network();
        let engine = MovementEngine::new(20.0);
        let mut fleet = vec![truck(0, 0.7, &net, "A")];
        send(&mut fleet[0], &net, "C", TruckTask::MovingToShovel);
        for _ in 0..10 {
            engine.step(&mut fleet, &net);
        }
        assert!(fleet[0].leg().unwrap().progress > 0.0);

        let a = net.node_id("A").unwrap();
        let b = net.node_id("B").unwrap();
        assert!(fleet[0].assign_route(&[a, b]));
        assert!(fleet[0].leg().is_none());
        assert_eq!(fleet[0].position, a);

        engine.step(&mut fleet, &net);
        assert!((fleet[0].leg().unwrap().progress - 0.01).abs() < 1e-12);
    }
}

// ── Movement ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod movement {
    use super::*;

    #[test]
    fn crosses_in_nominal_ticks() {
        // 100 / 50 / (1.0 + 0.3) = 1.54 ticks → arrives on the second tick.
        let net = two_node_network();
        let engine = MovementEngine::new(20.0);
        let mut fleet = vec![truck(0, 1.0, &net, "A")];
        send(&mut fleet[0], &net, "B", TruckTask::MovingToShovel);

        let out = engine.step(&mut fleet, &net);
        assert_eq!(out[0], MoveOutcome::Advanced);
        assert!((fleet[0].xy.x - 65.0).abs() < 1e-9);
        assert!((fleet[0].speed - 65.0).abs() < 1e-9);

        let out = engine.step(&mut fleet, &net);
        assert_eq!(out[0], MoveOutcome::Arrived(TruckTask::MovingToShovel));
        assert_eq!(fleet[0].task(), TruckTask::WaitingShovel);
        assert_eq!(fleet[0].position, net.node_id("B").unwrap());
        assert_eq!(fleet[0].xy, Point::new(100.0, 0.0));
        assert!(fleet[0].route().is_empty());
    }

    #[test]
    fn loaded_trucks_are_slower() {
        let net = two_node_network();
        let engine = MovementEngine::new(0.0);
        let mut fleet = vec![truck(0, 1.0, &net, "A"), truck(1, 1.0, &net, "A")];
        fleet[1].loaded = true;
        send(&mut fleet[0], &net, "B", TruckTask::MovingToShovel);
        send(&mut fleet[1], &net, "B", TruckTask::MovingToDump);
        engine.step(&mut fleet, &net);
        assert!(fleet[1].leg().unwrap().total_ticks > fleet[0].leg().unwrap().total_ticks);
    }

    #[test]
    fn waypoint_then_next_leg_next_tick() {
        let net = long_network();
        let engine = MovementEngine::new(0.0);
        let mut fleet = vec![truck(0, 0.7, &net, "A")];
        send(&mut fleet[0], &net, "C", TruckTask::Returning);

        // 1000 / 10 / 1.0 = 100 ticks per segment.
        let mut hit_waypoint = None;
        for tick in 1..=100 {
            if let MoveOutcome::Waypoint(n) = engine.step(&mut fleet, &net)[0] {
                hit_waypoint = Some((tick, n));
            }
        }
        assert_eq!(hit_waypoint, Some((100, net.node_id("B").unwrap())));
        assert!(fleet[0].leg().is_none());

        let out = engine.step(&mut fleet, &net);
        assert_eq!(out[0], MoveOutcome::Advanced);
        assert_eq!(fleet[0].leg().unwrap().from, net.node_id("B").unwrap());
    }

    #[test]
    fn stationary_states_do_not_move() {
        let net = two_node_network();
        let engine = MovementEngine::new(20.0);
        let mut fleet = vec![truck(0, 1.0, &net, "A")];
        let out = engine.step(&mut fleet, &net);
        assert_eq!(out[0], MoveOutcome::Idle);
        assert_eq!(fleet[0].speed, 0.0);
    }

    #[test]
    fn missing_segment_strands() {
        let net = long_network();
        let engine = MovementEngine::new(20.0);
        let mut fleet = vec![truck(0, 0.7, &net, "A")];
        let a = net.node_id("A").unwrap();
        let z = net.node_id("Z").unwrap();
        assert!(fleet[0].assign_route(&[a, z]));
        fleet[0].set_task(TruckTask::MovingToShovel).unwrap();

        let out = engine.step(&mut fleet, &net);
        assert_eq!(out[0], MoveOutcome::Stranded { at: a, next: z });
        assert!(fleet[0].route().is_empty());
        assert_eq!(fleet[0].task(), TruckTask::MovingToShovel);
    }
}

// ── Traffic ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod traffic {
    use super::*;
    use crate::traffic::{follow_cap, progress_caps, segment_peers, throttle_progress};

    #[test]
    fn throttle_never_moves_backwards() {
        assert_eq!(throttle_progress(0.5, 0.1, Some(0.3)), 0.5);
        assert_eq!(throttle_progress(0.1, 0.1, Some(0.15)), 0.15);
        assert_eq!(throttle_progress(0.95, 0.1, None), 1.0);
        assert_eq!(follow_cap(0.5, 20.0, 100.0), 0.3);
    }

    #[test]
    fn follower_keeps_gap_to_leader() {
        let net = long_network();
        let engine = MovementEngine::new(20.0);
        let mut fleet = vec![truck(0, 0.7, &net, "A"), truck(1, 0.7, &net, "A")];
        send(&mut fleet[0], &net, "B", TruckTask::MovingToShovel);
        send(&mut fleet[1], &net, "B", TruckTask::MovingToShovel);

        let gap = 20.0 / 1000.0;
        for _ in 0..60 {
            let lead_before = fleet[0].leg().map_or(0.0, |l| l.progress);
            let trail_before = fleet[1].leg().map_or(0.0, |l| l.progress);
            engine.step(&mut fleet, &net);
            let trail_after = fleet[1].leg().unwrap().progress;
            assert!(trail_after >= trail_before);
            if trail_after > trail_before {
                assert!(trail_after <= lead_before - gap + 1e-12);
            }
        }
        // Index breaks the initial tie: truck 0 leads.
        assert!(fleet[0].leg().unwrap().progress > fleet[1].leg().unwrap().progress);
        assert_eq!(segment_peers(&fleet, 0), 1);
    }

    #[test]
    fn held_truck_reports_zero_speed() {
        let net = long_network();
        let engine = MovementEngine::new(20.0);
        let mut fleet = vec![truck(0, 0.7, &net, "A"), truck(1, 0.7, &net, "A")];
        send(&mut fleet[0], &net, "B", TruckTask::MovingToShovel);
        send(&mut fleet[1], &net, "B", TruckTask::MovingToShovel);
        engine.step(&mut fleet, &net);
        assert!(fleet[0].speed > 0.0);
        assert_eq!(fleet[1].speed, 0.0);
    }

    #[test]
    fn caps_only_apply_to_followers() {
        let net = long_network();
        let engine = MovementEngine::new(20.0);
        let mut fleet = vec![truck(0, 0.7, &net, "A"), truck(1, 0.7, &net, "B")];
        send(&mut fleet[0], &net, "B", TruckTask::MovingToShovel);
        send(&mut fleet[1], &net, "C", TruckTask::MovingToShovel);
        engine.step(&mut fleet, &net);
        assert_eq!(progress_caps(&fleet, &net, 20.0), vec![None, None]);
        assert_eq!(segment_peers(&fleet, 0), 0);
    }
}
