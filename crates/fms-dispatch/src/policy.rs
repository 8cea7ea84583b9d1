//! Assignment heuristics for idle trucks.
//!
//! A [`DispatchPolicy`] sees an immutable [`FleetView`] and picks the next
//! station for one `WaitingAssignment` truck.  It never mutates anything;
//! the dispatcher routes the truck and rejects choices that have no route.

use fms_core::{Material, StationId, Tick};
use fms_fleet::Truck;
use fms_spatial::MineNetwork;
use fms_station::{Station, StationKind};

use crate::stats::ProductionTotals;

// ── FleetView ─────────────────────────────────────────────────────────────────

/// Read-only snapshot handed to policies.
#[derive(Copy, Clone)]
pub struct FleetView<'a> {
    pub tick:     Tick,
    pub network:  &'a MineNetwork,
    pub trucks:   &'a [Truck],
    pub stations: &'a [Station],
    pub totals:   &'a ProductionTotals,
}

impl<'a> FleetView<'a> {
    pub fn shovels(&self) -> impl Iterator<Item = &'a Station> + 'a {
        self.stations.iter().filter(|s| s.kind.is_loader())
    }

    /// Shovels digging `material`.
    pub fn shovels_of(&self, material: Material) -> impl Iterator<Item = &'a Station> + 'a {
        self.shovels().filter(move |s| s.kind.material() == material)
    }

    /// First crusher, if any.
    pub fn crusher(&self) -> Option<&'a Station> {
        self.stations.iter().find(|s| matches!(s.kind, StationKind::Crusher))
    }

    /// First dump, if any.
    pub fn dump(&self) -> Option<&'a Station> {
        self.stations.iter().find(|s| matches!(s.kind, StationKind::Dump))
    }
}

// ── DispatchPolicy ────────────────────────────────────────────────────────────

/// Chooses a station for an idle truck.
///
/// # Thread safety
///
/// `Send + Sync` so dispatchers carrying a policy can be moved onto Rayon
/// worker threads.
pub trait DispatchPolicy: Send + Sync + 'static {
    /// Station for `truck` to head to, or `None` to leave it waiting.
    ///
    /// Called once per tick for every truck in `WaitingAssignment`, in fleet
    /// order.
    fn assign(&self, truck: &Truck, view: &FleetView<'_>) -> Option<StationId>;
}

/// Queue-length heuristic with mineral/waste balancing.
///
/// * Empty trucks go to the shortest accepting shovel queue.  Mineral shovels
///   are preferred while mineral processed lags waste dumped (or when no
///   waste shovel can accept).
/// * Loaded trucks carrying mineral go to the crusher, falling back to the
///   dump when the crusher is full; waste goes to the dump.
///
/// Ties on queue length go to the station listed first.
#[derive(Copy, Clone, Debug, Default)]
pub struct GreedyPolicy;

impl DispatchPolicy for GreedyPolicy {
    fn assign(&self, truck: &Truck, view: &FleetView<'_>) -> Option<StationId> {
        if truck.loaded {
            return assign_unloader(truck, view);
        }

        let accepting = |m: Material| view.shovels_of(m).filter(|s| s.can_accept_truck());
        let mineral_open = accepting(Material::Mineral).next().is_some();
        let waste_open = accepting(Material::Waste).next().is_some();

        let prefer_mineral = mineral_open
            && (!waste_open || view.totals.mineral_processed < view.totals.waste_dumped);

        let best = if prefer_mineral {
            accepting(Material::Mineral).min_by_key(|s| s.queue_len())
        } else {
            view.shovels()
                .filter(|s| s.can_accept_truck())
                .min_by_key(|s| s.queue_len())
        };
        best.map(|s| s.id)
    }
}

fn assign_unloader(truck: &Truck, view: &FleetView<'_>) -> Option<StationId> {
    let open = |s: Option<&Station>| s.filter(|s| s.can_accept_truck()).map(|s| s.id);
    match truck.material {
        Some(Material::Mineral) => open(view.crusher()).or_else(|| open(view.dump())),
        Some(Material::Waste) | None => open(view.dump()),
    }
}

/// Never assigns anything.  Trucks move only on explicit commands
/// (`dispatch_to_station`, `dispatch_to_unload`).
#[derive(Copy, Clone, Debug, Default)]
pub struct ExternalPolicy;

impl DispatchPolicy for ExternalPolicy {
    fn assign(&self, _truck: &Truck, _view: &FleetView<'_>) -> Option<StationId> {
        None
    }
}
