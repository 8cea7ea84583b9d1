//! Fluent builder for constructing a [`Dispatcher`].

use log::warn;
use rustc_hash::FxHashSet;

use fms_core::{SimConfig, StationId, TruckId};
use fms_fleet::Truck;
use fms_spatial::{DijkstraRouter, MineNetwork, Router};
use fms_station::{Station, StationSpec};

use crate::policy::{DispatchPolicy, GreedyPolicy};
use crate::{DispatchError, DispatchResult, Dispatcher};

/// A truck to be parked at the node named `start`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TruckSpec {
    /// Payload in tons.
    pub capacity:   f64,
    pub efficiency: f64,
    pub start:      String,
}

impl TruckSpec {
    pub fn new(capacity: f64, efficiency: f64, start: impl Into<String>) -> Self {
        Self { capacity, efficiency, start: start.into() }
    }
}

/// Fluent builder for [`Dispatcher<R, P>`].
///
/// # Required inputs
///
/// - [`SimConfig`] — seed, run length, fallback node name, admission policy, …
/// - [`MineNetwork`] — the road graph every node name is resolved against
///
/// # Optional inputs (have defaults)
///
/// | Method            | Default           |
/// |-------------------|-------------------|
/// | `.router(r)`      | `DijkstraRouter`  |
/// | `.policy(p)`      | `GreedyPolicy`    |
/// | `.truck(s)`       | no trucks         |
/// | `.station(s)`     | no stations       |
///
/// Trucks and stations get ids in insertion order.
///
/// # Example
///
/// ```rust,ignore
/// let mut dispatcher = DispatcherBuilder::new(config, network)
///     .trucks(std::iter::repeat_n(TruckSpec::new(200.0, 0.85, "parking"), 6))
///     .station(StationSpec::shovel("c1", "c1", Material::Waste, 35.0, 0.7))
///     .station(StationSpec::crusher("crusher"))
///     .build()?;
/// dispatcher.run(&mut NoopObserver);
/// ```
pub struct DispatcherBuilder<R: Router = DijkstraRouter, P: DispatchPolicy = GreedyPolicy> {
    config:   SimConfig,
    network:  MineNetwork,
    router:   R,
    policy:   P,
    trucks:   Vec<TruckSpec>,
    stations: Vec<StationSpec>,
}

impl DispatcherBuilder {
    pub fn new(config: SimConfig, network: MineNetwork) -> Self {
        Self {
            config,
            network,
            router:   DijkstraRouter,
            policy:   GreedyPolicy,
            trucks:   Vec::new(),
            stations: Vec::new(),
        }
    }
}

impl<R: Router, P: DispatchPolicy> DispatcherBuilder<R, P> {
    /// Replace the routing engine.
    pub fn router<R2: Router>(self, router: R2) -> DispatcherBuilder<R2, P> {
        DispatcherBuilder {
            config:   self.config,
            network:  self.network,
            router,
            policy:   self.policy,
            trucks:   self.trucks,
            stations: self.stations,
        }
    }

    /// Replace the assignment heuristic.
    pub fn policy<P2: DispatchPolicy>(self, policy: P2) -> DispatcherBuilder<R, P2> {
        DispatcherBuilder {
            config:   self.config,
            network:  self.network,
            router:   self.router,
            policy,
            trucks:   self.trucks,
            stations: self.stations,
        }
    }

    pub fn truck(mut self, spec: TruckSpec) -> Self {
        self.trucks.push(spec);
        self
    }

    pub fn trucks(mut self, specs: impl IntoIterator<Item = TruckSpec>) -> Self {
        self.trucks.extend(specs);
        self
    }

    pub fn station(mut self, spec: StationSpec) -> Self {
        self.stations.push(spec);
        self
    }

    pub fn stations(mut self, specs: impl IntoIterator<Item = StationSpec>) -> Self {
        self.stations.extend(specs);
        self
    }

    /// Resolve node names, validate every spec, and return a ready-to-run
    /// [`Dispatcher`].
    ///
    /// Unreachable loaders or unloaders are reported with `warn!` but do not
    /// fail the build.
    pub fn build(self) -> DispatchResult<Dispatcher<R, P>> {
        let network = self.network;
        let resolve = |what: &'static str, name: &str| {
            network
                .node_id(name)
                .ok_or_else(|| DispatchError::UnknownNode { what, name: name.to_owned() })
        };

        self.config.validate()?;
        let fallback = resolve("fallback", &self.config.fallback_node)?;

        // ── Trucks ────────────────────────────────────────────────────────
        let mut trucks = Vec::with_capacity(self.trucks.len());
        for (i, spec) in self.trucks.iter().enumerate() {
            let start = resolve("truck start", &spec.start)?;
            trucks.push(Truck::new(
                TruckId(i as u32),
                spec.capacity,
                spec.efficiency,
                start,
                network.node_pos(start),
            )?);
        }

        // ── Stations ──────────────────────────────────────────────────────
        let mut stations: Vec<Station> = Vec::with_capacity(self.stations.len());
        let mut names = FxHashSet::default();
        for (i, spec) in self.stations.into_iter().enumerate() {
            if !names.insert(spec.name.clone()) {
                return Err(DispatchError::Config(format!("duplicate station name '{}'", spec.name)));
            }
            let node = resolve("station", &spec.node)?;
            stations.push(spec.build(StationId(i as u32), node, self.config.seed)?);
        }

        check_connectivity(&network, &self.router, fallback, &stations);

        Ok(Dispatcher::from_parts(
            self.config,
            network,
            self.router,
            self.policy,
            trucks,
            stations,
            fallback,
        ))
    }
}

/// Warn about fallback → loader and loader → unloader pairs with no route.
fn check_connectivity<R: Router>(
    network:  &MineNetwork,
    router:   &R,
    fallback: fms_core::NodeId,
    stations: &[Station],
) {
    let from_fallback = router.shortest_paths(network, fallback);
    for loader in stations.iter().filter(|s| s.kind.is_loader()) {
        if from_fallback.distance_to(loader.node).is_none() {
            warn!(
                "{} '{}' is unreachable from fallback node '{}'",
                loader.kind.label(),
                loader.name,
                network.node_name(fallback),
            );
        }
        let from_loader = router.shortest_paths(network, loader.node);
        for unloader in stations.iter().filter(|s| s.kind.is_unloader()) {
            if from_loader.distance_to(unloader.node).is_none() {
                warn!(
                    "{} '{}' is unreachable from {} '{}'",
                    unloader.kind.label(),
                    unloader.name,
                    loader.kind.label(),
                    loader.name,
                );
            }
        }
    }
}
