//! The reference open-pit layout: 25 nodes, six shovels, one crusher, one
//! dump and six trucks parked at `parking`.

use fms_core::{Material, Point, SimConfig};
use fms_spatial::{MineNetwork, MineNetworkBuilder};
use fms_station::StationSpec;

use crate::{DispatchError, DispatchResult, Dispatcher, DispatcherBuilder, TruckSpec};

const NODES: [(&str, f64, f64); 25] = [
    ("parking", 91.0, 926.0),
    ("n1", 223.0, 993.0),
    ("crusher", 314.0, 936.0),
    ("n2", 100.0, 823.0),
    ("n3", 180.0, 682.0),
    ("n4", 201.0, 457.0),
    ("n5", 320.0, 302.0),
    ("c1", 548.0, 293.0),
    ("dump_zone", 81.0, 256.0),
    ("n6", 521.0, 319.0),
    ("n7", 569.0, 417.0),
    ("n8", 593.0, 600.0),
    ("c2", 612.0, 751.0),
    ("n9", 446.0, 804.0),
    ("c3", 331.0, 846.0),
    ("n10", 323.0, 801.0),
    ("n11", 280.0, 689.0),
    ("n12", 286.0, 537.0),
    ("n13", 305.0, 404.0),
    ("c4", 426.0, 377.0),
    ("n14", 354.0, 440.0),
    ("n15", 472.0, 473.0),
    ("n16", 485.0, 549.0),
    ("c5", 413.0, 727.0),
    ("c6", 359.0, 618.0),
];

/// Two-way roads as `(a, b, empty speed, loaded speed)`.
const ROADS: [(&str, &str, f64, f64); 24] = [
    // haul trunk
    ("parking", "n2", 35.0, 20.0),
    ("n1", "n2", 40.0, 25.0),
    ("crusher", "n1", 30.0, 18.0),
    ("n2", "n3", 28.0, 16.0),
    ("n3", "n4", 25.0, 15.0),
    ("n4", "n5", 30.0, 18.0),
    ("n5", "dump_zone", 35.0, 20.0),
    // shovel spurs
    ("n5", "c1", 20.0, 12.0),
    ("n8", "c2", 18.0, 10.0),
    ("n9", "c3", 22.0, 13.0),
    ("n13", "c4", 20.0, 12.0),
    ("n16", "c5", 18.0, 11.0),
    ("n16", "c6", 19.0, 11.0),
    // pit ring
    ("n5", "n6", 32.0, 19.0),
    ("n6", "n7", 28.0, 17.0),
    ("n7", "n8", 26.0, 15.0),
    ("n8", "n9", 30.0, 18.0),
    ("n9", "n10", 24.0, 14.0),
    ("n10", "n11", 27.0, 16.0),
    ("n11", "n12", 29.0, 17.0),
    ("n12", "n13", 31.0, 18.0),
    ("n12", "n14", 25.0, 15.0),
    ("n14", "n15", 28.0, 16.0),
    ("n15", "n16", 26.0, 15.0),
];

/// `(name, material, tons per pass, efficiency)` for shovels at `c1`..`c6`.
const SHOVELS: [(&str, Material, f64, f64); 6] = [
    ("c1", Material::Waste, 35.0, 0.70),
    ("c2", Material::Waste, 37.0, 0.80),
    ("c3", Material::Waste, 40.0, 0.82),
    ("c4", Material::Waste, 45.0, 0.89),
    ("c5", Material::Mineral, 47.0, 0.92),
    ("c6", Material::Mineral, 47.0, 0.91),
];

const TRUCK_EFFICIENCIES: [f64; 6] = [0.85, 0.75, 0.90, 0.88, 0.82, 0.78];
const TRUCK_CAPACITY: f64 = 200.0;

/// The road network, with Euclidean segment lengths.
pub fn standard_network() -> DispatchResult<MineNetwork> {
    let mut b = MineNetworkBuilder::new();
    for (name, x, y) in NODES {
        b.add_node(name, Point::new(x, y))?;
    }
    for (from, to, empty, loaded) in ROADS {
        let node = |name: &str| {
            b.node_id(name)
                .ok_or_else(|| DispatchError::UnknownNode { what: "road", name: name.to_owned() })
        };
        let (a, z) = (node(from)?, node(to)?);
        b.add_road(a, z, empty, loaded)?;
    }
    Ok(b.build())
}

pub fn standard_trucks() -> Vec<TruckSpec> {
    TRUCK_EFFICIENCIES
        .iter()
        .map(|&eff| TruckSpec::new(TRUCK_CAPACITY, eff, "parking"))
        .collect()
}

/// Shovels first (in `c1`..`c6` order), then the crusher and the dump.
pub fn standard_stations() -> Vec<StationSpec> {
    let mut specs: Vec<StationSpec> = SHOVELS
        .iter()
        .map(|&(name, material, tpp, eff)| StationSpec::shovel(name, name, material, tpp, eff))
        .collect();
    specs.push(StationSpec::crusher("crusher"));
    specs.push(StationSpec::dump("dump_zone"));
    specs
}

/// A builder preloaded with the standard network, fleet and stations.
pub fn standard_builder(config: SimConfig) -> DispatchResult<DispatcherBuilder> {
    Ok(DispatcherBuilder::new(config, standard_network()?)
        .trucks(standard_trucks())
        .stations(standard_stations()))
}

/// The standard mine with the default router and greedy dispatch.
pub fn standard_mine(config: SimConfig) -> DispatchResult<Dispatcher> {
    standard_builder(config)?.build()
}
