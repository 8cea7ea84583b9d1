//! Production totals and read-only fleet statistics.

use fms_core::{Material, NodeId, Point, StationId, Tick, TruckId};
use fms_fleet::{Truck, TruckTask};
use fms_spatial::MineNetwork;
use fms_station::{Station, StationEvent};

// ── ProductionTotals ──────────────────────────────────────────────────────────

/// Cumulative delivered tonnage.  Non-decreasing over a run.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProductionTotals {
    /// Mineral delivered to a crusher.
    pub mineral_processed: f64,
    /// Waste delivered to a dump.
    pub waste_dumped:      f64,
    /// Mineral delivered to a dump.
    pub mineral_misrouted: f64,
    /// Waste delivered to a crusher.
    pub waste_misrouted:   f64,
    /// Tons that left a shovel in a truck.
    pub tons_loaded:       f64,
}

impl ProductionTotals {
    /// Fold one station event into the totals.
    pub fn record(&mut self, event: &StationEvent) {
        match *event {
            StationEvent::LoadFinished { tons, .. } => self.tons_loaded += tons,
            StationEvent::DumpFinished { tons, material: Some(material), correct, .. } => {
                let bucket = match (material, correct) {
                    (Material::Mineral, true)  => &mut self.mineral_processed,
                    (Material::Waste, true)    => &mut self.waste_dumped,
                    (Material::Mineral, false) => &mut self.mineral_misrouted,
                    (Material::Waste, false)   => &mut self.waste_misrouted,
                };
                *bucket += tons;
            }
            _ => {}
        }
    }

    /// All tons delivered to any unloader.
    #[inline]
    pub fn delivered(&self) -> f64 {
        self.mineral_processed + self.waste_dumped + self.mineral_misrouted + self.waste_misrouted
    }
}

// ── TickSummary ───────────────────────────────────────────────────────────────

/// What one `Dispatcher::update` did.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickSummary {
    pub tick:              Tick,
    /// Trucks that reached the end of a route.
    pub arrivals:          u32,
    /// Trucks that joined a station queue.
    pub enqueued:          u32,
    /// Trucks routed by the dispatch policy.
    pub assigned:          u32,
    /// Trucks sent back to the fallback node.
    pub sent_to_fallback:  u32,
    pub loads_finished:    u32,
    pub dumps_finished:    u32,
    pub totals:            ProductionTotals,
}

// ── Status rows ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TruckStatus {
    pub id:          TruckId,
    pub task:        TruckTask,
    pub position:    NodeId,
    pub node_name:   String,
    pub xy:          Point,
    pub loaded:      bool,
    pub load:        f64,
    pub capacity:    f64,
    pub material:    Option<Material>,
    pub speed:       f64,
    pub efficiency:  f64,
    pub station:     Option<StationId>,
    pub destination: Option<StationId>,
}

impl TruckStatus {
    pub fn of(truck: &Truck, network: &MineNetwork) -> Self {
        Self {
            id:          truck.id,
            task:        truck.task(),
            position:    truck.position,
            node_name:   network.node_name(truck.position).to_owned(),
            xy:          truck.xy,
            loaded:      truck.loaded,
            load:        truck.current_load,
            capacity:    truck.capacity,
            material:    truck.material,
            speed:       truck.speed,
            efficiency:  truck.efficiency,
            station:     truck.station,
            destination: truck.destination,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StationStatus {
    pub id:                  StationId,
    pub name:                String,
    pub kind:                String,
    pub queue_len:           usize,
    pub capacity:            usize,
    pub busy:                bool,
    pub served:              u64,
    pub tons:                f64,
    pub wrong_material_tons: f64,
    pub hang_time:           u64,
    pub utilization:         f64,
}

impl StationStatus {
    pub fn of(station: &Station) -> Self {
        Self {
            id:                  station.id,
            name:                station.name.clone(),
            kind:                station.kind.label().to_owned(),
            queue_len:           station.queue_len(),
            capacity:            station.capacity,
            busy:                station.is_busy(),
            served:              station.counters.served,
            tons:                station.counters.tons,
            wrong_material_tons: station.counters.wrong_material_tons,
            hang_time:           station.counters.hang_time,
            utilization:         station.utilization(),
        }
    }
}

// ── FleetStats ────────────────────────────────────────────────────────────────

/// Point-in-time snapshot returned by `Dispatcher::stats`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FleetStats {
    pub tick:     Tick,
    pub totals:   ProductionTotals,
    pub trucks:   Vec<TruckStatus>,
    pub stations: Vec<StationStatus>,
}

impl FleetStats {
    /// Trucks per task, in `TruckTask::ALL` order.
    pub fn task_counts(&self) -> [usize; 8] {
        let mut counts = [0; 8];
        for t in &self.trucks {
            counts[t.task as usize] += 1;
        }
        counts
    }

    /// Queue lengths in station order.
    pub fn queue_lengths(&self) -> Vec<usize> {
        self.stations.iter().map(|s| s.queue_len).collect()
    }
}
