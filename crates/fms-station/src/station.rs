//! Single-server station with a FIFO queue and a multi-tick service timer.

use std::collections::VecDeque;

use fms_core::{EquipmentRng, NodeId, StationId, TruckId};
use fms_fleet::{Truck, TruckTask};

use crate::{StationEvent, StationKind};

/// Relative spread of per-pass bucket tonnage around nominal.
pub const PASS_SPREAD: f64 = 0.1;

/// The truck currently being served.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InService {
    pub truck:           TruckId,
    /// Passes needed to fill the truck (always 1 at unloaders).
    pub passes_required: u32,
    pub passes_done:     u32,
}

/// Cumulative counters.  Never decrease during a run.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StationCounters {
    /// Trucks whose service completed.
    pub served:              u64,
    /// Tons loaded (shovel) or correctly received (crusher, dump).
    pub tons:                f64,
    /// Tons of the wrong material received (unloaders only).
    pub wrong_material_tons: f64,
    /// Ticks with nothing in service and an empty queue.
    pub hang_time:           u64,
    /// Ticks with a truck in service.
    pub busy_ticks:          u64,
}

/// A shovel, crusher or dump.
///
/// The station is a passive resource: [`request_enqueue`](Self::request_enqueue)
/// does not look at the queue length.  Admission against `capacity` is the
/// dispatcher's job.
#[derive(Clone, Debug)]
pub struct Station {
    pub id:            StationId,
    pub name:          String,
    pub node:          NodeId,
    pub kind:          StationKind,
    pub capacity:      usize,
    pub service_ticks: u32,
    pub counters:      StationCounters,

    queue:      VecDeque<TruckId>,
    in_service: Option<InService>,
    timer:      u32,
    rng:        EquipmentRng,
}

impl Station {
    pub fn new(
        id:            StationId,
        name:          String,
        node:          NodeId,
        kind:          StationKind,
        capacity:      usize,
        service_ticks: u32,
        rng:           EquipmentRng,
    ) -> Self {
        Self {
            id,
            name,
            node,
            kind,
            capacity,
            service_ticks,
            counters:   StationCounters::default(),
            queue:      VecDeque::new(),
            in_service: None,
            timer:      0,
            rng,
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Waiting trucks, head first.
    #[inline]
    pub fn queue(&self) -> &VecDeque<TruckId> {
        &self.queue
    }

    #[inline]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    pub fn in_service(&self) -> Option<&InService> {
        self.in_service.as_ref()
    }

    #[inline]
    pub fn is_busy(&self) -> bool {
        self.in_service.is_some()
    }

    /// Ticks left on the current service operation.
    #[inline]
    pub fn timer(&self) -> u32 {
        self.timer
    }

    #[inline]
    pub fn can_accept_truck(&self) -> bool {
        self.queue.len() < self.capacity
    }

    /// `true` if `truck` is queued here or being served here.
    pub fn holds(&self, truck: TruckId) -> bool {
        self.in_service.is_some_and(|s| s.truck == truck) || self.queue.contains(&truck)
    }

    /// Share of observed ticks spent serving, in `[0, 1]`.
    pub fn utilization(&self) -> f64 {
        let total = self.counters.busy_ticks + self.counters.hang_time;
        if total == 0 {
            0.0
        } else {
            self.counters.busy_ticks as f64 / total as f64
        }
    }

    /// Passes a shovel needs to fill `truck`: `ceil(capacity / nominal)`,
    /// at least 1.  Always 1 at unloaders.
    pub fn passes_for(&self, truck: &Truck) -> u32 {
        match self.nominal_pass_tons(truck) {
            Some(nominal) if nominal > 0.0 => ((truck.capacity / nominal).ceil() as u32).max(1),
            _ => 1,
        }
    }

    /// Nominal tons per pass into `truck`: `ton_per_pass × shovel efficiency
    /// × truck efficiency`.  `None` at unloaders.
    pub fn nominal_pass_tons(&self, truck: &Truck) -> Option<f64> {
        match self.kind {
            StationKind::Shovel { ton_per_pass, efficiency, .. } => {
                Some(ton_per_pass * efficiency * truck.efficiency)
            }
            _ => None,
        }
    }

    // ── Queue ─────────────────────────────────────────────────────────────

    /// Append `truck` to the queue.
    ///
    /// Refused (returns `false`) if the truck already occupies a station or
    /// is not waiting for this kind of station.  Queue length is not checked.
    pub fn request_enqueue(&mut self, truck: &mut Truck) -> bool {
        if truck.station.is_some() {
            return false;
        }
        let expected = if self.kind.is_loader() {
            TruckTask::WaitingShovel
        } else {
            TruckTask::WaitingDump
        };
        if truck.task() != expected {
            return false;
        }
        self.queue.push_back(truck.id);
        truck.station = Some(self.id);
        true
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    /// Advance one tick.
    ///
    /// Starts serving the queue head if idle, then counts the timer down; a
    /// service started this tick already consumes this tick.
    pub fn update(&mut self, trucks: &mut [Truck]) -> Vec<StationEvent> {
        let mut events = Vec::new();

        while self.in_service.is_none() {
            let Some(id) = self.queue.pop_front() else {
                break;
            };
            self.begin_service(id, trucks, &mut events);
        }

        let Some(service) = self.in_service else {
            self.counters.hang_time += 1;
            return events;
        };

        self.counters.busy_ticks += 1;
        self.timer = self.timer.saturating_sub(1);
        if self.timer == 0 {
            self.timer_expired(service, trucks, &mut events);
        }
        events
    }

    fn begin_service(&mut self, id: TruckId, trucks: &mut [Truck], events: &mut Vec<StationEvent>) {
        let Some(truck) = trucks.get_mut(id.index()) else {
            log::warn!("station '{}': dropping unknown truck {id} from queue", self.name);
            return;
        };

        let started = match self.kind {
            StationKind::Shovel { material, .. } => {
                let passes_required = self.passes_for(truck);
                let tons = self.pass_tons(truck, 1, passes_required);
                truck.start_loading(material, tons / truck.efficiency).map(|()| {
                    events.push(StationEvent::LoadStarted {
                        station: self.id,
                        truck:   id,
                        tons:    truck.current_load,
                    });
                    passes_required
                })
            }
            StationKind::Crusher | StationKind::Dump => truck.start_dumping().map(|()| {
                events.push(StationEvent::DumpStarted { station: self.id, truck: id });
                1
            }),
        };

        match started {
            Ok(passes_required) => {
                self.in_service = Some(InService { truck: id, passes_required, passes_done: 1 });
                self.timer = self.service_ticks;
            }
            Err(e) => {
                log::warn!("station '{}': {e}; truck removed from queue", self.name);
                truck.station = None;
            }
        }
    }

    fn timer_expired(&mut self, mut service: InService, trucks: &mut [Truck], events: &mut Vec<StationEvent>) {
        let Some(truck) = trucks.get_mut(service.truck.index()) else {
            log::warn!("station '{}': truck {} in service vanished", self.name, service.truck);
            self.in_service = None;
            return;
        };

        match self.kind {
            StationKind::Shovel { material, .. } => {
                if service.passes_done < service.passes_required && truck.current_load < truck.capacity {
                    service.passes_done += 1;
                    let tons = self.pass_tons(truck, service.passes_done, service.passes_required);
                    let added = truck.add_pass(tons);
                    events.push(StationEvent::PassLoaded { station: self.id, truck: truck.id, tons: added });
                    self.in_service = Some(service);
                    self.timer = self.service_ticks;
                    return;
                }
                if let Err(e) = truck.finish_loading() {
                    log::warn!("station '{}': {e}", self.name);
                }
                self.counters.served += 1;
                self.counters.tons += truck.current_load;
                events.push(StationEvent::LoadFinished {
                    station: self.id,
                    truck:   truck.id,
                    tons:    truck.current_load,
                    material,
                });
            }
            StationKind::Crusher | StationKind::Dump => {
                let (tons, material) = match truck.finish_dumping() {
                    Ok(dumped) => dumped,
                    Err(e) => {
                        log::warn!("station '{}': {e}", self.name);
                        (0.0, None)
                    }
                };
                let correct = material == Some(self.kind.material());
                if correct {
                    self.counters.tons += tons;
                } else {
                    self.counters.wrong_material_tons += tons;
                }
                self.counters.served += 1;
                events.push(StationEvent::DumpFinished {
                    station: self.id,
                    truck:   truck.id,
                    tons,
                    material,
                    correct,
                });
            }
        }

        truck.station = None;
        self.in_service = None;
    }

    /// Tons for pass `pass` of `required` into `truck`.
    ///
    /// Non-final passes vary by ±[`PASS_SPREAD`] around nominal.  The final
    /// pass tops the truck up to capacity, but never beyond the largest
    /// bucket the variation allows.
    fn pass_tons(&mut self, truck: &Truck, pass: u32, required: u32) -> f64 {
        let nominal = self.nominal_pass_tons(truck).unwrap_or(0.0);
        if pass >= required {
            let room = truck.capacity - if pass == 1 { 0.0 } else { truck.current_load };
            (nominal * (1.0 + PASS_SPREAD)).min(room).max(0.0)
        } else {
            nominal * self.rng.jitter(PASS_SPREAD)
        }
    }
}
