//! Station definitions, prior to placement on a network.

use fms_core::{EquipmentRng, Material, NodeId, StationId};

use crate::{Station, StationError, StationResult};

/// Default queue length for loading stations.
pub const SHOVEL_CAPACITY: usize = 3;
/// Default queue length for unloading stations.
pub const UNLOADER_CAPACITY: usize = 2;
/// Default ticks per bucket pass at a shovel.
pub const SHOVEL_PASS_TICKS: u32 = 5;
/// Default processing ticks at the crusher or dump.
pub const UNLOAD_TICKS: u32 = 4;

// ── StationKind ───────────────────────────────────────────────────────────────

/// What a station does to the trucks it serves.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StationKind {
    /// Loads trucks with `material` in passes of `ton_per_pass × efficiency`.
    Shovel { material: Material, ton_per_pass: f64, efficiency: f64 },
    /// Accepts mineral.
    Crusher,
    /// Accepts waste.
    Dump,
}

impl StationKind {
    #[inline]
    pub fn is_loader(&self) -> bool {
        matches!(self, StationKind::Shovel { .. })
    }

    #[inline]
    pub fn is_unloader(&self) -> bool {
        !self.is_loader()
    }

    /// Material this station produces (shovel) or is meant to receive
    /// (crusher, dump).
    pub fn material(&self) -> Material {
        match *self {
            StationKind::Shovel { material, .. } => material,
            StationKind::Crusher                 => Material::Mineral,
            StationKind::Dump                    => Material::Waste,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StationKind::Shovel { .. } => "shovel",
            StationKind::Crusher       => "crusher",
            StationKind::Dump          => "dump",
        }
    }
}

// ── StationSpec ───────────────────────────────────────────────────────────────

/// A station to be placed at the node named `node`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StationSpec {
    pub name:          String,
    pub node:          String,
    pub kind:          StationKind,
    /// Queue length at which the dispatcher stops routing trucks here.
    pub capacity:      usize,
    /// Ticks per pass (shovel) or per dump (crusher, dump).
    pub service_ticks: u32,
}

impl StationSpec {
    pub fn shovel(
        name:         impl Into<String>,
        node:         impl Into<String>,
        material:     Material,
        ton_per_pass: f64,
        efficiency:   f64,
    ) -> Self {
        Self {
            name:          name.into(),
            node:          node.into(),
            kind:          StationKind::Shovel { material, ton_per_pass, efficiency },
            capacity:      SHOVEL_CAPACITY,
            service_ticks: SHOVEL_PASS_TICKS,
        }
    }

    pub fn crusher(node: impl Into<String>) -> Self {
        Self {
            name:          "crusher".to_owned(),
            node:          node.into(),
            kind:          StationKind::Crusher,
            capacity:      UNLOADER_CAPACITY,
            service_ticks: UNLOAD_TICKS,
        }
    }

    pub fn dump(node: impl Into<String>) -> Self {
        Self {
            name:          "dump".to_owned(),
            node:          node.into(),
            kind:          StationKind::Dump,
            capacity:      UNLOADER_CAPACITY,
            service_ticks: UNLOAD_TICKS,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_service_ticks(mut self, ticks: u32) -> Self {
        self.service_ticks = ticks;
        self
    }

    pub fn validate(&self) -> StationResult<()> {
        let invalid = |reason: &str| StationError::InvalidSpec {
            name:   self.name.clone(),
            reason: reason.to_owned(),
        };
        if self.service_ticks == 0 {
            return Err(invalid("service_ticks must be at least 1"));
        }
        if let StationKind::Shovel { ton_per_pass, efficiency, .. } = self.kind {
            if !(ton_per_pass.is_finite() && ton_per_pass > 0.0) {
                return Err(invalid("ton_per_pass must be positive"));
            }
            if !(efficiency.is_finite() && efficiency > 0.0) {
                return Err(invalid("efficiency must be positive"));
            }
        }
        Ok(())
    }

    /// Validate and instantiate at `node` with a station-specific RNG stream.
    pub fn build(self, id: StationId, node: NodeId, seed: u64) -> StationResult<Station> {
        self.validate()?;
        Ok(Station::new(
            id,
            self.name,
            node,
            self.kind,
            self.capacity,
            self.service_ticks,
            EquipmentRng::new(seed, id),
        ))
    }
}
