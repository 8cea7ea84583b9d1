//! Deterministic per-station and simulation-level RNG wrappers.
//!
//! # Determinism strategy
//!
//! Each station gets its own independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (station_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive station IDs uniformly across the seed space.
//! Adding trucks, or stations at the end of the list, never disturbs the
//! pass-tonnage stream of an existing shovel, so runs stay comparable when
//! the fleet is resized.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::StationId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── EquipmentRng ──────────────────────────────────────────────────────────────

/// Per-station deterministic RNG.  Owned by the station it is seeded for.
#[derive(Clone, Debug)]
pub struct EquipmentRng(SmallRng);

impl EquipmentRng {
    /// Seed deterministically from the run's global seed and a station ID.
    pub fn new(global_seed: u64, station: StationId) -> Self {
        let seed = global_seed ^ (station.0 as u64).wrapping_mul(MIXING_CONSTANT);
        EquipmentRng(SmallRng::seed_from_u64(seed))
    }

    /// Multiplicative jitter factor uniformly distributed in
    /// `[1 - spread, 1 + spread]`.  `spread <= 0` yields exactly `1.0`.
    #[inline]
    pub fn jitter(&mut self, spread: f64) -> f64 {
        if spread <= 0.0 {
            return 1.0;
        }
        self.0.gen_range(1.0 - spread..=1.0 + spread)
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Simulation-level RNG for map-wide draws, such as the speeds of road
/// segments whose map rows leave them blank.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }
}
