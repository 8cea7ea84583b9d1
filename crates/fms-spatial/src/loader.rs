//! CSV mine-map loader.
//!
//! # CSV format
//!
//! Two files: one row per waypoint, one row per **directed** segment.
//!
//! ```csv
//! name,x,y
//! parking,91,926
//! crusher,314,936
//! ```
//!
//! ```csv
//! from,to,distance,empty_speed,loaded_speed
//! parking,crusher,,35,20
//! crusher,parking,,35,20
//! ```
//!
//! An empty `distance` is replaced by the Euclidean distance between the two
//! node positions.  A two-way road needs one row per direction.
//!
//! # Missing speeds
//!
//! An empty `empty_speed` or `loaded_speed` is drawn from the band of the
//! segment's [`RoadClass`] using the caller's [`SimRng`], so the same seed
//! always yields the same map.
//!
//! | Class   | Endpoint rule                                  | Empty   | Loaded  |
//! |---------|------------------------------------------------|---------|---------|
//! | `Spur`  | either end is a shovel face (`c` + digits)     | 18–25   | 10–15   |
//! | `Trunk` | either end is `parking`, `crusher`, `dump_zone` | 30–40   | 18–25   |
//! | `Ring`  | anything else                                  | 25–35   | 15–20   |
//!
//! # Malformed data
//!
//! Map files may come from external survey tools, so bad rows never abort the
//! load: a row that fails to parse, names an unknown node, repeats an ordered
//! pair, or carries an invalid distance/speed is logged at `warn` level and
//! skipped.  Only I/O failures and a malformed header are returned as errors.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use fms_core::{Point, SimRng};

use crate::network::{MineNetwork, MineNetworkBuilder};
use crate::SpatialResult;

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NodeRecord {
    name: String,
    x:    f64,
    y:    f64,
}

#[derive(Deserialize)]
struct SegmentRecord {
    from:         String,
    to:           String,
    distance:     Option<f64>,
    empty_speed:  Option<f64>,
    loaded_speed: Option<f64>,
}

// ── Road classes ──────────────────────────────────────────────────────────────

const TRUNK_NODES: [&str; 3] = ["parking", "crusher", "dump_zone"];

/// Speed band used for segments whose map row omits a speed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RoadClass {
    /// Short access road into a shovel face.
    Spur,
    /// Main haul road touching parking, the crusher or the dump.
    Trunk,
    /// Internal pit road.
    Ring,
}

impl RoadClass {
    /// Classify a segment by its endpoint names.  Spurs win over trunks.
    pub fn of(from: &str, to: &str) -> RoadClass {
        let is_face = |name: &str| {
            name.strip_prefix('c')
                .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
        };
        if is_face(from) || is_face(to) {
            RoadClass::Spur
        } else if TRUNK_NODES.contains(&from) || TRUNK_NODES.contains(&to) {
            RoadClass::Trunk
        } else {
            RoadClass::Ring
        }
    }

    /// `(empty, loaded)` speed ranges.
    pub fn bands(self) -> ((f64, f64), (f64, f64)) {
        match self {
            RoadClass::Spur  => ((18.0, 25.0), (10.0, 15.0)),
            RoadClass::Trunk => ((30.0, 40.0), (18.0, 25.0)),
            RoadClass::Ring  => ((25.0, 35.0), (15.0, 20.0)),
        }
    }

    /// Draw an `(empty, loaded)` speed pair.
    pub fn sample(self, rng: &mut SimRng) -> (f64, f64) {
        let ((e_lo, e_hi), (l_lo, l_hi)) = self.bands();
        (rng.gen_range(e_lo..e_hi), rng.gen_range(l_lo..l_hi))
    }
}

/// Row counts from a load, for startup reporting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub nodes_loaded:     usize,
    pub nodes_skipped:    usize,
    pub segments_loaded:  usize,
    pub segments_skipped: usize,
    /// Loaded segments with at least one sampled speed.
    pub speeds_sampled:   usize,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a [`MineNetwork`] from a node CSV and a segment CSV on disk.
///
/// `rng` fills in speeds the segment file leaves blank.
pub fn load_network_csv(
    nodes_path:    &Path,
    segments_path: &Path,
    rng:           &mut SimRng,
) -> SpatialResult<(MineNetwork, LoadSummary)> {
    let nodes    = std::fs::File::open(nodes_path)?;
    let segments = std::fs::File::open(segments_path)?;
    load_network_reader(nodes, segments, rng)
}

/// Like [`load_network_csv`] but accepts any `Read` sources.
///
/// Useful for testing (pass a `std::io::Cursor`) or embedded maps.
pub fn load_network_reader<N: Read, S: Read>(
    nodes:    N,
    segments: S,
    rng:      &mut SimRng,
) -> SpatialResult<(MineNetwork, LoadSummary)> {
    let mut builder = MineNetworkBuilder::new();
    let mut summary = LoadSummary::default();

    // ── Nodes ─────────────────────────────────────────────────────────────
    let mut reader = csv_reader(nodes);
    reader.headers()?;
    for (row, result) in reader.deserialize::<NodeRecord>().enumerate() {
        let rec = match result {
            Ok(rec) => rec,
            Err(e) => {
                log::warn!("nodes row {}: skipped: {e}", row + 1);
                summary.nodes_skipped += 1;
                continue;
            }
        };
        if rec.name.is_empty() || !rec.x.is_finite() || !rec.y.is_finite() {
            log::warn!("nodes row {}: skipped: blank name or non-finite position", row + 1);
            summary.nodes_skipped += 1;
            continue;
        }
        match builder.add_node(rec.name, Point::new(rec.x, rec.y)) {
            Ok(_) => summary.nodes_loaded += 1,
            Err(e) => {
                log::warn!("nodes row {}: skipped: {e}", row + 1);
                summary.nodes_skipped += 1;
            }
        }
    }

    // ── Segments ──────────────────────────────────────────────────────────
    let mut reader = csv_reader(segments);
    reader.headers()?;
    for (row, result) in reader.deserialize::<SegmentRecord>().enumerate() {
        let rec = match result {
            Ok(rec) => rec,
            Err(e) => {
                log::warn!("segments row {}: skipped: {e}", row + 1);
                summary.segments_skipped += 1;
                continue;
            }
        };
        let (Some(from), Some(to)) = (builder.node_id(&rec.from), builder.node_id(&rec.to)) else {
            log::warn!(
                "segments row {}: skipped: unknown node in '{}' -> '{}'",
                row + 1,
                rec.from,
                rec.to
            );
            summary.segments_skipped += 1;
            continue;
        };
        let sampled = rec.empty_speed.is_none() || rec.loaded_speed.is_none();
        let (empty, loaded) = match (rec.empty_speed, rec.loaded_speed) {
            (Some(e), Some(l)) => (e, l),
            (e, l) => {
                let (se, sl) = RoadClass::of(&rec.from, &rec.to).sample(rng);
                (e.unwrap_or(se), l.unwrap_or(sl))
            }
        };
        let added = match rec.distance {
            Some(d) => builder.add_segment(from, to, d, empty, loaded),
            None => builder.connect(from, to, empty, loaded),
        };
        match added {
            Ok(()) => {
                summary.segments_loaded += 1;
                summary.speeds_sampled += usize::from(sampled);
            }
            Err(e) => {
                log::warn!("segments row {}: skipped: {e}", row + 1);
                summary.segments_skipped += 1;
            }
        }
    }

    Ok((builder.build(), summary))
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader)
}
