//! Mine road network representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing
//! segments.  Given a `NodeId n`, its outgoing segments occupy the slice:
//!
//! ```text
//! segments[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! `segments` is sorted by origin node and indexed by `SegmentId`, so a
//! node's outgoing segments are a contiguous scan, both in Dijkstra's
//! inner loop and in `segment_between` lookups during truck movement.
//!
//! Roads are **directed**.  A two-way haul road is two independent
//! `Segment`s whose speeds may differ (uphill loaded vs. downhill empty);
//! at most one segment exists per ordered `(origin, destination)` pair.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `(x, y)` to the nearest `NodeId`.  Used by
//! visualization front-ends to resolve a cursor position to a waypoint.

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::{FxHashMap, FxHashSet};

use fms_core::{NodeId, Point, SegmentId};

use crate::{SpatialError, SpatialResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2],
    id:    NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── Segment ───────────────────────────────────────────────────────────────────

/// A directed haul-road segment.  Immutable once the network is built.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    pub from:         NodeId,
    pub to:           NodeId,
    /// Length in map units.
    pub distance:     f64,
    /// Travel speed of an empty truck (map units per tick).
    pub empty_speed:  f64,
    /// Travel speed of a loaded truck (map units per tick).
    pub loaded_speed: f64,
}

impl Segment {
    /// Speed for the given load state.
    #[inline]
    pub fn speed(&self, loaded: bool) -> f64 {
        if loaded { self.loaded_speed } else { self.empty_speed }
    }
}

// ── MineNetwork ───────────────────────────────────────────────────────────────

/// Directed road graph in CSR format plus a name index and a spatial index.
///
/// All graph arrays are `pub` for direct indexed access on hot paths.  Do not
/// construct directly; use [`MineNetworkBuilder`].
pub struct MineNetwork {
    /// Map position of each node.  Indexed by `NodeId`.
    pub node_pos: Vec<Point>,

    /// Unique name of each node.  Indexed by `NodeId`.
    pub node_name: Vec<String>,

    /// CSR row pointer.  Outgoing segments of node `n` are at SegmentIds
    /// `node_out_start[n] .. node_out_start[n+1]`.
    /// Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    /// All segments, sorted by origin node.  Indexed by `SegmentId`.
    pub segments: Vec<Segment>,

    name_index:  FxHashMap<String, NodeId>,
    spatial_idx: RTree<NodeEntry>,
}

impl MineNetwork {
    /// Construct an empty network with no nodes or segments.
    pub fn empty() -> Self {
        MineNetworkBuilder::new().build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    /// `true` if `node` indexes a node of this network.
    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.node_count()
    }

    // ── Node lookups ──────────────────────────────────────────────────────

    /// Resolve a node name.
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.name_index.get(name).copied()
    }

    /// Name of `node`.  Panics if `node` is out of range.
    #[inline]
    pub fn node_name(&self, node: NodeId) -> &str {
        &self.node_name[node.index()]
    }

    /// Position of `node`.  Panics if `node` is out of range.
    #[inline]
    pub fn node_pos(&self, node: NodeId) -> Point {
        self.node_pos[node.index()]
    }

    /// Iterator over every node as `(id, name, position)`, in id order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &str, Point)> + '_ {
        self.node_name
            .iter()
            .zip(&self.node_pos)
            .enumerate()
            .map(|(i, (name, &pos))| (NodeId(i as u32), name.as_str(), pos))
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `SegmentId`s of all outgoing segments from `node`.
    ///
    /// Empty for nodes outside the network.
    #[inline]
    pub fn out_segments(&self, node: NodeId) -> impl ExactSizeIterator<Item = SegmentId> + '_ {
        let (start, end) = if self.contains(node) {
            (
                self.node_out_start[node.index()] as usize,
                self.node_out_start[node.index() + 1] as usize,
            )
        } else {
            (0, 0)
        };
        (start..end).map(|i| SegmentId(i as u32))
    }

    /// Out-degree of `node`.
    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        self.out_segments(node).len()
    }

    /// The segment with id `id`.  Panics if `id` is out of range.
    #[inline]
    pub fn segment(&self, id: SegmentId) -> &Segment {
        &self.segments[id.index()]
    }

    /// The segment from `from` to `to`, if the road exists.
    pub fn segment_between(&self, from: NodeId, to: NodeId) -> Option<SegmentId> {
        self.out_segments(from)
            .find(|&s| self.segments[s.index()].to == to)
    }

    /// Name-based variant of [`segment_between`](Self::segment_between).
    pub fn segment_between_names(&self, from: &str, to: &str) -> Option<&Segment> {
        let from = self.node_id(from)?;
        let to   = self.node_id(to)?;
        self.segment_between(from, to).map(|s| self.segment(s))
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Return the `NodeId` of the nearest node to `pos`.
    ///
    /// Returns `None` only if the network has no nodes.
    pub fn snap_to_node(&self, pos: Point) -> Option<NodeId> {
        self.spatial_idx
            .nearest_neighbor(&[pos.x, pos.y])
            .map(|e| e.id)
    }

    /// Return up to `k` nearest nodes to `pos`, sorted by ascending distance.
    pub fn k_nearest_nodes(&self, pos: Point, k: usize) -> Vec<NodeId> {
        self.spatial_idx
            .nearest_neighbor_iter(&[pos.x, pos.y])
            .take(k)
            .map(|e| e.id)
            .collect()
    }
}

// ── MineNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`MineNetwork`] incrementally, then call [`build`](Self::build).
///
/// Every insertion is validated: node names are unique, segments must join
/// existing nodes, carry a finite non-negative distance and positive speeds,
/// and may not duplicate an existing ordered pair.
///
/// # Example
///
/// ```
/// use fms_core::Point;
/// use fms_spatial::MineNetworkBuilder;
///
/// let mut b = MineNetworkBuilder::new();
/// let a = b.add_node("parking", Point::new(0.0, 0.0)).unwrap();
/// let c = b.add_node("crusher", Point::new(30.0, 40.0)).unwrap();
/// b.add_road(a, c, 35.0, 20.0).unwrap();
/// let net = b.build();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.segment_count(), 2);
/// assert_eq!(net.segments[0].distance, 50.0);
/// ```
pub struct MineNetworkBuilder {
    names:      Vec<String>,
    positions:  Vec<Point>,
    name_index: FxHashMap<String, NodeId>,
    raw:        Vec<Segment>,
    pairs:      FxHashSet<(NodeId, NodeId)>,
}

impl MineNetworkBuilder {
    pub fn new() -> Self {
        Self {
            names:      Vec::new(),
            positions:  Vec::new(),
            name_index: FxHashMap::default(),
            raw:        Vec::new(),
            pairs:      FxHashSet::default(),
        }
    }

    /// Add a named waypoint and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, name: impl Into<String>, pos: Point) -> SpatialResult<NodeId> {
        let name = name.into();
        if self.name_index.contains_key(&name) {
            return Err(SpatialError::DuplicateNode(name));
        }
        let id = NodeId(self.names.len() as u32);
        self.name_index.insert(name.clone(), id);
        self.names.push(name);
        self.positions.push(pos);
        Ok(id)
    }

    /// Look up a node added earlier by name.
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.name_index.get(name).copied()
    }

    /// Position of a node added earlier.
    pub fn node_pos(&self, id: NodeId) -> Option<Point> {
        self.positions.get(id.index()).copied()
    }

    pub fn node_count(&self) -> usize { self.names.len() }
    pub fn segment_count(&self) -> usize { self.raw.len() }

    /// Add a **directed** segment with an explicit distance.
    pub fn add_segment(
        &mut self,
        from:         NodeId,
        to:           NodeId,
        distance:     f64,
        empty_speed:  f64,
        loaded_speed: f64,
    ) -> SpatialResult<()> {
        for node in [from, to] {
            if node.index() >= self.names.len() {
                return Err(SpatialError::DanglingNode(node));
            }
        }
        let invalid = |reason: &str| SpatialError::InvalidSegment {
            from:   self.names[from.index()].clone(),
            to:     self.names[to.index()].clone(),
            reason: reason.to_owned(),
        };
        if from == to {
            return Err(invalid("self-loop"));
        }
        if !distance.is_finite() || distance < 0.0 {
            return Err(invalid("distance must be finite and non-negative"));
        }
        if !(empty_speed.is_finite() && empty_speed > 0.0 && loaded_speed.is_finite() && loaded_speed > 0.0) {
            return Err(invalid("speeds must be finite and positive"));
        }
        if !self.pairs.insert((from, to)) {
            return Err(SpatialError::DuplicateSegment {
                from: self.names[from.index()].clone(),
                to:   self.names[to.index()].clone(),
            });
        }
        self.raw.push(Segment { from, to, distance, empty_speed, loaded_speed });
        Ok(())
    }

    /// Add a **directed** segment whose distance is the Euclidean distance
    /// between the two node positions.
    pub fn connect(
        &mut self,
        from:         NodeId,
        to:           NodeId,
        empty_speed:  f64,
        loaded_speed: f64,
    ) -> SpatialResult<()> {
        let (Some(a), Some(b)) = (self.node_pos(from), self.node_pos(to)) else {
            let missing = if self.node_pos(from).is_none() { from } else { to };
            return Err(SpatialError::DanglingNode(missing));
        };
        self.add_segment(from, to, a.distance(b), empty_speed, loaded_speed)
    }

    /// Convenience: connect `a` and `b` in **both directions** with the same
    /// speeds.  The two segments are still independent instances.
    pub fn add_road(
        &mut self,
        a:            NodeId,
        b:            NodeId,
        empty_speed:  f64,
        loaded_speed: f64,
    ) -> SpatialResult<()> {
        self.connect(a, b, empty_speed, loaded_speed)?;
        self.connect(b, a, empty_speed, loaded_speed)
    }

    /// Consume the builder and produce a [`MineNetwork`].
    ///
    /// Time complexity: O(E log E) for the segment sort + O(N log N) for the
    /// R-tree bulk load.
    pub fn build(self) -> MineNetwork {
        let node_count = self.names.len();

        // Stable sort keeps insertion order among a node's outgoing segments,
        // which is the relaxation order Dijkstra sees.
        let mut segments = self.raw;
        segments.sort_by_key(|s| s.from.0);

        let mut node_out_start = vec![0u32; node_count + 1];
        for s in &segments {
            node_out_start[s.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, segments.len());

        let entries: Vec<NodeEntry> = self
            .positions
            .iter()
            .enumerate()
            .map(|(i, p)| NodeEntry { point: [p.x, p.y], id: NodeId(i as u32) })
            .collect();

        MineNetwork {
            node_pos:       self.positions,
            node_name:      self.names,
            node_out_start,
            segments,
            name_index:     self.name_index,
            spatial_idx:    RTree::bulk_load(entries),
        }
    }
}

impl Default for MineNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
