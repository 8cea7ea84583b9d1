//! Routing trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! `fms-dispatch` calls routing via the [`Router`] trait, so applications can
//! swap in custom implementations (A*, travel-time weighting, closed-road
//! overlays) without touching the dispatcher.
//!
//! # Cost units
//!
//! Edge weight is segment **distance** in map units.  Speeds are ignored for
//! routing; they only matter once a truck is actually driving a segment.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use fms_core::{NodeId, SegmentId};

use crate::network::MineNetwork;

// ── Route ─────────────────────────────────────────────────────────────────────

/// The result of a routing query: the node sequence from source to
/// destination (both inclusive) and its summed segment distance.
///
/// An empty `nodes` means "no route" (unknown endpoint or disconnected).
/// A single-node route means source and destination coincide.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Route {
    pub nodes:    Vec<NodeId>,
    pub distance: f64,
}

impl Route {
    /// The "no route" value.
    pub fn none() -> Self {
        Self::default()
    }

    /// `true` if no path was found.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// `true` if the route actually moves a truck (`len > 1`).
    #[inline]
    pub fn is_assignable(&self) -> bool {
        self.nodes.len() > 1
    }

    /// Node names along the route, for logs and external consumers.
    pub fn names<'n>(&self, network: &'n MineNetwork) -> Vec<&'n str> {
        self.nodes.iter().map(|&n| network.node_name(n)).collect()
    }
}

// ── ShortestPaths ─────────────────────────────────────────────────────────────

/// Single-source shortest-distance tree.
///
/// Compute once per source and query [`path_to`](Self::path_to) for as many
/// targets as needed.
#[derive(Debug, Clone)]
pub struct ShortestPaths {
    pub source: NodeId,
    /// Best distance from `source`; `f64::INFINITY` for unreached nodes.
    pub dist:   Vec<f64>,
    /// Segment that reached each node; `SegmentId::INVALID` for the source and
    /// unreached nodes.
    pub prev:   Vec<SegmentId>,
}

impl ShortestPaths {
    /// Distance to `target`, or `None` if it was not reached.
    pub fn distance_to(&self, target: NodeId) -> Option<f64> {
        self.dist
            .get(target.index())
            .copied()
            .filter(|d| d.is_finite())
    }

    /// Reconstruct the route to `target`.  Empty if `target` is unreachable
    /// or outside the network.
    pub fn path_to(&self, network: &MineNetwork, target: NodeId) -> Route {
        let Some(distance) = self.distance_to(target) else {
            return Route::none();
        };
        let mut nodes = vec![target];
        let mut cur = target;
        while cur != self.source {
            let seg = self.prev[cur.index()];
            if seg == SegmentId::INVALID {
                return Route::none();
            }
            cur = network.segment(seg).from;
            nodes.push(cur);
        }
        nodes.reverse();
        Route { nodes, distance }
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so independent dispatchers can run
/// on Rayon worker threads.
pub trait Router: Send + Sync {
    /// Full shortest-distance tree from `source`.  A `source` outside the
    /// network yields a tree in which nothing is reachable.
    fn shortest_paths(&self, network: &MineNetwork, source: NodeId) -> ShortestPaths;

    /// Shortest route from `from` to `to`.  Never fails: a missing endpoint
    /// or a disconnected pair yields an empty route and `from == to` yields
    /// the single-node route `[from]`.
    fn shortest_path(&self, network: &MineNetwork, from: NodeId, to: NodeId) -> Route {
        if !network.contains(from) || !network.contains(to) {
            return Route::none();
        }
        self.shortest_paths(network, from).path_to(network, to)
    }

    /// Name-based variant of [`shortest_path`](Self::shortest_path).
    fn shortest_path_by_name(&self, network: &MineNetwork, from: &str, to: &str) -> Route {
        match (network.node_id(from), network.node_id(to)) {
            (Some(a), Some(b)) => self.shortest_path(network, a, b),
            _ => Route::none(),
        }
    }
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Standard Dijkstra's algorithm over the CSR segment graph, weighted by
/// segment distance.
///
/// Relaxation follows each node's outgoing-segment order; the first segment
/// reaching a strictly smaller distance wins.
#[derive(Copy, Clone, Debug, Default)]
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn shortest_paths(&self, network: &MineNetwork, source: NodeId) -> ShortestPaths {
        dijkstra(network, source, None)
    }

    fn shortest_path(&self, network: &MineNetwork, from: NodeId, to: NodeId) -> Route {
        if !network.contains(from) || !network.contains(to) {
            return Route::none();
        }
        dijkstra(network, from, Some(to)).path_to(network, to)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Min-heap entry.  Ordering is reversed on cost so `BinaryHeap` (a max-heap)
/// pops the cheapest entry; `NodeId` breaks ties deterministically.
#[derive(Copy, Clone, Debug)]
struct HeapEntry {
    cost: f64,
    node: NodeId,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Segment weight, or `None` if the segment must be skipped.
#[inline]
fn usable_weight(network: &MineNetwork, seg: SegmentId) -> Option<(NodeId, f64)> {
    let s = network.segment(seg);
    if !network.contains(s.to) {
        log::warn!(
            "skipping segment {seg} from '{}': destination {} is not in the network",
            network.node_name(s.from),
            s.to
        );
        return None;
    }
    if !s.distance.is_finite() || s.distance < 0.0 {
        log::warn!(
            "skipping segment '{}' -> '{}': invalid distance {}",
            network.node_name(s.from),
            network.node_name(s.to),
            s.distance
        );
        return None;
    }
    Some((s.to, s.distance))
}

fn dijkstra(network: &MineNetwork, source: NodeId, target: Option<NodeId>) -> ShortestPaths {
    let n = network.node_count();
    // dist[v] = best known distance to v.
    let mut dist = vec![f64::INFINITY; n];
    // prev[v] = segment that reached v.
    let mut prev = vec![SegmentId::INVALID; n];

    if !network.contains(source) {
        return ShortestPaths { source, dist, prev };
    }

    dist[source.index()] = 0.0;
    let mut heap = BinaryHeap::new();
    heap.push(HeapEntry { cost: 0.0, node: source });

    while let Some(HeapEntry { cost, node }) = heap.pop() {
        if Some(node) == target {
            break;
        }

        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }

        for seg in network.out_segments(node) {
            let Some((neighbor, weight)) = usable_weight(network, seg) else {
                continue;
            };
            let new_cost = cost + weight;
            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev[neighbor.index()] = seg;
                heap.push(HeapEntry { cost: new_cost, node: neighbor });
            }
        }
    }

    ShortestPaths { source, dist, prev }
}
