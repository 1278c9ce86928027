//! Default navigation backend: a walkable-point graph with spatial snapping.
//!
//! # Data layout
//!
//! The surface is a graph of walkable sample points in **Compressed Sparse
//! Row (CSR)** format.  Given a `NodeId n`, its outgoing links occupy the
//! slice:
//!
//! ```text
//! edge_to[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! Link iteration is therefore a contiguous memory scan — ideal for the
//! pathfinder's inner loop.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps horizontal `(x, z)` to the nearest node.
//! Snapping is horizontal-only: a point above or below the floor projects
//! straight down/up onto it, matching how click-to-navigate and exhibit
//! anchors are resolved.  Points farther than the snap radius from any node
//! fail to snap — off-mesh positions must be rejected, not teleported.
//!
//! # Cost units
//!
//! Path costs are integer **millimetres** internally, so comparisons are
//! exact and tie-breaking is deterministic.  `NavPath` exposes metres.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use mg_core::{NodeId, Vec3};

use crate::port::{NavPath, NavPoint, NavigationPort};
use crate::{NavError, NavResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: a horizontal `[x, z]` point with
/// the associated `NodeId`.
#[derive(Clone)]
struct NodeEntry {
    point: [f32; 2], // [x, z]
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared horizontal distance — the vertical axis never participates in
    /// snapping.
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.point[0] - point[0];
        let dz = self.point[1] - point[1];
        dx * dx + dz * dz
    }
}

// ── NavSurface ────────────────────────────────────────────────────────────────

/// Walkable-point graph in CSR format plus a spatial index for snapping.
///
/// Do not construct directly; use [`NavSurfaceBuilder`].
pub struct NavSurface {
    /// World position of each sample point.  Indexed by `NodeId`.
    node_pos: Vec<Vec3>,

    /// CSR row pointer.  Outgoing links of node `n` are at positions
    /// `node_out_start[n] .. node_out_start[n+1]` in `edge_to`/`edge_len_mm`.
    /// Length = `node_count + 1`.
    node_out_start: Vec<u32>,

    /// Destination node of each link, sorted by source node.
    edge_to: Vec<NodeId>,

    /// Walk length of each link in millimetres (pathfinder cost).
    edge_len_mm: Vec<u32>,

    /// Maximum horizontal distance a query point may lie from the nearest
    /// sample point and still snap onto the surface.
    snap_radius_m: f32,

    spatial_idx: RTree<NodeEntry>,
}

impl NavSurface {
    /// An empty surface with no walkable area.  Every query fails — useful
    /// as a placeholder and in degradation tests.
    pub fn empty() -> Self {
        NavSurfaceBuilder::new().build()
    }

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn link_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    /// World position of a sample point.
    #[inline]
    pub fn position(&self, node: NodeId) -> Vec3 {
        self.node_pos[node.index()]
    }

    /// Iterator over `(neighbor, length_mm)` of all links out of `node`.
    ///
    /// Contiguous index range — no heap allocation.
    #[inline]
    fn out_links(&self, node: NodeId) -> impl Iterator<Item = (NodeId, u32)> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| (self.edge_to[i], self.edge_len_mm[i]))
    }

    // ── Pathfinding (Dijkstra over CSR) ───────────────────────────────────

    fn shortest_path(&self, from: NodeId, to: NodeId) -> NavResult<NavPath> {
        if from == to {
            return Ok(NavPath {
                corners: vec![self.position(from)],
                length_m: 0.0,
            });
        }

        let n = self.node_count();
        // dist[v] = best known cost (mm) to reach v.
        let mut dist = vec![u32::MAX; n];
        // prev[v] = node that reached v; NodeId::INVALID for unreached nodes.
        let mut prev = vec![NodeId::INVALID; n];

        dist[from.index()] = 0;

        // Min-heap: (cost, node). Reverse makes BinaryHeap (max) behave as
        // min-heap.  Secondary key NodeId ensures deterministic tie-breaking.
        let mut heap: BinaryHeap<Reverse<(u32, NodeId)>> = BinaryHeap::new();
        heap.push(Reverse((0, from)));

        while let Some(Reverse((cost, node))) = heap.pop() {
            if node == to {
                return Ok(self.reconstruct(prev, from, to, cost));
            }

            // Skip stale heap entries.
            if cost > dist[node.index()] {
                continue;
            }

            for (neighbor, len_mm) in self.out_links(node) {
                let new_cost = cost.saturating_add(len_mm);
                if new_cost < dist[neighbor.index()] {
                    dist[neighbor.index()] = new_cost;
                    prev[neighbor.index()] = node;
                    heap.push(Reverse((new_cost, neighbor)));
                }
            }
        }

        Err(NavError::NoPath { from, to })
    }

    fn reconstruct(&self, prev: Vec<NodeId>, from: NodeId, to: NodeId, total_mm: u32) -> NavPath {
        let mut corners = Vec::new();
        let mut cur = to;
        while cur != from {
            corners.push(self.position(cur));
            cur = prev[cur.index()];
        }
        corners.push(self.position(from));
        corners.reverse();
        NavPath {
            corners,
            length_m: total_mm as f32 / 1000.0,
        }
    }
}

impl NavigationPort for NavSurface {
    fn find_closest_point(&self, point: Vec3) -> NavResult<NavPoint> {
        let entry = self
            .spatial_idx
            .nearest_neighbor(&[point.x, point.z])
            .ok_or(NavError::NotFound(point))?;

        let position = self.node_pos[entry.id.index()];
        if position.horizontal_distance(point) > self.snap_radius_m {
            return Err(NavError::NotFound(point));
        }
        Ok(NavPoint { position, node: entry.id })
    }

    fn compute_path(&self, from: &NavPoint, to: &NavPoint) -> NavResult<NavPath> {
        // Foreign or stale NavPoints (another surface, rebuilt mesh) are a
        // routing failure, not a panic.
        if from.node.index() >= self.node_count() || to.node.index() >= self.node_count() {
            return Err(NavError::NoPath { from: from.node, to: to.node });
        }
        self.shortest_path(from.node, to.node)
    }
}

// ── NavSurfaceBuilder ─────────────────────────────────────────────────────────

/// Construct a [`NavSurface`] incrementally, then call [`build`](Self::build).
///
/// The builder accepts sample points and links in any order.  `build()`
/// sorts links by source node, constructs the CSR arrays, and bulk-loads the
/// R-tree.
///
/// # Example
///
/// ```
/// use mg_core::Vec3;
/// use mg_nav::NavSurfaceBuilder;
///
/// let mut b = NavSurfaceBuilder::new();
/// let a = b.add_node(Vec3::new(0.0, 0.0, 0.0));
/// let c = b.add_node(Vec3::new(2.0, 0.0, 0.0));
/// b.link(a, c); // bidirectional, length from positions
/// let surface = b.build();
/// assert_eq!(surface.node_count(), 2);
/// assert_eq!(surface.link_count(), 2);
/// ```
pub struct NavSurfaceBuilder {
    nodes: Vec<Vec3>,
    raw_links: Vec<RawLink>,
    snap_radius_m: f32,
}

struct RawLink {
    from: NodeId,
    to: NodeId,
    len_mm: u32,
}

/// Default snap radius: generous enough for exhibit anchors placed a little
/// off the walkable floor, tight enough to reject points behind walls on a
/// sanely sampled surface.
const DEFAULT_SNAP_RADIUS_M: f32 = 4.0;

impl NavSurfaceBuilder {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            raw_links: Vec::new(),
            snap_radius_m: DEFAULT_SNAP_RADIUS_M,
        }
    }

    /// Pre-allocate for the expected number of points and links.
    pub fn with_capacity(nodes: usize, links: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(nodes),
            raw_links: Vec::with_capacity(links),
            snap_radius_m: DEFAULT_SNAP_RADIUS_M,
        }
    }

    /// Override the horizontal snap radius (metres).
    pub fn snap_radius(mut self, metres: f32) -> Self {
        self.snap_radius_m = metres;
        self
    }

    /// Add a walkable sample point and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, pos: Vec3) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        id
    }

    /// Add a **directed** link from `from` to `to` with the walk length
    /// derived from the node positions.
    pub fn add_directed_link(&mut self, from: NodeId, to: NodeId) {
        let len_m = (self.nodes[to.index()] - self.nodes[from.index()]).length();
        self.raw_links.push(RawLink {
            from,
            to,
            len_mm: (len_m * 1000.0) as u32,
        });
    }

    /// Convenience: link two points in **both directions** (the common case
    /// for open floor).
    pub fn link(&mut self, a: NodeId, b: NodeId) {
        self.add_directed_link(a, b);
        self.add_directed_link(b, a);
    }

    /// Position of a node added earlier.
    pub fn node_pos(&self, id: NodeId) -> Vec3 {
        self.nodes[id.index()]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Consume the builder and produce a [`NavSurface`].
    ///
    /// Time complexity: O(E log E) for the link sort + O(N log N) for R-tree
    /// bulk load.
    pub fn build(self) -> NavSurface {
        let node_count = self.nodes.len();
        let link_count = self.raw_links.len();

        // Sort links by source node for CSR construction.
        let mut raw = self.raw_links;
        raw.sort_unstable_by_key(|l| l.from.0);

        let edge_to: Vec<NodeId> = raw.iter().map(|l| l.to).collect();
        let edge_len_mm: Vec<u32> = raw.iter().map(|l| l.len_mm).collect();

        // Build CSR row pointer.
        let mut node_out_start = vec![0u32; node_count + 1];
        for l in &raw {
            node_out_start[l.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, link_count);

        // Bulk-load R-tree for O(N log N) construction.
        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, &pos)| NodeEntry {
                point: [pos.x, pos.z],
                id: NodeId(i as u32),
            })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        NavSurface {
            node_pos: self.nodes,
            node_out_start,
            edge_to,
            edge_len_mm,
            snap_radius_m: self.snap_radius_m,
            spatial_idx,
        }
    }
}

impl Default for NavSurfaceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
