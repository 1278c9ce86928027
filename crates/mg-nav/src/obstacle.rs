//! Obstacle geometry and straight-line visibility checks.
//!
//! The follow resolver needs one geometric question answered: "does solid
//! geometry block the straight line between these two points?"  In the full
//! application that is a raycast against the scene's collision meshes; here
//! the same contract is the [`ObstacleField`] trait with a default
//! implementation over axis-aligned boxes — statues, benches, partition
//! walls are all box-shaped for this purpose.
//!
//! Broad phase via the same R-tree machinery the surface uses; narrow phase
//! is the slab method for segment-vs-AABB.

use rstar::{AABB, RTree, RTreeObject};

use mg_core::Vec3;

// ── Aabb ──────────────────────────────────────────────────────────────────────

/// An axis-aligned box in world space.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Build from two corners in any order.
    pub fn from_corners(a: Vec3, b: Vec3) -> Self {
        Self {
            min: Vec3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Vec3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Build from a center point and full extents.
    pub fn from_center(center: Vec3, extents: Vec3) -> Self {
        let half = extents * 0.5;
        Self::from_corners(center - half, center + half)
    }

    /// Slab test: does the segment `from → to` pass through this box?
    ///
    /// Touching exactly at the segment endpoints counts as a hit — the
    /// caller trims its segment if grazing contact should be allowed.
    pub fn intersects_segment(&self, from: Vec3, to: Vec3) -> bool {
        let dir = to - from;
        let mut t_min = 0.0_f32;
        let mut t_max = 1.0_f32;

        for (origin, delta, lo, hi) in [
            (from.x, dir.x, self.min.x, self.max.x),
            (from.y, dir.y, self.min.y, self.max.y),
            (from.z, dir.z, self.min.z, self.max.z),
        ] {
            if delta.abs() < 1e-9 {
                // Parallel to this slab: inside or miss entirely.
                if origin < lo || origin > hi {
                    return false;
                }
                continue;
            }
            let inv = 1.0 / delta;
            let (t0, t1) = ((lo - origin) * inv, (hi - origin) * inv);
            let (near, far) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
            t_min = t_min.max(near);
            t_max = t_max.min(far);
            if t_min > t_max {
                return false;
            }
        }
        true
    }
}

// ── ObstacleField ─────────────────────────────────────────────────────────────

/// Straight-line visibility oracle over obstacle geometry.
///
/// "Blocked" is a candidate-rejection signal, never an error: the follow
/// resolver simply tries the next candidate.
pub trait ObstacleField {
    /// `true` if solid geometry blocks the segment `from → to`.
    fn segment_blocked(&self, from: Vec3, to: Vec3) -> bool;
}

impl<T: ObstacleField + ?Sized> ObstacleField for &T {
    fn segment_blocked(&self, from: Vec3, to: Vec3) -> bool {
        (**self).segment_blocked(from, to)
    }
}

/// An [`ObstacleField`] with no geometry — nothing is ever blocked.  Use in
/// tests and scenes with open floors.
pub struct NoopObstacleField;

impl ObstacleField for NoopObstacleField {
    fn segment_blocked(&self, _from: Vec3, _to: Vec3) -> bool {
        false
    }
}

// ── AabbObstacleSet ───────────────────────────────────────────────────────────

/// Entry stored in the obstacle R-tree: the box's horizontal footprint.
struct ObstacleEntry {
    envelope: AABB<[f32; 2]>,
    aabb: Aabb,
}

impl RTreeObject for ObstacleEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// A set of axis-aligned obstacle boxes with an R-tree broad phase.
///
/// Built once at scene-load time; queried by the follow resolver a bounded
/// number of times per frame.
pub struct AabbObstacleSet {
    idx: RTree<ObstacleEntry>,
}

impl AabbObstacleSet {
    /// Bulk-load from a list of boxes.
    pub fn new(boxes: impl IntoIterator<Item = Aabb>) -> Self {
        let entries: Vec<ObstacleEntry> = boxes
            .into_iter()
            .map(|aabb| ObstacleEntry {
                envelope: AABB::from_corners([aabb.min.x, aabb.min.z], [aabb.max.x, aabb.max.z]),
                aabb,
            })
            .collect();
        Self { idx: RTree::bulk_load(entries) }
    }

    pub fn len(&self) -> usize {
        self.idx.size()
    }

    pub fn is_empty(&self) -> bool {
        self.idx.size() == 0
    }
}

impl ObstacleField for AabbObstacleSet {
    fn segment_blocked(&self, from: Vec3, to: Vec3) -> bool {
        // Broad phase: only boxes whose horizontal footprint overlaps the
        // segment's footprint are narrow-phase tested.
        let envelope = AABB::from_corners(
            [from.x.min(to.x), from.z.min(to.z)],
            [from.x.max(to.x), from.z.max(to.z)],
        );
        self.idx
            .locate_in_envelope_intersecting(&envelope)
            .any(|e| e.aabb.intersects_segment(from, to))
    }
}
