//! The `NavigationPort` trait and its result types.
//!
//! # Pluggability
//!
//! The tour core calls navigation exclusively through this trait, so the
//! backend can be swapped without touching any state-machine code: the
//! default [`NavSurface`][crate::NavSurface] graph, a production
//! navigation-mesh engine, or a scripted fake in tests.
//!
//! The two operations are synchronous and bounded by surface complexity;
//! callers issue them freely inside the frame loop.  A failed query this
//! frame is simply retried next frame by virtue of the loop re-running.

use mg_core::{NodeId, Vec3};

use crate::NavResult;

// ── NavPoint ──────────────────────────────────────────────────────────────────

/// A world point that has been snapped onto the navigable surface.
///
/// Only [`NavigationPort::find_closest_point`] constructs these, so holding
/// a `NavPoint` is proof the position is walkable.  The originating surface
/// node is kept for path queries.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavPoint {
    /// Snapped position on the surface.
    pub position: Vec3,
    /// The surface node the position belongs to.
    pub node: NodeId,
}

// ── NavPath ───────────────────────────────────────────────────────────────────

/// The result of a path query: an ordered corner sequence and total length.
///
/// Always non-empty — a same-node query yields a single-corner path of
/// length zero rather than an error.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavPath {
    /// Corners to traverse in order, from start to destination (inclusive).
    pub corners: Vec<Vec3>,
    /// Total walk length in metres.
    pub length_m: f32,
}

impl NavPath {
    /// `true` when start and destination snapped to the same node.
    pub fn is_trivial(&self) -> bool {
        self.corners.len() <= 1
    }

    /// Final corner — the destination position.  A hand-built empty path
    /// reports the origin rather than panicking.
    pub fn destination(&self) -> Vec3 {
        self.corners.last().copied().unwrap_or(Vec3::ZERO)
    }
}

// ── NavigationPort ────────────────────────────────────────────────────────────

/// The navigation capability surface consumed by the tour core.
pub trait NavigationPort {
    /// Snap `point` to the nearest position on the navigable surface.
    ///
    /// Fails with [`NavError::NotFound`][crate::NavError::NotFound] when no
    /// surface exists within the backend's snap range.
    fn find_closest_point(&self, point: Vec3) -> NavResult<NavPoint>;

    /// Compute a walkable path between two snapped points.
    ///
    /// Fails with [`NavError::NoPath`][crate::NavError::NoPath] when the
    /// points lie in disconnected regions.
    fn compute_path(&self, from: &NavPoint, to: &NavPoint) -> NavResult<NavPath>;
}

impl<T: NavigationPort + ?Sized> NavigationPort for &T {
    fn find_closest_point(&self, point: Vec3) -> NavResult<NavPoint> {
        (**self).find_closest_point(point)
    }

    fn compute_path(&self, from: &NavPoint, to: &NavPoint) -> NavResult<NavPath> {
        (**self).compute_path(from, to)
    }
}
