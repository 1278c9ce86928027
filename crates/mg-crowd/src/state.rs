//! Per-agent movement state.

use mg_core::Vec3;
use mg_nav::{NavPath, NavPoint};

/// The movement state for a single agent.
///
/// An agent is either **settled** (no active path, decelerating to rest) or
/// **moving** (steering along `path` toward its requested target).  The
/// previous-substep position is retained so the frame loop can interpolate
/// a smooth visual position between fixed substeps.
#[derive(Debug, Clone)]
pub struct AgentState {
    /// Integrated position after the latest substep.
    pub position: Vec3,

    /// Position before the latest substep — interpolation endpoint.
    pub(crate) prev_position: Vec3,

    /// Current velocity in m/s.
    pub velocity: Vec3,

    /// Yaw of the last meaningful movement direction.  Retained while the
    /// agent stands still so "forward" stays defined for followers.
    pub heading: f32,

    /// The path being followed, if any.
    pub(crate) path: Option<ActivePath>,
}

/// Progress along a computed path.
#[derive(Debug, Clone)]
pub(crate) struct ActivePath {
    pub corners: Vec<Vec3>,
    /// Index of the corner currently steered toward.
    pub next: usize,
    /// The requested destination, kept for re-requests and diagnostics.
    pub target: NavPoint,
}

impl AgentState {
    /// A settled agent at `position` facing `heading`.
    pub(crate) fn settled(position: Vec3, heading: f32) -> Self {
        Self {
            position,
            prev_position: position,
            velocity: Vec3::ZERO,
            heading,
            path: None,
        }
    }

    /// `true` while the agent has an unfinished path.
    #[inline]
    pub fn is_moving(&self) -> bool {
        self.path.is_some()
    }

    /// The requested destination, if a move is active.
    pub fn move_target(&self) -> Option<NavPoint> {
        self.path.as_ref().map(|p| p.target)
    }

    pub(crate) fn begin_path(&mut self, path: NavPath, target: NavPoint) {
        // Corner 0 is the snapped stand-node — already (approximately) under
        // the agent's feet.  Steer for the corner after it when one exists.
        let next = usize::from(path.corners.len() > 1);
        self.path = Some(ActivePath { corners: path.corners, next, target });
    }

    pub(crate) fn clear_path(&mut self) {
        self.path = None;
    }
}
