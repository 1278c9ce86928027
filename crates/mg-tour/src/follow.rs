//! Companion follow-target resolution.
//!
//! While a visitor avatar accompanies a touring guide, something has to
//! decide *where next to stand*: beside the guide, not inside it, not
//! behind a pillar, and reachable across the surface.  `FollowResolver`
//! makes that choice once per frame with a bounded amount of synchronous
//! geometry:
//!
//! 1. two side candidates (preferred side first — sticky),
//! 2. a fan of six angles around the guide,
//! 3. converging onto the guide's own position as the last resort.
//!
//! A candidate must snap to the surface, be reachable by path from the
//! guide, and have line of sight from the guide (no wall between them).
//! The winning side is remembered so the companion does not flap from hip
//! to hip across frames.

use tracing::debug;

use mg_core::{AgentId, Seconds, Vec3};
use mg_crowd::Crowd;
use mg_nav::{NavPoint, NavigationPort, ObstacleField};

use crate::{TourResult, TourState};

// Lateral stand distance from the guide, metres.
const SIDE_OFFSET_M: f32 = 0.7;

// Small backward offset so the companion never clips the guide's front.
const BACK_OFFSET_M: f32 = 0.12;

// Fan fallback angles relative to the guide's forward, tried in order.
const FAN_ANGLES: [f32; 6] = [
    std::f32::consts::FRAC_PI_6,
    -std::f32::consts::FRAC_PI_6,
    std::f32::consts::FRAC_PI_3,
    -std::f32::consts::FRAC_PI_3,
    std::f32::consts::FRAC_PI_2,
    -std::f32::consts::FRAC_PI_2,
];

// Visibility rays run at chest height and are trimmed at both ends so
// grazing contact with the guide's or companion's own volume never counts.
const CHEST_HEIGHT_M: f32 = 0.5;
const RAY_TRIM_NEAR_M: f32 = 0.02;
const RAY_TRIM_FAR_M: f32 = 0.05;

// ── Side ──────────────────────────────────────────────────────────────────────

/// Which side of the guide the companion stands on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Sign along the guide's lateral axis (`forward × up`).
    fn sign(self) -> f32 {
        match self {
            Side::Right => 1.0,
            Side::Left => -1.0,
        }
    }

    fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Which rung of the fallback ladder produced the move request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FollowOutcome {
    /// A side candidate validated.
    Side(Side),
    /// A fan angle validated.
    Fan(Side),
    /// Nothing validated — converging onto the guide's own position.
    Converged,
}

// ── FollowResolver ────────────────────────────────────────────────────────────

/// Per-companion follow context.  Created when following begins, dropped
/// when it stops; `resolve` is consulted once per frame in between.
pub struct FollowResolver {
    side_offset: f32,
    back_offset: f32,
    /// Last side that validated — tried first next frame.
    preferred: Side,
}

impl Default for FollowResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl FollowResolver {
    pub fn new() -> Self {
        Self {
            side_offset: SIDE_OFFSET_M,
            back_offset: BACK_OFFSET_M,
            preferred: Side::Right,
        }
    }

    /// Override the stand offsets (distances in metres).
    pub fn with_offsets(mut self, side: f32, back: f32) -> Self {
        self.side_offset = side;
        self.back_offset = back;
        self
    }

    /// The sticky side from the last successful resolution.
    pub fn preferred_side(&self) -> Side {
        self.preferred
    }

    /// Pick a stand point near `guide` and issue `companion`'s move request
    /// toward it.
    ///
    /// `guide_state` supplies the frozen hold facing: while the guide
    /// presents, candidates flank its *presentation* forward, so the
    /// companion lines up beside it in front of the exhibit rather than
    /// beside its last walking direction.
    ///
    /// Bounded work — at most 2 + 6 candidate validations, each one snap,
    /// one path query, and one visibility ray; never blocks.
    pub fn resolve<N: NavigationPort, O: ObstacleField>(
        &mut self,
        companion: AgentId,
        guide: AgentId,
        guide_state: Option<&TourState>,
        now: Seconds,
        crowd: &mut Crowd,
        nav: &N,
        obstacles: &O,
    ) -> TourResult<FollowOutcome> {
        let guide_pos = crowd.position(guide)?;

        let forward_yaw = match guide_state {
            Some(st) if st.rotation_frozen(now) => {
                st.facing_yaw.map(Ok).unwrap_or_else(|| crowd.heading(guide))?
            }
            _ => crowd.heading(guide)?,
        };
        let forward = Vec3::from_yaw(forward_yaw);
        let right = forward.cross(Vec3::UP);

        // The guide's own navigable point anchors all path checks (and is
        // the convergence fallback).
        let guide_nav = nav.find_closest_point(guide_pos)?;

        // Rung 1: side candidates, preferred side first.
        for side in [self.preferred, self.preferred.opposite()] {
            let candidate = guide_pos + right * (self.side_offset * side.sign())
                - forward * self.back_offset;
            if let Some(nav_pt) = validate(candidate, guide_pos, &guide_nav, nav, obstacles) {
                crowd.request_move_target(companion, nav_pt, nav)?;
                self.preferred = side;
                return Ok(FollowOutcome::Side(side));
            }
        }

        // Rung 2: fan out around the guide at the side-offset radius.
        for angle in FAN_ANGLES {
            let candidate = guide_pos + forward.rotated_y(angle) * self.side_offset;
            if let Some(nav_pt) = validate(candidate, guide_pos, &guide_nav, nav, obstacles) {
                crowd.request_move_target(companion, nav_pt, nav)?;
                let side = if right.dot(candidate - guide_pos) < 0.0 {
                    Side::Left
                } else {
                    Side::Right
                };
                self.preferred = side;
                debug!(%companion, ?side, "follow fan fallback used");
                return Ok(FollowOutcome::Fan(side));
            }
        }

        // Rung 3: no clear flank anywhere — converge onto the guide itself
        // rather than idling in place.
        crowd.request_move_target(companion, guide_nav, nav)?;
        debug!(%companion, "follow converged onto the guide");
        Ok(FollowOutcome::Converged)
    }
}

/// A candidate is valid iff it snaps onto the surface, is reachable from
/// the guide's navigable point, and the guide has line of sight to it.
fn validate<N: NavigationPort, O: ObstacleField>(
    candidate: Vec3,
    guide_pos: Vec3,
    guide_nav: &NavPoint,
    nav: &N,
    obstacles: &O,
) -> Option<NavPoint> {
    let nav_pt = nav.find_closest_point(candidate).ok()?;
    nav.compute_path(guide_nav, &nav_pt).ok()?;

    let offset = (candidate - guide_pos).flattened();
    let dist = offset.length();
    if dist < 1e-4 {
        return None;
    }
    let dir = offset * (1.0 / dist);
    let origin = guide_pos + Vec3::new(0.0, CHEST_HEIGHT_M, 0.0);
    let near = RAY_TRIM_NEAR_M.min(dist);
    let far = (dist - RAY_TRIM_FAR_M).max(near);
    if obstacles.segment_blocked(origin + dir * near, origin + dir * far) {
        return None;
    }
    Some(nav_pt)
}
