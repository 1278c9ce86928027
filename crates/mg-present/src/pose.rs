//! Per-frame pose and animation sampling.

use std::collections::BTreeMap;

use mg_core::{AgentId, Seconds, Vec3};
use mg_crowd::Crowd;
use mg_tour::{Gait, TourState};

// Turn rate while rotation is not frozen, radians per second.
const TURN_SPEED: f32 = 6.0;

// Below this speed the entity is presented as standing.
const IDLE_SPEED: f32 = 0.1;

// Agents without a tour gait are presented as running above this speed.
const RUN_SPEED: f32 = 3.0;

// ── Output types ──────────────────────────────────────────────────────────────

/// Where and how the entity stands this frame.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    /// Interpolated simulation position.  The renderer adds its model's own
    /// foot offset.
    pub position: Vec3,
    /// Displayed yaw (radians about +Y).
    pub yaw: f32,
}

/// Which locomotion animation to blend toward.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnimationCue {
    Idle,
    Walk,
    Run,
}

/// One frame's presentation sample for one entity.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Presentation {
    pub pose: Pose,
    pub cue: AnimationCue,
    /// Camera/look anchor height above the feet, from the agent's body
    /// height.
    pub eye_height: f32,
}

// ── PresentationSync ──────────────────────────────────────────────────────────

/// Samples crowd + tour state into render-ready poses.
///
/// Holds only the displayed yaw per agent (for rate-limited turning).
/// Forgetting a despawned agent is the caller's job via [`forget`].
///
/// [`forget`]: PresentationSync::forget
#[derive(Default)]
pub struct PresentationSync {
    displayed_yaw: BTreeMap<AgentId, f32>,
}

impl PresentationSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop cached smoothing state for a despawned agent.
    pub fn forget(&mut self, agent: AgentId) {
        self.displayed_yaw.remove(&agent);
    }

    /// Sample one entity.  Returns `None` when the agent is gone from the
    /// simulation (renderer hides the model).
    ///
    /// `tour_state` is the guide's read-only state, or `None` for plain
    /// agents (visitors, the companion avatar).
    pub fn sample(
        &mut self,
        agent: AgentId,
        tour_state: Option<&TourState>,
        crowd: &Crowd,
        now: Seconds,
        dt: f32,
    ) -> Option<Presentation> {
        let position = crowd.interpolated_position(agent).ok()?;
        let velocity = crowd.velocity(agent).ok()?;
        let heading = crowd.heading(agent).ok()?;
        let params = crowd.params(agent).ok()?;
        let speed = velocity.length();

        // Rotation: frozen hold facing wins, exactly; otherwise turn toward
        // the movement heading at a bounded rate.
        let frozen_yaw = tour_state
            .filter(|st| st.rotation_frozen(now))
            .and_then(|st| st.facing_yaw);
        let yaw = match frozen_yaw {
            Some(yaw) => {
                self.displayed_yaw.insert(agent, yaw);
                yaw
            }
            None => {
                let current = self.displayed_yaw.get(&agent).copied().unwrap_or(heading);
                let stepped = step_yaw(current, heading, TURN_SPEED * dt);
                self.displayed_yaw.insert(agent, stepped);
                stepped
            }
        };

        let gait = tour_state.and_then(|st| st.requested_gait);
        let cue = if speed < IDLE_SPEED {
            AnimationCue::Idle
        } else if gait == Some(Gait::Run) || (gait.is_none() && speed >= RUN_SPEED) {
            AnimationCue::Run
        } else {
            AnimationCue::Walk
        };

        Some(Presentation {
            pose: Pose { position, yaw },
            cue,
            eye_height: params.height * 0.9,
        })
    }
}

/// Step `current` toward `target` by at most `max_step`, along the shorter
/// way around the circle.
pub(crate) fn step_yaw(current: f32, target: f32, max_step: f32) -> f32 {
    let mut diff = (target - current) % std::f32::consts::TAU;
    if diff > std::f32::consts::PI {
        diff -= std::f32::consts::TAU;
    } else if diff < -std::f32::consts::PI {
        diff += std::f32::consts::TAU;
    }
    current + diff.clamp(-max_step, max_step)
}
