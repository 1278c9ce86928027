//! Per-agent movement tuning.

/// Movement parameters for one simulated agent.
///
/// Defaults suit a museum NPC; the companion avatar and visitor agents
/// override what they need at spawn time.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentParams {
    /// Body radius in metres — the personal-space floor for separation.
    pub radius: f32,

    /// Body height in metres.  Not used by the integrator; the presentation
    /// layer derives eye/chest anchors from it.
    pub height: f32,

    /// Top speed in m/s.  The gait layer rewrites this per leg (walk vs run).
    pub max_speed: f32,

    /// Velocity change ceiling in m/s².
    pub max_acceleration: f32,

    /// Neighbour search radius for separation, metres.
    pub separation_range: f32,

    /// Strength of the separation push.  0 disables local avoidance.
    pub separation_weight: f32,
}

impl Default for AgentParams {
    fn default() -> Self {
        Self {
            radius: 0.5,
            height: 2.0,
            max_speed: 3.5,
            max_acceleration: 8.0,
            separation_range: 1.0,
            separation_weight: 2.0,
        }
    }
}

/// A partial update to [`AgentParams`] — only the fields the caller sets are
/// touched.  Used by the gait layer and the hold stop-fade.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParamsUpdate {
    pub max_speed: Option<f32>,
    pub max_acceleration: Option<f32>,
}

impl ParamsUpdate {
    /// Update only the speed ceiling.
    pub fn speed(max_speed: f32) -> Self {
        Self { max_speed: Some(max_speed), ..Self::default() }
    }

    /// Update speed and acceleration together.
    pub fn motion(max_speed: f32, max_acceleration: f32) -> Self {
        Self {
            max_speed: Some(max_speed),
            max_acceleration: Some(max_acceleration),
        }
    }

    /// Apply onto a params record.
    pub(crate) fn apply_to(self, params: &mut AgentParams) {
        if let Some(v) = self.max_speed {
            params.max_speed = v.max(0.0);
        }
        if let Some(v) = self.max_acceleration {
            params.max_acceleration = v.max(0.0);
        }
    }
}
