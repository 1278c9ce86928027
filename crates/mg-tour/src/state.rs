//! Per-guide tour state as seen by the presentation layer.
//!
//! `TourState` is the read-only contract between the tour core and
//! everything that renders: the controller is the only writer, presentation
//! and followers only read.  A consumer mutating these flags is an
//! invariant break.

use mg_core::{ExhibitId, Seconds};

// ── TourMode ──────────────────────────────────────────────────────────────────

/// Where in the tour state machine a guide currently is.
///
/// Transitions are strictly sequential within one agent:
/// `Starting → Moving → Waiting → Moving → … → Idle`.  No state is skipped.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TourMode {
    /// No active tour.
    #[default]
    Idle,
    /// Tour created; first move request pending.
    Starting,
    /// Underway toward the current waypoint.
    Moving,
    /// Holding at a waypoint (presenting).
    Waiting,
}

// ── Gait ──────────────────────────────────────────────────────────────────────

/// Locomotion speed class requested for the current leg.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Gait {
    Walk,
    Run,
}

// ── TourState ─────────────────────────────────────────────────────────────────

/// Presentation-facing flags for one guide, updated every frame by the
/// controller.
///
/// Invariants (enforced by the controller, asserted in tests):
/// - `at_destination` is `true` **iff** `mode == Waiting`.
/// - `facing_yaw` is set only on the transition into `Waiting` and cleared
///   on tour stop/finish.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TourState {
    pub mode: TourMode,

    /// Speed class of the current leg; `None` while idle or holding.
    pub requested_gait: Option<Gait>,

    /// `true` only while holding at a waypoint.
    pub at_destination: bool,

    /// The exhibit being presented, while holding.
    pub current_exhibit: Option<ExhibitId>,

    /// Orientation frozen onto during the hold (radians about +Y).
    pub facing_yaw: Option<f32>,

    /// While `now` is before this, presentation must not reorient the
    /// entity — it renders exactly `facing_yaw`.
    pub rotation_frozen_until: Option<Seconds>,
}

impl TourState {
    /// `true` while presentation must hold the cached facing.
    pub fn rotation_frozen(&self, now: Seconds) -> bool {
        matches!(self.rotation_frozen_until, Some(until) if now < until)
    }

    /// Clear everything back to idle.  Used on tour stop and natural
    /// completion; afterwards no component can observe a stale frozen state.
    pub(crate) fn reset(&mut self) {
        *self = TourState::default();
    }
}
