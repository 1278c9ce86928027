//! The tour queue: resolved waypoints and per-tour progression state.

use mg_core::{ExhibitId, Seconds, Vec3};
use mg_nav::NavPoint;

use crate::Gait;

// ── Waypoint ──────────────────────────────────────────────────────────────────

/// One resolved tour stop.  Immutable after construction.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Waypoint {
    /// The exhibit this stop presents.
    pub exhibit: ExhibitId,

    /// Stand point snapped onto the navigable surface — the move target.
    pub anchor: NavPoint,

    /// World point the guide orients toward during the hold.
    pub face_target: Vec3,

    /// Outward normal of the subject's plane, used to square up the facing.
    pub surface_normal: Vec3,

    /// The authored stand point before snapping, kept for diagnostics.
    pub raw_target: Vec3,
}

// ── TourOptions ───────────────────────────────────────────────────────────────

/// Caller-tunable knobs for one tour.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TourOptions {
    /// Seconds to present at each waypoint before proceeding.
    pub hold_secs: f64,

    /// Horizontal distance at which a waypoint counts as reached.
    pub arrival_radius: f32,

    /// Wrap to the first waypoint after the last instead of finishing.
    pub loop_tour: bool,

    /// Force a gait for every leg.  `None` selects per leg from path length.
    pub gait: Option<Gait>,
}

impl Default for TourOptions {
    fn default() -> Self {
        Self {
            hold_secs: 3.0,
            arrival_radius: 0.18,
            loop_tour: false,
            gait: None,
        }
    }
}

// ── Tour ──────────────────────────────────────────────────────────────────────

/// Fade of movement parameters to zero after arrival, evaluated inside the
/// frame tick (no timers).
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub(crate) struct ParamFade {
    pub started: Seconds,
    pub base_speed: f32,
    pub base_accel: f32,
}

/// An active tour owned by one guide entry.
///
/// Invariant: `waypoints` is non-empty and `index < waypoints.len()` for as
/// long as the tour exists; an emptied queue tears the tour down instead.
#[derive(Clone, Debug)]
pub(crate) struct Tour {
    pub waypoints: Vec<Waypoint>,
    pub index: usize,
    pub loop_tour: bool,
    pub hold_secs: f64,
    pub arrival_radius: f32,
    pub forced_gait: Option<Gait>,

    /// When the current hold expires and the tour proceeds.
    pub next_action: Seconds,

    /// When the current hold began — `set_hold` re-anchors against this.
    pub hold_started: Seconds,

    /// Single-fire arrival latch.  Set on arrival; cleared only once the
    /// agent wanders beyond `arrival_radius + hysteresis`, so jitter at the
    /// threshold cannot re-fire the arrival handling.
    pub arrived_latch: bool,

    /// Next waypoint already announced via `on_approach` for this leg.
    pub announced_next: Option<ExhibitId>,

    /// In-flight stop fade, while holding.
    pub fade: Option<ParamFade>,
}

impl Tour {
    pub fn new(waypoints: Vec<Waypoint>, options: TourOptions, now: Seconds) -> Self {
        debug_assert!(!waypoints.is_empty());
        Self {
            waypoints,
            index: 0,
            loop_tour: options.loop_tour,
            hold_secs: options.hold_secs,
            arrival_radius: options.arrival_radius,
            forced_gait: options.gait,
            next_action: now,
            hold_started: now,
            arrived_latch: false,
            announced_next: None,
            fade: None,
        }
    }

    /// Hysteresis band beyond the arrival radius: the latch only clears
    /// outside `arrival_radius + hysteresis`.
    pub fn hysteresis(&self) -> f32 {
        (self.arrival_radius * 0.5).max(0.25)
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn current(&self) -> &Waypoint {
        &self.waypoints[self.index]
    }

    /// The upcoming waypoint, if any.  Looping tours intentionally report
    /// `None` past the last stop — the wrap is not known to be wanted until
    /// the hold actually expires.
    pub fn upcoming(&self) -> Option<&Waypoint> {
        self.waypoints.get(self.index + 1)
    }
}
