//! Tour event notifications.
//!
//! Narration audio, asset prefetch, and UI captions all key off tour
//! progress, but none of them belong inside the state machine.  The
//! controller emits plain notifications through this trait; subscribers do
//! their own work — and defer anything slow, because these callbacks run
//! inside the frame tick.

use mg_core::AgentId;

use crate::Waypoint;

/// Callbacks invoked by
/// [`TourController::advance_all`][crate::TourController::advance_all] at
/// the tour's notable moments.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — narration trigger
///
/// ```rust,ignore
/// struct Narrator { player: AudioHandle }
///
/// impl TourObserver for Narrator {
///     fn on_approach(&mut self, _guide: AgentId, next: &Waypoint) {
///         self.player.prefetch(next.exhibit); // queued, decoded off-frame
///     }
///     fn on_arrival(&mut self, _guide: AgentId, wp: &Waypoint) {
///         self.player.play(wp.exhibit);
///     }
/// }
/// ```
pub trait TourObserver {
    /// The guide is underway and `next` is the stop after the current one.
    /// Fires once per leg — the hook for prefetching narration/assets.
    /// Never fires for the final stop of a non-looping tour.
    fn on_approach(&mut self, _guide: AgentId, _next: &Waypoint) {}

    /// The guide just arrived and began holding at `waypoint`.  Fires
    /// exactly once per waypoint visit.
    fn on_arrival(&mut self, _guide: AgentId, _waypoint: &Waypoint) {}

    /// A non-looping tour ran out of waypoints and was torn down.
    fn on_tour_finished(&mut self, _guide: AgentId) {}
}

/// A [`TourObserver`] that does nothing.
pub struct NoopTourObserver;

impl TourObserver for NoopTourObserver {}
