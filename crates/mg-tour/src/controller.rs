//! The `TourController` — one tour state machine per guide, advanced once
//! per frame.
//!
//! # State machine
//!
//! ```text
//! start_tour ──▶ Starting ──▶ Moving ──▶ Waiting ──▶ Moving ──▶ … ──▶ Idle
//!                  (once)      ▲  │ arrival  │ hold     next leg
//!                              └──┴──────────┘ expired
//! ```
//!
//! Arrival is detected on **horizontal** distance to the waypoint anchor
//! with a hysteresis band: the single-fire latch set on arrival only clears
//! once the agent wanders beyond `arrival_radius + hysteresis`, so jitter
//! at the threshold cannot re-fire the arrival handling.
//!
//! The controller owns its guide registry outright — no module-level state,
//! so multiple independent controllers can coexist (and be tested) in one
//! process.

use std::collections::BTreeMap;

use tracing::{debug, error, warn};

use mg_core::{AgentId, EntityId, ExhibitId, Seconds, Vec3};
use mg_crowd::{Crowd, CrowdError, ParamsUpdate};
use mg_nav::NavigationPort;

use crate::queue::{ParamFade, Tour};
use crate::{
    ExhibitCatalog, Gait, TourError, TourMode, TourObserver, TourOptions, TourResult, TourState,
    Waypoint,
};

// A leg at least this long is run, shorter ones are walked.
const RUN_PATH_LENGTH_M: f32 = 4.0;

// Movement parameters fade to zero over this long after arrival.
const STOP_FADE_SECS: f64 = 0.3;

// The hold look point sits this far out along the subject's normal.
const FACING_NORMAL_BIAS_M: f32 = 0.5;

// Acceleration ceilings per gait.
const WALK_ACCEL: f32 = 6.0;
const RUN_ACCEL: f32 = 8.0;

// ── GuideEntry ────────────────────────────────────────────────────────────────

/// Registry record for one touring agent.
struct GuideEntry {
    agent: AgentId,
    /// Back-reference to the guide's visual entity.  Never touched here.
    visual: Option<EntityId>,
    walk_speed: f32,
    run_speed: f32,
    /// Presentation-facing flags.  This controller is the only writer.
    state: TourState,
    tour: Option<Tour>,
}

/// What a hold tick decided, computed under the tour borrow and acted on
/// after it ends.
enum HoldOutcome {
    Hold,
    Depart,
    Finish,
}

// ── TourController ────────────────────────────────────────────────────────────

/// Owns the per-guide tour state machines.
#[derive(Default)]
pub struct TourController {
    /// Guides in ascending `AgentId` order — iteration (and therefore the
    /// whole tour layer) is deterministic for a given command sequence.
    guides: BTreeMap<AgentId, GuideEntry>,
}

impl TourController {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Guide registry ────────────────────────────────────────────────────

    /// Register (or re-register) an agent as a tour guide.
    ///
    /// Independent of any tour: entries persist until explicitly
    /// unregistered, and a guide can tour any number of times.
    pub fn register_guide(
        &mut self,
        agent: AgentId,
        visual: Option<EntityId>,
        walk_speed: f32,
        run_speed: f32,
    ) {
        self.guides.insert(
            agent,
            GuideEntry {
                agent,
                visual,
                walk_speed,
                run_speed,
                state: TourState::default(),
                tour: None,
            },
        );
    }

    /// Remove a guide entry (and any active tour with it).
    pub fn unregister_guide(&mut self, agent: AgentId) -> bool {
        self.guides.remove(&agent).is_some()
    }

    pub fn is_guide(&self, agent: AgentId) -> bool {
        self.guides.contains_key(&agent)
    }

    pub fn guide_count(&self) -> usize {
        self.guides.len()
    }

    /// Read-only tour state for presentation and followers.
    pub fn state(&self, agent: AgentId) -> Option<&TourState> {
        self.guides.get(&agent).map(|e| &e.state)
    }

    /// The guide's visual entity back-reference.
    pub fn visual(&self, agent: AgentId) -> Option<EntityId> {
        self.guides.get(&agent).and_then(|e| e.visual)
    }

    pub fn has_tour(&self, agent: AgentId) -> bool {
        self.guides.get(&agent).is_some_and(|e| e.tour.is_some())
    }

    /// `(current index, total stops)` of the active tour.
    pub fn tour_progress(&self, agent: AgentId) -> Option<(usize, usize)> {
        let tour = self.guides.get(&agent)?.tour.as_ref()?;
        Some((tour.index, tour.len()))
    }

    // ── Commands ──────────────────────────────────────────────────────────

    /// Start a tour over `targets`, overwriting any tour in progress.
    ///
    /// Each target is resolved through the catalog and its stand point
    /// snapped onto the surface; unresolvable or off-surface targets are
    /// skipped with a warning.  Fails only when the guide is unknown or
    /// **zero** targets survive — a broken state machine is never created.
    ///
    /// Returns the number of resolved waypoints.
    pub fn start_tour<N: NavigationPort>(
        &mut self,
        agent: AgentId,
        targets: &[ExhibitId],
        catalog: &ExhibitCatalog,
        now: Seconds,
        options: TourOptions,
        crowd: &mut Crowd,
        nav: &N,
    ) -> TourResult<usize> {
        let entry = self
            .guides
            .get_mut(&agent)
            .ok_or(TourError::UnknownGuide(agent))?;

        let mut waypoints = Vec::with_capacity(targets.len());
        for &id in targets {
            let Some(exhibit) = catalog.get(id) else {
                warn!(%id, "start_tour: no exhibit for tour target");
                continue;
            };
            match nav.find_closest_point(exhibit.stand_target) {
                Ok(anchor) => waypoints.push(Waypoint {
                    exhibit: id,
                    anchor,
                    face_target: exhibit.center,
                    surface_normal: exhibit.normal,
                    raw_target: exhibit.stand_target,
                }),
                Err(e) => {
                    warn!(name = %exhibit.name, error = %e, "start_tour: stand point off the surface");
                }
            }
        }
        if waypoints.is_empty() {
            return Err(TourError::NoResolvableTargets);
        }
        let count = waypoints.len();

        entry.tour = Some(Tour::new(waypoints, options, now));
        entry.state.reset();
        entry.state.mode = TourMode::Starting;

        // Kick off the first movement immediately.  The Starting tick
        // re-issues it, which is a harmless duplicate request.
        if let Err(e) = Self::issue_leg(entry, crowd, nav) {
            warn!(%agent, error = %e, "start_tour: initial move request failed; first tick retries");
        }
        debug!(%agent, count, "tour started");
        Ok(count)
    }

    /// Cancel the active tour, clearing every derived flag.
    ///
    /// Safe in any state, including mid-hold: afterwards
    /// `mode == Idle`, `at_destination == false`, and the rotation freeze
    /// and cached facing are gone.  Movement parameters are restored so a
    /// half-faded guide is left steerable.  No-op (`false`) without a tour.
    pub fn stop_tour(&mut self, agent: AgentId, crowd: &mut Crowd) -> bool {
        let Some(entry) = self.guides.get_mut(&agent) else {
            return false;
        };
        if entry.tour.is_none() {
            return false;
        }
        debug!(%agent, "tour stopped");
        entry.tour = None;
        entry.state.reset();
        let _ = crowd.update_parameters(agent, ParamsUpdate::motion(entry.walk_speed, WALK_ACCEL));
        true
    }

    /// Re-anchor the current hold to `hold_secs` from when it began, and
    /// extend the rotation freeze with it.  The narration layer calls this
    /// once it knows the clip length.  `false` unless the guide is holding.
    pub fn set_hold(&mut self, agent: AgentId, hold_secs: f64) -> bool {
        let Some(entry) = self.guides.get_mut(&agent) else {
            return false;
        };
        if entry.state.mode != TourMode::Waiting {
            return false;
        }
        let Some(tour) = entry.tour.as_mut() else {
            return false;
        };
        tour.hold_secs = hold_secs.max(0.1);
        tour.next_action = tour.hold_started + tour.hold_secs;
        if entry.state.facing_yaw.is_some() {
            entry.state.rotation_frozen_until = Some(tour.next_action);
        }
        true
    }

    /// Make the current hold expire now (narration finished early).  The
    /// tour proceeds on the next tick.  `false` unless the guide is holding.
    pub fn release_hold(&mut self, agent: AgentId, now: Seconds) -> bool {
        let Some(entry) = self.guides.get_mut(&agent) else {
            return false;
        };
        if entry.state.mode != TourMode::Waiting {
            return false;
        }
        let Some(tour) = entry.tour.as_mut() else {
            return false;
        };
        tour.next_action = now;
        true
    }

    // ── Frame advance ─────────────────────────────────────────────────────

    /// Advance every active tour by one frame.  Called exactly once per
    /// simulation frame, after `crowd.advance`.
    ///
    /// Tours are independent: a failure in one agent's update is logged and
    /// contained, and the remaining agents still advance this frame.
    pub fn advance_all<N: NavigationPort, O: TourObserver>(
        &mut self,
        now: Seconds,
        crowd: &mut Crowd,
        nav: &N,
        observer: &mut O,
    ) {
        for (&agent, entry) in self.guides.iter_mut() {
            if entry.tour.is_none() {
                continue;
            }
            if let Err(e) = Self::advance_one(entry, now, crowd, nav, observer) {
                error!(%agent, error = %e, "tour advance failed for this agent; continuing");
            }
        }
    }

    fn advance_one<N: NavigationPort, O: TourObserver>(
        entry: &mut GuideEntry,
        now: Seconds,
        crowd: &mut Crowd,
        nav: &N,
        observer: &mut O,
    ) -> TourResult<()> {
        // Defensive queue validation: a malformed tour advances or clamps
        // rather than deadlocking the guide.
        {
            let Some(tour) = entry.tour.as_mut() else {
                return Ok(());
            };
            if tour.waypoints.is_empty() {
                warn!(agent = %entry.agent, "tour queue is empty; tearing down");
                Self::finish(entry, crowd);
                observer.on_tour_finished(entry.agent);
                return Ok(());
            }
            if tour.index >= tour.waypoints.len() {
                warn!(agent = %entry.agent, index = tour.index, "tour index out of range; clamping");
                tour.index = tour.waypoints.len() - 1;
            }
        }

        match entry.state.mode {
            // Runs exactly once per tour.  (Idle with a queue present can
            // only mean external state tampering; treat it as Starting.)
            TourMode::Starting | TourMode::Idle => {
                Self::begin_leg(entry, crowd, nav, observer)
            }
            TourMode::Moving => Self::advance_moving(entry, now, crowd, observer),
            TourMode::Waiting => Self::advance_waiting(entry, now, crowd, nav, observer),
        }
    }

    // ── Moving ────────────────────────────────────────────────────────────

    fn advance_moving<O: TourObserver>(
        entry: &mut GuideEntry,
        now: Seconds,
        crowd: &mut Crowd,
        observer: &mut O,
    ) -> TourResult<()> {
        let pos = crowd.interpolated_position(entry.agent)?;
        let Some(tour) = entry.tour.as_mut() else {
            return Ok(());
        };
        let wp = *tour.current();
        let dist = pos.horizontal_distance(wp.anchor.position);

        // Announce the upcoming stop once per leg — the prefetch hook.
        if let Some(next) = tour.upcoming().copied()
            && tour.announced_next != Some(next.exhibit)
        {
            tour.announced_next = Some(next.exhibit);
            observer.on_approach(entry.agent, &next);
        }

        if dist <= tour.arrival_radius {
            if !tour.arrived_latch {
                tour.arrived_latch = true;
                tour.announced_next = None;

                // Stop dead, then fade the movement ceilings to zero so the
                // separation push cannot drag the guide off its mark.
                crowd.reset_move_target(entry.agent)?;
                let params = crowd.params(entry.agent)?;
                tour.fade = Some(ParamFade {
                    started: now,
                    base_speed: params.max_speed,
                    base_accel: params.max_acceleration,
                });

                // Freeze the hold facing, squared up in front of the subject.
                if let Some(yaw) = hold_facing_yaw(pos, wp.face_target, wp.surface_normal) {
                    entry.state.facing_yaw = Some(yaw);
                    entry.state.rotation_frozen_until = Some(now + tour.hold_secs);
                }

                tour.hold_started = now;
                tour.next_action = now + tour.hold_secs;
                entry.state.mode = TourMode::Waiting;
                entry.state.at_destination = true;
                entry.state.current_exhibit = Some(wp.exhibit);
                entry.state.requested_gait = None;
                debug!(agent = %entry.agent, exhibit = %wp.exhibit, "arrived; holding");
                observer.on_arrival(entry.agent, &wp);
            }
        } else if tour.arrived_latch && dist > tour.arrival_radius + tour.hysteresis() {
            tour.arrived_latch = false;
        }
        Ok(())
    }

    // ── Waiting ───────────────────────────────────────────────────────────

    fn advance_waiting<N: NavigationPort, O: TourObserver>(
        entry: &mut GuideEntry,
        now: Seconds,
        crowd: &mut Crowd,
        nav: &N,
        observer: &mut O,
    ) -> TourResult<()> {
        let outcome = {
            let Some(tour) = entry.tour.as_mut() else {
                return Ok(());
            };

            // Stop-fade tween, evaluated inside the tick (no timers).
            if let Some(fade) = tour.fade {
                let t = ((now - fade.started) / STOP_FADE_SECS).clamp(0.0, 1.0);
                let factor = 1.0 - t as f32;
                crowd.update_parameters(
                    entry.agent,
                    ParamsUpdate::motion(fade.base_speed * factor, fade.base_accel * factor),
                )?;
                if t >= 1.0 {
                    tour.fade = None;
                }
            }

            if now < tour.next_action {
                HoldOutcome::Hold
            } else {
                let next = tour.index + 1;
                if next >= tour.len() {
                    if tour.loop_tour {
                        tour.index = 0;
                        HoldOutcome::Depart
                    } else {
                        HoldOutcome::Finish
                    }
                } else {
                    tour.index = next;
                    HoldOutcome::Depart
                }
            }
        };

        match outcome {
            HoldOutcome::Hold => Ok(()),
            HoldOutcome::Finish => {
                Self::finish(entry, crowd);
                observer.on_tour_finished(entry.agent);
                Ok(())
            }
            HoldOutcome::Depart => Self::begin_leg(entry, crowd, nav, observer),
        }
    }

    // ── Leg issuing ───────────────────────────────────────────────────────

    /// Issue the move request for the current waypoint and enter Moving.
    ///
    /// Unreachable waypoints are skipped (bounded by the queue length);
    /// when nothing remains reachable the tour is torn down rather than
    /// left deadlocked.
    fn begin_leg<N: NavigationPort, O: TourObserver>(
        entry: &mut GuideEntry,
        crowd: &mut Crowd,
        nav: &N,
        observer: &mut O,
    ) -> TourResult<()> {
        let Some(len) = entry.tour.as_ref().map(Tour::len) else {
            return Ok(());
        };

        let mut attempts = 0;
        loop {
            match Self::issue_leg(entry, crowd, nav) {
                Ok(()) => {
                    entry.state.mode = TourMode::Moving;
                    entry.state.at_destination = false;
                    entry.state.current_exhibit = None;
                    return Ok(());
                }
                Err(TourError::Crowd(CrowdError::Routing(e))) => {
                    attempts += 1;
                    let Some(tour) = entry.tour.as_mut() else {
                        return Ok(());
                    };
                    warn!(
                        agent = %entry.agent,
                        index = tour.index,
                        error = %e,
                        "waypoint unreachable; skipping"
                    );
                    let next = tour.index + 1;
                    if attempts >= len || (next >= len && !tour.loop_tour) {
                        Self::finish(entry, crowd);
                        observer.on_tour_finished(entry.agent);
                        return Ok(());
                    }
                    tour.index = if next >= len { 0 } else { next };
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One move request toward the current waypoint, with gait selection
    /// from the path length (forced gait wins when set).
    fn issue_leg<N: NavigationPort>(
        entry: &mut GuideEntry,
        crowd: &mut Crowd,
        nav: &N,
    ) -> TourResult<()> {
        let Some(tour) = entry.tour.as_mut() else {
            return Ok(());
        };
        let anchor = tour.current().anchor;
        let length = crowd.request_move_target(entry.agent, anchor, nav)?;

        let gait = tour.forced_gait.unwrap_or(if length >= RUN_PATH_LENGTH_M {
            Gait::Run
        } else {
            Gait::Walk
        });
        let (speed, accel) = match gait {
            Gait::Walk => (entry.walk_speed, WALK_ACCEL),
            Gait::Run => (entry.run_speed, RUN_ACCEL),
        };
        crowd.update_parameters(entry.agent, ParamsUpdate::motion(speed, accel))?;
        tour.fade = None;
        entry.state.requested_gait = Some(gait);
        debug!(agent = %entry.agent, exhibit = %tour.current().exhibit, ?gait, "tour leg underway");
        Ok(())
    }

    /// Tear the tour down: same flag-clearing effect as `stop_tour`.
    fn finish(entry: &mut GuideEntry, crowd: &mut Crowd) {
        debug!(agent = %entry.agent, "tour finished");
        entry.tour = None;
        entry.state.reset();
        let _ = crowd.update_parameters(
            entry.agent,
            ParamsUpdate::motion(entry.walk_speed, WALK_ACCEL),
        );
    }
}

// ── Hold facing ───────────────────────────────────────────────────────────────

/// Yaw that squares a holding guide up in front of its subject.
///
/// The subject's plane normal may be authored facing either way, so it is
/// reflected toward the agent when the two disagree in sign; the look point
/// then sits slightly out along that normal, which pulls an obliquely
/// approaching guide around to face the piece head-on.
///
/// `None` when the geometry is degenerate (agent exactly at the look
/// point) — the caller then leaves rotation unfrozen.
pub(crate) fn hold_facing_yaw(agent_pos: Vec3, face_target: Vec3, surface_normal: Vec3) -> Option<f32> {
    let mut normal = surface_normal
        .flattened()
        .normalized()
        .unwrap_or(Vec3::new(0.0, 0.0, 1.0));
    let to_agent = (agent_pos - face_target)
        .flattened()
        .normalized()
        .unwrap_or(Vec3::new(0.0, 0.0, 1.0));
    if normal.dot(to_agent) < 0.0 {
        normal = -normal;
    }
    let look_point = face_target + normal * FACING_NORMAL_BIAS_M;
    (look_point - agent_pos).yaw()
}
