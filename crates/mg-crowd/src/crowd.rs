//! The `Crowd` — agent registry plus the fixed-substep movement simulation.

use std::collections::BTreeMap;

use tracing::warn;

use mg_core::{AgentId, AgentRng, EntityId, Vec3};
use mg_nav::{NavPoint, NavigationPort};

use crate::state::AgentState;
use crate::{AgentParams, CrowdError, CrowdResult, ParamsUpdate};

// Neighbour grid cell size, metres.  Rings of cells are searched, so
// separation ranges larger than one cell still work.
const CELL_M: f32 = 2.0;

// An agent within this horizontal distance of a corner has passed it.
const CORNER_RADIUS_M: f32 = 0.15;

// Deceleration gain into the final corner: desired speed = dist * gain,
// capped at max_speed.  Settles the agent instead of orbiting the target.
const ARRIVE_GAIN: f32 = 4.0;

// Frame deltas above this are clamped (debugger pause, tab switch).
const MAX_FRAME_DT: f32 = 0.25;

// Below this speed the heading is left at its last value.
const HEADING_EPS: f32 = 0.1;

#[cfg(not(feature = "fx-hash"))]
type CellMap = std::collections::HashMap<(i32, i32), Vec<usize>>;
#[cfg(feature = "fx-hash")]
type CellMap = rustc_hash::FxHashMap<(i32, i32), Vec<usize>>;

// ── Slot ──────────────────────────────────────────────────────────────────────

struct AgentSlot {
    state: AgentState,
    params: AgentParams,
    /// Back-reference to the visual entity.  Never dereferenced here.
    visual: Option<EntityId>,
    rng: AgentRng,
}

/// Snapshot row used for neighbour queries while slots are mutably iterated.
struct NeighborSample {
    id: AgentId,
    position: Vec3,
}

// ── Crowd ─────────────────────────────────────────────────────────────────────

/// Owns all simulated agents and advances them through time.
///
/// Handles are weak references: despawned agents make subsequent operations
/// fail with [`CrowdError::AgentNotFound`], never panic.  Iteration order is
/// ascending `AgentId`, so a replayed session integrates identically.
pub struct Crowd {
    slots: BTreeMap<AgentId, AgentSlot>,
    next_id: u32,
    seed: u64,
    fixed_dt: f32,
    max_sub_steps: u32,
    accumulator: f32,
    /// Interpolation fraction into the next substep after the last `advance`.
    alpha: f32,
}

impl Crowd {
    /// A crowd stepping at 60 Hz, at most 4 substeps per frame.
    pub fn new(seed: u64) -> Self {
        Self {
            slots: BTreeMap::new(),
            next_id: 0,
            seed,
            fixed_dt: 1.0 / 60.0,
            max_sub_steps: 4,
            accumulator: 0.0,
            alpha: 0.0,
        }
    }

    /// Override the substep length and per-frame substep budget.
    pub fn with_stepping(mut self, fixed_dt: f32, max_sub_steps: u32) -> Self {
        self.fixed_dt = fixed_dt.max(1e-4);
        self.max_sub_steps = max_sub_steps.max(1);
        self
    }

    // ── Registry ──────────────────────────────────────────────────────────

    /// Spawn an agent at `position` (projected onto the surface).
    ///
    /// Returns `None` when the position does not reach the navigable surface
    /// — logged, non-fatal, matching the "agent simply does not appear"
    /// degradation the frame loop expects.
    pub fn add_agent(
        &mut self,
        position: Vec3,
        params: AgentParams,
        visual: Option<EntityId>,
        nav: &impl NavigationPort,
    ) -> Option<AgentId> {
        let snapped = match nav.find_closest_point(position) {
            Ok(p) => p,
            Err(e) => {
                warn!(%position, error = %e, "add_agent: spawn position is off the surface");
                return None;
            }
        };

        let id = AgentId(self.next_id);
        self.next_id += 1;

        // Keep the requested footprint, take the floor height from the snap.
        let start = Vec3::new(position.x, snapped.position.y, position.z);
        self.slots.insert(
            id,
            AgentSlot {
                state: AgentState::settled(start, 0.0),
                params,
                visual,
                rng: AgentRng::new(self.seed, id),
            },
        );
        Some(id)
    }

    /// Despawn an agent.  Returns `false` if the handle was already gone.
    pub fn remove_agent(&mut self, id: AgentId) -> bool {
        self.slots.remove(&id).is_some()
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.slots.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// All live handles in ascending order.
    pub fn agent_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.slots.keys().copied()
    }

    fn slot(&self, id: AgentId) -> CrowdResult<&AgentSlot> {
        self.slots.get(&id).ok_or(CrowdError::AgentNotFound(id))
    }

    fn slot_mut(&mut self, id: AgentId) -> CrowdResult<&mut AgentSlot> {
        self.slots.get_mut(&id).ok_or(CrowdError::AgentNotFound(id))
    }

    // ── Per-agent queries ─────────────────────────────────────────────────

    pub fn state(&self, id: AgentId) -> CrowdResult<&AgentState> {
        Ok(&self.slot(id)?.state)
    }

    /// Raw position after the latest substep.
    pub fn position(&self, id: AgentId) -> CrowdResult<Vec3> {
        Ok(self.slot(id)?.state.position)
    }

    /// Render-smooth position: previous and current substep blended by the
    /// frame accumulator.
    pub fn interpolated_position(&self, id: AgentId) -> CrowdResult<Vec3> {
        let state = &self.slot(id)?.state;
        Ok(state.prev_position.lerp(state.position, self.alpha))
    }

    pub fn velocity(&self, id: AgentId) -> CrowdResult<Vec3> {
        Ok(self.slot(id)?.state.velocity)
    }

    /// Yaw of the last meaningful movement direction.
    pub fn heading(&self, id: AgentId) -> CrowdResult<f32> {
        Ok(self.slot(id)?.state.heading)
    }

    pub fn params(&self, id: AgentId) -> CrowdResult<AgentParams> {
        Ok(self.slot(id)?.params)
    }

    pub fn visual(&self, id: AgentId) -> CrowdResult<Option<EntityId>> {
        Ok(self.slot(id)?.visual)
    }

    // ── Per-agent commands ────────────────────────────────────────────────

    /// Steer the agent along a fresh path to `target`.
    ///
    /// Returns the path length in metres (the gait layer picks walk vs run
    /// from it).  Fails if the agent is gone, its own position no longer
    /// projects onto the surface, or no route exists.
    pub fn request_move_target(
        &mut self,
        id: AgentId,
        target: NavPoint,
        nav: &impl NavigationPort,
    ) -> CrowdResult<f32> {
        let slot = self.slots.get_mut(&id).ok_or(CrowdError::AgentNotFound(id))?;
        let start = nav
            .find_closest_point(slot.state.position)
            .map_err(|_| CrowdError::OffSurface(id))?;
        let path = nav.compute_path(&start, &target)?;
        let length = path.length_m;
        slot.state.begin_path(path, target);
        Ok(length)
    }

    /// Drop the active path and stop dead.  Used on tour arrival so the
    /// agent cannot overshoot its stand point.
    pub fn reset_move_target(&mut self, id: AgentId) -> CrowdResult<()> {
        let slot = self.slot_mut(id)?;
        slot.state.clear_path();
        slot.state.velocity = Vec3::ZERO;
        Ok(())
    }

    /// Merge a partial parameter update.
    pub fn update_parameters(&mut self, id: AgentId, update: ParamsUpdate) -> CrowdResult<()> {
        update.apply_to(&mut self.slot_mut(id)?.params);
        Ok(())
    }

    /// Place the agent at `position` instantly (initial alignment of an
    /// avatar with its model).  Clears any active path.
    pub fn teleport(
        &mut self,
        id: AgentId,
        position: Vec3,
        nav: &impl NavigationPort,
    ) -> CrowdResult<()> {
        let snapped = nav
            .find_closest_point(position)
            .map_err(|_| CrowdError::OffSurface(id))?;
        let slot = self.slot_mut(id)?;
        let pos = Vec3::new(position.x, snapped.position.y, position.z);
        slot.state.position = pos;
        slot.state.prev_position = pos;
        slot.state.velocity = Vec3::ZERO;
        slot.state.clear_path();
        Ok(())
    }

    // ── Simulation advance ────────────────────────────────────────────────

    /// Advance all agents by one frame delta.
    ///
    /// Runs fixed substeps from an accumulator (at most `max_sub_steps`; a
    /// longer stall drops the backlog rather than spiralling), then records
    /// the interpolation fraction for [`interpolated_position`].
    ///
    /// [`interpolated_position`]: Crowd::interpolated_position
    pub fn advance(&mut self, dt: f32, nav: &impl NavigationPort) {
        self.accumulator += dt.clamp(0.0, MAX_FRAME_DT);

        let mut steps = 0;
        while self.accumulator >= self.fixed_dt && steps < self.max_sub_steps {
            self.step_once(self.fixed_dt, nav);
            self.accumulator -= self.fixed_dt;
            steps += 1;
        }
        if self.accumulator >= self.fixed_dt {
            // Out of substep budget: drop the remaining backlog.
            self.accumulator %= self.fixed_dt;
        }
        self.alpha = (self.accumulator / self.fixed_dt).clamp(0.0, 1.0);
    }

    fn step_once(&mut self, h: f32, nav: &impl NavigationPort) {
        // Phase 0: snapshot positions into a neighbour grid so the mutable
        // integration pass below reads a consistent previous-step world.
        let samples: Vec<NeighborSample> = self
            .slots
            .iter()
            .map(|(&id, s)| NeighborSample { id, position: s.state.position })
            .collect();

        let mut grid = CellMap::default();
        for (i, s) in samples.iter().enumerate() {
            grid.entry(cell_of(s.position)).or_default().push(i);
        }

        // Phase 1: integrate every agent in ascending id order.
        for (&id, slot) in self.slots.iter_mut() {
            let AgentSlot { state, params, rng, .. } = slot;
            state.prev_position = state.position;

            // Steering toward the active path's next corner.
            let mut desired = Vec3::ZERO;
            let mut finished = false;
            if let Some(path) = state.path.as_mut() {
                while path.next + 1 < path.corners.len()
                    && state.position.horizontal_distance(path.corners[path.next])
                        <= CORNER_RADIUS_M
                {
                    path.next += 1;
                }
                let corner = path.corners[path.next];
                let dist = state.position.horizontal_distance(corner);
                let last = path.next + 1 == path.corners.len();

                if last && dist <= CORNER_RADIUS_M {
                    finished = true;
                } else {
                    match (corner - state.position).flattened().normalized() {
                        Some(dir) => {
                            let speed = if last {
                                params.max_speed.min(dist * ARRIVE_GAIN)
                            } else {
                                params.max_speed
                            };
                            desired = dir * speed;
                        }
                        // Directly underneath/above the corner.
                        None => finished = last,
                    }
                }
            }
            if finished {
                state.clear_path();
            }

            // Local avoidance: push away from neighbours.
            if params.separation_weight > 0.0 {
                let range = params.separation_range.max(2.0 * params.radius);
                let mut push = Vec3::ZERO;
                let mut coincident = false;

                let home = cell_of(state.position);
                let rings = (range / CELL_M).ceil() as i32;
                for cx in (home.0 - rings)..=(home.0 + rings) {
                    for cz in (home.1 - rings)..=(home.1 + rings) {
                        let Some(indices) = grid.get(&(cx, cz)) else { continue };
                        for &i in indices {
                            let other = &samples[i];
                            if other.id == id {
                                continue;
                            }
                            let d = state.position.horizontal_distance(other.position);
                            if d >= range {
                                continue;
                            }
                            if d < 1e-4 {
                                coincident = true;
                                continue;
                            }
                            let away = (state.position - other.position).flattened() * (1.0 / d);
                            push += away * (1.0 - d / range);
                        }
                    }
                }
                if coincident {
                    // Exact overlap has no separation direction; break the
                    // tie with the agent's own deterministic stream.
                    push += Vec3::from_yaw(rng.random_heading());
                }
                desired += push * params.separation_weight;
            }

            // Never ask for more than the speed ceiling, however hard the
            // neighbours push — a zero-speed holding agent must stay put.
            desired = clamp_length(desired, params.max_speed);

            // Acceleration-limited velocity change, then integrate.
            let dv = clamp_length(desired - state.velocity, params.max_acceleration * h);
            state.velocity = (state.velocity + dv).flattened();
            state.position += state.velocity * h;

            if state.velocity.length() > HEADING_EPS
                && let Some(yaw) = state.velocity.yaw()
            {
                state.heading = yaw;
            }

            // Re-project height onto the walkable surface.  Off-surface is
            // transient (mid-push between samples); keep the last height.
            if let Ok(np) = nav.find_closest_point(state.position) {
                state.position.y = np.position.y;
            }
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

#[inline]
fn cell_of(p: Vec3) -> (i32, i32) {
    ((p.x / CELL_M).floor() as i32, (p.z / CELL_M).floor() as i32)
}

/// Scale `v` down to `max` length if it exceeds it.
fn clamp_length(v: Vec3, max: f32) -> Vec3 {
    let len = v.length();
    if len > max && len > 1e-6 {
        v * (max / len)
    } else {
        v
    }
}
