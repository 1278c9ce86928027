//! Deterministic per-agent and world-level RNG wrappers.
//!
//! # Determinism strategy
//!
//! Each agent gets its own independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (agent_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive agent IDs uniformly across the seed space.
//! This means:
//!
//! - Agents never share RNG state (no ordering dependency between agents).
//! - Adding or removing agents does not disturb the streams of existing
//!   agents — a replayed session produces identical crowd behavior.
//!
//! Randomness is used sparingly: separation tie-breaks when two agents
//! occupy the exact same point, and scenario setup in demos.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::AgentId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── AgentRng ──────────────────────────────────────────────────────────────────

/// Per-agent deterministic RNG.
///
/// Created when the agent is registered with the crowd and dropped with it.
pub struct AgentRng(SmallRng);

impl AgentRng {
    /// Seed deterministically from the run's global seed and an agent ID.
    pub fn new(global_seed: u64, agent: AgentId) -> Self {
        let seed = global_seed ^ (agent.0 as u64).wrapping_mul(MIXING_CONSTANT);
        AgentRng(SmallRng::seed_from_u64(seed))
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// A uniformly random heading in `[0, 2π)` — used to break ties when two
    /// agents coincide and no separation direction exists.
    #[inline]
    pub fn random_heading(&mut self) -> f32 {
        self.0.gen_range(0.0..std::f32::consts::TAU)
    }
}

// ── WorldRng ──────────────────────────────────────────────────────────────────

/// World-level RNG for operations not tied to any one agent (scenario
/// generation, spawn placement).  Single-threaded use only.
pub struct WorldRng(SmallRng);

impl WorldRng {
    pub fn new(seed: u64) -> Self {
        WorldRng(SmallRng::seed_from_u64(seed))
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }
}
