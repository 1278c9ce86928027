//! `mg-core` — foundational types for the `museum_guide` framework.
//!
//! This crate is a dependency of every other `mg-*` crate.  It intentionally
//! has no `mg-*` dependencies and minimal external ones (only `rand`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module     | Contents                                      |
//! |------------|-----------------------------------------------|
//! | [`ids`]    | `AgentId`, `ExhibitId`, `EntityId`            |
//! | [`geo`]    | `Vec3`, horizontal-plane math, yaw helpers    |
//! | [`time`]   | `Seconds`, `FrameClock`                       |
//! | [`rng`]    | `AgentRng` (per-agent), `WorldRng` (global)   |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|-----------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types. |

pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use geo::Vec3;
pub use ids::{AgentId, EntityId, ExhibitId, NodeId};
pub use rng::{AgentRng, WorldRng};
pub use time::{FrameClock, Seconds};
