//! `mg-crowd` — agent registry and movement simulation.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                      |
//! |------------|---------------------------------------------------------------|
//! | [`params`] | `AgentParams`, `ParamsUpdate` — per-agent movement tuning     |
//! | [`state`]  | `AgentState` — position, velocity, heading, active path       |
//! | [`crowd`]  | `Crowd` — registry + fixed-substep `advance`                  |
//! | [`error`]  | `CrowdError`, `CrowdResult<T>`                                |
//!
//! # Simulation model
//!
//! `Crowd` owns every simulated agent.  Handles (`AgentId`) are weak: any
//! other component may hold one, and every operation on a despawned agent is
//! an error the caller logs and survives.
//!
//! Movement uses fixed 60 Hz substeps driven by the frame loop's variable
//! `dt` through an accumulator.  Each substep an agent steers toward the
//! next corner of its active path (acceleration-limited, decelerating into
//! the final corner), gets pushed apart from neighbours (local avoidance),
//! integrates, and re-projects its height onto the walkable surface.
//! Between substeps, [`Crowd::interpolated_position`] blends the previous
//! and current positions so a 144 Hz renderer never sees 60 Hz stairsteps.
//!
//! # Cargo features
//!
//! | Feature   | Effect                                                   |
//! |-----------|----------------------------------------------------------|
//! | `fx-hash` | FxHash for the per-step neighbour grid (integer keys).   |
//! | `serde`   | Derives `Serialize`/`Deserialize` on public types.       |

pub mod crowd;
pub mod error;
pub mod params;
pub mod state;

#[cfg(test)]
mod tests;

pub use crowd::Crowd;
pub use error::{CrowdError, CrowdResult};
pub use params::{AgentParams, ParamsUpdate};
pub use state::AgentState;
