//! Crowd-subsystem error type.

use thiserror::Error;

use mg_core::AgentId;
use mg_nav::NavError;

/// Errors produced by `mg-crowd`.
///
/// All of these degrade one agent for one frame; none may abort the frame
/// loop.  Callers log and continue.
#[derive(Debug, Error)]
pub enum CrowdError {
    /// The handle does not (or no longer does) refer to a simulated agent.
    #[error("agent {0} is not in the crowd")]
    AgentNotFound(AgentId),

    /// The agent's own position no longer projects onto the surface, so no
    /// movement can be established from it.
    #[error("agent {0} is off the navigable surface")]
    OffSurface(AgentId),

    /// A navigation query failed while establishing a move.
    #[error("routing failed: {0}")]
    Routing(#[from] NavError),
}

pub type CrowdResult<T> = Result<T, CrowdError>;
