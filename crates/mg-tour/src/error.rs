//! Tour-subsystem error type.

use thiserror::Error;

use mg_core::AgentId;
use mg_crowd::CrowdError;
use mg_nav::NavError;

/// Errors produced by `mg-tour`.
///
/// Inside the frame loop these are caught per agent, logged, and dropped —
/// a tour error degrades one guide for one frame, never the loop.  At the
/// command surface (`start_tour`) they reach the caller so the UI can fail
/// fast instead of entering a broken state machine.
#[derive(Debug, Error)]
pub enum TourError {
    /// The agent was never registered as a guide (or was unregistered).
    #[error("agent {0} is not registered as a guide")]
    UnknownGuide(AgentId),

    /// Every requested tour target was unresolvable or failed to snap.
    #[error("no tour target could be resolved onto the surface")]
    NoResolvableTargets,

    #[error(transparent)]
    Nav(#[from] NavError),

    #[error(transparent)]
    Crowd(#[from] CrowdError),
}

pub type TourResult<T> = Result<T, TourError>;
