//! Navigation-subsystem error type.

use thiserror::Error;

use mg_core::{NodeId, Vec3};

/// Errors produced by `mg-nav`.
///
/// Both variants are expected, recoverable conditions: a snap failure skips
/// that target, a missing path rejects that candidate.  Callers log and
/// continue; nothing here aborts a frame.
#[derive(Debug, Error)]
pub enum NavError {
    #[error("no navigable surface near {0}")]
    NotFound(Vec3),

    #[error("no path from {from} to {to}")]
    NoPath { from: NodeId, to: NodeId },
}

pub type NavResult<T> = Result<T, NavError>;
