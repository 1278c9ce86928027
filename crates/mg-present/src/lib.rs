//! `mg-present` — turns simulation + tour state into something a renderer
//! can draw.
//!
//! This crate sits strictly on the consuming side of the tour core's
//! read-only contract: it samples [`Crowd`][mg_crowd::Crowd] positions and
//! [`TourState`][mg_tour::TourState] flags every frame and produces a
//! [`Presentation`] — smoothed pose plus an animation cue — without ever
//! mutating either.
//!
//! The one piece of state it owns is the per-entity displayed yaw, needed to
//! rate-limit turning.  While a guide's rotation freeze is active the
//! displayed yaw is the cached hold facing **bit-for-bit**; smoothing only
//! resumes once the freeze elapses.

pub mod pose;


pub use pose::{AnimationCue, Pose, Presentation, PresentationSync};
