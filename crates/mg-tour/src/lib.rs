//! `mg-tour` — the tour core: per-agent state machines, arrival detection,
//! and follow-target resolution.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                    |
//! |----------------|-------------------------------------------------------------|
//! | [`catalog`]    | `Exhibit`, `ExhibitCatalog` — tour-target lookup            |
//! | [`state`]      | `TourMode`, `Gait`, `TourState` — per-guide presentation state |
//! | [`queue`]      | `Waypoint`, `Tour`, `TourOptions` — the progression queue   |
//! | [`controller`] | `TourController` — start/stop/advance, one state machine per guide |
//! | [`follow`]     | `FollowResolver` — companion stand-point search             |
//! | [`observer`]   | `TourObserver` — arrival/approach/finish notifications      |
//! | [`error`]      | `TourError`, `TourResult<T>`                                |
//!
//! # The frame contract
//!
//! Everything here is driven by one synchronous call per frame:
//!
//! ```text
//! crowd.advance(dt, &nav);                                   // mg-crowd
//! controller.advance_all(clock.now(), &mut crowd, &nav, &mut observer);
//! resolver.resolve(companion, guide, controller.state(guide), clock.now(), …);
//! ```
//!
//! No method blocks, awaits, or reads the wall clock.  Side effects with
//! latency (narration audio, asset prefetch) hang off [`TourObserver`] and
//! are the subscriber's responsibility to defer.
//!
//! Per-agent failures inside `advance_all` are logged and contained: one
//! agent degrading never stops the others, and never unwinds into the frame
//! loop.

pub mod catalog;
pub mod controller;
pub mod error;
pub mod follow;
pub mod observer;
pub mod queue;
pub mod state;


pub use catalog::{Exhibit, ExhibitCatalog};
pub use controller::TourController;
pub use error::{TourError, TourResult};
pub use follow::{FollowOutcome, FollowResolver, Side};
pub use observer::{NoopTourObserver, TourObserver};
pub use queue::{TourOptions, Waypoint};
pub use state::{Gait, TourMode, TourState};
