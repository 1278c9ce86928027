//! `mg-nav` — navigable surface, spatial snapping, pathfinding, and
//! obstacle visibility.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`port`]     | `NavigationPort` trait, `NavPoint`, `NavPath`             |
//! | [`surface`]  | `NavSurface` (CSR graph + R-tree), `NavSurfaceBuilder`    |
//! | [`obstacle`] | `ObstacleField` trait, `Aabb`, `AabbObstacleSet`          |
//! | [`error`]    | `NavError`, `NavResult<T>`                                |
//!
//! # The port abstraction
//!
//! Everything above this crate talks to navigation through the
//! [`NavigationPort`] trait: snap a world point to the surface, compute a
//! path between two snapped points.  [`NavSurface`] is the default backend —
//! a graph of walkable sample points with an R-tree for nearest-point
//! queries and Dijkstra for paths.  A production navigation-mesh engine
//! implements the same trait; tests use hand-built surfaces or scripted
//! fakes.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                             |
//! |---------|----------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types. |

pub mod error;
pub mod obstacle;
pub mod port;
pub mod surface;

#[cfg(test)]
mod tests;

pub use error::{NavError, NavResult};
pub use obstacle::{Aabb, AabbObstacleSet, NoopObstacleField, ObstacleField};
pub use port::{NavPath, NavPoint, NavigationPort};
pub use surface::{NavSurface, NavSurfaceBuilder};
