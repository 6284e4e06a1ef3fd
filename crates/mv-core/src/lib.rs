//! `mv-core` — foundational types for the authoritative movement server.
//!
//! Every other `mv-*` crate depends on this one.  It has no `mv-*`
//! dependencies of its own.
//!
//! # What lives here
//!
//! | Module      | Contents                                                   |
//! |-------------|------------------------------------------------------------|
//! | [`ids`]     | `UnitId`, `CorrelationId`                                  |
//! | [`geo`]     | `Point2`, `Waypoint`                                       |
//! | [`math`]    | distance, angles, clamp, lerp, angular interpolation       |
//! | [`time`]    | `Tick`, `SimClock`                                         |
//! | [`config`]  | `MovementConfig`, `SimConfig`                              |
//! | [`rng`]     | `SimRng` (seeded, deterministic)                           |
//! | [`error`]   | `CoreError`, `CoreResult`                                  |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod math;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{MovementConfig, SimConfig};
pub use error::{CoreError, CoreResult};
pub use geo::{Point2, Waypoint};
pub use ids::{CorrelationId, UnitId};
pub use rng::SimRng;
pub use time::{SimClock, Tick};
