//! `mv-movement` — per-unit movement state machine and tick driver.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                       |
//! |----------------|----------------------------------------------------------------|
//! | [`unit`]       | `Unit` trait, `BasicUnit`, `UnitRegistry`                      |
//! | [`state`]      | `MovementState`, `PathCursor`                                  |
//! | [`controller`] | `MovementController` — one per unit                            |
//! | [`event`]      | `MovementEvent`, `MovementEventKind`                           |
//! | [`system`]     | `MovementSystem<P>` — owns controllers, routes path answers    |
//! | [`error`]      | `MovementError`, `MovementResult<T>`                           |
//!
//! # State machine
//!
//! ```text
//!             move_to                 path (non-empty)
//!   Idle ───────────────▶ PendingPath ─────────────────▶ Following
//!    ▲  ◀─────────────────┘   │  ▲                          │  │
//!    │   failure / timeout /  │  │ move_to (supersede)      │  │ move_to
//!    │   empty path           └──┘                          │  ▼
//!    │                                                      │ PendingPath
//!    └──────────────────── last waypoint reached ───────────┘
//!
//!   any ── release ──▶ Released (terminal)
//! ```
//!
//! Path answers arrive asynchronously through [`mv_host::PathService::poll`].
//! `MovementSystem::tick` polls first and then moves every unit, so an answer
//! that arrived before a tick is visible to that tick.

pub mod controller;
pub mod error;
pub mod event;
pub mod state;
pub mod system;
pub mod unit;


pub use controller::MovementController;
pub use error::{MovementError, MovementResult};
pub use event::{MovementEvent, MovementEventKind};
pub use state::{MovementState, PathCursor};
pub use system::MovementSystem;
pub use unit::{BasicUnit, Unit, UnitRegistry};
