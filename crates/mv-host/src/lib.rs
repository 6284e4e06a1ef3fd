//! `mv-host` — delegating pathfinding to the host peer.
//!
//! The server never searches for paths itself.  It asks a single designated
//! host peer and matches the answers back to the units that asked.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                    |
//! |-----------------|-------------------------------------------------------------|
//! | [`protocol`]    | `RequestFrame`, `HostRequest`, `decode_response`            |
//! | [`channel`]     | `HostChannel` trait — the message transport seam            |
//! | [`loopback`]    | `LoopbackChannel` + `HostEndpoint` in-process transport     |
//! | [`coordinator`] | `PathService` trait, `PathfindingCoordinator<C>`            |
//! | [`error`]       | `HostError`, `HostResult<T>`                                |
//!
//! # Request lifecycle
//!
//! ```text
//! find_path(from, to, now)
//!   ├─ from ≈ to           → PathCall::AlreadyThere   (no wire traffic)
//!   ├─ channel down        → PathCall::Failed(ChannelFailure)
//!   └─ send frame{id}      → PathCall::InFlight(PendingRequest{id, deadline})
//!
//! poll(now)
//!   ├─ response{id, path}  → PathResolution{id, Ok(path)}
//!   ├─ response{id, null}  → PathResolution{id, Err(NoPathFound)}
//!   ├─ response{unknown}   → dropped (stale)
//!   ├─ disconnect          → every outstanding id → Err(ChannelFailure)
//!   └─ deadline <= now     → PathResolution{id, Err(Timeout)}
//! ```
//!
//! Every id resolves at most once: its table entry is removed by whichever
//! of the above happens first, and by `forget` when the owner loses
//! interest.

pub mod channel;
pub mod coordinator;
pub mod error;
pub mod loopback;
pub mod protocol;

#[cfg(test)]
mod tests;

pub use channel::{HostChannel, Inbound};
pub use coordinator::{
    CoordinatorStats, PathCall, PathFailure, PathOutcome, PathResolution, PathService,
    PathfindingCoordinator, PendingRequest,
};
pub use error::{HostError, HostResult};
pub use loopback::{HostEndpoint, LoopbackChannel, loopback};
pub use protocol::{DecodedResponse, HostRequest, RequestFrame, ResponseFrame};
