//! The transport seam between the server and the host peer.

use crate::HostResult;

/// Something read off the channel during a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// One raw response frame.
    Frame(String),
    /// The peer went away.  Reported once; the channel is dead afterwards.
    Disconnected,
}

/// Bidirectional message channel to one designated host peer.
///
/// Shared by every request the coordinator issues; there is no per-request
/// channel.  Implementations must never block: `send` queues, `poll` returns
/// whatever has arrived so far.
///
/// The real network transport lives outside this workspace; implement this
/// trait over it.  [`LoopbackChannel`][crate::LoopbackChannel] is the
/// in-process implementation used by tests and the demo.
pub trait HostChannel {
    /// Queue one request frame for the peer.
    ///
    /// Returns [`HostError::Disconnected`][crate::HostError::Disconnected] if
    /// the peer is gone.
    fn send(&mut self, frame: String) -> HostResult<()>;

    /// Drain everything received since the last poll, in arrival order.
    fn poll(&mut self) -> Vec<Inbound>;
}
