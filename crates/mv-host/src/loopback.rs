//! In-process transport backed by a pair of `async-channel` queues.
//!
//! The server half ([`LoopbackChannel`]) only uses the non-blocking
//! `try_*` calls so it is safe on the tick thread.  The peer half
//! ([`HostEndpoint`]) may live on another thread and block on
//! [`HostEndpoint::recv_request_blocking`].  Dropping either half closes
//! the link in both directions.

use async_channel::{Receiver, Sender, TryRecvError};
use mv_core::{CorrelationId, Waypoint};

use crate::{HostChannel, HostError, HostResult, Inbound, RequestFrame, ResponseFrame};

/// Create a connected `(server, peer)` pair.
pub fn loopback() -> (LoopbackChannel, HostEndpoint) {
    let (req_tx, req_rx) = async_channel::unbounded();
    let (resp_tx, resp_rx) = async_channel::unbounded();
    (
        LoopbackChannel { outbound: req_tx, inbound: resp_rx, closed: false },
        HostEndpoint { requests: req_rx, responses: resp_tx },
    )
}

// ── Server side ───────────────────────────────────────────────────────────────

pub struct LoopbackChannel {
    outbound: Sender<String>,
    inbound:  Receiver<String>,
    /// Set once `Disconnected` has been reported.
    closed:   bool,
}

impl HostChannel for LoopbackChannel {
    fn send(&mut self, frame: String) -> HostResult<()> {
        self.outbound.try_send(frame).map_err(|_| HostError::Disconnected)
    }

    fn poll(&mut self) -> Vec<Inbound> {
        let mut out = Vec::new();
        if self.closed {
            return out;
        }
        loop {
            match self.inbound.try_recv() {
                Ok(frame) => out.push(Inbound::Frame(frame)),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Closed) => {
                    self.closed = true;
                    out.push(Inbound::Disconnected);
                    break;
                }
            }
        }
        out
    }
}

impl LoopbackChannel {
    /// Close the link from the server side.
    pub fn close(&self) {
        self.outbound.close();
        self.inbound.close();
    }
}

// ── Peer side ─────────────────────────────────────────────────────────────────

/// The host peer's end of a loopback link.
pub struct HostEndpoint {
    requests:  Receiver<String>,
    responses: Sender<String>,
}

impl HostEndpoint {
    /// Next queued request, if any.  `None` when nothing is waiting or the
    /// server has gone away.
    pub fn try_recv_request(&self) -> Option<HostResult<RequestFrame>> {
        let raw = self.requests.try_recv().ok()?;
        Some(RequestFrame::decode(&raw))
    }

    /// Block until a request arrives.  `None` once the server side is closed
    /// and drained.
    pub fn recv_request_blocking(&self) -> Option<HostResult<RequestFrame>> {
        let raw = self.requests.recv_blocking().ok()?;
        Some(RequestFrame::decode(&raw))
    }

    /// Answer request `id`.  `None` means "no path".
    pub fn respond(&self, id: CorrelationId, path: Option<Vec<Waypoint>>) -> HostResult<()> {
        let frame = ResponseFrame { id, path }.encode()?;
        self.send_raw(frame)
    }

    /// Send an arbitrary frame; used to exercise malformed-input handling.
    pub fn send_raw(&self, frame: String) -> HostResult<()> {
        self.responses.try_send(frame).map_err(|_| HostError::Disconnected)
    }

    /// Number of requests waiting to be read.
    pub fn pending_requests(&self) -> usize {
        self.requests.len()
    }
}
