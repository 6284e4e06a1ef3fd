//! The pathfinding coordinator — issues path requests to the host peer and
//! correlates the answers.

use mv_core::{CorrelationId, MovementConfig, Point2, Tick, Waypoint};
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::protocol::{DecodedResponse, RequestFrame, decode_response};
use crate::{HostChannel, Inbound};

// ── Request / resolution types ────────────────────────────────────────────────

/// Why a path request produced no usable path.
#[derive(Debug, Error, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PathFailure {
    #[error("host found no path")]
    NoPathFound,

    #[error("path request timed out")]
    Timeout,

    #[error("host channel failed")]
    ChannelFailure,

    #[error("malformed host response")]
    Malformed,
}

/// A completed path request: the waypoints (start point excluded) or the
/// reason there are none.
pub type PathOutcome = Result<Box<[Waypoint]>, PathFailure>;

/// One outstanding request, owned by whoever asked for it.
///
/// The coordinator keeps only a `CorrelationId → deadline` entry; everything
/// else here is for the owner.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub id:          CorrelationId,
    pub origin:      Point2,
    pub destination: Point2,
    pub issued_at:   Tick,
    pub deadline:    Tick,
}

/// The answer to one request, produced by [`PathService::poll`].
#[derive(Debug, Clone, PartialEq)]
pub struct PathResolution {
    pub id:      CorrelationId,
    pub outcome: PathOutcome,
}

/// What `find_path` hands back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum PathCall {
    /// Request sent; the answer will come out of a later `poll`.
    InFlight(PendingRequest),
    /// Start and destination coincide.  Nothing was sent.
    AlreadyThere,
    /// Resolved on the spot without a request (the channel is down).
    Failed(PathFailure),
}

// ── PathService trait ─────────────────────────────────────────────────────────

/// Asynchronous path provider consumed by the movement layer.
///
/// [`PathfindingCoordinator`] is the production implementation; tests can
/// substitute a scripted one.
pub trait PathService {
    /// Ask for a path from `from` to `to`.  Never blocks.
    fn find_path(&mut self, from: Point2, to: Point2, now: Tick) -> PathCall;

    /// Drop interest in `id`.  No later `poll` reports it, whether its
    /// answer was still on the wire or already queued.  No-op for unknown ids.
    fn forget(&mut self, id: CorrelationId);

    /// Collect every request that completed since the last poll, including
    /// those whose deadline is `<= now`.
    fn poll(&mut self, now: Tick) -> Vec<PathResolution>;
}

// ── Stats ─────────────────────────────────────────────────────────────────────

/// Running counters, for diagnostics only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinatorStats {
    pub issued:           u64,
    pub resolved:         u64,
    pub no_path:          u64,
    pub timed_out:        u64,
    pub channel_failures: u64,
    pub malformed:        u64,
    /// Responses that matched no tracked id.
    pub stale:            u64,
    pub forgotten:        u64,
}

// ── PathfindingCoordinator ────────────────────────────────────────────────────

/// Table entry for an outstanding request.
#[derive(Debug, Clone, Copy)]
struct InFlight {
    deadline: Tick,
}

/// Issues `find-path` requests over one shared [`HostChannel`] and routes the
/// answers back by correlation id.
///
/// All methods run on the tick thread.  Responses that arrive between polls
/// wait in the channel until the next [`poll`][PathService::poll].
pub struct PathfindingCoordinator<C: HostChannel> {
    channel:        C,
    connected:      bool,
    pub(crate) last_id: CorrelationId,
    in_flight:      FxHashMap<CorrelationId, InFlight>,
    /// Resolutions produced outside `poll`, emitted by the next `poll`.
    ready:          Vec<PathResolution>,
    /// Timeout and trivial-request radius (`arrival_tolerance`).
    config:         MovementConfig,
    stats:          CoordinatorStats,
}

impl<C: HostChannel> PathfindingCoordinator<C> {
    pub fn new(channel: C, config: &MovementConfig) -> Self {
        Self {
            channel,
            connected:      true,
            last_id:        CorrelationId(0),
            in_flight:      FxHashMap::default(),
            ready:          Vec::new(),
            config:         config.clone(),
            stats:          CoordinatorStats::default(),
        }
    }

    /// Number of requests awaiting an answer.
    #[inline]
    pub fn outstanding(&self) -> usize {
        self.in_flight.len()
    }

    #[inline]
    pub fn is_tracking(&self, id: CorrelationId) -> bool {
        self.in_flight.contains_key(&id)
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    #[inline]
    pub fn stats(&self) -> CoordinatorStats {
        self.stats
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Attach a new host peer.
    ///
    /// Every request outstanding on the old channel fails with
    /// `ChannelFailure` (reported by the next `poll`).  Correlation ids keep
    /// counting from where they were, so a late frame from the old peer can
    /// never match a new request.
    pub fn reconnect(&mut self, channel: C) {
        self.fail_all(PathFailure::ChannelFailure);
        self.channel = channel;
        self.connected = true;
        debug!("host channel reattached");
    }

    /// `None` once the id space is used up.
    fn next_id(&mut self) -> Option<CorrelationId> {
        let id = self.last_id.next()?;
        self.last_id = id;
        Some(id)
    }

    /// Fail every outstanding request into the `ready` queue.
    fn fail_all(&mut self, failure: PathFailure) {
        let mut ids: Vec<CorrelationId> = self.in_flight.drain().map(|(id, _)| id).collect();
        ids.sort_unstable();
        for id in ids {
            self.record_failure(failure);
            self.ready.push(PathResolution { id, outcome: Err(failure) });
        }
    }

    fn record_failure(&mut self, failure: PathFailure) {
        match failure {
            PathFailure::NoPathFound    => self.stats.no_path += 1,
            PathFailure::Timeout        => self.stats.timed_out += 1,
            PathFailure::ChannelFailure => self.stats.channel_failures += 1,
            PathFailure::Malformed      => self.stats.malformed += 1,
        }
    }

    fn disconnect(&mut self) {
        if self.connected {
            warn!(outstanding = self.in_flight.len(), "host channel disconnected");
        }
        self.connected = false;
        self.fail_all(PathFailure::ChannelFailure);
    }

    /// Apply one raw response frame.
    fn handle_frame(&mut self, raw: &str) {
        let decoded = match decode_response(raw) {
            Ok(d) => d,
            Err(e) => {
                self.stats.malformed += 1;
                warn!(error = %e, "dropping unreadable host frame");
                return;
            }
        };

        let id = decoded.id();
        if self.in_flight.remove(&id).is_none() {
            self.stats.stale += 1;
            trace!(%id, "ignoring response for untracked request");
            return;
        }

        let outcome = match decoded {
            DecodedResponse::Path { waypoints, .. } => {
                self.stats.resolved += 1;
                debug!(%id, waypoints = waypoints.len(), "path received");
                Ok(waypoints.into_boxed_slice())
            }
            DecodedResponse::NoPath { .. } => {
                self.record_failure(PathFailure::NoPathFound);
                debug!(%id, "host reports no path");
                Err(PathFailure::NoPathFound)
            }
            DecodedResponse::Malformed { reason, .. } => {
                self.record_failure(PathFailure::Malformed);
                warn!(%id, %reason, "malformed path response");
                Err(PathFailure::Malformed)
            }
        };
        self.ready.push(PathResolution { id, outcome });
    }

    /// Time out every request whose deadline is `<= now`, in id order.
    fn expire(&mut self, now: Tick) {
        let mut overdue: Vec<CorrelationId> = self
            .in_flight
            .iter()
            .filter(|(_, entry)| entry.deadline <= now)
            .map(|(&id, _)| id)
            .collect();
        overdue.sort_unstable();

        for id in overdue {
            self.in_flight.remove(&id);
            self.record_failure(PathFailure::Timeout);
            debug!(%id, %now, "path request timed out");
            self.ready.push(PathResolution { id, outcome: Err(PathFailure::Timeout) });
        }
    }
}

impl<C: HostChannel> PathService for PathfindingCoordinator<C> {
    fn find_path(&mut self, from: Point2, to: Point2, now: Tick) -> PathCall {
        if from.distance(to) <= self.config.arrival_tolerance {
            return PathCall::AlreadyThere;
        }
        if !self.connected {
            self.record_failure(PathFailure::ChannelFailure);
            return PathCall::Failed(PathFailure::ChannelFailure);
        }

        let Some(id) = self.next_id() else {
            warn!(last = %self.last_id, "correlation ids exhausted");
            self.record_failure(PathFailure::ChannelFailure);
            return PathCall::Failed(PathFailure::ChannelFailure);
        };
        let frame = match RequestFrame::find_path(id, from, to).encode() {
            Ok(f) => f,
            Err(e) => {
                warn!(%id, error = %e, "could not encode path request");
                self.record_failure(PathFailure::Malformed);
                return PathCall::Failed(PathFailure::Malformed);
            }
        };

        if self.channel.send(frame).is_err() {
            self.record_failure(PathFailure::ChannelFailure);
            self.disconnect();
            return PathCall::Failed(PathFailure::ChannelFailure);
        }

        let deadline = self.config.deadline_from(now);
        self.in_flight.insert(id, InFlight { deadline });
        self.stats.issued += 1;
        debug!(%id, %from, %to, %deadline, "path requested");

        PathCall::InFlight(PendingRequest {
            id,
            origin: from,
            destination: to,
            issued_at: now,
            deadline,
        })
    }

    fn forget(&mut self, id: CorrelationId) {
        let queued = self.ready.len();
        self.ready.retain(|r| r.id != id);
        let was_queued = self.ready.len() != queued;

        if self.in_flight.remove(&id).is_some() || was_queued {
            self.stats.forgotten += 1;
            trace!(%id, was_queued, "request forgotten");
        }
    }

    fn poll(&mut self, now: Tick) -> Vec<PathResolution> {
        if self.connected {
            for inbound in self.channel.poll() {
                match inbound {
                    Inbound::Frame(raw) => self.handle_frame(&raw),
                    Inbound::Disconnected => self.disconnect(),
                }
            }
        }
        self.expire(now);
        std::mem::take(&mut self.ready)
    }
}
