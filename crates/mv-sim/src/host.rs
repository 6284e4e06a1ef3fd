//! A deterministic stand-in for the host peer.
//!
//! `ScriptedHost` sits on the peer side of a loopback link and answers every
//! `find-path` request with a straight line from start to destination.  Answer
//! latency, jitter and loss come from [`ScriptedHostConfig`] and a seeded
//! [`SimRng`], so a run is reproducible for a given seed.
//!
//! Destinations listed in `blocked` get a `null` path.

use std::collections::BTreeMap;

use mv_core::math::lerp;
use mv_core::{CorrelationId, Point2, SimRng, Tick, Waypoint};
use mv_host::{HostEndpoint, HostRequest, RequestFrame};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::{SimObserver, SimResult};

/// Seed offset separating the host's RNG stream from anything else seeded
/// with the same `SimConfig::seed`.
const HOST_STREAM: u64 = 0x4057;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptedHostConfig {
    /// Ticks between receiving a request and answering it.  Default: 2.
    pub latency_ticks: u64,

    /// Extra latency drawn uniformly from `0..=jitter_ticks`.  Default: 0.
    pub jitter_ticks: u64,

    /// Probability that a request is silently dropped.  Default: 0.
    pub loss_probability: f64,

    /// Number of straight segments per path (≥ 1).  Default: 2.
    pub segments: u32,

    /// Destinations the host refuses to route to.
    pub blocked: Vec<Point2>,

    /// Distance within which a destination counts as blocked.  Default: 0.5.
    pub blocked_radius: f32,
}

impl Default for ScriptedHostConfig {
    fn default() -> Self {
        Self {
            latency_ticks:    2,
            jitter_ticks:     0,
            loss_probability: 0.0,
            segments:         2,
            blocked:          Vec::new(),
            blocked_radius:   0.5,
        }
    }
}

/// Counters over the life of a [`ScriptedHost`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptedHostStats {
    pub received: u64,
    pub answered: u64,
    pub refused:  u64,
    pub dropped:  u64,
    /// Frames that could not be decoded.
    pub garbled:  u64,
}

struct Scheduled {
    id:   CorrelationId,
    path: Option<Vec<Waypoint>>,
}

pub struct ScriptedHost {
    endpoint: HostEndpoint,
    config:   ScriptedHostConfig,
    rng:      SimRng,
    /// Answers waiting to go out, keyed by due tick.
    outbox:   BTreeMap<Tick, Vec<Scheduled>>,
    stats:    ScriptedHostStats,
}

impl ScriptedHost {
    pub fn new(endpoint: HostEndpoint, config: ScriptedHostConfig, seed: u64) -> Self {
        let rng = SimRng::new(seed).child(HOST_STREAM);
        Self {
            endpoint,
            config,
            rng,
            outbox: BTreeMap::new(),
            stats:  ScriptedHostStats::default(),
        }
    }

    #[inline]
    pub fn stats(&self) -> ScriptedHostStats {
        self.stats
    }

    /// Answers scheduled but not yet sent.
    pub fn queued(&self) -> usize {
        self.outbox.values().map(Vec::len).sum()
    }

    /// Read every waiting request, then send every answer due at or before
    /// `now`.  Returns the number of frames sent.
    pub fn step(&mut self, now: Tick) -> SimResult<usize> {
        while let Some(decoded) = self.endpoint.try_recv_request() {
            match decoded {
                Ok(frame) => self.schedule(frame, now),
                Err(e) => {
                    self.stats.garbled += 1;
                    warn!(error = %e, "scripted host could not read request");
                }
            }
        }

        let later = self.outbox.split_off(&now.offset(1));
        let due = std::mem::replace(&mut self.outbox, later);

        let mut sent = 0;
        for answer in due.into_values().flatten() {
            self.endpoint.respond(answer.id, answer.path)?;
            sent += 1;
        }
        Ok(sent)
    }

    fn schedule(&mut self, frame: RequestFrame, now: Tick) {
        self.stats.received += 1;
        let HostRequest::FindPath { from, to } = frame.body;

        if self.rng.gen_bool(self.config.loss_probability) {
            self.stats.dropped += 1;
            trace!(id = %frame.id, "scripted host dropped request");
            return;
        }

        let path = if self.is_blocked(to) {
            self.stats.refused += 1;
            None
        } else {
            self.stats.answered += 1;
            Some(straight_line(from, to, self.config.segments))
        };

        let jitter = match self.config.jitter_ticks {
            0 => 0,
            j => self.rng.gen_range(0..=j),
        };
        let due = now.offset(self.config.latency_ticks + jitter);
        debug!(id = %frame.id, %due, routed = path.is_some(), "scripted host answer scheduled");
        self.outbox.entry(due).or_default().push(Scheduled { id: frame.id, path });
    }

    fn is_blocked(&self, destination: Point2) -> bool {
        self.config
            .blocked
            .iter()
            .any(|b| b.distance(destination) <= self.config.blocked_radius)
    }
}

/// Host peers are stepped at the start of every tick so answers due now are
/// visible to that tick's poll.
impl SimObserver for ScriptedHost {
    fn on_tick_start(&mut self, tick: Tick) {
        if let Err(e) = self.step(tick) {
            warn!(error = %e, %tick, "scripted host lost its link");
        }
    }
}

/// `segments` evenly spaced points from `from` to `to`, excluding `from` and
/// ending exactly on `to`.
pub fn straight_line(from: Point2, to: Point2, segments: u32) -> Vec<Waypoint> {
    let n = segments.max(1);
    let mut path: Vec<Waypoint> = (1..n)
        .map(|i| {
            let t = i as f32 / n as f32;
            Point2::new(lerp(from.x, to.x, t), lerp(from.y, to.y, t))
        })
        .collect();
    path.push(to);
    path
}
