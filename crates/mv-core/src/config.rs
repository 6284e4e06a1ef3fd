//! Tunables for movement and the tick loop.
//!
//! Both structs derive `serde` so the application can load them from a JSON
//! file; missing fields fall back to the defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult, SimClock, Tick};

// ── MovementConfig ────────────────────────────────────────────────────────────

/// Per-unit kinematics and path-request policy.
///
/// Shared by every controller in a `MovementSystem`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Travel speed in world units per second.
    pub speed: f32,

    /// Distance under which a waypoint counts as reached.
    pub arrival_tolerance: f32,

    /// Maximum rotation in radians per second.
    pub turn_rate: f32,

    /// Ticks a path request may stay unanswered before it resolves as a
    /// timeout.
    pub path_timeout_ticks: u64,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            speed:              4.0,
            arrival_tolerance:  0.1,
            turn_rate:          std::f32::consts::TAU,
            path_timeout_ticks: 60,
        }
    }
}

impl MovementConfig {
    /// Reject values the kinematics cannot work with.
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(CoreError::Config(format!("speed must be positive, got {}", self.speed)));
        }
        if !(self.arrival_tolerance.is_finite() && self.arrival_tolerance >= 0.0) {
            return Err(CoreError::Config(format!(
                "arrival_tolerance must be non-negative, got {}",
                self.arrival_tolerance
            )));
        }
        if !(self.turn_rate.is_finite() && self.turn_rate > 0.0) {
            return Err(CoreError::Config(format!(
                "turn_rate must be positive, got {}",
                self.turn_rate
            )));
        }
        if self.path_timeout_ticks == 0 {
            return Err(CoreError::Config("path_timeout_ticks must be at least 1".into()));
        }
        Ok(())
    }

    /// Deadline for a request issued at `now`.
    #[inline]
    pub fn deadline_from(&self, now: Tick) -> Tick {
        now.offset(self.path_timeout_ticks)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level server configuration.
///
/// Typically loaded from a JSON file by the application crate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seconds per tick.  Default: 0.05 (20 Hz).
    pub tick_dt_secs: f32,

    /// Total ticks to simulate.  `0` means "until stopped".
    pub total_ticks: u64,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    pub movement: MovementConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_dt_secs: 0.05,
            total_ticks:  0,
            seed:         42,
            movement:     MovementConfig::default(),
        }
    }
}

impl SimConfig {
    /// Parse from a JSON document and validate.
    pub fn from_json_str(s: &str) -> CoreResult<Self> {
        let config: SimConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if !(self.tick_dt_secs.is_finite() && self.tick_dt_secs > 0.0) {
            return Err(CoreError::Config(format!(
                "tick_dt_secs must be positive, got {}",
                self.tick_dt_secs
            )));
        }
        self.movement.validate()
    }

    /// The tick at which the run ends, if bounded.
    #[inline]
    pub fn end_tick(&self) -> Option<Tick> {
        (self.total_ticks > 0).then_some(Tick(self.total_ticks))
    }

    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.tick_dt_secs)
    }
}
