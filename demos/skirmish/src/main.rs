//! skirmish — a small movement server run against a threaded host peer.
//!
//! A handful of units are ordered across an open field.  The host peer lives
//! on its own thread, blocks on the loopback link, and answers each
//! `find-path` request with a straight line unless the destination is inside
//! a blocked zone.  The server side runs the tick loop on the main thread.
//!
//! ```text
//! cargo run -p skirmish                     # built-in scenario
//! cargo run -p skirmish -- scenario.json    # scenario from file
//! RUST_LOG=mv_host=debug cargo run -p skirmish
//! ```

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mv_core::{MovementConfig, Point2, SimConfig, Tick};
use mv_host::{HostEndpoint, HostRequest, PathfindingCoordinator, loopback};
use mv_movement::{MovementEvent, MovementEventKind};
use mv_sim::host::straight_line;
use mv_sim::{Sim, SimObserver};

// ── Scenario ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
struct Order {
    from: Point2,
    to:   Point2,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct Scenario {
    sim:            SimConfig,
    /// Wall-clock delay the peer adds before each answer.
    peer_delay_ms:  u64,
    /// Wall-clock pacing per tick on the server side.
    tick_sleep_ms:  u64,
    /// Destinations within `blocked_radius` of these get no path.
    blocked:        Vec<Point2>,
    blocked_radius: f32,
    segments:       u32,
    orders:         Vec<Order>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            sim: SimConfig {
                tick_dt_secs: 0.05,
                total_ticks:  200,
                seed:         42,
                movement:     MovementConfig { speed: 5.0, ..MovementConfig::default() },
            },
            peer_delay_ms:  3,
            tick_sleep_ms:  1,
            blocked:        vec![Point2::new(-20.0, 0.0)],
            blocked_radius: 2.0,
            segments:       3,
            orders: vec![
                Order { from: Point2::new(0.0, 0.0),  to: Point2::new(15.0, 0.0) },
                Order { from: Point2::new(0.0, 5.0),  to: Point2::new(10.0, 10.0) },
                Order { from: Point2::new(3.0, 3.0),  to: Point2::new(3.0, 3.0) },
                Order { from: Point2::new(5.0, -5.0), to: Point2::new(-20.0, 1.0) },
            ],
        }
    }
}

impl Scenario {
    fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        let scenario: Scenario = serde_json::from_str(&text)
            .with_context(|| format!("parsing scenario {}", path.display()))?;
        scenario.sim.validate()?;
        Ok(scenario)
    }
}

// ── Host peer thread ──────────────────────────────────────────────────────────

fn run_peer(endpoint: HostEndpoint, scenario: Scenario) -> usize {
    let mut answered = 0;
    while let Some(request) = endpoint.recv_request_blocking() {
        let frame = match request {
            Ok(f) => f,
            Err(e) => {
                warn!(error = %e, "peer received unreadable request");
                continue;
            }
        };
        let HostRequest::FindPath { from, to } = frame.body;

        thread::sleep(Duration::from_millis(scenario.peer_delay_ms));
        let blocked = scenario
            .blocked
            .iter()
            .any(|b| b.distance(to) <= scenario.blocked_radius);
        let path = (!blocked).then(|| straight_line(from, to, scenario.segments));

        if endpoint.respond(frame.id, path).is_err() {
            break;
        }
        answered += 1;
    }
    answered
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Tally {
    started: usize,
    arrived: usize,
    failed:  usize,
}

impl SimObserver for Tally {
    fn on_event(&mut self, tick: Tick, event: &MovementEvent) {
        log_event(tick, event);
        match event.kind {
            MovementEventKind::PathStarted { .. } => self.started += 1,
            MovementEventKind::Arrived            => self.arrived += 1,
            MovementEventKind::Failed(_)          => self.failed += 1,
        }
    }
}

fn log_event(tick: Tick, event: &MovementEvent) {
    match event.kind {
        MovementEventKind::PathStarted { waypoints } => {
            info!(%tick, unit = %event.unit, waypoints, "path started");
        }
        MovementEventKind::Arrived => info!(%tick, unit = %event.unit, "arrived"),
        MovementEventKind::Failed(reason) => {
            warn!(%tick, unit = %event.unit, %reason, "movement failed");
        }
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let scenario = match std::env::args().nth(1) {
        Some(path) => Scenario::load(Path::new(&path))?,
        None => Scenario::default(),
    };
    info!(
        units = scenario.orders.len(),
        ticks = scenario.sim.total_ticks,
        "skirmish: authoritative movement demo"
    );

    // 1. Link the server to a host peer on its own thread.
    let (chan, endpoint) = loopback();
    let peer_scenario = scenario.clone();
    let peer = thread::Builder::new()
        .name("host-peer".into())
        .spawn(move || run_peer(endpoint, peer_scenario))?;

    // 2. Build the sim and issue the orders.
    let coordinator = PathfindingCoordinator::new(chan, &scenario.sim.movement);
    let mut sim = Sim::new(scenario.sim.clone(), coordinator)?;
    let mut tally = Tally::default();
    for order in &scenario.orders {
        let unit = sim.spawn_unit(order.from)?;
        if let Some(event) = sim.move_unit(unit, order.to)? {
            tally.on_event(sim.now(), &event);
        }
    }

    // 3. Run, pacing ticks so the peer's answers interleave with motion.
    let t0 = Instant::now();
    let end = scenario.sim.end_tick().unwrap_or(Tick(200));
    while sim.now() < end {
        sim.step(&mut tally);
        if sim.is_settled() {
            break;
        }
        thread::sleep(Duration::from_millis(scenario.tick_sleep_ms));
    }
    let elapsed = t0.elapsed();
    let stats = sim.movement.paths().stats();

    // 4. Final table, then shut the link so the peer thread exits.
    println!();
    println!("{:<10} {:<14} {:<16} {:<8}", "Unit", "State", "Position", "Heading");
    println!("{}", "-".repeat(50));
    for (id, unit) in &sim.units {
        println!(
            "{:<10} {:<14} {:<16} {:<8.2}",
            id.to_string(),
            unit.debug_state,
            unit.position.to_string(),
            unit.orientation,
        );
    }
    println!();
    println!(
        "ran {} ticks ({:.2} s simulated) in {:.3} s | started {} arrived {} failed {}",
        sim.now().0,
        sim.clock.elapsed_secs(),
        elapsed.as_secs_f64(),
        tally.started,
        tally.arrived,
        tally.failed,
    );
    println!(
        "requests issued {} resolved {} no-path {} timed-out {} stale {}",
        stats.issued, stats.resolved, stats.no_path, stats.timed_out, stats.stale,
    );

    drop(sim);
    let answered = peer
        .join()
        .map_err(|_| anyhow::anyhow!("host peer thread panicked"))?;
    info!(answered, "host peer finished");
    Ok(())
}
