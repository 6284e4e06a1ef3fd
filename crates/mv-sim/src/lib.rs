//! `mv-sim` — tick loop and test harness for the movement server.
//!
//! # Tick loop
//!
//! ```text
//! for tick in now..config.end_tick():
//!   ① observer.on_tick_start(tick)   — a ScriptedHost answers requests here
//!   ② MovementSystem::tick           — poll path answers, then move units
//!   ③ observer.on_event(..)          — once per MovementEvent
//!   ④ observer.on_tick_end(tick, n)
//! ```
//!
//! # Crate layout
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`sim`]      | `Sim<P>` — clock, unit table, movement system               |
//! | [`observer`] | `SimObserver` hooks, `NoopObserver`, `EventLog`              |
//! | [`host`]     | `ScriptedHost` — deterministic straight-line host peer       |
//! | [`error`]    | `SimError`, `SimResult<T>`                                   |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use mv_core::SimConfig;
//! use mv_host::{PathfindingCoordinator, loopback};
//! use mv_sim::{ScriptedHost, ScriptedHostConfig, Sim};
//!
//! let config = SimConfig { total_ticks: 200, ..SimConfig::default() };
//! let (chan, endpoint) = loopback();
//! let coordinator = PathfindingCoordinator::new(chan, &config.movement);
//! let mut sim = Sim::new(config.clone(), coordinator)?;
//! let mut host = ScriptedHost::new(endpoint, ScriptedHostConfig::default(), config.seed);
//!
//! let scout = sim.spawn_unit(Point2::ORIGIN)?;
//! sim.move_unit(scout, Point2::new(10.0, 0.0))?;
//! sim.run(&mut host)?;
//! ```

pub mod error;
pub mod host;
pub mod observer;
pub mod sim;


pub use error::{SimError, SimResult};
pub use host::{ScriptedHost, ScriptedHostConfig, ScriptedHostStats};
pub use observer::{EventLog, NoopObserver, SimObserver};
pub use sim::Sim;
