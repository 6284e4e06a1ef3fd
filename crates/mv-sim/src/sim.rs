//! The `Sim` struct and its tick loop.

use std::collections::BTreeMap;

use mv_core::{Point2, SimClock, SimConfig, Tick, UnitId};
use mv_host::PathService;
use mv_movement::{BasicUnit, MovementEvent, MovementSystem};
use tracing::debug;

use crate::{SimError, SimObserver, SimResult};

/// The main simulation runner.
///
/// `Sim<P>` owns the clock, the unit table and the [`MovementSystem`] and
/// drives them one tick at a time.  `P` is the path provider handed to the
/// movement system; the host peer behind it is not owned by the sim and is
/// usually stepped from an observer (see [`ScriptedHost`][crate::ScriptedHost]).
pub struct Sim<P: PathService> {
    /// Global configuration (tick duration, total ticks, seed, movement).
    pub config: SimConfig,

    /// Simulation clock.  `current_tick` is the next tick to run.
    pub clock: SimClock,

    /// Every live unit, in `UnitId` order.
    pub units: BTreeMap<UnitId, BasicUnit>,

    /// Per-unit movement controllers plus the shared path provider.
    pub movement: MovementSystem<P>,

    /// Next id `spawn_unit` hands out.
    pub(crate) next_unit: u32,
}

impl<P: PathService> Sim<P> {
    /// Validate `config` and build an empty sim around `paths`.
    pub fn new(config: SimConfig, paths: P) -> SimResult<Self> {
        config.validate()?;
        let movement = MovementSystem::new(paths, config.movement.clone())?;
        Ok(Self {
            clock: config.make_clock(),
            config,
            units: BTreeMap::new(),
            movement,
            next_unit: 0,
        })
    }

    // ── Units ─────────────────────────────────────────────────────────────

    /// Create a unit at `position` and give it a movement controller.
    pub fn spawn_unit(&mut self, position: Point2) -> SimResult<UnitId> {
        let id = UnitId(self.next_unit);
        if id == UnitId::INVALID {
            return Err(SimError::UnitIdsExhausted);
        }
        let next = self.next_unit.checked_add(1).ok_or(SimError::UnitIdsExhausted)?;
        self.movement.spawn(id)?;
        self.next_unit = next;
        self.units.insert(id, BasicUnit::new(id, position));
        debug!(unit = %id, %position, "unit spawned");
        Ok(id)
    }

    /// Destroy a unit.  Its pending path request, if any, is forgotten.
    pub fn despawn_unit(&mut self, id: UnitId) -> SimResult<BasicUnit> {
        self.movement.despawn(id)?;
        let unit = self
            .units
            .remove(&id)
            .ok_or(mv_movement::MovementError::UnitMissing(id))?;
        debug!(unit = %id, "unit despawned");
        Ok(unit)
    }

    /// Order `id` toward `destination`, stamped with the current tick.
    ///
    /// Returns the event if the order resolved immediately.
    pub fn move_unit(
        &mut self,
        id:          UnitId,
        destination: Point2,
    ) -> SimResult<Option<MovementEvent>> {
        let now = self.clock.current_tick;
        Ok(self.movement.move_to(&mut self.units, id, destination, now)?)
    }

    /// Halt `id` where it stands.
    pub fn stop_unit(&mut self, id: UnitId) -> SimResult<()> {
        Ok(self.movement.stop(&mut self.units, id)?)
    }

    #[inline]
    pub fn unit(&self, id: UnitId) -> Option<&BasicUnit> {
        self.units.get(&id)
    }

    #[inline]
    pub fn now(&self) -> Tick {
        self.clock.current_tick
    }

    // ── Running ───────────────────────────────────────────────────────────

    /// Run from the current tick to `config.end_tick()`.
    ///
    /// Fails with [`SimError::Unbounded`] when `total_ticks` is 0.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let end = self.config.end_tick().ok_or(SimError::Unbounded)?;
        while self.clock.current_tick < end {
            self.step(observer);
        }
        observer.on_sim_end(self.clock.current_tick);
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) {
        for _ in 0..n {
            self.step(observer);
        }
    }

    /// Run until no unit is waiting on or following a path, or `max_ticks`
    /// pass.  Returns the number of ticks run.
    pub fn run_until_settled<O: SimObserver>(&mut self, max_ticks: u64, observer: &mut O) -> u64 {
        for ran in 0..max_ticks {
            if self.is_settled() {
                return ran;
            }
            self.step(observer);
        }
        max_ticks
    }

    /// `true` when every controller is Idle or Released.
    pub fn is_settled(&self) -> bool {
        self.movement
            .controllers()
            .all(|c| c.is_idle() || c.is_released())
    }

    /// Run one tick and return its events.
    pub fn step<O: SimObserver>(&mut self, observer: &mut O) -> Vec<MovementEvent> {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);

        let events = self.movement.tick(&mut self.units, now, self.clock.dt());
        for event in &events {
            observer.on_event(now, event);
        }

        observer.on_tick_end(now, events.len());
        self.clock.advance();
        events
    }
}
