//! The per-tick movement driver.

use std::collections::BTreeMap;

use mv_core::{CorrelationId, MovementConfig, Point2, Tick, UnitId};
use mv_host::PathService;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::{
    MovementController, MovementError, MovementEvent, MovementResult, Unit, UnitRegistry,
};

/// Owns one [`MovementController`] per live unit plus the shared
/// [`PathService`], and drives them once per simulation step.
///
/// # Type parameter
///
/// `P` is the path provider, normally
/// [`mv_host::PathfindingCoordinator`] over the real host channel.
///
/// # Tick order
///
/// [`tick`][Self::tick] first polls `P` and hands every answer to the
/// controller that asked for it, then advances all controllers in ascending
/// `UnitId` order.  Nothing here is shared across threads.
pub struct MovementSystem<P: PathService> {
    paths:       P,
    config:      MovementConfig,
    controllers: BTreeMap<UnitId, MovementController>,
    /// Which unit is waiting on which request.
    owners:      FxHashMap<CorrelationId, UnitId>,
}

impl<P: PathService> MovementSystem<P> {
    pub fn new(paths: P, config: MovementConfig) -> MovementResult<Self> {
        config.validate()?;
        Ok(Self {
            paths,
            config,
            controllers: BTreeMap::new(),
            owners:      FxHashMap::default(),
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Create the controller for a newly created unit.
    pub fn spawn(&mut self, unit: UnitId) -> MovementResult<()> {
        if self.controllers.contains_key(&unit) {
            return Err(MovementError::DuplicateUnit(unit));
        }
        self.controllers.insert(unit, MovementController::new(unit));
        Ok(())
    }

    /// Release and drop the controller of a destroyed unit.
    pub fn despawn(&mut self, unit: UnitId) -> MovementResult<()> {
        let mut controller = self
            .controllers
            .remove(&unit)
            .ok_or(MovementError::UnknownUnit(unit))?;
        self.untrack(&controller);
        controller.release(&mut self.paths);
        debug!(%unit, "movement controller released");
        Ok(())
    }

    // ── Commands ──────────────────────────────────────────────────────────

    /// Send `unit` toward `destination`.  See [`MovementController::move_to`].
    pub fn move_to<R: UnitRegistry>(
        &mut self,
        units:       &mut R,
        unit:        UnitId,
        destination: Point2,
        now:         Tick,
    ) -> MovementResult<Option<MovementEvent>> {
        let controller = self
            .controllers
            .get_mut(&unit)
            .ok_or(MovementError::UnknownUnit(unit))?;
        let body = units.unit_mut(unit).ok_or(MovementError::UnitMissing(unit))?;

        if let Some(old) = controller.pending_id() {
            self.owners.remove(&old);
        }
        let event = controller.move_to(&*body, destination, &mut self.paths, now);
        if let Some(id) = controller.pending_id() {
            self.owners.insert(id, unit);
        }
        body.set_debug_state(controller.state().label());
        Ok(event)
    }

    /// Halt `unit` where it stands.
    pub fn stop<R: UnitRegistry>(&mut self, units: &mut R, unit: UnitId) -> MovementResult<()> {
        let controller = self
            .controllers
            .get_mut(&unit)
            .ok_or(MovementError::UnknownUnit(unit))?;
        if let Some(old) = controller.pending_id() {
            self.owners.remove(&old);
        }
        controller.stop(&mut self.paths);
        if let Some(body) = units.unit_mut(unit) {
            body.set_debug_state(controller.state().label());
        }
        Ok(())
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    /// Run one simulation step of `dt` seconds at tick `now`.
    ///
    /// Returns every movement event produced this step: path answers first
    /// (in the order the coordinator produced them), then arrivals in
    /// `UnitId` order.  Controllers whose unit is missing from `units` are
    /// skipped for motion but still receive their path answers.
    pub fn tick<R: UnitRegistry>(
        &mut self,
        units: &mut R,
        now:   Tick,
        dt:    f32,
    ) -> Vec<MovementEvent> {
        let mut events = Vec::new();

        // ── Phase 1: path answers ─────────────────────────────────────────
        for resolution in self.paths.poll(now) {
            let Some(unit) = self.owners.remove(&resolution.id) else {
                trace!(id = %resolution.id, "path answer has no owner");
                continue;
            };
            let Some(controller) = self.controllers.get_mut(&unit) else {
                continue;
            };
            if let Some(event) = controller.resolve(resolution) {
                events.push(event);
            }
            if let Some(body) = units.unit_mut(unit) {
                body.set_debug_state(controller.state().label());
            }
        }

        // ── Phase 2: motion ───────────────────────────────────────────────
        let config = &self.config;
        for (&id, controller) in self.controllers.iter_mut() {
            let Some(body) = units.unit_mut(id) else {
                continue;
            };
            if let Some(event) = controller.tick(body, dt, config) {
                body.set_debug_state(controller.state().label());
                events.push(event);
            }
        }

        events
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn controller(&self, unit: UnitId) -> Option<&MovementController> {
        self.controllers.get(&unit)
    }

    /// All controllers in `UnitId` order.
    pub fn controllers(&self) -> impl Iterator<Item = &MovementController> {
        self.controllers.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    /// Units currently waiting on a path.
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.owners.len()
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    pub fn paths(&self) -> &P {
        &self.paths
    }

    pub fn paths_mut(&mut self) -> &mut P {
        &mut self.paths
    }

    fn untrack(&mut self, controller: &MovementController) {
        if let Some(id) = controller.pending_id() {
            self.owners.remove(&id);
        }
    }
}
