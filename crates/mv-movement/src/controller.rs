//! The per-unit movement controller.

use mv_core::math::rotate_toward;
use mv_core::{CorrelationId, MovementConfig, Point2, Tick, UnitId, Waypoint};
use mv_host::{PathCall, PathFailure, PathResolution, PathService, PendingRequest};
use tracing::{debug, trace};

use crate::{MovementEvent, MovementEventKind, MovementState, PathCursor, Unit};

/// Turns destination requests into per-tick motion for one unit.
///
/// The controller owns its unit's [`MovementState`] and nothing else: the
/// unit itself is passed in by the caller on every operation that needs it,
/// and path requests go through a [`PathService`].  State is only reachable
/// through the accessors below.
///
/// All methods are synchronous and must be called from the tick thread.
#[derive(Debug, Clone)]
pub struct MovementController {
    unit:  UnitId,
    state: MovementState,
}

impl MovementController {
    pub fn new(unit: UnitId) -> Self {
        Self { unit, state: MovementState::Idle }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn unit_id(&self) -> UnitId {
        self.unit
    }

    #[inline]
    pub fn state(&self) -> &MovementState {
        &self.state
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.state.is_idle()
    }

    #[inline]
    pub fn is_released(&self) -> bool {
        matches!(self.state, MovementState::Released)
    }

    #[inline]
    pub fn pending_request(&self) -> Option<&PendingRequest> {
        self.state.pending()
    }

    #[inline]
    pub fn pending_id(&self) -> Option<CorrelationId> {
        self.state.pending().map(|r| r.id)
    }

    /// The adopted path while Following.
    #[inline]
    pub fn waypoints(&self) -> Option<&[Waypoint]> {
        self.state.cursor().map(PathCursor::waypoints)
    }

    /// Index of the waypoint being approached while Following.
    #[inline]
    pub fn current_index(&self) -> Option<usize> {
        self.state.cursor().map(PathCursor::index)
    }

    // ── Commands ──────────────────────────────────────────────────────────

    /// Start moving toward `destination`.
    ///
    /// Whatever the unit was doing is dropped: a pending request is
    /// forgotten (its answer, if it ever comes, is ignored) and a followed
    /// path is discarded.  There is no de-duplication; asking for the same
    /// destination again issues a new request.
    ///
    /// Returns an event when the request resolved on the spot: `Arrived` if
    /// the unit already stands at `destination`, `Failed` if the host channel
    /// is down.
    pub fn move_to<S: PathService>(
        &mut self,
        unit:        &impl Unit,
        destination: Point2,
        paths:       &mut S,
        now:         Tick,
    ) -> Option<MovementEvent> {
        if self.is_released() {
            trace!(unit = %self.unit, "move_to on released controller ignored");
            return None;
        }
        self.drop_pending(paths);

        match paths.find_path(unit.position(), destination, now) {
            PathCall::InFlight(request) => {
                self.transition(MovementState::PendingPath { request });
                None
            }
            PathCall::AlreadyThere => {
                self.transition(MovementState::Idle);
                Some(self.event(MovementEventKind::Arrived))
            }
            PathCall::Failed(failure) => {
                self.transition(MovementState::Idle);
                Some(self.event(MovementEventKind::Failed(failure)))
            }
        }
    }

    /// Apply a path answer.
    ///
    /// Ignored (returns `None`, no mutation) unless the controller is waiting
    /// on exactly `resolution.id`.
    pub fn resolve(&mut self, resolution: PathResolution) -> Option<MovementEvent> {
        match self.pending_id() {
            Some(id) if id == resolution.id => {}
            _ => {
                trace!(unit = %self.unit, id = %resolution.id, "stale path answer ignored");
                return None;
            }
        }

        match resolution.outcome {
            Ok(waypoints) => match PathCursor::new(waypoints) {
                Some(cursor) => {
                    let count = cursor.waypoints().len();
                    self.transition(MovementState::Following(cursor));
                    Some(self.event(MovementEventKind::PathStarted { waypoints: count }))
                }
                None => {
                    self.transition(MovementState::Idle);
                    Some(self.event(MovementEventKind::Failed(PathFailure::NoPathFound)))
                }
            },
            Err(failure) => {
                self.transition(MovementState::Idle);
                Some(self.event(MovementEventKind::Failed(failure)))
            }
        }
    }

    /// Advance the unit by one tick of `dt` seconds.
    ///
    /// Only Following does anything.  The unit travels up to
    /// `speed × dt`; every waypoint within arrival tolerance, or within the
    /// remaining travel budget, is snapped to and passed in order, so a fast
    /// unit can cross several in one tick without skipping any.  Orientation
    /// turns toward the direction of travel by at most `turn_rate × dt`.
    pub fn tick(
        &mut self,
        unit:   &mut impl Unit,
        dt:     f32,
        config: &MovementConfig,
    ) -> Option<MovementEvent> {
        let MovementState::Following(cursor) = &mut self.state else {
            return None;
        };

        let mut budget  = config.speed * dt.max(0.0);
        let mut pos     = unit.position();
        let mut heading = None;

        let finished = loop {
            let target = cursor.current();
            let dist = pos.distance(target);

            if dist <= config.arrival_tolerance || dist <= budget {
                if dist > f32::EPSILON {
                    heading = Some(pos.angle_to(target));
                }
                budget = (budget - dist).max(0.0);
                pos = target;
                if !cursor.advance() {
                    break true;
                }
                continue;
            }

            heading = Some(pos.angle_to(target));
            pos = pos.step_toward(target, budget);
            break false;
        };

        unit.set_position(pos);
        if let Some(heading) = heading {
            let max_turn = config.turn_rate * dt.max(0.0);
            unit.set_orientation(rotate_toward(unit.orientation(), heading, max_turn));
        }

        if finished {
            self.transition(MovementState::Idle);
            return Some(self.event(MovementEventKind::Arrived));
        }
        None
    }

    /// Halt where the unit stands.  Any pending request is forgotten.
    pub fn stop<S: PathService>(&mut self, paths: &mut S) {
        if self.is_released() {
            return;
        }
        self.drop_pending(paths);
        self.transition(MovementState::Idle);
    }

    /// Detach for good: forget any pending request and enter `Released`.
    pub fn release<S: PathService>(&mut self, paths: &mut S) {
        self.drop_pending(paths);
        self.transition(MovementState::Released);
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn drop_pending<S: PathService>(&mut self, paths: &mut S) {
        if let Some(id) = self.pending_id() {
            paths.forget(id);
        }
    }

    fn transition(&mut self, next: MovementState) {
        if self.state.label() != next.label() {
            debug!(unit = %self.unit, from = self.state.label(), to = next.label(), "movement state");
        }
        self.state = next;
    }

    #[inline]
    fn event(&self, kind: MovementEventKind) -> MovementEvent {
        MovementEvent::new(self.unit, kind)
    }
}
