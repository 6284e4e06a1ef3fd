//! Notifications produced by movement controllers.

use mv_core::UnitId;
use mv_host::PathFailure;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementEventKind {
    /// A path was adopted and the unit started following it.
    PathStarted { waypoints: usize },
    /// The unit reached its destination (or was already there).
    Arrived,
    /// No path could be obtained; the unit is idle.  Callers that want
    /// another attempt must issue a new `move_to`.
    Failed(PathFailure),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementEvent {
    pub unit: UnitId,
    pub kind: MovementEventKind,
}

impl MovementEvent {
    #[inline]
    pub fn new(unit: UnitId, kind: MovementEventKind) -> Self {
        Self { unit, kind }
    }
}
