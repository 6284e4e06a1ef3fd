//! Per-unit movement state.

use mv_core::Waypoint;
use mv_host::PendingRequest;

/// Position along an adopted path.
///
/// Never empty: [`PathCursor::new`] refuses an empty path, and the cursor is
/// dropped (not advanced past the end) when the last waypoint is reached.
#[derive(Debug, Clone, PartialEq)]
pub struct PathCursor {
    waypoints: Box<[Waypoint]>,
    index:     usize,
}

impl PathCursor {
    /// `None` for an empty path.
    pub fn new(waypoints: Box<[Waypoint]>) -> Option<Self> {
        (!waypoints.is_empty()).then_some(Self { waypoints, index: 0 })
    }

    /// The waypoint the unit is heading for.
    #[inline]
    pub fn current(&self) -> Waypoint {
        self.waypoints[self.index]
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    #[inline]
    pub fn is_last(&self) -> bool {
        self.index + 1 == self.waypoints.len()
    }

    /// Waypoints not yet reached, current one included.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.waypoints.len() - self.index
    }

    /// Move on to the next waypoint.  Returns `false`, leaving the cursor
    /// unchanged, if the current one was the last.
    pub fn advance(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.index += 1;
        true
    }
}

/// The movement state of a single unit.
///
/// Every transition replaces the whole value, so no variant ever carries data
/// left over from a previous one.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MovementState {
    /// No destination, no request, no waypoints.
    #[default]
    Idle,

    /// A path request is outstanding.  The unit does not move.
    PendingPath { request: PendingRequest },

    /// Advancing along a path.
    Following(PathCursor),

    /// The unit is gone.  Every operation is a no-op.
    Released,
}

impl MovementState {
    /// Short label for logs and the unit's debug-state hook.
    pub fn label(&self) -> &'static str {
        match self {
            MovementState::Idle                => "idle",
            MovementState::PendingPath { .. }  => "pending-path",
            MovementState::Following(_)        => "following",
            MovementState::Released            => "released",
        }
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self, MovementState::Idle)
    }

    #[inline]
    pub fn pending(&self) -> Option<&PendingRequest> {
        match self {
            MovementState::PendingPath { request } => Some(request),
            _ => None,
        }
    }

    #[inline]
    pub fn cursor(&self) -> Option<&PathCursor> {
        match self {
            MovementState::Following(cursor) => Some(cursor),
            _ => None,
        }
    }
}
