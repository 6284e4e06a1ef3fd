//! The unit seam.
//!
//! Units belong to the game world, not to this crate.  Controllers only read
//! and write position and orientation through [`Unit`].

use std::collections::{BTreeMap, HashMap};

use mv_core::{Point2, UnitId};

/// A mobile entity the movement layer can steer.
pub trait Unit {
    fn position(&self) -> Point2;
    fn set_position(&mut self, position: Point2);

    /// Facing in radians, `atan2` convention.
    fn orientation(&self) -> f32;
    fn set_orientation(&mut self, radians: f32);

    /// Observability hook: the current movement state label.  No behaviour
    /// may depend on it.
    fn set_debug_state(&mut self, _label: &'static str) {}
}

/// A plain unit record.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicUnit {
    pub id:          UnitId,
    pub position:    Point2,
    pub orientation: f32,
    pub debug_state: &'static str,
}

impl BasicUnit {
    pub fn new(id: UnitId, position: Point2) -> Self {
        Self { id, position, orientation: 0.0, debug_state: "" }
    }
}

impl Unit for BasicUnit {
    fn position(&self) -> Point2 {
        self.position
    }

    fn set_position(&mut self, position: Point2) {
        self.position = position;
    }

    fn orientation(&self) -> f32 {
        self.orientation
    }

    fn set_orientation(&mut self, radians: f32) {
        self.orientation = radians;
    }

    fn set_debug_state(&mut self, label: &'static str) {
        self.debug_state = label;
    }
}

// ── UnitRegistry ──────────────────────────────────────────────────────────────

/// Lookup of live units by id, implemented by whatever owns them.
pub trait UnitRegistry {
    type Unit: Unit;

    fn unit(&self, id: UnitId) -> Option<&Self::Unit>;
    fn unit_mut(&mut self, id: UnitId) -> Option<&mut Self::Unit>;
}

impl<U: Unit> UnitRegistry for BTreeMap<UnitId, U> {
    type Unit = U;

    fn unit(&self, id: UnitId) -> Option<&U> {
        self.get(&id)
    }

    fn unit_mut(&mut self, id: UnitId) -> Option<&mut U> {
        self.get_mut(&id)
    }
}

impl<U: Unit> UnitRegistry for HashMap<UnitId, U> {
    type Unit = U;

    fn unit(&self, id: UnitId) -> Option<&U> {
        self.get(&id)
    }

    fn unit_mut(&mut self, id: UnitId) -> Option<&mut U> {
        self.get_mut(&id)
    }
}
