//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they work as map keys and sorted
//! collection elements without ceremony.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[derive(Serialize, Deserialize)]
        #[serde(transparent)]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            #[inline(always)]
            pub fn get(self) -> $inner {
                self.0
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

typed_id! {
    /// Identity of a mobile unit on the server.
    pub struct UnitId(u32);
}

typed_id! {
    /// Matches a path response from the host peer to the request that
    /// caused it.  Issued from a monotonic counter; never reused within a
    /// process.
    pub struct CorrelationId(u64);
}

impl CorrelationId {
    /// The id following `self`, or `None` when that would be `INVALID`.
    /// Ids never wrap, so none is ever issued twice.
    #[inline]
    pub fn next(self) -> Option<CorrelationId> {
        self.0
            .checked_add(1)
            .map(CorrelationId)
            .filter(|id| *id != CorrelationId::INVALID)
    }
}
