//! Per-step collision flags.

use serde::{Deserialize, Serialize};

/// Which sides of a body were blocked during its last move.
///
/// Reset at the start of every move by the owning controller and only
/// written by it. Anyone may read them; `down` doubles as the grounded check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionFlags(pub u8);

impl CollisionFlags {
    /// Blocked while moving left.
    pub const LEFT: u8 = 1 << 0;

    /// Blocked while moving right.
    pub const RIGHT: u8 = 1 << 1;

    /// Blocked while moving up (ceiling).
    pub const UP: u8 = 1 << 2;

    /// Blocked while moving down (ground).
    pub const DOWN: u8 = 1 << 3;

    /// Check if a flag is set.
    #[inline]
    pub fn has(self, flag: u8) -> bool {
        (self.0 & flag) != 0
    }

    /// Set or clear a flag.
    #[inline]
    pub fn set(&mut self, flag: u8, value: bool) {
        if value {
            self.0 |= flag;
        } else {
            self.0 &= !flag;
        }
    }

    /// Clear every flag.
    #[inline]
    pub fn reset(&mut self) {
        self.0 = 0;
    }

    #[inline]
    pub fn left(self) -> bool {
        self.has(Self::LEFT)
    }

    #[inline]
    pub fn right(self) -> bool {
        self.has(Self::RIGHT)
    }

    #[inline]
    pub fn up(self) -> bool {
        self.has(Self::UP)
    }

    #[inline]
    pub fn down(self) -> bool {
        self.has(Self::DOWN)
    }

    /// Blocked on either horizontal side.
    #[inline]
    pub fn horizontal(self) -> bool {
        self.has(Self::LEFT | Self::RIGHT)
    }

    /// Blocked above or below.
    #[inline]
    pub fn vertical(self) -> bool {
        self.has(Self::UP | Self::DOWN)
    }

    #[inline]
    pub fn any(self) -> bool {
        self.0 != 0
    }
}
