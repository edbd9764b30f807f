//! Integer grid positions.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A discrete terrain cell address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// East-west coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
    /// North-south coordinate.
    pub z: i32,
}

impl Position {
    /// Create a position from its coordinates.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The cell that contains the given continuous coordinates.
    ///
    /// Coordinates are floored, so `-0.5` lands in cell `-1`. Values outside
    /// the `i32` range saturate.
    #[allow(clippy::cast_possible_truncation)]
    pub fn containing(x: f64, y: f64, z: f64) -> Self {
        // `as` on floats saturates and maps NaN to 0.
        Self {
            x: x.floor() as i32,
            y: y.floor() as i32,
            z: z.floor() as i32,
        }
    }

    /// The cell directly underneath this one.
    #[must_use]
    pub const fn below(self) -> Self {
        Self {
            x: self.x,
            y: self.y.saturating_sub(1),
            z: self.z,
        }
    }

    /// Offset this position horizontally, saturating at the `i32` bounds.
    #[must_use]
    pub const fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y,
            z: self.z.saturating_add(dz),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
