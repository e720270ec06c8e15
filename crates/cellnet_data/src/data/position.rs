use rkyv::{Archive, Deserialize as RkyvDeserialize, Serialize as RkyvSerialize};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer cell coordinate on the grid plane.
///
/// Ordering is lexicographic: `x` first, then `y`. A grid keeps its nodes
/// sorted by this order so lookups can binary search.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Archive,
    RkyvSerialize,
    RkyvDeserialize,
)]
#[archive(check_bytes)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Wraps this position onto a `width` × `height` torus anchored at the origin.
    ///
    /// `None` unless both extents are positive.
    #[must_use]
    pub fn wrapped(self, width: i32, height: i32) -> Option<Self> {
        if width <= 0 || height <= 0 {
            return None;
        }
        Some(Self {
            x: self.x.rem_euclid(width),
            y: self.y.rem_euclid(height),
        })
    }

    /// The cell `offset` away from this one on a `width` × `height` torus.
    ///
    /// The sum is taken in `i64`, so any offset is accepted. `None` unless
    /// both extents are positive.
    #[must_use]
    pub fn offset_on_torus(self, offset: Position, width: i32, height: i32) -> Option<Self> {
        if width <= 0 || height <= 0 {
            return None;
        }
        let wrap = |a: i32, b: i32, extent: i32| {
            // The remainder lies in [0, extent), so it fits back into i32.
            (i64::from(a) + i64::from(b)).rem_euclid(i64::from(extent)) as i32
        };
        Some(Self {
            x: wrap(self.x, offset.x, width),
            y: wrap(self.y, offset.y, height),
        })
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_is_x_then_y() {
        assert!(Position::new(0, 5) < Position::new(1, 0));
        assert!(Position::new(1, 0) < Position::new(1, 1));
        assert_eq!(Position::new(2, 3), Position::new(2, 3));
    }

    #[test]
    fn test_wrapped_handles_negative_and_overflow() {
        assert_eq!(Position::new(-1, 4).wrapped(4, 4), Some(Position::new(3, 0)));
        assert_eq!(Position::new(5, -5).wrapped(4, 4), Some(Position::new(1, 3)));
    }

    #[test]
    fn test_zero_extent_does_not_wrap() {
        assert_eq!(Position::new(1, 1).wrapped(0, 4), None);
        assert_eq!(
            Position::new(1, 1).offset_on_torus(Position::new(1, 0), 4, 0),
            None
        );
    }

    #[test]
    fn test_offset_on_torus_accepts_extreme_offsets() {
        let origin = Position::new(0, 0);
        // i32::MAX = 4 * 536870911 + 3
        assert_eq!(
            origin.offset_on_torus(Position::new(i32::MAX, 0), 4, 4),
            Some(Position::new(3, 0))
        );
        assert_eq!(
            Position::new(3, 3).offset_on_torus(Position::new(i32::MIN, i32::MAX), 4, 5),
            Some(Position::new(3, 0))
        );
    }
}
