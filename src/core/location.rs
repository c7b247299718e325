//! Grid Locations and Directions
//!
//! Integer map coordinates as reported by the simulator.
//! All operations are exact integer arithmetic.

use std::fmt;
use std::ops::{Add, Sub};
use serde::{Serialize, Deserialize};

/// A cell on the match map, in simulator coordinates.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct MapLocation {
    /// Column
    pub x: i32,
    /// Row (grows southward)
    pub y: i32,
}

impl MapLocation {
    /// Create a location from its coordinates.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another location.
    #[inline]
    pub fn distance_squared_to(self, other: Self) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        dx * dx + dy * dy
    }

    /// True when `other` is one of the 8 neighbouring cells or this cell itself.
    ///
    /// A zero-length move is therefore a slide, never a teleport.
    #[inline]
    pub fn is_adjacent_to(self, other: Self) -> bool {
        self.distance_squared_to(other) <= 2
    }

    /// The neighbouring cell in direction `dir`. `Omni` and `None` return `self`.
    #[inline]
    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self::new(self.x.wrapping_add(dx), self.y.wrapping_add(dy))
    }

    /// Direction that best approximates the vector from `self` to `other`.
    pub fn direction_to(self, other: Self) -> Direction {
        let dx = (other.x - self.x).signum();
        let dy = (other.y - self.y).signum();
        Direction::from_delta(dx, dy)
    }
}

impl Add for MapLocation {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x.wrapping_add(rhs.x), self.y.wrapping_add(rhs.y))
    }
}

impl Sub for MapLocation {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x.wrapping_sub(rhs.x), self.y.wrapping_sub(rhs.y))
    }
}

impl fmt::Debug for MapLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Loc({}, {})", self.x, self.y)
    }
}

impl fmt::Display for MapLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// =============================================================================
// DIRECTION
// =============================================================================

/// Facing of an entity. Compass points run clockwise from north.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Direction {
    /// Up (-y)
    #[default]
    North = 0,
    /// Up-right
    NorthEast = 1,
    /// Right (+x)
    East = 2,
    /// Down-right
    SouthEast = 3,
    /// Down (+y)
    South = 4,
    /// Down-left
    SouthWest = 5,
    /// Left (-x)
    West = 6,
    /// Up-left
    NorthWest = 7,
    /// Every direction at once (area effects)
    Omni = 8,
    /// No direction
    None = 9,
}

impl Direction {
    /// The 8 compass directions in clockwise order.
    pub const COMPASS: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Unit grid offset for this direction.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
            Direction::Omni | Direction::None => (0, 0),
        }
    }

    /// Direction for a unit offset; `(0, 0)` maps to `None`.
    pub fn from_delta(dx: i32, dy: i32) -> Direction {
        Direction::COMPASS
            .iter()
            .copied()
            .find(|d| d.delta() == (dx.signum(), dy.signum()))
            .unwrap_or(Direction::None)
    }

    /// Is this one of the 8 compass points?
    #[inline]
    pub fn is_compass(self) -> bool {
        (self as u8) < 8
    }

    /// Rotate 45 degrees clockwise. Non-compass values are unchanged.
    pub fn rotate_right(self) -> Direction {
        if !self.is_compass() {
            return self;
        }
        Direction::COMPASS[(self as usize + 1) % 8]
    }

    /// Rotate 45 degrees counter-clockwise. Non-compass values are unchanged.
    pub fn rotate_left(self) -> Direction {
        if !self.is_compass() {
            return self;
        }
        Direction::COMPASS[(self as usize + 7) % 8]
    }

    /// The direction pointing the other way.
    pub fn opposite(self) -> Direction {
        if !self.is_compass() {
            return self;
        }
        Direction::COMPASS[(self as usize + 4) % 8]
    }
}

// =============================================================================
// TESTS
// =============================================================================
