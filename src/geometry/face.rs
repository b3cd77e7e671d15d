//! Cube face identification and in-face directions.

use serde::{Deserialize, Serialize};

/// Identifies which face of the cube a height sample belongs to.
///
/// Unfolded, the cube is a cross with `Front` in the middle, `Up` above it,
/// `Down` below it, `Left` and `Right` beside it and `Back` to the right of
/// `Right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CubeFaceId {
    Up = 0,
    Down = 1,
    Front = 2,
    Back = 3,
    Left = 4,
    Right = 5,
}

impl CubeFaceId {
    /// Returns all six cube faces in storage order.
    pub const fn all() -> [CubeFaceId; 6] {
        [
            CubeFaceId::Up,
            CubeFaceId::Down,
            CubeFaceId::Front,
            CubeFaceId::Back,
            CubeFaceId::Left,
            CubeFaceId::Right,
        ]
    }

    /// Returns the face index (0-5).
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Creates a face from an index (0-5).
    pub const fn from_index(index: usize) -> Option<CubeFaceId> {
        match index {
            0 => Some(CubeFaceId::Up),
            1 => Some(CubeFaceId::Down),
            2 => Some(CubeFaceId::Front),
            3 => Some(CubeFaceId::Back),
            4 => Some(CubeFaceId::Left),
            5 => Some(CubeFaceId::Right),
            _ => None,
        }
    }

    /// Returns a short name for the face, used in exported file names.
    pub const fn short_name(self) -> &'static str {
        match self {
            CubeFaceId::Up => "up",
            CubeFaceId::Down => "down",
            CubeFaceId::Front => "front",
            CubeFaceId::Back => "back",
            CubeFaceId::Left => "left",
            CubeFaceId::Right => "right",
        }
    }
}

/// A cardinal direction in a face's local frame.
///
/// x grows towards `East`, y grows towards `South`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    West = 0,
    East = 1,
    North = 2,
    South = 3,
}

impl Direction {
    /// Neighbor enumeration order: west, east, north, south.
    pub const fn all() -> [Direction; 4] {
        [Direction::West, Direction::East, Direction::North, Direction::South]
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Unit grid delta `(dx, dy)` for this direction.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::West => (-1, 0),
            Direction::East => (1, 0),
            Direction::North => (0, -1),
            Direction::South => (0, 1),
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::West => Direction::East,
            Direction::East => Direction::West,
            Direction::North => Direction::South,
            Direction::South => Direction::North,
        }
    }
}
