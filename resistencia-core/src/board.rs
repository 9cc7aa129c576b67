//! Square board geometry with 1-based coordinates and move codes

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::rules;

/// Default board dimension (squares per side)
pub const DEFAULT_BOARD_SIZE: i64 = 8;

/// Team side. `A` plays first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    /// Token used in logs and by the rule library (`"A"` / `"B"`)
    pub fn as_str(self) -> &'static str {
        match self {
            Side::A => "A",
            Side::B => "B",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }

    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "A" => Some(Side::A),
            "B" => Some(Side::B),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Move directions, numbered as the rule library encodes them
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// +x
    Right = 1,
    /// -x
    Left = 2,
    /// +y, towards the opponent's back row
    Up = 3,
    /// -y
    Down = 4,
}

/// All directions in move-code order
pub const DIRECTIONS: [Direction; 4] = [
    Direction::Right,
    Direction::Left,
    Direction::Up,
    Direction::Down,
];

impl Direction {
    pub fn code(self) -> i64 {
        self as i64
    }

    /// Decode a move code; anything outside 1..=4 is "no movement"
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Direction::Right),
            2 => Some(Direction::Left),
            3 => Some(Direction::Up),
            4 => Some(Direction::Down),
            _ => None,
        }
    }

    /// Same move seen from the opposite side of the board
    pub fn mirrored(self) -> Self {
        // symmetric_move maps 1..=4 onto 1..=4
        Direction::from_code(rules::symmetric_move(self.code())).unwrap_or(self)
    }

    pub fn delta(self) -> (i64, i64) {
        (rules::move_dx(self.code()), rules::move_dy(self.code()))
    }
}

/// Board square
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Square {
    pub x: i64,
    pub y: i64,
}

impl Square {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Check if this square lies on a board of the given dimension
    pub fn is_on_board(&self, board_size: i64) -> bool {
        rules::within_bounds(
            1.0,
            1.0,
            board_size as f64,
            board_size as f64,
            self.x as f64,
            self.y as f64,
        )
    }

    /// Point reflection through the board centre
    pub fn mirrored(&self, board_size: i64) -> Square {
        Square::new(board_size + 1 - self.x, board_size + 1 - self.y)
    }

    /// Neighbour in a direction (may fall off the board)
    pub fn step(&self, direction: Direction) -> Square {
        let (dx, dy) = direction.delta();
        Square::new(self.x + dx, self.y + dy)
    }

    pub fn distance_to(&self, other: Square) -> f64 {
        rules::distance(self.x as f64, self.y as f64, other.x as f64, other.y as f64)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
