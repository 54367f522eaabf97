use std::ops::{Add, Sub};

/// A cell coordinate on the board, or a translation vector between two cells.
///
/// `y` grows downwards; rows above the visible board are negative.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub struct Position {
    pub x: i16,
    pub y: i16,
}

impl Position {
    pub const DOWN: Position = Position { x: 0, y: 1 };
    pub const UP: Position = Position { x: 0, y: -1 };
    pub const LEFT: Position = Position { x: -1, y: 0 };
    pub const RIGHT: Position = Position { x: 1, y: 0 };

    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    /// Adds `vector` to this position in place.
    pub fn translate(&mut self, vector: Position) {
        self.x += vector.x;
        self.y += vector.y;
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Position {
        Position {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}
