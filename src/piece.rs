use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::board::{Board, CellState};
use crate::geometry::Position;

// ============================================================================
// Piece kinds
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum TetrominoType {
    I,
    Z,
    S,
    T,
    O,
    L,
    J,
}

struct Template {
    /// Filled cells, one string per row from the top. `#` is filled.
    rows: &'static [&'static str],
    pivot: Position,
}

/// Shape table, indexed by `TetrominoType::tag() - 1`.
static TEMPLATES: [Template; 7] = [
    Template {
        rows: &["#", "#", "#", "#"],
        pivot: Position::new(0, 1),
    },
    Template {
        rows: &["##.", ".##"],
        pivot: Position::new(1, 1),
    },
    Template {
        rows: &[".##", "##."],
        pivot: Position::new(1, 1),
    },
    Template {
        rows: &["###", ".#."],
        pivot: Position::new(1, 0),
    },
    Template {
        rows: &["##", "##"],
        pivot: Position::new(0, 0),
    },
    Template {
        rows: &["#.", "#.", "##"],
        pivot: Position::new(0, 1),
    },
    Template {
        rows: &[".#", ".#", "##"],
        pivot: Position::new(1, 1),
    },
];

impl TetrominoType {
    pub const ALL: [TetrominoType; 7] = [
        TetrominoType::I,
        TetrominoType::Z,
        TetrominoType::S,
        TetrominoType::T,
        TetrominoType::O,
        TetrominoType::L,
        TetrominoType::J,
    ];

    /// Cell tag written into the board for this kind, 1 through 7.
    pub fn tag(self) -> u8 {
        match self {
            TetrominoType::I => 1,
            TetrominoType::Z => 2,
            TetrominoType::S => 3,
            TetrominoType::T => 4,
            TetrominoType::O => 5,
            TetrominoType::L => 6,
            TetrominoType::J => 7,
        }
    }

    fn template(self) -> &'static Template {
        &TEMPLATES[usize::from(self.tag()) - 1]
    }

    /// Rotation centre, as an offset from the top-left of the spawn shape.
    pub fn pivot(self) -> Position {
        self.template().pivot
    }

    /// The shape in spawn orientation.
    pub fn shape(self) -> Shape {
        let rows = self
            .template()
            .rows
            .iter()
            .map(|row| {
                row.chars()
                    .map(|c| match c {
                        '#' => CellState::Filled(self),
                        _ => CellState::Empty,
                    })
                    .collect()
            })
            .collect();
        Shape { rows }
    }

    fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }
}

// ============================================================================
// Shape
// ============================================================================

/// A piece footprint stored row-major (`rows[y][x]`).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Shape {
    rows: Vec<Vec<CellState>>,
}

impl Shape {
    pub fn rows(&self) -> &[Vec<CellState>] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn filled_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, cell)| !cell.is_empty())
                .map(move |(x, _)| (x, y))
        })
    }

    fn transposed(&self) -> Vec<Vec<CellState>> {
        (0..self.width())
            .map(|x| self.rows.iter().map(|row| row[x]).collect())
            .collect()
    }

    /// The shape turned 90 degrees clockwise.
    pub fn rotated_clockwise(&self) -> Shape {
        let mut rows = self.transposed();
        for row in &mut rows {
            row.reverse();
        }
        Shape { rows }
    }

    /// The shape turned 90 degrees counter-clockwise.
    pub fn rotated_counter_clockwise(&self) -> Shape {
        let mut rows = self.transposed();
        rows.reverse();
        Shape { rows }
    }
}

// ============================================================================
// Piece Provider Trait
// ============================================================================

pub trait PieceProvider {
    fn next_piece(&mut self) -> TetrominoType;
}

/// Uniform choice over the seven kinds from the thread-local RNG.
pub struct RandomPieceProvider;

impl PieceProvider for RandomPieceProvider {
    fn next_piece(&mut self) -> TetrominoType {
        TetrominoType::from_index(rand::thread_rng().gen_range(0..TetrominoType::ALL.len()))
    }
}

/// Uniform choice from a seeded RNG, so a game can be replayed.
pub struct SeededPieceProvider {
    rng: StdRng,
}

impl SeededPieceProvider {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl PieceProvider for SeededPieceProvider {
    fn next_piece(&mut self) -> TetrominoType {
        TetrominoType::from_index(self.rng.gen_range(0..TetrominoType::ALL.len()))
    }
}

pub struct SequencePieceProvider {
    pieces: Vec<TetrominoType>,
    index: usize,
}

impl SequencePieceProvider {
    pub fn new(pieces: Vec<TetrominoType>) -> Self {
        Self { pieces, index: 0 }
    }
}

impl PieceProvider for SequencePieceProvider {
    fn next_piece(&mut self) -> TetrominoType {
        if self.pieces.is_empty() {
            return TetrominoType::I;
        }
        let piece = self.pieces[self.index % self.pieces.len()];
        self.index += 1;
        piece
    }
}

// ============================================================================
// Piece
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Piece {
    kind: TetrominoType,
    shape: Shape,
    /// Logical anchor; the shape's top-left is `position - pivot`.
    position: Position,
    pivot: Position,
    spawn: Position,
}

impl Piece {
    pub fn new(kind: TetrominoType, spawn: Position) -> Self {
        Self {
            kind,
            shape: kind.shape(),
            position: spawn,
            pivot: kind.pivot(),
            spawn,
        }
    }

    pub fn random(spawn: Position, provider: &mut dyn PieceProvider) -> Self {
        Self::new(provider.next_piece(), spawn)
    }

    /// A piece whose top-left sits at `(x, y)`. [`Piece::reset`] returns it there.
    pub fn new_at(kind: TetrominoType, x: i16, y: i16) -> Self {
        let spawn = Position::new(x, y) + kind.pivot();
        Self::new(kind, spawn)
    }

    pub fn kind(&self) -> TetrominoType {
        self.kind
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn width(&self) -> usize {
        self.shape.width()
    }

    pub fn height(&self) -> usize {
        self.shape.height()
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn pivot(&self) -> Position {
        self.pivot
    }

    pub fn top_left(&self) -> Position {
        self.position - self.pivot
    }

    /// True while the top edge is still above the visible board.
    pub fn is_spawning(&self) -> bool {
        self.top_left().y < 0
    }

    /// Absolute board positions of every filled cell.
    pub fn blocks(&self) -> Vec<Position> {
        let top_left = self.top_left();
        self.shape
            .filled_cells()
            .map(|(x, y)| top_left + Position::new(x as i16, y as i16))
            .collect()
    }

    pub fn translate(&mut self, vector: Position) {
        self.position.translate(vector);
    }

    pub fn rotate_clockwise(&mut self, board: &Board) -> bool {
        self.try_rotate(board, Shape::rotated_clockwise)
    }

    pub fn rotate_counter_clockwise(&mut self, board: &Board) -> bool {
        self.try_rotate(board, Shape::rotated_counter_clockwise)
    }

    /// Puts a new kind from `provider` back at the spawn point.
    pub fn reset(&mut self, provider: &mut dyn PieceProvider) {
        *self = Self::new(provider.next_piece(), self.spawn);
    }

    fn try_rotate(&mut self, board: &Board, rotate: fn(&Shape) -> Shape) -> bool {
        if self.is_spawning() {
            return false;
        }
        let candidate = rotate(&self.shape);
        if !board.is_valid_on_board(self.top_left(), &candidate) {
            debug!("rejected rotation of {:?} at {:?}", self.kind, self.top_left());
            return false;
        }
        self.shape = candidate;
        true
    }
}
