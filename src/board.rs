use log::debug;

use crate::geometry::Position;
use crate::piece::{Piece, Shape, TetrominoType};

// ============================================================================
// Cells
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CellState {
    #[default]
    Empty,
    Filled(TetrominoType),
    /// Part of a completed row, waiting for the next clear pass.
    Matched,
}

impl CellState {
    pub const MATCHED_TAG: u8 = 8;

    /// Integer tag of the cell: 0 empty, 1-7 piece kind, 8 matched.
    pub fn tag(self) -> u8 {
        match self {
            CellState::Empty => 0,
            CellState::Filled(kind) => kind.tag(),
            CellState::Matched => Self::MATCHED_TAG,
        }
    }

    pub fn is_empty(self) -> bool {
        self == CellState::Empty
    }
}

// ============================================================================
// Board
// ============================================================================

/// The grid of placed cells, stored row-major (`grid[y][x]`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    grid: Vec<Vec<CellState>>,
    /// Rows marked by the last match check, in ascending order.
    matches: Vec<usize>,
}

impl Board {
    /// Creates an empty board. Dimensions are expected to have been checked by
    /// [`GameConfig::validate`](crate::GameConfig::validate).
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            grid: vec![vec![CellState::Empty; width]; height],
            matches: Vec::new(),
        }
    }

    /// Builds a board from an existing row-major grid. Every row must have the same length.
    pub fn with_grid(grid: Vec<Vec<CellState>>) -> Self {
        let width = grid.first().map_or(0, Vec::len);
        debug_assert!(grid.iter().all(|row| row.len() == width));
        Self {
            width,
            height: grid.len(),
            grid,
            matches: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cells(&self) -> &[Vec<CellState>] {
        &self.grid
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<CellState> {
        self.grid.get(y).and_then(|row| row.get(x)).copied()
    }

    pub fn pending_matches(&self) -> &[usize] {
        &self.matches
    }

    pub fn reset(&mut self) {
        for row in &mut self.grid {
            row.fill(CellState::Empty);
        }
        self.matches.clear();
    }

    /// Writes the piece's filled cells into the grid at its top-left.
    ///
    /// Placement is not re-validated; callers check [`Board::is_move_valid`] first.
    /// Cells outside the grid are dropped.
    pub fn lock_in_piece(&mut self, piece: &Piece) {
        let top_left = piece.top_left();
        for (y, row) in piece.shape().rows().iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                if cell.is_empty() {
                    continue;
                }
                let board_x = top_left.x as isize + x as isize;
                let board_y = top_left.y as isize + y as isize;
                if board_x < 0 || board_y < 0 {
                    continue;
                }
                if let Some(slot) = self
                    .grid
                    .get_mut(board_y as usize)
                    .and_then(|r| r.get_mut(board_x as usize))
                {
                    *slot = *cell;
                }
            }
        }
        debug!("locked {:?} at {:?}", piece.kind(), top_left);
    }

    /// Returns true if `shape` fits inside the walls and floor with its top-left at
    /// `top_left`, and none of its filled cells overlap placed cells.
    ///
    /// A shape whose top edge is still above row 0 is only checked against the walls
    /// and floor.
    pub fn is_valid_on_board(&self, top_left: Position, shape: &Shape) -> bool {
        let left = top_left.x as isize;
        let top = top_left.y as isize;
        if left < 0
            || left + shape.width() as isize > self.width as isize
            || top + shape.height() as isize > self.height as isize
        {
            return false;
        }
        if top < 0 {
            return true;
        }

        let (left, top) = (left as usize, top as usize);
        shape.rows().iter().enumerate().all(|(y, row)| {
            row.iter()
                .enumerate()
                .all(|(x, cell)| cell.is_empty() || self.grid[top + y][left + x].is_empty())
        })
    }

    /// Tests the piece translated by `translation` without moving it.
    pub fn is_move_valid(&self, translation: Position, piece: &Piece) -> bool {
        let mut top_left = piece.top_left();
        top_left.translate(translation);
        self.is_valid_on_board(top_left, piece.shape())
    }

    /// Marks every complete row as [`CellState::Matched`] and records it for the
    /// next [`Board::clear_matched_rows`]. Returns the number of rows matched.
    pub fn check_for_matches(&mut self) -> u32 {
        let mut matched = 0;
        for y in 0..self.height {
            if !self.is_row_complete(y) {
                continue;
            }
            self.grid[y].fill(CellState::Matched);
            self.matches.push(y);
            matched += 1;
        }
        if matched > 0 {
            debug!("matched rows {:?}", self.matches);
        }
        matched
    }

    /// Removes the recorded rows, shifting everything above each one down a row.
    ///
    /// Rows are processed in recorded (ascending) order; each clear only moves rows above
    /// its own index, so later indices stay valid.
    pub fn clear_matched_rows(&mut self) -> u32 {
        if self.matches.is_empty() {
            return 0;
        }
        for &matched_row in &self.matches {
            for y in (1..=matched_row).rev() {
                let (above, below) = self.grid.split_at_mut(y);
                below[0].copy_from_slice(&above[y - 1]);
            }
            self.grid[0].fill(CellState::Empty);
        }
        let cleared = self.matches.len() as u32;
        debug!("cleared {} rows", cleared);
        self.matches.clear();
        cleared
    }

    /// A row is complete when no cell in it is empty.
    pub fn is_row_complete(&self, y: usize) -> bool {
        self.grid[y].iter().all(|cell| !cell.is_empty())
    }

    pub fn filled_count_in_row(&self, y: usize) -> usize {
        self.grid[y].iter().filter(|cell| !cell.is_empty()).count()
    }

    pub fn total_filled_cells(&self) -> usize {
        self.grid
            .iter()
            .flatten()
            .filter(|cell| !cell.is_empty())
            .count()
    }
}
