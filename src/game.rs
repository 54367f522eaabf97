use log::{debug, info};

use crate::board::{Board, CellState};
use crate::config::GameConfig;
use crate::error::ConfigError;
use crate::geometry::Position;
use crate::piece::{Piece, PieceProvider, RandomPieceProvider};

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    PieceMoved,
    PieceRotated,
    PieceLocked,
    /// Rows marked by the last lock; they are removed on the next tick.
    LinesMatched(u32),
    LinesCleared(u32),
    LevelUp(u32),
    Paused,
    Unpaused,
    GameRestarted,
    GameOver,
}

// ============================================================================
// Game
// ============================================================================

pub struct Game {
    config: GameConfig,
    board: Board,
    current_piece: Piece,
    next_piece: Piece,
    /// Applied on the next tick, then reset to `Position::DOWN`.
    pending_move: Position,
    score: u32,
    level: u32,
    tick_interval_ms: u64,
    game_over: bool,
    running: bool,
    piece_provider: Box<dyn PieceProvider>,
    events: Vec<GameEvent>,
}

impl Game {
    /// A game with the default configuration and random pieces.
    pub fn new() -> Self {
        Self::build(GameConfig::default(), Box::new(RandomPieceProvider))
    }

    pub fn with_provider(provider: Box<dyn PieceProvider>) -> Self {
        Self::build(GameConfig::default(), provider)
    }

    pub fn with_config(
        config: GameConfig,
        provider: Box<dyn PieceProvider>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, provider))
    }

    /// A default-configured game over an existing grid, with `current_piece` in play.
    pub fn with_grid(grid: Vec<Vec<CellState>>, current_piece: Piece) -> Self {
        let mut game = Self::new();
        game.board = Board::with_grid(grid);
        game.current_piece = current_piece;
        game
    }

    fn build(config: GameConfig, mut provider: Box<dyn PieceProvider>) -> Self {
        let spawn = config.spawn_position();
        let current_piece = Piece::random(spawn, provider.as_mut());
        let next_piece = Piece::random(spawn, provider.as_mut());

        Self {
            board: Board::new(config.grid_width, config.grid_height),
            current_piece,
            next_piece,
            pending_move: Position::DOWN,
            score: 0,
            level: 1,
            tick_interval_ms: config.base_tick_ms,
            game_over: false,
            running: true,
            piece_provider: provider,
            events: Vec::new(),
            config,
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_piece(&self) -> &Piece {
        &self.current_piece
    }

    pub fn next_piece(&self) -> &Piece {
        &self.next_piece
    }

    pub fn pending_move(&self) -> Position {
        self.pending_move
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Delay between ticks at the current level.
    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms
    }

    fn accepts_input(&self) -> bool {
        self.running && !self.game_over
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Advances the game by one step: removes rows matched on the previous tick,
    /// then applies the pending move, locking the piece if it can fall no further.
    pub fn tick(&mut self) {
        if !self.accepts_input() {
            return;
        }

        let cleared = self.board.clear_matched_rows();
        if cleared > 0 {
            self.events.push(GameEvent::LinesCleared(cleared));
        }

        let movement = std::mem::replace(&mut self.pending_move, Position::DOWN);
        if self.board.is_move_valid(movement, &self.current_piece) {
            self.current_piece.translate(movement);
            self.events.push(GameEvent::PieceMoved);
        } else if movement == Position::DOWN {
            self.lock_in_piece();
        }
    }

    pub fn move_left(&mut self) {
        self.set_pending_move(Position::LEFT);
    }

    pub fn move_right(&mut self) {
        self.set_pending_move(Position::RIGHT);
    }

    pub fn move_down(&mut self) {
        self.set_pending_move(Position::DOWN);
    }

    fn set_pending_move(&mut self, movement: Position) {
        if self.accepts_input() {
            self.pending_move = movement;
        }
    }

    pub fn rotate_clockwise(&mut self) -> bool {
        if !self.accepts_input() {
            return false;
        }
        let rotated = self.current_piece.rotate_clockwise(&self.board);
        if rotated {
            self.events.push(GameEvent::PieceRotated);
        }
        rotated
    }

    pub fn rotate_counter_clockwise(&mut self) -> bool {
        if !self.accepts_input() {
            return false;
        }
        let rotated = self.current_piece.rotate_counter_clockwise(&self.board);
        if rotated {
            self.events.push(GameEvent::PieceRotated);
        }
        rotated
    }

    /// Drops the current piece as far as it goes and locks it without waiting for a tick.
    pub fn hard_drop(&mut self) {
        if !self.accepts_input() {
            return;
        }

        // New matches must be recorded against the compacted grid.
        let cleared = self.board.clear_matched_rows();
        if cleared > 0 {
            self.events.push(GameEvent::LinesCleared(cleared));
        }

        self.pending_move = Position::DOWN;
        while self.board.is_move_valid(Position::DOWN, &self.current_piece) {
            self.current_piece.translate(Position::DOWN);
        }
        self.lock_in_piece();
    }

    pub fn toggle_pause(&mut self) {
        if self.game_over {
            return;
        }
        self.running = !self.running;
        if self.running {
            info!("resumed");
            self.events.push(GameEvent::Unpaused);
        } else {
            info!("paused");
            self.events.push(GameEvent::Paused);
        }
    }

    pub fn restart(&mut self) {
        self.score = 0;
        self.level = 1;
        self.tick_interval_ms = self.config.base_tick_ms;
        self.pending_move = Position::DOWN;
        self.current_piece.reset(self.piece_provider.as_mut());
        self.next_piece.reset(self.piece_provider.as_mut());
        self.board.reset();
        self.game_over = false;
        self.running = true;

        self.events.clear();
        self.events.push(GameEvent::GameRestarted);
        info!("restarted");
    }

    fn lock_in_piece(&mut self) {
        if self.current_piece.is_spawning() {
            self.game_over = true;
            self.events.push(GameEvent::GameOver);
            info!("game over at level {} with score {}", self.level, self.score);
            return;
        }

        self.board.lock_in_piece(&self.current_piece);
        self.events.push(GameEvent::PieceLocked);

        let spawn = self.config.spawn_position();
        let incoming = Piece::random(spawn, self.piece_provider.as_mut());
        self.current_piece = std::mem::replace(&mut self.next_piece, incoming);

        let matched = self.board.check_for_matches();
        if matched > 0 {
            self.events.push(GameEvent::LinesMatched(matched));
            self.add_score(matched);
        }
    }

    fn add_score(&mut self, rows: u32) {
        self.score += (self.config.row_score)(rows);
        let new_level = self.config.level_for_score(self.score);
        if new_level > self.level {
            info!("level {}", new_level);
            self.events.push(GameEvent::LevelUp(new_level));
        }
        self.level = new_level;
        self.tick_interval_ms = self.config.tick_interval_ms(self.level);
        debug!(
            "score {} level {} tick {} ms",
            self.score, self.level, self.tick_interval_ms
        );
    }

    // ------------------------------------------------------------------------
    // Rendering support
    // ------------------------------------------------------------------------

    /// The board with the current piece overlaid. Cells above the board are skipped.
    pub fn render_grid(&self) -> Vec<Vec<CellState>> {
        let mut visual_grid = self.board.cells().to_vec();
        let (width, height) = (self.board.width() as i16, self.board.height() as i16);

        for block in self.current_piece.blocks() {
            if block.y >= 0 && block.y < height && block.x >= 0 && block.x < width {
                visual_grid[block.y as usize][block.x as usize] =
                    CellState::Filled(self.current_piece.kind());
            }
        }

        visual_grid
    }

    /// Takes and clears all pending events.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;
    use crate::config::{DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH};
    use crate::piece::TetrominoType;

    pub fn empty_grid() -> Vec<Vec<CellState>> {
        vec![vec![CellState::Empty; DEFAULT_GRID_WIDTH]; DEFAULT_GRID_HEIGHT]
    }

    pub fn fill_row(grid: &mut [Vec<CellState>], y: usize) {
        grid[y].fill(CellState::Filled(TetrominoType::T));
    }

    pub fn fill_row_with_gap(grid: &mut [Vec<CellState>], y: usize, gap_x: usize) {
        fill_row(grid, y);
        grid[y][gap_x] = CellState::Empty;
    }
}
