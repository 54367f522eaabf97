pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod geometry;
pub mod piece;

pub use board::{Board, CellState};
pub use config::GameConfig;
pub use error::ConfigError;
pub use game::{Game, GameEvent};
pub use geometry::Position;
pub use piece::{
    Piece, PieceProvider, RandomPieceProvider, SeededPieceProvider, SequencePieceProvider, Shape,
    TetrominoType,
};
