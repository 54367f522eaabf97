use thiserror::Error;

/// Rejected [`GameConfig`](crate::GameConfig) values. No board can be built from these.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum ConfigError {
    #[error("grid width must be at least 1 column")]
    ZeroWidth,
    #[error("grid height must be at least 1 row")]
    ZeroHeight,
    #[error("grid of {width}x{height} exceeds the coordinate range (max {max} per side)")]
    GridTooLarge { width: usize, height: usize, max: usize },
    #[error("score per level must be at least 1")]
    ZeroScorePerLevel,
    #[error("minimum tick interval must be at least 1 ms")]
    ZeroMinTick,
    #[error("minimum tick interval ({min_ms} ms) is longer than the base interval ({base_ms} ms)")]
    MinTickAboveBase { min_ms: u64, base_ms: u64 },
}
