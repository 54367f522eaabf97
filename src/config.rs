use crate::error::ConfigError;
use crate::geometry::Position;

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_GRID_WIDTH: usize = 10;
pub const DEFAULT_GRID_HEIGHT: usize = 15;

// Timing (in milliseconds)
pub const DEFAULT_BASE_TICK_MS: u64 = 300;
pub const DEFAULT_MIN_TICK_MS: u64 = 30;
pub const DEFAULT_TICK_STEP_MS: u64 = 30;

// Scoring
pub const DEFAULT_SCORE_PER_LEVEL: u32 = 5;

/// Rows spawn this far above the visible board.
const SPAWN_ROW: i16 = -2;

/// Score awarded for clearing `rows` rows in a single lock.
pub fn squared_row_score(rows: u32) -> u32 {
    rows * rows
}

// ============================================================================
// GameConfig
// ============================================================================

#[derive(Clone, Copy, Debug)]
pub struct GameConfig {
    pub grid_width: usize,
    pub grid_height: usize,
    pub base_tick_ms: u64,
    pub min_tick_ms: u64,
    /// Interval reduction per level gained.
    pub tick_step_ms: u64,
    pub score_per_level: u32,
    pub row_score: fn(u32) -> u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: DEFAULT_GRID_WIDTH,
            grid_height: DEFAULT_GRID_HEIGHT,
            base_tick_ms: DEFAULT_BASE_TICK_MS,
            min_tick_ms: DEFAULT_MIN_TICK_MS,
            tick_step_ms: DEFAULT_TICK_STEP_MS,
            score_per_level: DEFAULT_SCORE_PER_LEVEL,
            row_score: squared_row_score,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_width == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        if self.grid_height == 0 {
            return Err(ConfigError::ZeroHeight);
        }
        let max = i16::MAX as usize;
        if self.grid_width > max || self.grid_height > max {
            return Err(ConfigError::GridTooLarge {
                width: self.grid_width,
                height: self.grid_height,
                max,
            });
        }
        if self.score_per_level == 0 {
            return Err(ConfigError::ZeroScorePerLevel);
        }
        if self.min_tick_ms == 0 {
            return Err(ConfigError::ZeroMinTick);
        }
        if self.min_tick_ms > self.base_tick_ms {
            return Err(ConfigError::MinTickAboveBase {
                min_ms: self.min_tick_ms,
                base_ms: self.base_tick_ms,
            });
        }
        Ok(())
    }

    /// Anchor position new pieces start from: horizontally centred, above the board.
    pub fn spawn_position(&self) -> Position {
        Position::new((self.grid_width / 2) as i16, SPAWN_ROW)
    }

    pub fn level_for_score(&self, score: u32) -> u32 {
        1 + score / self.score_per_level
    }

    pub fn tick_interval_ms(&self, level: u32) -> u64 {
        let speed_reduction = u64::from(level.saturating_sub(1)).saturating_mul(self.tick_step_ms);
        self.base_tick_ms
            .saturating_sub(speed_reduction)
            .max(self.min_tick_ms)
    }
}
