//! Petal Run - a three-act browser mini-game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (runner physics, puzzles, level state machine)
//! - `story`: Narration shown between and during levels
//! - `surface`: Presentation surface contract the simulation talks to
//! - `tuning`: Data-driven game balance

pub mod sim;
pub mod story;
pub mod surface;
pub mod tuning;

pub use sim::{LevelPhase, Session};
pub use surface::PresentationSurface;
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate (one frame tick per step)
    pub const TICK_HZ: u32 = 60;
    /// Fixed simulation timestep in seconds
    pub const SIM_DT: f32 = 1.0 / TICK_HZ as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta fed to the accumulator (seconds). Never more than
    /// the substep budget can drain.
    pub const MAX_FRAME_DT: f32 = MAX_SUBSTEPS as f32 * SIM_DT;

    /// Play field
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const GROUND_Y: f32 = 350.0;

    /// Player defaults
    pub const PLAYER_START_X: f32 = 50.0;
    pub const PLAYER_START_Y: f32 = 300.0;
    pub const PLAYER_SIZE: f32 = 50.0;
    /// Added to vertical velocity every tick
    pub const GRAVITY: f32 = 0.5;
    /// Vertical velocity applied by a jump (negative is up)
    pub const JUMP_VELOCITY: f32 = -16.0;

    /// Entities
    pub const ENTITY_WIDTH: f32 = 50.0;
    pub const OBSTACLE_BASE_HEIGHT: f32 = 50.0;
    pub const OBSTACLE_HEIGHT_MULTIPLIERS: [f32; 3] = [1.0, 1.2, 1.3];
    /// Leftward travel per tick
    pub const SCROLL_SPEED: f32 = 3.0;

    /// Level 1 rules
    pub const LEVEL1_LIVES: u32 = 3;
    pub const LEVEL1_FLOWERS_TO_CLEAR: u32 = 3;
    pub const SPAWN_INTERVAL_MS: u32 = 2000;
    /// Spawns between flowers, inclusive range
    pub const FLOWER_GAP_MIN: u32 = 3;
    pub const FLOWER_GAP_MAX: u32 = 8;

    /// Pause between a cleared level and the next screen
    pub const HANDOFF_DELAY_MS: u32 = 2000;

    /// Word lock
    pub const SECRET_WORD: &str = "HARDI";
    pub const WORD_LENGTH: usize = 5;
    pub const MAX_ATTEMPTS: usize = 6;

    /// Memory match
    pub const CARD_PAIRS: usize = 8;
    pub const MISMATCH_DELAY_MS: u32 = 1000;
}
