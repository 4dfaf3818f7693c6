//! Data-driven game balance
//!
//! Every gameplay constant the simulation reads lives in [`Tuning`]. The
//! defaults reproduce the shipped game; a JSON document may override any
//! subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Reasons a tuning document can be rejected
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("could not read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("tuning JSON could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

impl TuningError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Gameplay constants for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Level 1: the run ===
    pub field_width: f32,
    pub ground_y: f32,
    pub player_start: (f32, f32),
    pub player_size: f32,
    pub gravity: f32,
    pub jump_velocity: f32,
    pub scroll_speed: f32,
    pub entity_width: f32,
    pub obstacle_base_height: f32,
    pub obstacle_height_multipliers: [f32; 3],
    pub lives: u32,
    pub flowers_to_clear: u32,
    pub spawn_interval_ms: u32,
    pub flower_gap_min: u32,
    pub flower_gap_max: u32,

    // === Level 2: the word lock ===
    pub secret_word: String,
    pub max_attempts: usize,

    // === Level 3: memory match ===
    pub card_symbols: Vec<String>,
    pub mismatch_delay_ms: u32,

    // === Pacing ===
    pub handoff_delay_ms: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            ground_y: GROUND_Y,
            player_start: (PLAYER_START_X, PLAYER_START_Y),
            player_size: PLAYER_SIZE,
            gravity: GRAVITY,
            jump_velocity: JUMP_VELOCITY,
            scroll_speed: SCROLL_SPEED,
            entity_width: ENTITY_WIDTH,
            obstacle_base_height: OBSTACLE_BASE_HEIGHT,
            obstacle_height_multipliers: OBSTACLE_HEIGHT_MULTIPLIERS,
            lives: LEVEL1_LIVES,
            flowers_to_clear: LEVEL1_FLOWERS_TO_CLEAR,
            spawn_interval_ms: SPAWN_INTERVAL_MS,
            flower_gap_min: FLOWER_GAP_MIN,
            flower_gap_max: FLOWER_GAP_MAX,

            secret_word: SECRET_WORD.to_string(),
            max_attempts: MAX_ATTEMPTS,

            card_symbols: (1..=CARD_PAIRS)
                .map(|i| format!("assets/images/img{i}.png"))
                .collect(),
            mismatch_delay_ms: MISMATCH_DELAY_MS,

            handoff_delay_ms: HANDOFF_DELAY_MS,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning document and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        log::info!("Loaded tuning (secret word length {})", tuning.secret_word.len());
        Ok(tuning)
    }

    /// Read a tuning document from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        log::info!("Reading tuning from {}", path.as_ref().display());
        Self::from_json(&json)
    }

    /// Check the cross-field rules the simulation relies on
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.secret_word.len() != WORD_LENGTH
            || !self.secret_word.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(TuningError::invalid(
                "secret_word",
                format!("must be exactly {WORD_LENGTH} ASCII letters"),
            ));
        }
        if self.max_attempts == 0 {
            return Err(TuningError::invalid("max_attempts", "must be at least 1"));
        }
        if self.flower_gap_min == 0 || self.flower_gap_min > self.flower_gap_max {
            return Err(TuningError::invalid(
                "flower_gap_min",
                format!(
                    "range [{}, {}] must be non-empty and start at 1 or more",
                    self.flower_gap_min, self.flower_gap_max
                ),
            ));
        }
        if self.lives == 0 {
            return Err(TuningError::invalid("lives", "must be at least 1"));
        }
        if self.flowers_to_clear == 0 {
            return Err(TuningError::invalid("flowers_to_clear", "must be at least 1"));
        }
        for (field, period) in [
            ("spawn_interval_ms", self.spawn_interval_ms),
            ("mismatch_delay_ms", self.mismatch_delay_ms),
            ("handoff_delay_ms", self.handoff_delay_ms),
        ] {
            if period == 0 {
                return Err(TuningError::invalid(field, "must be positive"));
            }
        }
        for (field, value) in [
            ("field_width", self.field_width),
            ("ground_y", self.ground_y),
            ("player_size", self.player_size),
            ("gravity", self.gravity),
            ("scroll_speed", self.scroll_speed),
            ("entity_width", self.entity_width),
            ("obstacle_base_height", self.obstacle_base_height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(TuningError::invalid(
                    field,
                    format!("must be finite and positive, got {value}"),
                ));
            }
        }
        if !self.jump_velocity.is_finite() || self.jump_velocity >= 0.0 {
            return Err(TuningError::invalid(
                "jump_velocity",
                format!("must be finite and negative (upward), got {}", self.jump_velocity),
            ));
        }
        if !self.player_start.0.is_finite() || !self.player_start.1.is_finite() {
            return Err(TuningError::invalid("player_start", "must be finite"));
        }
        if self
            .obstacle_height_multipliers
            .iter()
            .any(|m| !m.is_finite() || *m <= 0.0)
        {
            return Err(TuningError::invalid(
                "obstacle_height_multipliers",
                "every multiplier must be positive",
            ));
        }
        if self.card_symbols.len() != CARD_PAIRS {
            return Err(TuningError::invalid(
                "card_symbols",
                format!("expected {CARD_PAIRS} symbols, got {}", self.card_symbols.len()),
            ));
        }
        if self.card_symbols.iter().any(|s| s.is_empty()) {
            return Err(TuningError::invalid("card_symbols", "symbols must be non-empty"));
        }
        let mut sorted: Vec<&str> = self.card_symbols.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != self.card_symbols.len() {
            return Err(TuningError::invalid("card_symbols", "symbols must be distinct"));
        }
        Ok(())
    }

    /// Secret word in the case the board stores letters
    pub fn secret_upper(&self) -> String {
        self.secret_word.to_ascii_uppercase()
    }
}
