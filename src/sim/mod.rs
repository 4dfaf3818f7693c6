//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod clock;
pub mod collision;
pub mod level;
pub mod memory;
pub mod runner;
pub mod state;
pub mod wordle;

pub use autopilot::Autopilot;
pub use clock::{Cue, Scheduler, ms_to_ticks};
pub use collision::{Rect, collides};
pub use level::{LevelPhase, Session, SessionSnapshot};
pub use memory::{Card, CardView, MemoryPuzzle, SelectOutcome};
pub use runner::{FrameOutcome, RunSnapshot, RunStatus, RunnerState};
pub use state::{Entity, EntityKind, Player, Progress, SpawnSchedule};
pub use wordle::{LetterScore, SubmitOutcome, WordlePuzzle, WordleRow, score_guess};
