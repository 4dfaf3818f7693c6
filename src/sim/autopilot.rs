//! Demo autopilot
//!
//! Plays a whole session through the same input intents a front end would
//! use: jumps obstacles, steps into flowers, types the secret word and pairs
//! the cards. Drives the headless runner and the end-to-end tests.

use super::level::{LevelPhase, Session};
use super::runner::RunnerState;
use super::state::EntityKind;
use crate::consts::WORD_LENGTH;
use crate::surface::PresentationSurface;

/// Gap (px) between the player's front edge and an obstacle at which a jump
/// carries the player over even the tallest obstacle.
const JUMP_WINDOW: (f32, f32) = (18.0, 30.0);

#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    /// Wrong guesses to type before the real word, to exercise the board
    pub decoys: Vec<String>,
    decoys_used: usize,
}

impl Autopilot {
    pub fn with_decoys(decoys: &[&str]) -> Self {
        Self {
            decoys: decoys.iter().map(|d| d.to_ascii_uppercase()).collect(),
            decoys_used: 0,
        }
    }

    /// Issue at most one input for the current step
    pub fn act(&mut self, session: &mut Session, surface: &mut dyn PresentationSurface) {
        match session.phase() {
            phase if phase.awaits_continue() => session.on_continue_acknowledged(surface),
            LevelPhase::Level1 => {
                if session.runner().is_some_and(should_jump) {
                    session.on_jump_input();
                }
            }
            LevelPhase::Level2 => self.type_guess(session, surface),
            LevelPhase::Level3 => pick_card(session, surface),
            _ => {}
        }
    }

    fn type_guess(&mut self, session: &mut Session, surface: &mut dyn PresentationSurface) {
        let Some(puzzle) = session.wordle() else {
            return;
        };
        if !puzzle.is_active() {
            return;
        }
        let col = puzzle.col;

        let word = match self.decoys.get(self.decoys_used) {
            Some(decoy) => decoy.clone(),
            None => session.tuning().secret_upper(),
        };

        if col < WORD_LENGTH {
            if let Some(letter) = word.chars().nth(col) {
                session.on_letter_input(letter, surface);
            }
        } else {
            if self.decoys_used < self.decoys.len() {
                self.decoys_used += 1;
            }
            session.on_submit(surface);
        }
    }
}

/// Jump when the nearest obstacle ahead sits inside the jump window
pub fn should_jump(runner: &RunnerState) -> bool {
    if !runner.is_running() || !runner.player.on_ground {
        return false;
    }
    let front = runner.player.rect().right();
    runner
        .entities
        .iter()
        .filter(|e| e.kind == EntityKind::Obstacle)
        .map(|e| e.rect.left() - front)
        .filter(|gap| *gap > 0.0)
        .min_by(f32::total_cmp)
        .is_some_and(|gap| (JUMP_WINDOW.0..=JUMP_WINDOW.1).contains(&gap))
}

/// Turn over the next card, completing a known pair when one is half open
fn pick_card(session: &mut Session, surface: &mut dyn PresentationSurface) {
    let Some(puzzle) = session.memory() else {
        return;
    };
    if puzzle.locked || puzzle.completed {
        return;
    }

    let open = puzzle.cards.iter().find(|c| c.face_up && !c.matched);
    let choice = match open {
        Some(first) => puzzle
            .cards
            .iter()
            .find(|c| !c.face_up && c.symbol == first.symbol)
            .map(|c| c.id),
        None => puzzle.cards.iter().find(|c| !c.face_up).map(|c| c.id),
    };

    if let Some(id) = choice {
        session.on_card_selected(id, surface);
    }
}
