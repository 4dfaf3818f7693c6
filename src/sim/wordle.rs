//! Level 2: the word lock
//!
//! Guess a fixed five-letter word in a limited number of rows. Each
//! submitted row is scored letter by letter.

use serde::Serialize;

use super::state::Progress;
use crate::consts::WORD_LENGTH;

/// Feedback for one guessed letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LetterScore {
    /// Right letter, right position
    Correct,
    /// Letter appears somewhere else in the secret
    Present,
    /// Letter is not in the secret
    Absent,
}

/// Score a guess against the secret.
///
/// Position matches win first; otherwise a letter is `Present` whenever the
/// secret contains it at all. Repeated letters are not counted against the
/// secret's letter frequencies, so a letter the secret holds once can be
/// marked `Present` in several cells.
pub fn score_guess(guess: &[char; WORD_LENGTH], secret: &[char; WORD_LENGTH]) -> [LetterScore; WORD_LENGTH] {
    std::array::from_fn(|i| {
        if guess[i] == secret[i] {
            LetterScore::Correct
        } else if secret.contains(&guess[i]) {
            LetterScore::Present
        } else {
            LetterScore::Absent
        }
    })
}

/// One row of the board
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WordleRow {
    pub letters: [Option<char>; WORD_LENGTH],
    /// Set once the row has been submitted
    pub scores: Option<[LetterScore; WORD_LENGTH]>,
}

/// Result of pressing submit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Row not full; nothing changed
    Incomplete,
    /// Scored, wrong word; cursor moved to the next row
    Miss,
    /// Guessed the secret; a flower was awarded
    Solved,
    /// Wrong word on the last row; the board has been reset
    Exhausted,
    /// Puzzle already solved
    Ignored,
}

#[derive(Debug, Clone)]
pub struct WordlePuzzle {
    secret: [char; WORD_LENGTH],
    pub rows: Vec<WordleRow>,
    pub row: usize,
    pub col: usize,
    pub solved: bool,
    /// Boards wiped after running out of rows
    pub restarts: u32,
}

impl WordlePuzzle {
    /// `secret` must be `WORD_LENGTH` ASCII letters; `Tuning::validate`
    /// enforces this for configured words.
    pub fn new(secret: &str, max_attempts: usize) -> Self {
        let mut letters = secret.chars().map(|c| c.to_ascii_uppercase());
        let secret = std::array::from_fn(|_| letters.next().unwrap_or(' '));
        Self {
            secret,
            rows: vec![WordleRow::default(); max_attempts.max(1)],
            row: 0,
            col: 0,
            solved: false,
            restarts: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.solved
    }

    /// Type a letter at the cursor. Non-letters and a full row are ignored.
    pub fn enter_letter(&mut self, letter: char) -> bool {
        if !self.is_active() || !letter.is_ascii_alphabetic() || self.col >= WORD_LENGTH {
            return false;
        }
        self.rows[self.row].letters[self.col] = Some(letter.to_ascii_uppercase());
        self.col += 1;
        true
    }

    /// Clear the cell before the cursor
    pub fn backspace(&mut self) -> bool {
        if !self.is_active() || self.col == 0 {
            return false;
        }
        self.col -= 1;
        self.rows[self.row].letters[self.col] = None;
        true
    }

    pub fn submit(&mut self, progress: &mut Progress) -> SubmitOutcome {
        if !self.is_active() {
            return SubmitOutcome::Ignored;
        }
        if self.col < WORD_LENGTH {
            return SubmitOutcome::Incomplete;
        }

        let current = &mut self.rows[self.row];
        let guess: [char; WORD_LENGTH] = std::array::from_fn(|i| current.letters[i].unwrap_or(' '));
        let scores = score_guess(&guess, &self.secret);
        current.scores = Some(scores);

        if guess == self.secret {
            self.solved = true;
            progress.award_flower();
            log::info!("Word lock solved on row {}", self.row + 1);
            return SubmitOutcome::Solved;
        }

        self.row += 1;
        self.col = 0;
        if self.row >= self.rows.len() {
            log::info!("Word lock out of attempts, resetting board");
            self.reset();
            return SubmitOutcome::Exhausted;
        }
        SubmitOutcome::Miss
    }

    /// Fresh empty board, same secret
    pub fn reset(&mut self) {
        self.rows.iter_mut().for_each(|row| *row = WordleRow::default());
        self.row = 0;
        self.col = 0;
        self.solved = false;
        self.restarts += 1;
    }
}
