//! Presentation surface contract
//!
//! The simulation never draws. It pushes snapshots and narration outward
//! through [`PresentationSurface`]; input flows back in through the
//! `Session::on_*` methods.

use crate::sim::{CardView, RunSnapshot, WordleRow};
use crate::story::Narration;

/// Everything the simulation asks of a front end
pub trait PresentationSurface {
    /// Draw one run frame (called after every frame tick)
    fn render(&mut self, frame: &RunSnapshot<'_>);

    /// Draw the word-lock board after it changes
    fn render_wordle(&mut self, _rows: &[WordleRow]) {}

    /// Draw the memory cards after they change
    fn render_memory(&mut self, _cards: &[CardView<'_>]) {}

    /// Replace the narration panel
    fn show_narration(&mut self, narration: &Narration);

    /// Modal notice (validation messages, failure notices)
    fn notify(&mut self, message: &str);

    /// The adventure is over; the surface owns whatever follows
    fn show_end_screen(&mut self);
}

/// Surface that only writes to the log. Used by the headless runner.
#[derive(Debug, Default)]
pub struct LogSurface {
    frames: u64,
}

impl PresentationSurface for LogSurface {
    fn render(&mut self, frame: &RunSnapshot<'_>) {
        self.frames += 1;
        log::trace!(
            "frame {} player y={:.1} entities={}",
            frame.ticks,
            frame.player.pos.y,
            frame.entities.len()
        );
    }

    fn render_wordle(&mut self, rows: &[WordleRow]) {
        for row in rows.iter().filter(|r| r.scores.is_some()) {
            let word: String = row.letters.iter().map(|c| c.unwrap_or('_')).collect();
            log::debug!("word lock row {} {:?}", word, row.scores);
        }
    }

    fn show_narration(&mut self, narration: &Narration) {
        log::info!("[{}] {}", narration.heading, narration.body);
    }

    fn notify(&mut self, message: &str) {
        log::warn!("{}", message);
    }

    fn show_end_screen(&mut self) {
        log::info!("End screen after {} rendered frames", self.frames);
    }
}

/// Surface that keeps everything it was told, for harnesses and tests
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub frames: u64,
    pub narrations: Vec<Narration>,
    pub notices: Vec<String>,
    pub wordle_renders: u64,
    pub memory_renders: u64,
    pub end_screen: bool,
}

impl RecordingSurface {
    pub fn last_heading(&self) -> Option<&str> {
        self.narrations.last().map(|n| n.heading.as_str())
    }
}

impl PresentationSurface for RecordingSurface {
    fn render(&mut self, _frame: &RunSnapshot<'_>) {
        self.frames += 1;
    }

    fn render_wordle(&mut self, _rows: &[WordleRow]) {
        self.wordle_renders += 1;
    }

    fn render_memory(&mut self, _cards: &[CardView<'_>]) {
        self.memory_renders += 1;
    }

    fn show_narration(&mut self, narration: &Narration) {
        self.narrations.push(narration.clone());
    }

    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }

    fn show_end_screen(&mut self) {
        self.end_screen = true;
    }
}
