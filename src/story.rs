//! Narration shown between and during levels

use serde::Serialize;

/// A block of narration for the surface to display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Narration {
    pub heading: String,
    pub body: String,
    /// Label of the continue control, when the screen waits for one
    pub prompt: Option<&'static str>,
}

impl Narration {
    fn new(heading: &str, body: &str) -> Self {
        Self {
            heading: heading.to_string(),
            body: body.to_string(),
            prompt: None,
        }
    }

    fn with_prompt(mut self, prompt: &'static str) -> Self {
        self.prompt = Some(prompt);
        self
    }
}

pub const INCOMPLETE_ROW: &str = "You must fill all 5 letters before pressing Enter!";
pub const RUN_FAILED: &str = "Ouch! Kovid stumbled. Try again!";
pub const WORD_LOCK_FAILED: &str = "Not quite right. Try again!";

pub fn intro() -> Narration {
    Narration::new(
        "The Adventure Begins!",
        "Kovid is trying to reach Tars to give her some flowers in time for Valentine's Day, \
         but there's a rocky plain to get past first! Survive and collect 3 flowers for her in the process :)",
    )
    .with_prompt("Begin Level 1")
}

/// Level 1 heads-up line, refreshed whenever lives or flowers change
pub fn run_hud(lives: u32, flowers: u32) -> Narration {
    Narration::new("Level 1: The Run", &format!("Lives: {lives} | Flowers: {flowers}"))
}

pub fn run_cleared(flowers: u32) -> Narration {
    Narration::new("Great job!", &format!("You collected {flowers} flowers!"))
}

pub fn before_word_lock() -> Narration {
    Narration::new(
        "You successfully crossed the rocky plains!",
        "You reached her house, but there's a code lock! How will you get through this?",
    )
    .with_prompt("Continue")
}

pub fn word_lock() -> Narration {
    Narration::new(
        "Level 2: The Wordle Challenge",
        "Enter the secret word to unlock the mystical gate.",
    )
}

pub fn word_lock_solved(flowers: u32) -> Narration {
    Narration::new(
        "Correct!",
        &format!("You got past the gate, and you earned another flower. Flowers Collected: {flowers}"),
    )
}

pub fn before_memory_match() -> Narration {
    Narration::new(
        "A Memory to Cherish",
        "After unlocking the code lock, Kovid now stands before the final door, the door to her heart!! \
         But it can only be opened by recalling the treasured memories they share. Help him match these memories!",
    )
    .with_prompt("Continue")
}

pub fn memory_match() -> Narration {
    Narration::new("Level 3: Memory Match", "Find all matching pairs to earn a flower!")
}

pub fn memory_match_solved(flowers: u32) -> Narration {
    Narration::new(
        "Congratulations!",
        &format!("You matched all pairs and earned a flower. Flowers Collected: {flowers}"),
    )
}
