//! Level state machine
//!
//! `Session` owns everything one playthrough needs: the phase, the shared
//! flower count, the RNG, the scheduler and whichever level engine is live.
//! Front ends feed it elapsed time and input intents; it answers through a
//! [`PresentationSurface`].

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::clock::{Cue, Scheduler, ms_to_ticks};
use super::memory::{MemoryPuzzle, SelectOutcome};
use super::runner::{FrameOutcome, RunnerState};
use super::state::Progress;
use super::wordle::{SubmitOutcome, WordlePuzzle};
use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::story;
use crate::surface::PresentationSurface;
use crate::tuning::{Tuning, TuningError};

/// Node of the level state machine. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelPhase {
    Intro,
    Level1,
    Transition12,
    Level2,
    Transition23,
    Level3,
    Complete,
}

impl LevelPhase {
    /// The phase that follows this one
    pub fn next(self) -> Option<Self> {
        match self {
            LevelPhase::Intro => Some(LevelPhase::Level1),
            LevelPhase::Level1 => Some(LevelPhase::Transition12),
            LevelPhase::Transition12 => Some(LevelPhase::Level2),
            LevelPhase::Level2 => Some(LevelPhase::Transition23),
            LevelPhase::Transition23 => Some(LevelPhase::Level3),
            LevelPhase::Level3 => Some(LevelPhase::Complete),
            LevelPhase::Complete => None,
        }
    }

    /// Screens that wait for a continue acknowledgment
    pub fn awaits_continue(self) -> bool {
        matches!(
            self,
            LevelPhase::Intro | LevelPhase::Transition12 | LevelPhase::Transition23
        )
    }
}

/// Work deferred through the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    /// Leave a cleared level for the next screen
    Handoff,
    /// Turn a mismatched memory pair back over
    ConcealMismatch,
}

/// A deferred action tagged with the phase that armed it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Armed {
    owner: LevelPhase,
    action: Deferred,
}

/// Live level engine. Dropped when its phase ends.
#[derive(Debug, Clone)]
enum Engine {
    Idle,
    Run(RunnerState),
    WordLock(WordlePuzzle),
    Memory(MemoryPuzzle),
}

/// Read-only summary for HUDs and debugging
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub phase: LevelPhase,
    pub flowers_collected: u32,
    /// Present while the run level is live
    pub level1_lives: Option<u32>,
    pub level1_attempts: u32,
    pub ticks: u64,
}

/// One playthrough
#[derive(Debug, Clone)]
pub struct Session {
    seed: u64,
    tuning: Tuning,
    rng: Pcg32,
    phase: LevelPhase,
    progress: Progress,
    scheduler: Scheduler<Armed>,
    engine: Engine,
    accumulator: f32,
    level1_attempts: u32,
}

impl Session {
    /// Session with the default tuning
    pub fn new(seed: u64) -> Self {
        Self::build(seed, Tuning::default())
    }

    /// Session with custom tuning (validated first)
    pub fn with_tuning(seed: u64, tuning: Tuning) -> Result<Self, TuningError> {
        tuning.validate()?;
        Ok(Self::build(seed, tuning))
    }

    fn build(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            tuning,
            rng: Pcg32::seed_from_u64(seed),
            phase: LevelPhase::Intro,
            progress: Progress::default(),
            scheduler: Scheduler::new(),
            engine: Engine::Idle,
            accumulator: 0.0,
            level1_attempts: 0,
        }
    }

    /// Show the intro screen
    pub fn start(&mut self, surface: &mut dyn PresentationSurface) {
        log::info!("Session starting with seed {}", self.seed);
        surface.show_narration(&story::intro());
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn phase(&self) -> LevelPhase {
        self.phase
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /// Ticks simulated since the session was created
    pub fn now_ticks(&self) -> u64 {
        self.scheduler.now()
    }

    /// How many times the run level has been started
    pub fn level1_attempts(&self) -> u32 {
        self.level1_attempts
    }

    pub fn runner(&self) -> Option<&RunnerState> {
        match &self.engine {
            Engine::Run(runner) => Some(runner),
            _ => None,
        }
    }

    pub fn wordle(&self) -> Option<&WordlePuzzle> {
        match &self.engine {
            Engine::WordLock(puzzle) => Some(puzzle),
            _ => None,
        }
    }

    pub fn memory(&self) -> Option<&MemoryPuzzle> {
        match &self.engine {
            Engine::Memory(puzzle) => Some(puzzle),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            flowers_collected: self.progress.flowers_collected,
            level1_lives: self.runner().map(|r| r.lives),
            level1_attempts: self.level1_attempts,
            ticks: self.scheduler.now(),
        }
    }

    /// Run as many fixed steps as `elapsed` seconds cover (capped per call).
    /// Returns the number of steps taken.
    pub fn advance(&mut self, elapsed: f32, surface: &mut dyn PresentationSurface) -> u32 {
        if !elapsed.is_finite() {
            log::warn!("Ignoring non-finite frame delta {}", elapsed);
            return 0;
        }
        self.accumulator += elapsed.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.step(surface);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        substeps
    }

    /// Run exactly one fixed step
    pub fn step(&mut self, surface: &mut dyn PresentationSurface) {
        self.scheduler.begin_step();
        while let Some(cue) = self.scheduler.next_cue() {
            match cue {
                Cue::Frame => self.on_frame(surface),
                Cue::Spawn => self.on_spawn(),
                Cue::Timer(armed) => self.on_timer(armed, surface),
            }
        }
    }

    // === Input intents ===

    pub fn on_jump_input(&mut self) {
        if self.phase != LevelPhase::Level1 {
            return;
        }
        if let Engine::Run(runner) = &mut self.engine {
            runner.jump(&self.tuning);
        }
    }

    pub fn on_letter_input(&mut self, letter: char, surface: &mut dyn PresentationSurface) {
        if self.phase != LevelPhase::Level2 {
            return;
        }
        if let Engine::WordLock(puzzle) = &mut self.engine {
            if puzzle.enter_letter(letter) {
                surface.render_wordle(&puzzle.rows);
            }
        }
    }

    pub fn on_backspace(&mut self, surface: &mut dyn PresentationSurface) {
        if self.phase != LevelPhase::Level2 {
            return;
        }
        if let Engine::WordLock(puzzle) = &mut self.engine {
            if puzzle.backspace() {
                surface.render_wordle(&puzzle.rows);
            }
        }
    }

    pub fn on_submit(&mut self, surface: &mut dyn PresentationSurface) {
        if self.phase != LevelPhase::Level2 {
            return;
        }
        let Engine::WordLock(puzzle) = &mut self.engine else {
            return;
        };

        match puzzle.submit(&mut self.progress) {
            SubmitOutcome::Incomplete => surface.notify(story::INCOMPLETE_ROW),
            SubmitOutcome::Miss => surface.render_wordle(&puzzle.rows),
            SubmitOutcome::Solved => {
                surface.render_wordle(&puzzle.rows);
                surface.show_narration(&story::word_lock_solved(self.progress.flowers_collected));
                self.arm(Deferred::Handoff, self.tuning.handoff_delay_ms);
            }
            SubmitOutcome::Exhausted => {
                surface.notify(story::WORD_LOCK_FAILED);
                surface.show_narration(&story::word_lock());
                surface.render_wordle(&puzzle.rows);
            }
            SubmitOutcome::Ignored => {}
        }
    }

    pub fn on_card_selected(&mut self, card_id: usize, surface: &mut dyn PresentationSurface) {
        if self.phase != LevelPhase::Level3 {
            return;
        }
        let Engine::Memory(puzzle) = &mut self.engine else {
            return;
        };

        let outcome = puzzle.select(card_id, &mut self.progress);
        if outcome == SelectOutcome::Ignored {
            log::trace!("Card {} selection ignored", card_id);
            return;
        }
        surface.render_memory(&puzzle.views());

        match outcome {
            SelectOutcome::Mismatched => {
                self.arm(Deferred::ConcealMismatch, self.tuning.mismatch_delay_ms);
            }
            SelectOutcome::Completed => {
                surface.show_narration(&story::memory_match_solved(self.progress.flowers_collected));
                self.arm(Deferred::Handoff, self.tuning.handoff_delay_ms);
            }
            _ => {}
        }
    }

    pub fn on_continue_acknowledged(&mut self, surface: &mut dyn PresentationSurface) {
        match self.phase {
            LevelPhase::Intro => self.start_level1(surface),
            LevelPhase::Transition12 => self.start_level2(surface),
            LevelPhase::Transition23 => self.start_level3(surface),
            phase => log::debug!("Continue ignored in {:?}", phase),
        }
    }

    // === Scheduled work ===

    fn on_frame(&mut self, surface: &mut dyn PresentationSurface) {
        if self.phase != LevelPhase::Level1 {
            return;
        }
        let Engine::Run(runner) = &mut self.engine else {
            return;
        };

        let before = (runner.lives, self.progress.flowers_collected);
        match runner.tick(&self.tuning, &mut self.progress) {
            FrameOutcome::Continue => {
                surface.render(&runner.snapshot(&self.progress));
                if before != (runner.lives, self.progress.flowers_collected) {
                    surface.show_narration(&story::run_hud(runner.lives, self.progress.flowers_collected));
                }
            }
            FrameOutcome::Cleared => {
                self.scheduler.stop_cadences();
                log::info!(
                    "Run cleared after {} ticks with {} lives left",
                    runner.ticks,
                    runner.lives
                );
                surface.show_narration(&story::run_cleared(self.progress.flowers_collected));
                self.arm(Deferred::Handoff, self.tuning.handoff_delay_ms);
            }
            FrameOutcome::Failed => {
                self.scheduler.stop_cadences();
                log::info!("Run failed after {} ticks, restarting", runner.ticks);
                surface.notify(story::RUN_FAILED);
                self.start_level1(surface);
            }
            FrameOutcome::Stopped => {}
        }
    }

    fn on_spawn(&mut self) {
        if self.phase != LevelPhase::Level1 {
            return;
        }
        if let Engine::Run(runner) = &mut self.engine {
            runner.spawn(&mut self.rng, &self.tuning);
        }
    }

    fn on_timer(&mut self, armed: Armed, surface: &mut dyn PresentationSurface) {
        if armed.owner != self.phase {
            log::debug!("Dropping stale {:?} armed in {:?}", armed.action, armed.owner);
            return;
        }
        match armed.action {
            Deferred::Handoff => self.hand_off(surface),
            Deferred::ConcealMismatch => {
                if let Engine::Memory(puzzle) = &mut self.engine {
                    if puzzle.conceal_mismatch() {
                        surface.render_memory(&puzzle.views());
                    }
                }
            }
        }
    }

    fn arm(&mut self, action: Deferred, delay_ms: u32) {
        let owner = self.phase;
        self.scheduler.after(ms_to_ticks(delay_ms), Armed { owner, action });
    }

    // === Phase changes ===

    fn enter(&mut self, phase: LevelPhase) {
        log::info!(
            "Phase {:?} -> {:?} (flowers: {})",
            self.phase,
            phase,
            self.progress.flowers_collected
        );
        self.scheduler.stop_cadences();
        self.scheduler.cancel_timers();
        self.engine = Engine::Idle;
        self.phase = phase;
    }

    fn hand_off(&mut self, surface: &mut dyn PresentationSurface) {
        let Some(next) = self.phase.next() else {
            return;
        };
        self.enter(next);
        match next {
            LevelPhase::Transition12 => surface.show_narration(&story::before_word_lock()),
            LevelPhase::Transition23 => surface.show_narration(&story::before_memory_match()),
            LevelPhase::Complete => surface.show_end_screen(),
            _ => {}
        }
    }

    /// Start (or restart) the run from scratch
    fn start_level1(&mut self, surface: &mut dyn PresentationSurface) {
        self.enter(LevelPhase::Level1);
        let runner = RunnerState::new(&mut self.rng, &self.tuning, &mut self.progress);
        self.level1_attempts += 1;
        log::info!(
            "Run attempt {} (first flower at spawn #{})",
            self.level1_attempts,
            runner.schedule.next_flower_target
        );
        surface.show_narration(&story::run_hud(runner.lives, self.progress.flowers_collected));
        self.engine = Engine::Run(runner);
        self.scheduler
            .start_cadences(ms_to_ticks(self.tuning.spawn_interval_ms));
    }

    fn start_level2(&mut self, surface: &mut dyn PresentationSurface) {
        self.enter(LevelPhase::Level2);
        let puzzle = WordlePuzzle::new(&self.tuning.secret_word, self.tuning.max_attempts);
        surface.show_narration(&story::word_lock());
        surface.render_wordle(&puzzle.rows);
        self.engine = Engine::WordLock(puzzle);
    }

    fn start_level3(&mut self, surface: &mut dyn PresentationSurface) {
        self.enter(LevelPhase::Level3);
        let puzzle = MemoryPuzzle::new(&mut self.rng, &self.tuning.card_symbols);
        surface.show_narration(&story::memory_match());
        surface.render_memory(&puzzle.views());
        self.engine = Engine::Memory(puzzle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::TICK_HZ;
    use crate::sim::state::{Entity, EntityKind};
    use crate::surface::RecordingSurface;

    fn running_session() -> (Session, RecordingSurface) {
        let mut surface = RecordingSurface::default();
        let mut session = Session::new(42);
        session.start(&mut surface);
        session.on_continue_acknowledged(&mut surface);
        (session, surface)
    }

    /// Put an entity where the player will touch it on the next frame
    fn plant(session: &mut Session, kind: EntityKind) {
        let Engine::Run(runner) = &mut session.engine else {
            panic!("run level not live");
        };
        let id = 1000 + runner.entities.len() as u32;
        let mut entity = Entity::spawn(id, kind, 50.0, 50.0, &session.tuning);
        entity.rect.pos.x = 63.0;
        runner.entities.push(entity);
    }

    fn steps(session: &mut Session, surface: &mut RecordingSurface, n: u32) {
        for _ in 0..n {
            session.step(surface);
        }
    }

    #[test]
    fn test_phase_order() {
        let mut phase = LevelPhase::Intro;
        let mut seen = vec![phase];
        while let Some(next) = phase.next() {
            seen.push(next);
            phase = next;
        }
        assert_eq!(
            seen,
            vec![
                LevelPhase::Intro,
                LevelPhase::Level1,
                LevelPhase::Transition12,
                LevelPhase::Level2,
                LevelPhase::Transition23,
                LevelPhase::Level3,
                LevelPhase::Complete,
            ]
        );
    }

    #[test]
    fn test_continue_starts_run() {
        let (session, surface) = running_session();
        assert_eq!(session.phase(), LevelPhase::Level1);
        assert_eq!(session.level1_attempts(), 1);
        assert_eq!(surface.last_heading(), Some("Level 1: The Run"));
        assert!(session.scheduler.cadences_running());
    }

    #[test]
    fn test_first_spawn_after_interval() {
        let (mut session, mut surface) = running_session();
        steps(&mut session, &mut surface, 119);
        assert!(session.runner().unwrap().entities.is_empty());
        session.step(&mut surface);
        assert_eq!(session.runner().unwrap().entities.len(), 1);
        assert_eq!(surface.frames, 120);
    }

    #[test]
    fn test_three_flowers_hand_off_after_delay() {
        let (mut session, mut surface) = running_session();
        for _ in 0..3 {
            plant(&mut session, EntityKind::Flower);
            session.step(&mut surface);
        }

        assert_eq!(session.progress().flowers_collected, 3);
        assert_eq!(session.runner().unwrap().lives, 3);
        assert_eq!(session.phase(), LevelPhase::Level1);
        assert!(!session.scheduler.cadences_running());
        assert_eq!(surface.last_heading(), Some("Great job!"));

        // Jump input after the run ended is ignored
        session.on_jump_input();
        assert!(session.runner().unwrap().player.on_ground);

        steps(&mut session, &mut surface, 2 * TICK_HZ - 1);
        assert_eq!(session.phase(), LevelPhase::Level1);
        session.step(&mut surface);
        assert_eq!(session.phase(), LevelPhase::Transition12);
        assert!(session.runner().is_none());
        assert_eq!(surface.narrations.last().unwrap().prompt, Some("Continue"));
    }

    #[test]
    fn test_losing_all_lives_restarts_run() {
        let (mut session, mut surface) = running_session();
        plant(&mut session, EntityKind::Flower);
        session.step(&mut surface);
        assert_eq!(session.progress().flowers_collected, 1);

        for lives_left in [2, 1] {
            plant(&mut session, EntityKind::Obstacle);
            session.step(&mut surface);
            assert_eq!(session.runner().unwrap().lives, lives_left);
        }
        plant(&mut session, EntityKind::Obstacle);
        session.step(&mut surface);

        assert_eq!(surface.notices, vec![story::RUN_FAILED.to_string()]);
        assert_eq!(session.phase(), LevelPhase::Level1);
        assert_eq!(session.level1_attempts(), 2);
        let runner = session.runner().unwrap();
        assert_eq!(runner.lives, 3);
        assert_eq!(runner.schedule.object_count, 0);
        assert!(runner.entities.is_empty());
        assert_eq!(session.progress().flowers_collected, 0);
        assert!(session.scheduler.cadences_running());
    }

    #[test]
    fn test_inputs_ignored_outside_owning_phase() {
        let mut surface = RecordingSurface::default();
        let mut session = Session::new(1);
        session.start(&mut surface);

        session.on_jump_input();
        session.on_letter_input('A', &mut surface);
        session.on_submit(&mut surface);
        session.on_card_selected(0, &mut surface);
        assert_eq!(session.phase(), LevelPhase::Intro);
        assert!(surface.notices.is_empty());
        assert_eq!(surface.wordle_renders, 0);
        assert_eq!(surface.memory_renders, 0);
    }

    #[test]
    fn test_stale_timer_is_dropped() {
        let (mut session, mut surface) = running_session();
        // Armed by a phase that is no longer current
        session.scheduler.after(
            1,
            Armed {
                owner: LevelPhase::Level3,
                action: Deferred::Handoff,
            },
        );
        session.step(&mut surface);
        assert_eq!(session.phase(), LevelPhase::Level1);
    }

    #[test]
    fn test_advance_caps_substeps() {
        let (mut session, mut surface) = running_session();
        assert_eq!(session.advance(SIM_DT * 0.5, &mut surface), 0);
        assert_eq!(session.advance(1.0, &mut surface), MAX_SUBSTEPS);
    }

    #[test]
    fn test_slow_frames_do_not_build_backlog() {
        let (mut session, mut surface) = running_session();
        session.advance(SIM_DT * 0.5, &mut surface);
        for _ in 0..100 {
            assert_eq!(session.advance(1.0, &mut surface), MAX_SUBSTEPS);
            assert!(session.accumulator < SIM_DT);
        }
    }

    #[test]
    fn test_non_finite_delta_is_ignored() {
        let (mut session, mut surface) = running_session();
        assert_eq!(session.advance(f32::NAN, &mut surface), 0);
        assert_eq!(session.advance(f32::INFINITY, &mut surface), 0);
        assert_eq!(session.accumulator, 0.0);
        assert_eq!(session.advance(SIM_DT * 1.5, &mut surface), 1);
    }

    fn word_lock_session() -> (Session, RecordingSurface) {
        let mut surface = RecordingSurface::default();
        let mut session = Session::new(5);
        session.start_level2(&mut surface);
        (session, surface)
    }

    fn type_word(session: &mut Session, surface: &mut RecordingSurface, word: &str) {
        for c in word.chars() {
            session.on_letter_input(c, surface);
        }
    }

    #[test]
    fn test_incomplete_row_notifies_without_scoring() {
        let (mut session, mut surface) = word_lock_session();
        type_word(&mut session, &mut surface, "HAR");
        session.on_submit(&mut surface);

        assert_eq!(surface.notices, vec![story::INCOMPLETE_ROW.to_string()]);
        let puzzle = session.wordle().unwrap();
        assert_eq!((puzzle.row, puzzle.col), (0, 3));
        assert_eq!(puzzle.rows[0].scores, None);
        assert_eq!(session.phase(), LevelPhase::Level2);
    }

    #[test]
    fn test_six_misses_notify_and_reset_board() {
        let (mut session, mut surface) = word_lock_session();
        for _ in 0..6 {
            type_word(&mut session, &mut surface, "ROSES");
            session.on_submit(&mut surface);
        }

        assert_eq!(surface.notices, vec![story::WORD_LOCK_FAILED.to_string()]);
        assert_eq!(surface.last_heading(), Some("Level 2: The Wordle Challenge"));
        let puzzle = session.wordle().unwrap();
        assert_eq!((puzzle.row, puzzle.col), (0, 0));
        assert_eq!(puzzle.restarts, 1);
        assert!(puzzle.rows.iter().all(|r| r.scores.is_none()));
        assert_eq!(session.progress().flowers_collected, 0);
        assert_eq!(session.phase(), LevelPhase::Level2);

        type_word(&mut session, &mut surface, "HARDI");
        session.on_submit(&mut surface);
        assert_eq!(session.progress().flowers_collected, 1);
        assert_eq!(surface.last_heading(), Some("Correct!"));
        steps(&mut session, &mut surface, 2 * TICK_HZ);
        assert_eq!(session.phase(), LevelPhase::Transition23);
    }

    #[test]
    fn test_mismatch_flips_back_after_delay() {
        let mut surface = RecordingSurface::default();
        let mut session = Session::new(8);
        session.start_level3(&mut surface);

        let (a, b) = {
            let cards = &session.memory().unwrap().cards;
            let other = cards.iter().find(|c| c.symbol != cards[0].symbol).unwrap();
            (cards[0].id, other.id)
        };
        session.on_card_selected(a, &mut surface);
        session.on_card_selected(b, &mut surface);
        let renders = surface.memory_renders;

        steps(&mut session, &mut surface, TICK_HZ - 1);
        let puzzle = session.memory().unwrap();
        assert!(puzzle.locked);
        assert!(puzzle.cards[a].face_up && puzzle.cards[b].face_up);
        assert_eq!(surface.memory_renders, renders);

        // Locked board ignores further picks
        let third = puzzle.cards.iter().find(|c| !c.face_up).unwrap().id;
        session.on_card_selected(third, &mut surface);
        assert!(!session.memory().unwrap().cards[third].face_up);

        session.step(&mut surface);
        let puzzle = session.memory().unwrap();
        assert!(!puzzle.locked);
        assert!(!puzzle.cards[a].face_up && !puzzle.cards[b].face_up);
        assert_eq!(surface.memory_renders, renders + 1);
        assert_eq!(session.phase(), LevelPhase::Level3);
    }

    #[test]
    fn test_with_tuning_validates() {
        let tuning = Tuning {
            max_attempts: 0,
            ..Tuning::default()
        };
        assert!(Session::with_tuning(1, tuning).is_err());
        assert!(Session::with_tuning(1, Tuning::default()).is_ok());
    }
}
