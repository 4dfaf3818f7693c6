//! Single authoritative tick source
//!
//! The session advances in fixed steps at [`TICK_HZ`]. During the run level
//! the scheduler raises a frame cue every step and a spawn cue every
//! `spawn_period` steps; both cadences start and stop together. One-shot
//! timers cover narrative delays and the memory-match flip back.

use crate::consts::TICK_HZ;

/// Convert a millisecond duration to whole ticks (rounded up)
pub const fn ms_to_ticks(ms: u32) -> u32 {
    (ms as u64 * TICK_HZ as u64).div_ceil(1000) as u32
}

/// Something the scheduler wants handled this step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cue<A> {
    /// Advance physics and resolve collisions
    Frame,
    /// Create the next obstacle or flower
    Spawn,
    /// A one-shot timer expired
    Timer(A),
}

#[derive(Debug, Clone)]
struct Cadence {
    spawn_period: u32,
    spawn_countdown: u32,
}

#[derive(Debug, Clone)]
struct Timer<A> {
    due: u64,
    action: A,
}

/// Fixed-step scheduler owning every cadence of a session
#[derive(Debug, Clone)]
pub struct Scheduler<A> {
    now: u64,
    cadence: Option<Cadence>,
    frame_pending: bool,
    spawn_pending: bool,
    timers: Vec<Timer<A>>,
}

impl<A> Default for Scheduler<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Scheduler<A> {
    pub fn new() -> Self {
        Self {
            now: 0,
            cadence: None,
            frame_pending: false,
            spawn_pending: false,
            timers: Vec::new(),
        }
    }

    /// Ticks elapsed since the scheduler was created
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Start the frame and spawn cadences. The first spawn lands one full
    /// period from now; the first frame lands on the next step.
    pub fn start_cadences(&mut self, spawn_period: u32) {
        let spawn_period = spawn_period.max(1);
        self.cadence = Some(Cadence {
            spawn_period,
            spawn_countdown: spawn_period,
        });
        self.frame_pending = false;
        self.spawn_pending = false;
    }

    /// Stop both cadences, dropping any cue not yet handed out this step
    pub fn stop_cadences(&mut self) {
        self.cadence = None;
        self.frame_pending = false;
        self.spawn_pending = false;
    }

    pub fn cadences_running(&self) -> bool {
        self.cadence.is_some()
    }

    /// Arm a one-shot timer. A zero delay still waits for the next step.
    pub fn after(&mut self, delay_ticks: u32, action: A) {
        let due = self.now + u64::from(delay_ticks.max(1));
        self.timers.push(Timer { due, action });
    }

    pub fn cancel_timers(&mut self) {
        self.timers.clear();
    }

    /// Move the clock forward one step and queue the cues it raises
    pub fn begin_step(&mut self) {
        self.now += 1;
        if let Some(cadence) = &mut self.cadence {
            self.frame_pending = true;
            cadence.spawn_countdown -= 1;
            if cadence.spawn_countdown == 0 {
                self.spawn_pending = true;
                cadence.spawn_countdown = cadence.spawn_period;
            }
        }
    }

    /// Next cue for the current step: frame, then spawn, then expired timers
    /// in due order (ties by arming order).
    pub fn next_cue(&mut self) -> Option<Cue<A>> {
        if self.frame_pending {
            self.frame_pending = false;
            return Some(Cue::Frame);
        }
        if self.spawn_pending {
            self.spawn_pending = false;
            return Some(Cue::Spawn);
        }
        let now = self.now;
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= now)
            .min_by_key(|(i, t)| (t.due, *i))
            .map(|(i, _)| i)?;
        Some(Cue::Timer(self.timers.remove(index).action))
    }
}
