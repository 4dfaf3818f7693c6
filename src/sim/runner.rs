//! Level 1: the obstacle run
//!
//! A fixed-step side runner. The player jumps over obstacles scrolling in
//! from the right and touches flowers to collect them. Frame and spawn cues
//! come from the session's scheduler; this module only applies them.

use rand::Rng;
use serde::Serialize;

use super::collision::Rect;
use super::state::{Entity, EntityKind, Player, Progress, SpawnSchedule};
use crate::tuning::Tuning;

/// Lifecycle of one attempt at the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    /// Accepting frames, spawns and jumps
    Running,
    /// Enough flowers collected
    Cleared,
    /// Out of lives
    Failed,
}

/// Result of one frame tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Keep ticking
    Continue,
    /// Flower target reached this tick
    Cleared,
    /// Last life lost this tick
    Failed,
    /// The run had already ended; nothing was simulated
    Stopped,
}

/// Complete Level 1 state
#[derive(Debug, Clone, Serialize)]
pub struct RunnerState {
    pub player: Player,
    /// Live entities in spawn order
    pub entities: Vec<Entity>,
    pub lives: u32,
    pub schedule: SpawnSchedule,
    pub status: RunStatus,
    /// Frame ticks simulated in this attempt
    pub ticks: u64,
    next_id: u32,
}

impl RunnerState {
    /// Fresh attempt. Resets the shared flower count, since a run always
    /// starts from zero flowers.
    pub fn new(rng: &mut impl Rng, tuning: &Tuning, progress: &mut Progress) -> Self {
        progress.flowers_collected = 0;
        Self {
            player: Player::new(tuning),
            entities: Vec::new(),
            lives: tuning.lives,
            schedule: SpawnSchedule::new(rng, tuning),
            status: RunStatus::Running,
            ticks: 0,
            next_id: 1,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == RunStatus::Running
    }

    /// Handle a jump intent. Ignored once the run has ended or mid-air.
    pub fn jump(&mut self, tuning: &Tuning) -> bool {
        if !self.is_running() {
            return false;
        }
        self.player.jump(tuning.jump_velocity)
    }

    /// Advance one frame: gravity, scroll, contacts, then off-field cleanup.
    ///
    /// Contacts resolve in spawn order. Reaching the flower target or losing
    /// the last life ends the run immediately; later entities are left as they
    /// are for this tick.
    pub fn tick(&mut self, tuning: &Tuning, progress: &mut Progress) -> FrameOutcome {
        if !self.is_running() {
            return FrameOutcome::Stopped;
        }
        self.ticks += 1;

        self.player.integrate(tuning.gravity, tuning.ground_y);

        for entity in &mut self.entities {
            entity.advance(tuning.scroll_speed);
        }

        let player = self.player.rect();
        let mut i = 0;
        while i < self.entities.len() {
            if !self.entities[i].rect.overlaps(&player) {
                i += 1;
                continue;
            }

            let entity = self.entities.remove(i);
            match entity.kind {
                EntityKind::Flower => {
                    let total = progress.award_flower();
                    log::debug!("Flower {} collected ({} total)", entity.id, total);
                    if total >= tuning.flowers_to_clear {
                        self.status = RunStatus::Cleared;
                        return FrameOutcome::Cleared;
                    }
                }
                EntityKind::Obstacle => {
                    self.lives = self.lives.saturating_sub(1);
                    log::debug!("Hit obstacle {} ({} lives left)", entity.id, self.lives);
                    if self.lives == 0 {
                        self.status = RunStatus::Failed;
                        return FrameOutcome::Failed;
                    }
                }
            }
        }

        self.entities.retain(|e| !e.is_off_field());
        FrameOutcome::Continue
    }

    /// Spawn the next entity at the right edge. Returns its kind, or `None`
    /// if the run has already ended.
    pub fn spawn(&mut self, rng: &mut impl Rng, tuning: &Tuning) -> Option<EntityKind> {
        if !self.is_running() {
            return None;
        }

        let kind = self.schedule.next_kind(rng, tuning);
        let height = match kind {
            EntityKind::Flower => tuning.obstacle_base_height,
            EntityKind::Obstacle => {
                let tier = rng.random_range(0..tuning.obstacle_height_multipliers.len());
                (tuning.obstacle_base_height * tuning.obstacle_height_multipliers[tier]).round()
            }
        };

        let id = self.next_id;
        self.next_id += 1;
        self.entities
            .push(Entity::spawn(id, kind, tuning.entity_width, height, tuning));
        log::trace!(
            "Spawn #{} {:?} h={} (next flower at #{})",
            self.schedule.object_count,
            kind,
            height,
            self.schedule.next_flower_target
        );
        Some(kind)
    }

    /// Borrowed view for the presentation surface
    pub fn snapshot<'a>(&'a self, progress: &Progress) -> RunSnapshot<'a> {
        RunSnapshot {
            player: self.player.rect(),
            entities: &self.entities,
            lives: self.lives,
            flowers: progress.flowers_collected,
            ticks: self.ticks,
        }
    }
}

/// What the surface needs to draw one run frame
#[derive(Debug, Clone, Serialize)]
pub struct RunSnapshot<'a> {
    pub player: Rect,
    pub entities: &'a [Entity],
    pub lives: u32,
    pub flowers: u32,
    pub ticks: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn setup() -> (RunnerState, Tuning, Progress, Pcg32) {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(12345);
        let mut progress = Progress::default();
        let runner = RunnerState::new(&mut rng, &tuning, &mut progress);
        (runner, tuning, progress, rng)
    }

    /// Place an entity so that it overlaps the player after the next scroll
    fn entity_on_player(id: u32, kind: EntityKind, tuning: &Tuning) -> Entity {
        let mut entity = Entity::spawn(id, kind, 50.0, 50.0, tuning);
        entity.rect.pos.x = 60.0 + tuning.scroll_speed;
        entity
    }

    #[test]
    fn test_new_run_resets_progress() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut progress = Progress {
            flowers_collected: 2,
        };
        let runner = RunnerState::new(&mut rng, &tuning, &mut progress);

        assert_eq!(progress.flowers_collected, 0);
        assert_eq!(runner.lives, 3);
        assert_eq!(runner.schedule.object_count, 0);
        assert!(runner.entities.is_empty());
        assert_eq!(runner.player.pos.x, 50.0);
        assert_eq!(runner.player.pos.y, 300.0);
        assert!(runner.is_running());
    }

    #[test]
    fn test_tick_scrolls_and_keeps_player_grounded() {
        let (mut runner, tuning, mut progress, mut rng) = setup();
        runner.spawn(&mut rng, &tuning);

        assert_eq!(runner.tick(&tuning, &mut progress), FrameOutcome::Continue);
        assert_eq!(runner.entities[0].rect.left(), tuning.field_width - 3.0);
        assert!(runner.player.on_ground);
        assert_eq!(runner.player.rect().bottom(), 350.0);
    }

    #[test]
    fn test_flower_contact_collects() {
        let (mut runner, tuning, mut progress, _) = setup();
        runner.entities.push(entity_on_player(1, EntityKind::Flower, &tuning));

        assert_eq!(runner.tick(&tuning, &mut progress), FrameOutcome::Continue);
        assert_eq!(progress.flowers_collected, 1);
        assert!(runner.entities.is_empty());
        assert_eq!(runner.lives, 3);
    }

    #[test]
    fn test_touching_edge_counts_as_contact() {
        let (mut runner, tuning, mut progress, _) = setup();
        let mut flower = Entity::spawn(1, EntityKind::Flower, 50.0, 50.0, &tuning);
        // Left edge lands exactly on the player's right edge (x = 100)
        flower.rect.pos.x = 100.0 + tuning.scroll_speed;
        runner.entities.push(flower);

        runner.tick(&tuning, &mut progress);
        assert_eq!(progress.flowers_collected, 1);
    }

    #[test]
    fn test_obstacle_contact_costs_life() {
        let (mut runner, tuning, mut progress, _) = setup();
        runner.entities.push(entity_on_player(1, EntityKind::Obstacle, &tuning));

        assert_eq!(runner.tick(&tuning, &mut progress), FrameOutcome::Continue);
        assert_eq!(runner.lives, 2);
        assert!(runner.entities.is_empty());
    }

    #[test]
    fn test_third_flower_clears_and_skips_rest_of_tick() {
        let (mut runner, tuning, mut progress, _) = setup();
        progress.flowers_collected = 2;
        runner.entities.push(entity_on_player(1, EntityKind::Flower, &tuning));
        runner.entities.push(entity_on_player(2, EntityKind::Obstacle, &tuning));

        assert_eq!(runner.tick(&tuning, &mut progress), FrameOutcome::Cleared);
        assert_eq!(runner.status, RunStatus::Cleared);
        assert_eq!(progress.flowers_collected, 3);
        // The obstacle behind the flower was never resolved
        assert_eq!(runner.lives, 3);
        assert_eq!(runner.entities.len(), 1);
    }

    #[test]
    fn test_last_life_fails() {
        let (mut runner, tuning, mut progress, _) = setup();
        runner.lives = 1;
        runner.entities.push(entity_on_player(1, EntityKind::Obstacle, &tuning));
        runner.entities.push(entity_on_player(2, EntityKind::Flower, &tuning));

        assert_eq!(runner.tick(&tuning, &mut progress), FrameOutcome::Failed);
        assert_eq!(runner.lives, 0);
        assert_eq!(progress.flowers_collected, 0);
    }

    #[test]
    fn test_stopped_run_ignores_everything() {
        let (mut runner, tuning, mut progress, mut rng) = setup();
        runner.status = RunStatus::Cleared;

        assert_eq!(runner.tick(&tuning, &mut progress), FrameOutcome::Stopped);
        assert_eq!(runner.spawn(&mut rng, &tuning), None);
        assert!(!runner.jump(&tuning));
        assert_eq!(runner.ticks, 0);
    }

    #[test]
    fn test_off_field_entities_removed() {
        let (mut runner, tuning, mut progress, _) = setup();
        let mut gone = Entity::spawn(1, EntityKind::Obstacle, 50.0, 50.0, &tuning);
        gone.rect.pos.x = -48.0;
        let mut kept = Entity::spawn(2, EntityKind::Obstacle, 50.0, 50.0, &tuning);
        kept.rect.pos.x = 400.0;
        runner.entities.push(gone);
        runner.entities.push(kept);

        runner.tick(&tuning, &mut progress);
        assert_eq!(runner.entities.len(), 1);
        assert_eq!(runner.entities[0].id, 2);
    }

    #[test]
    fn test_jump_clears_tallest_obstacle() {
        let (mut runner, tuning, mut progress, _) = setup();
        let mut obstacle = Entity::spawn(1, EntityKind::Obstacle, 50.0, 65.0, &tuning);
        // 15 px short of the player's right edge after the first scroll
        obstacle.rect.pos.x = 118.0;
        runner.entities.push(obstacle);

        assert!(runner.jump(&tuning));
        for _ in 0..70 {
            assert_eq!(runner.tick(&tuning, &mut progress), FrameOutcome::Continue);
        }
        assert_eq!(runner.lives, 3);
        assert!(runner.player.on_ground);
    }

    proptest! {
        #[test]
        fn prop_flowers_only_at_target_indices(seed in any::<u64>(), spawns in 1usize..200) {
            let tuning = Tuning::default();
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut progress = Progress::default();
            let mut runner = RunnerState::new(&mut rng, &tuning, &mut progress);

            for _ in 0..spawns {
                let target = runner.schedule.next_flower_target;
                let kind = runner.spawn(&mut rng, &tuning).unwrap();
                let index = runner.schedule.object_count;
                let entity = runner.entities.last().unwrap();

                prop_assert!(target >= index);
                if index == target {
                    prop_assert_eq!(kind, EntityKind::Flower);
                    prop_assert_eq!(entity.rect.size.y, 50.0);
                    let gap = runner.schedule.next_flower_target - index;
                    prop_assert!((3..=8).contains(&gap));
                } else {
                    prop_assert_eq!(kind, EntityKind::Obstacle);
                    prop_assert!([50.0, 60.0, 65.0].contains(&entity.rect.size.y));
                }
                prop_assert_eq!(entity.rect.bottom(), 350.0);
            }
        }
    }
}
