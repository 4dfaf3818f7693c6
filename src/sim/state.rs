//! Entity model and shared progress
//!
//! Everything here is plain data plus the small mutations each entity owns.
//! Scheduling and rule enforcement live in the engines.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::tuning::Tuning;

/// The runner controlled by the jump input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub size: Vec2,
    /// Vertical velocity (positive is down)
    pub vy: f32,
    /// Resting exactly on the ground line
    pub on_ground: bool,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        let (x, y) = tuning.player_start;
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::splat(tuning.player_size),
            vy: 0.0,
            on_ground: true,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }

    /// Integrate one tick of gravity, then clamp to the ground
    pub fn integrate(&mut self, gravity: f32, ground_y: f32) {
        self.vy += gravity;
        self.pos.y += self.vy;

        if self.pos.y + self.size.y >= ground_y {
            self.pos.y = ground_y - self.size.y;
            self.vy = 0.0;
            self.on_ground = true;
        }
    }

    /// Leave the ground. Returns false (and does nothing) while airborne.
    pub fn jump(&mut self, velocity: f32) -> bool {
        if !self.on_ground {
            return false;
        }
        self.vy = velocity;
        self.on_ground = false;
        true
    }
}

/// What an entity does to the player on contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    /// Costs a life
    Obstacle,
    /// Adds a flower
    Flower,
}

/// A scrolling obstacle or flower
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    pub rect: Rect,
}

impl Entity {
    /// Create an entity at the field's right edge, seated on the ground
    pub fn spawn(id: u32, kind: EntityKind, width: f32, height: f32, tuning: &Tuning) -> Self {
        Self {
            id,
            kind,
            rect: Rect::new(tuning.field_width, tuning.ground_y - height, width, height),
        }
    }

    pub fn advance(&mut self, speed: f32) {
        self.rect.pos.x -= speed;
    }

    /// Entirely past the left boundary
    pub fn is_off_field(&self) -> bool {
        self.rect.right() < 0.0
    }
}

/// Decides which spawn index produces a flower
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnSchedule {
    /// Spawns so far
    pub object_count: u32,
    /// Spawn index of the next flower
    pub next_flower_target: u32,
}

impl SpawnSchedule {
    pub fn new(rng: &mut impl Rng, tuning: &Tuning) -> Self {
        Self {
            object_count: 0,
            next_flower_target: draw_gap(rng, tuning),
        }
    }

    /// Count one spawn and decide its kind. Reaching the target yields a
    /// flower and pushes the target out by a fresh random gap.
    pub fn next_kind(&mut self, rng: &mut impl Rng, tuning: &Tuning) -> EntityKind {
        self.object_count += 1;
        if self.object_count == self.next_flower_target {
            self.next_flower_target = self.object_count + draw_gap(rng, tuning);
            EntityKind::Flower
        } else {
            EntityKind::Obstacle
        }
    }
}

fn draw_gap(rng: &mut impl Rng, tuning: &Tuning) -> u32 {
    rng.random_range(tuning.flower_gap_min..=tuning.flower_gap_max)
}

/// Session-wide progress shared by every level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub flowers_collected: u32,
}

impl Progress {
    pub fn award_flower(&mut self) -> u32 {
        self.flowers_collected += 1;
        self.flowers_collected
    }
}
