//! Enemy controllers: ground walkers and shelled walkers
//!
//! The shelled walker is a three-state machine: Walking -> Shelled(still)
//! -> Shelled(moving). Every transition is an explicit field change here so
//! the interaction resolver only ever reads state, never re-derives it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::entity::{ActorKind, Body, Direction, Entity};
use crate::consts::{SHELLED_SPEED, TILE_SIZE, WALKER_SPEED};
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemySpecies {
    /// Walks off ledges, dies flat when stomped
    Walker,
    /// Hides in its shell when stomped; a kicked shell is a projectile
    Shelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyState {
    pub species: EnemySpecies,
    pub dir: Direction,
    /// Permanently admitted by the camera's activation window
    pub activated: bool,
    /// Flattened walker awaiting expiry
    pub stomped: bool,
    pub stomp_timer: f32,
    /// Shelled walker only
    pub in_shell: bool,
    pub shell_moving: bool,
}

impl EnemyState {
    pub fn new(species: EnemySpecies) -> Self {
        Self {
            species,
            dir: Direction::Left,
            activated: false,
            stomped: false,
            stomp_timer: 0.0,
            in_shell: false,
            shell_moving: false,
        }
    }

    /// Shell sitting still: touching it kicks it instead of stomping
    pub fn is_resting_shell(&self) -> bool {
        self.in_shell && !self.shell_moving
    }

    /// Kicked shell: lethal to other enemies, damaging to the player
    pub fn is_lethal_shell(&self) -> bool {
        self.in_shell && self.shell_moving
    }

    /// Activate once the camera window admits this enemy's x position
    pub fn check_activation(&mut self, body: &mut Body, camera: &Camera) {
        if !self.activated && camera.in_activation_zone(body.pos.x) {
            self.activated = true;
            body.active = true;
        }
    }

    /// Per-tick advance; physics and collision are applied by the resolver
    pub fn update(&mut self, body: &mut Body, tuning: &Tuning, dt: f32) {
        if self.stomped {
            self.stomp_timer += dt;
            if self.stomp_timer > tuning.stomp_expiry {
                body.remove = true;
            }
            return;
        }

        match self.species {
            EnemySpecies::Walker => {
                body.vel.x = self.dir.sign() * tuning.walker_speed;
            }
            EnemySpecies::Shelled => {
                if !self.in_shell {
                    body.vel.x = self.dir.sign() * tuning.shelled_speed;
                } else if self.shell_moving {
                    body.vel.x = self.dir.sign() * tuning.shell_speed;
                }
                // Resting shells stay put
            }
        }
    }

    /// Stomp contact from above
    pub fn on_stomp(&mut self, body: &mut Body) {
        match self.species {
            EnemySpecies::Walker => {
                self.stomped = true;
                body.vel = Vec2::ZERO;
            }
            EnemySpecies::Shelled => {
                if !self.in_shell {
                    // Withdraw: shorter hitbox, feet stay planted
                    self.in_shell = true;
                    self.shell_moving = false;
                    body.vel.x = 0.0;
                    body.pos.y += body.size.y - TILE_SIZE;
                    body.size.y = TILE_SIZE;
                }
            }
        }
    }

    /// Kick a resting shell away from the player's side
    pub fn kick(&mut self, body: &mut Body, dir: Direction, tuning: &Tuning) {
        self.shell_moving = true;
        self.dir = dir;
        body.vel.x = dir.sign() * tuning.shell_speed;
    }

    /// Halt a moving shell back to rest (stomped while sliding)
    pub fn halt(&mut self, body: &mut Body) {
        self.shell_moving = false;
        body.vel.x = 0.0;
    }

    /// Reverse travel on a wall hit. Speed comes back from the travel state,
    /// not the negated velocity: the collision snap has already zeroed it.
    pub fn reverse(&mut self, body: &mut Body, tuning: &Tuning) {
        match self.species {
            EnemySpecies::Walker => {
                self.dir = self.dir.flip();
                body.vel.x = self.dir.sign() * tuning.walker_speed;
            }
            EnemySpecies::Shelled => {
                if self.shell_moving {
                    self.dir = self.dir.flip();
                    body.vel.x = self.dir.sign() * tuning.shell_speed;
                } else if !self.in_shell {
                    self.dir = self.dir.flip();
                    body.vel.x = self.dir.sign() * tuning.shelled_speed;
                }
            }
        }
    }
}

/// Ground walker at a spawn cell's top-left corner
pub fn spawn_walker(pos: Vec2) -> Entity {
    let mut body = Body::new(pos, Vec2::new(TILE_SIZE, TILE_SIZE));
    body.vel.x = -WALKER_SPEED;
    Entity::new(body, ActorKind::Enemy(EnemyState::new(EnemySpecies::Walker)))
}

/// Shelled walker; taller than a tile, so it stands up out of its cell
pub fn spawn_shelled(pos: Vec2) -> Entity {
    let mut body = Body::new(pos - Vec2::new(0.0, 8.0), Vec2::new(TILE_SIZE, 24.0));
    body.vel.x = -SHELLED_SPEED;
    Entity::new(body, ActorKind::Enemy(EnemyState::new(EnemySpecies::Shelled)))
}
