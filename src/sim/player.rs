//! Player control state machine
//!
//! Composed flags over one alive supertype: normal control, grow-animating,
//! flag-sliding, walking-to-castle, dead. While any flag other than normal
//! control is set, input handling is suppressed and the resolver drives the
//! sequence instead.
//!
//! Jump feel comes from three pieces: coyote ticks (jump shortly after
//! walking off a ledge), a jump buffer (early press before landing still
//! counts), and a variable-height jump (reduced gravity while ascending
//! with the button held, velocity cap on release).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Body, Direction};
use super::tick::TickInput;
use crate::consts::{DEATH_BOUNCE_VY, JUMP_CUT_VELOCITY, TILE_SIZE};
use crate::tuning::Tuning;

/// Monotonic upgrade path; damage resets big/fire to small
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PowerState {
    Small,
    Big,
    Fire,
}

/// Outcome of a damage attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Damage {
    /// Invulnerable or star-powered: nothing happens
    Ignored,
    /// Downgraded to small, invulnerability window started
    Survived,
    /// Already small: the caller kills the player
    Fatal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub dir: Direction,
    pub power: PowerState,
    pub on_ground: bool,
    pub jumping: bool,
    pub running: bool,
    pub skidding: bool,
    pub crouching: bool,
    pub dead: bool,
    pub invulnerable: bool,
    pub invuln_timer: f32,
    pub star_power: bool,
    pub star_timer: f32,
    pub growing: bool,
    pub grow_timer: f32,
    pub flag_sliding: bool,
    pub walking_to_castle: bool,
    coyote: u8,
    jump_buffer: u8,
}

impl Player {
    /// Hitbox is slightly narrower than a tile for forgiving gaps
    pub const WIDTH: f32 = 14.0;
    pub const SMALL_HEIGHT: f32 = 16.0;
    pub const BIG_HEIGHT: f32 = 32.0;

    pub fn new(pos: Vec2) -> Self {
        let mut body = Body::new(pos, Vec2::new(Self::WIDTH, Self::SMALL_HEIGHT));
        body.active = true;
        Self {
            body,
            dir: Direction::Right,
            power: PowerState::Small,
            on_ground: false,
            jumping: false,
            running: false,
            skidding: false,
            crouching: false,
            dead: false,
            invulnerable: false,
            invuln_timer: 0.0,
            star_power: false,
            star_timer: 0.0,
            growing: false,
            grow_timer: 0.0,
            flag_sliding: false,
            walking_to_castle: false,
            coyote: 0,
            jump_buffer: 0,
        }
    }

    pub fn is_big(&self) -> bool {
        self.power >= PowerState::Big
    }

    pub fn is_fire(&self) -> bool {
        self.power == PowerState::Fire
    }

    /// Is ordinary input handling suppressed this tick?
    pub fn input_suppressed(&self) -> bool {
        self.dead || self.growing || self.flag_sliding || self.walking_to_castle
    }

    /// Upgrade only; `power_up(Small)` on a big player is a no-op
    pub fn power_up(&mut self, new_state: PowerState, tuning: &Tuning) {
        if new_state > self.power {
            self.power = new_state;
            self.update_hitbox();
            self.growing = true;
            self.grow_timer = tuning.grow_duration;
        }
    }

    pub fn damage(&mut self, tuning: &Tuning) -> Damage {
        if self.invulnerable || self.star_power {
            return Damage::Ignored;
        }
        if self.power == PowerState::Small {
            return Damage::Fatal;
        }
        self.power = PowerState::Small;
        self.update_hitbox();
        self.invulnerable = true;
        self.invuln_timer = tuning.invuln_duration;
        Damage::Survived
    }

    pub fn activate_star(&mut self, tuning: &Tuning) {
        self.star_power = true;
        self.star_timer = tuning.star_duration;
    }

    /// Enter the death bounce; the resolver animates it from here
    pub fn kill(&mut self) {
        self.dead = true;
        self.body.vel = Vec2::new(0.0, DEATH_BOUNCE_VY);
    }

    /// Height follows power state; feet stay planted through the change
    fn update_hitbox(&mut self) {
        if self.is_big() {
            if self.body.size.y == Self::SMALL_HEIGHT {
                self.body.size.y = Self::BIG_HEIGHT;
                self.body.pos.y -= TILE_SIZE; // grow upward
            }
        } else if self.body.size.y == Self::BIG_HEIGHT {
            self.body.size.y = Self::SMALL_HEIGHT;
            self.body.pos.y += TILE_SIZE; // shrink downward
        }
    }

    pub fn handle_input(&mut self, input: &TickInput, tuning: &Tuning) {
        if self.input_suppressed() {
            return;
        }

        self.running = input.run;
        self.crouching = input.down && self.is_big() && self.on_ground;
        if self.crouching {
            return;
        }

        let accel = if self.running {
            tuning.run_accel
        } else {
            tuning.walk_accel
        };
        let max_speed = if self.running {
            tuning.run_max
        } else {
            tuning.walk_max
        };

        if input.left {
            if self.body.vel.x > 0.0 && self.on_ground {
                // Skid: stronger deceleration, turn suppressed until the
                // velocity crosses zero
                self.skidding = true;
                self.body.vel.x -= tuning.skid_friction;
            } else {
                self.skidding = false;
                self.body.vel.x -= accel;
            }
            self.body.vel.x = self.body.vel.x.max(-max_speed);
            if !self.skidding {
                self.dir = Direction::Left;
            }
        } else if input.right {
            if self.body.vel.x < 0.0 && self.on_ground {
                self.skidding = true;
                self.body.vel.x += tuning.skid_friction;
            } else {
                self.skidding = false;
                self.body.vel.x += accel;
            }
            self.body.vel.x = self.body.vel.x.min(max_speed);
            if !self.skidding {
                self.dir = Direction::Right;
            }
        } else {
            self.skidding = false;
            if self.on_ground {
                if self.body.vel.x.abs() < tuning.friction {
                    self.body.vel.x = 0.0;
                } else {
                    self.body.vel.x -= self.body.vel.x.signum() * tuning.friction;
                }
            }
        }

        // Coyote time refills on the ground, burns down in the air
        if self.on_ground {
            self.coyote = tuning.coyote_ticks;
        } else {
            self.coyote = self.coyote.saturating_sub(1);
        }

        // Jump buffer remembers an early press for a few ticks
        if input.jump_pressed {
            self.jump_buffer = tuning.jump_buffer_ticks;
        } else {
            self.jump_buffer = self.jump_buffer.saturating_sub(1);
        }

        let can_jump = self.on_ground || self.coyote > 0;
        let wants_jump = input.jump_pressed || self.jump_buffer > 0;
        if wants_jump && can_jump && !self.jumping {
            let base = if self.is_big() {
                tuning.big_jump_velocity
            } else {
                tuning.jump_velocity
            };
            let speed_bonus = if self.body.vel.x.abs() > tuning.run_jump_threshold {
                tuning.run_jump_bonus
            } else {
                0.0
            };
            self.body.vel.y = base + speed_bonus;
            self.jumping = true;
            self.on_ground = false;
            self.coyote = 0;
            self.jump_buffer = 0;
        }
    }

    /// Gravity scale for this tick; also applies the jump cut when the
    /// button is released mid-ascent.
    pub fn gravity_multiplier(&mut self, input: &TickInput, tuning: &Tuning) -> f32 {
        if self.jumping && input.jump && self.body.vel.y < 0.0 {
            return tuning.jump_gravity_mult;
        }
        if !input.jump && self.jumping {
            self.jumping = false;
            if self.body.vel.y < JUMP_CUT_VELOCITY {
                self.body.vel.y = JUMP_CUT_VELOCITY;
            }
        }
        1.0
    }

    /// Count down the invulnerability, star and grow windows
    pub fn update_timers(&mut self, dt: f32) {
        if self.invulnerable {
            self.invuln_timer -= dt;
            if self.invuln_timer <= 0.0 {
                self.invulnerable = false;
            }
        }
        if self.star_power {
            self.star_timer -= dt;
            if self.star_timer <= 0.0 {
                self.star_power = false;
            }
        }
        if self.growing {
            self.grow_timer -= dt;
            if self.grow_timer <= 0.0 {
                self.growing = false;
            }
        }
    }
}
