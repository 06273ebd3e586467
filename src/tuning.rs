//! Data-driven game balance
//!
//! Every feel-critical number the simulation consumes at runtime lives in
//! one serializable struct, so balance passes edit a JSON file instead of
//! source. Defaults mirror [`crate::consts`]. Partial files work: any
//! missing field keeps its default.

use serde::{Deserialize, Serialize};

use crate::consts;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Pixels per tick per tick
    pub gravity: f32,
    pub max_fall_speed: f32,

    /// Player movement (pixels per tick)
    pub walk_accel: f32,
    pub run_accel: f32,
    pub walk_max: f32,
    pub run_max: f32,
    pub friction: f32,
    pub skid_friction: f32,
    pub jump_velocity: f32,
    pub big_jump_velocity: f32,
    /// Gravity scale while ascending with jump held
    pub jump_gravity_mult: f32,
    /// Horizontal speed above which a jump gets an extra boost
    pub run_jump_threshold: f32,
    pub run_jump_bonus: f32,
    /// Grace windows, in ticks
    pub coyote_ticks: u8,
    pub jump_buffer_ticks: u8,

    /// Enemy speeds (pixels per tick)
    pub walker_speed: f32,
    pub shelled_speed: f32,
    pub shell_speed: f32,
    /// Flat-walker lifetime after a stomp (seconds)
    pub stomp_expiry: f32,

    /// Bouncing item velocities
    pub star_bounce_vy: f32,
    pub fireball_bounce_vy: f32,

    /// Timed windows (seconds)
    pub level_time: f32,
    pub time_warning: f32,
    pub star_duration: f32,
    pub invuln_duration: f32,
    pub grow_duration: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: consts::GRAVITY,
            max_fall_speed: consts::MAX_FALL_SPEED,
            walk_accel: consts::PLAYER_WALK_ACCEL,
            run_accel: consts::PLAYER_RUN_ACCEL,
            walk_max: consts::PLAYER_WALK_MAX,
            run_max: consts::PLAYER_RUN_MAX,
            friction: consts::PLAYER_FRICTION,
            skid_friction: consts::PLAYER_SKID_FRICTION,
            jump_velocity: consts::PLAYER_JUMP_VELOCITY,
            big_jump_velocity: consts::PLAYER_BIG_JUMP_VELOCITY,
            jump_gravity_mult: consts::PLAYER_JUMP_GRAVITY_MULT,
            run_jump_threshold: consts::RUN_JUMP_THRESHOLD,
            run_jump_bonus: consts::RUN_JUMP_BONUS,
            coyote_ticks: consts::COYOTE_TICKS,
            jump_buffer_ticks: consts::JUMP_BUFFER_TICKS,
            walker_speed: consts::WALKER_SPEED,
            shelled_speed: consts::SHELLED_SPEED,
            shell_speed: consts::SHELL_SPEED,
            stomp_expiry: consts::STOMP_EXPIRY,
            star_bounce_vy: consts::STAR_BOUNCE_VY,
            fireball_bounce_vy: consts::FIREBALL_BOUNCE_VY,
            level_time: consts::LEVEL_TIME,
            time_warning: consts::TIME_WARNING,
            star_duration: consts::STAR_DURATION,
            invuln_duration: consts::INVULN_DURATION,
            grow_duration: consts::GROW_ANIM_DURATION,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning file
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
