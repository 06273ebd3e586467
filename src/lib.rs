//! Plumber Panic - a side-scrolling platformer simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (tile collision, actors, game state)
//! - `scheduler`: Fixed-timestep accumulator with catch-up cap
//! - `tuning`: Data-driven game balance
//!
//! Rendering, audio and input devices are external collaborators: they feed
//! [`sim::TickInput`] in, read entity/camera/grid state out, and drain the
//! typed event queue once per frame.

pub mod scheduler;
pub mod sim;
pub mod tuning;

pub use scheduler::FixedTimestep;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Logical screen size (NES resolution)
    pub const SCREEN_WIDTH: f32 = 256.0;
    pub const SCREEN_HEIGHT: f32 = 240.0;
    /// World grid cell size in pixels
    pub const TILE_SIZE: f32 = 16.0;

    /// Fixed simulation timestep (60 Hz)
    pub const TICK_DT: f32 = 1.0 / 60.0;
    /// Maximum ticks drained per frame to prevent spiral of death
    pub const MAX_TICKS_PER_FRAME: u32 = 5;

    /// Physics (pixels per tick at 60 Hz)
    pub const GRAVITY: f32 = 0.7;
    pub const MAX_FALL_SPEED: f32 = 8.0;

    /// Player movement
    pub const PLAYER_WALK_ACCEL: f32 = 0.15;
    pub const PLAYER_RUN_ACCEL: f32 = 0.2;
    pub const PLAYER_WALK_MAX: f32 = 1.9;
    pub const PLAYER_RUN_MAX: f32 = 3.5;
    pub const PLAYER_FRICTION: f32 = 0.15;
    pub const PLAYER_SKID_FRICTION: f32 = 0.3;
    pub const PLAYER_JUMP_VELOCITY: f32 = -8.0;
    pub const PLAYER_BIG_JUMP_VELOCITY: f32 = -8.5;
    /// Gravity scale while ascending with jump held (variable-height jump)
    pub const PLAYER_JUMP_GRAVITY_MULT: f32 = 0.5;
    /// Upward velocity cap applied when jump is released mid-ascent
    pub const JUMP_CUT_VELOCITY: f32 = -2.0;
    /// Horizontal speed above which a jump gets an extra boost
    pub const RUN_JUMP_THRESHOLD: f32 = 2.5;
    pub const RUN_JUMP_BONUS: f32 = -1.0;
    /// Grace windows, in ticks
    pub const COYOTE_TICKS: u8 = 6;
    pub const JUMP_BUFFER_TICKS: u8 = 6;
    /// Upward bounce applied to the player after a stomp
    pub const STOMP_BOUNCE_VY: f32 = -6.0;
    /// Death animation launch velocity and per-tick gravity
    pub const DEATH_BOUNCE_VY: f32 = -8.0;
    pub const DEATH_GRAVITY: f32 = 0.3;

    /// Enemy speeds (pixels per tick)
    pub const WALKER_SPEED: f32 = 0.5;
    pub const SHELLED_SPEED: f32 = 0.5;
    pub const SHELL_SPEED: f32 = 5.0;
    /// How long a stomped walker stays flat before removal (seconds)
    pub const STOMP_EXPIRY: f32 = 0.5;

    /// Item speeds (pixels per tick)
    pub const MUSHROOM_SPEED: f32 = 1.5;
    pub const FIREBALL_SPEED: f32 = 4.0;
    pub const FIREBALL_BOUNCE_VY: f32 = -5.0;
    pub const STAR_SPEED: f32 = 2.0;
    pub const STAR_BOUNCE_VY: f32 = -6.0;
    pub const MAX_FIREBALLS: usize = 2;

    /// Timed windows (seconds)
    pub const LEVEL_TIME: f32 = 400.0;
    pub const TIME_WARNING: f32 = 100.0;
    pub const STAR_DURATION: f32 = 10.0;
    pub const INVULN_DURATION: f32 = 2.0;
    pub const GROW_ANIM_DURATION: f32 = 1.0;

    /// Player's horizontal anchor on screen
    pub const CAMERA_OFFSET_X: f32 = 80.0;
}

/// Score values awarded by the interaction resolver
pub mod scores {
    pub const COIN: u32 = 200;
    pub const STOMP: u32 = 100;
    pub const KICK: u32 = 100;
    pub const SHELL_KILL: u32 = 200;
    pub const MUSHROOM: u32 = 1000;
    pub const FIRE_FLOWER: u32 = 1000;
    pub const STAR: u32 = 1000;
    pub const BRICK_COIN: u32 = 200;
    pub const FLAG_BASE: u32 = 100;
    pub const FLAG_TOP: u32 = 5000;
}
