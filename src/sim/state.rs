//! Game state and the typed event queue
//!
//! All state that must be persisted for save/determinism lives here. The
//! event queue is the one transient exception: it is drained once per frame
//! by the presentation side and never serialized.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::level::{Level, LevelData};
use super::player::Player;
use crate::consts::TILE_SIZE;
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Death bounce animation running
    Dying,
    /// Death animation finished, a life was consumed
    Dead,
    /// Flag touched; slide and walk-to-castle sequence
    LevelComplete,
    /// No lives left
    GameOver,
}

/// One gameplay occurrence, drained by the presentation side each frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    CoinCollected,
    BlockBump,
    BlockBreak,
    /// An item started emerging from a block
    ItemAppear,
    Stomp,
    /// A resting shell was kicked
    Kick,
    EnemyKilled,
    PowerUp,
    PowerDown,
    Jump { big: bool },
    FireballThrown,
    OneUp,
    FlagReached,
    LevelComplete,
    PlayerDied,
    /// Level timer crossed the warning threshold
    TimeWarning,
    /// Points awarded at a world position, for floating score text
    ScoreAdded { points: u32, x: f32, y: f32 },
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// RNG state, re-derived each tick from seed and tick counter
    pub rng_state: RngState,
    pub level: Level,
    pub player: Player,
    pub camera: Camera,
    pub tuning: Tuning,
    pub score: u32,
    /// Rolls over to a life at 100
    pub coins: u32,
    pub lives: u8,
    /// Level timer in seconds, counts down
    pub time_left: f32,
    /// Fired the time warning already?
    pub time_warned: bool,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub phase: GamePhase,
    /// Pending events, drained once per frame
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Build a fresh run from a level seed
    pub fn new(data: &LevelData, seed: u64) -> Self {
        let level = Level::from_data(data);
        let (col, row) = data.player_spawn;
        let spawn = glam::Vec2::new(
            col as f32 * TILE_SIZE,
            row as f32 * TILE_SIZE - Player::SMALL_HEIGHT,
        );
        let camera = Camera::new(level.grid.width());
        let tuning = Tuning::default();
        let time_left = tuning.level_time;
        Self {
            seed,
            rng_state: RngState::new(seed),
            level,
            player: Player::new(spawn),
            camera,
            tuning,
            score: 0,
            coins: 0,
            lives: 3,
            time_left,
            time_warned: false,
            time_ticks: 0,
            phase: GamePhase::Playing,
            events: Vec::new(),
        }
    }

    /// Per-tick RNG: seeded from the run seed and tick counter so replays
    /// with the same seed and inputs stay bit-identical.
    pub fn tick_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed ^ self.time_ticks)
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Award points and emit the floating-score event at a world position
    pub fn add_score(&mut self, points: u32, x: f32, y: f32) {
        self.score += points;
        self.push_event(GameEvent::ScoreAdded { points, x, y });
    }

    /// Collect one coin; 100 coins roll over into a life
    pub fn add_coin(&mut self) {
        self.coins += 1;
        self.push_event(GameEvent::CoinCollected);
        if self.coins >= 100 {
            self.coins -= 100;
            self.add_life();
        }
    }

    pub fn add_life(&mut self) {
        self.lives = self.lives.saturating_add(1);
        self.push_event(GameEvent::OneUp);
    }

    /// Hand the pending events to the presentation side
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
