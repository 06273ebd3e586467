//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (insertion order for actors)
//! - No rendering or platform dependencies

pub mod block;
pub mod camera;
pub mod enemy;
pub mod entity;
pub mod item;
pub mod level;
pub mod physics;
pub mod player;
pub mod state;
pub mod tick;

pub use block::{BrickState, FlagpoleState, QuestionPayload, QuestionState};
pub use camera::Camera;
pub use enemy::{EnemySpecies, EnemyState};
pub use entity::{ActorKind, Body, Direction, Entity};
pub use item::{ItemKind, ItemState};
pub use level::{EnemySpawn, Level, LevelData, TileGrid, TileKind, to_tile};
pub use physics::{TileHits, apply_gravity, apply_velocity, is_on_ground, resolve};
pub use player::{Damage, Player, PowerState};
pub use state::{GameEvent, GamePhase, GameState};
pub use tick::{TickInput, tick};
