//! Tile grid, level ownership and the level-data seed
//!
//! The grid has an immutable shape and mutable cell contents; `set` is the
//! only way a cell changes (question blocks turning into used blocks, bricks
//! breaking to empty). Out-of-bounds reads are always `Empty`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::block::{BrickState, FlagpoleState, QuestionPayload, QuestionState};
use super::enemy::{self, EnemySpecies};
use super::entity::{ActorKind, Body, Entity};
use crate::consts::TILE_SIZE;

/// Closed enumeration of grid cell types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum TileKind {
    #[default]
    Empty = 0,
    Ground = 1,
    Brick = 2,
    Question = 3,
    UsedBlock = 4,
    HardBlock = 5,
    PipeTopLeft = 6,
    PipeTopRight = 7,
    PipeBodyLeft = 8,
    PipeBodyRight = 9,
    Flagpole = 10,
    FlagpoleTop = 11,
    CastleBlock = 12,
    InvisibleBarrier = 13,
    CoinBrick = 14,
    QuestionMushroom = 15,
    QuestionStar = 16,
    QuestionOneUp = 17,
}

impl From<TileKind> for u8 {
    fn from(t: TileKind) -> u8 {
        t as u8
    }
}

impl TryFrom<u8> for TileKind {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        use TileKind::*;
        Ok(match v {
            0 => Empty,
            1 => Ground,
            2 => Brick,
            3 => Question,
            4 => UsedBlock,
            5 => HardBlock,
            6 => PipeTopLeft,
            7 => PipeTopRight,
            8 => PipeBodyLeft,
            9 => PipeBodyRight,
            10 => Flagpole,
            11 => FlagpoleTop,
            12 => CastleBlock,
            13 => InvisibleBarrier,
            14 => CoinBrick,
            15 => QuestionMushroom,
            16 => QuestionStar,
            17 => QuestionOneUp,
            _ => return Err(format!("unknown tile value {v}")),
        })
    }
}

impl TileKind {
    /// Fixed solidity classification. Hidden 1-up blocks and flagpole
    /// tiles are pass-through. The castle is solid; the end-of-level walk
    /// moves the player through it with a scripted position update.
    pub fn is_solid(self) -> bool {
        use TileKind::*;
        matches!(
            self,
            Ground
                | Brick
                | Question
                | UsedBlock
                | HardBlock
                | PipeTopLeft
                | PipeTopRight
                | PipeBodyLeft
                | PipeBodyRight
                | CastleBlock
                | InvisibleBarrier
                | CoinBrick
                | QuestionMushroom
                | QuestionStar
        )
    }
}

/// World pixel coordinate to tile coordinate
#[inline]
pub fn to_tile(px: f32) -> i32 {
    (px / TILE_SIZE).floor() as i32
}

/// Fixed-shape 2D grid of tile kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    width: i32,
    height: i32,
    tiles: Vec<TileKind>,
}

impl TileGrid {
    pub fn new(width: i32, height: i32, tiles: Vec<TileKind>) -> Self {
        assert_eq!(tiles.len(), (width * height) as usize);
        Self {
            width,
            height,
            tiles,
        }
    }

    /// All-empty grid, for tests and tooling
    pub fn empty(width: i32, height: i32) -> Self {
        Self::new(width, height, vec![TileKind::Empty; (width * height) as usize])
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn get(&self, col: i32, row: i32) -> TileKind {
        if col < 0 || col >= self.width || row < 0 || row >= self.height {
            return TileKind::Empty;
        }
        self.tiles[(row * self.width + col) as usize]
    }

    /// The only mutation path for cell contents
    pub fn set(&mut self, col: i32, row: i32, kind: TileKind) {
        if col >= 0 && col < self.width && row >= 0 && row < self.height {
            self.tiles[(row * self.width + col) as usize] = kind;
        }
    }

    pub fn is_solid(&self, col: i32, row: i32) -> bool {
        self.get(col, row).is_solid()
    }
}

/// An enemy placement in the level seed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub species: EnemySpecies,
    pub col: i32,
    pub row: i32,
}

fn default_player_spawn() -> (i32, i32) {
    (3, 13)
}

/// Immutable level seed supplied by the level-data collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<TileKind>,
    #[serde(default)]
    pub spawns: Vec<EnemySpawn>,
    /// Player start cell (col, row of the feet)
    #[serde(default = "default_player_spawn")]
    pub player_spawn: (i32, i32),
    /// Castle door column ending the walk-to-castle sequence
    #[serde(default)]
    pub castle_col: Option<i32>,
}

/// Owns the grid, the insertion-ordered actor collection and the flagpole
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub grid: TileGrid,
    pub entities: Vec<Entity>,
    /// Flagpole world x, 0.0 when the level has none
    pub flag_x: f32,
    /// X threshold ending the walk-to-castle sequence
    pub castle_x: f32,
}

impl Level {
    /// Build the level from its seed: scan the grid for interactive blocks
    /// and the flagpole, then place enemies from the spawn list.
    pub fn from_data(data: &LevelData) -> Self {
        let grid = TileGrid::new(data.width, data.height, data.tiles.clone());
        let mut entities = Vec::new();
        let mut flag_x = 0.0;
        let mut castle_x = data.width as f32 * TILE_SIZE;

        for row in 0..grid.height() {
            for col in 0..grid.width() {
                let pos = Vec2::new(col as f32 * TILE_SIZE, row as f32 * TILE_SIZE);
                match grid.get(col, row) {
                    TileKind::Question => {
                        entities.push(block_entity(pos, col, row, QuestionPayload::Coin));
                    }
                    TileKind::QuestionMushroom => {
                        entities.push(block_entity(pos, col, row, QuestionPayload::PowerUp));
                    }
                    TileKind::QuestionStar => {
                        entities.push(block_entity(pos, col, row, QuestionPayload::Star));
                    }
                    TileKind::Brick => {
                        entities.push(brick_entity(pos, col, row, 0));
                    }
                    TileKind::CoinBrick => {
                        entities.push(brick_entity(pos, col, row, 5));
                    }
                    TileKind::FlagpoleTop => {
                        flag_x = col as f32 * TILE_SIZE;
                        entities.push(flagpole_entity(col));
                    }
                    TileKind::CastleBlock if castle_x >= data.width as f32 * TILE_SIZE => {
                        castle_x = col as f32 * TILE_SIZE;
                    }
                    _ => {}
                }
            }
        }

        if let Some(col) = data.castle_col {
            castle_x = col as f32 * TILE_SIZE;
        }

        for spawn in &data.spawns {
            let pos = Vec2::new(spawn.col as f32 * TILE_SIZE, spawn.row as f32 * TILE_SIZE);
            entities.push(match spawn.species {
                EnemySpecies::Walker => enemy::spawn_walker(pos),
                EnemySpecies::Shelled => enemy::spawn_shelled(pos),
            });
        }

        log::info!(
            "loaded level {}x{} with {} actors, flag at x={}",
            grid.width(),
            grid.height(),
            entities.len(),
            flag_x
        );

        Self {
            grid,
            entities,
            flag_x,
            castle_x,
        }
    }

    pub fn add_entity(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    /// Purge actors flagged for removal, preserving insertion order
    pub fn cleanup(&mut self) {
        self.entities.retain(|e| !e.body.remove);
    }
}

fn block_entity(pos: Vec2, col: i32, row: i32, payload: QuestionPayload) -> Entity {
    let mut body = Body::new(pos, Vec2::splat(TILE_SIZE));
    body.active = true;
    Entity::new(body, ActorKind::Question(QuestionState::new(col, row, payload)))
}

fn brick_entity(pos: Vec2, col: i32, row: i32, coins: u8) -> Entity {
    let mut body = Body::new(pos, Vec2::splat(TILE_SIZE));
    body.active = true;
    Entity::new(body, ActorKind::Brick(BrickState::new(col, row, coins)))
}

fn flagpole_entity(col: i32) -> Entity {
    // Pole spans rows 4..=12
    let pos = Vec2::new(col as f32 * TILE_SIZE, 4.0 * TILE_SIZE);
    let mut body = Body::new(pos, Vec2::new(TILE_SIZE, 9.0 * TILE_SIZE));
    body.active = true;
    Entity::new(body, ActorKind::Flagpole(FlagpoleState::new(col)))
}
