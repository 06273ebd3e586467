//! Movable-rectangle base shared by every actor
//!
//! All gameplay actors are an axis-aligned box plus a tagged kind. The
//! resolver switches on [`ActorKind`] instead of downcasting, so each
//! interaction branch reads explicit sub-state fields.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::block::{BrickState, FlagpoleState, QuestionState};
use super::enemy::EnemyState;
use super::item::ItemState;

/// Facing/travel direction along the x axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }

    #[inline]
    pub fn flip(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Physics substrate: continuous position, velocity, size and liveness flags
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Top-left corner in world pixels
    pub pos: Vec2,
    /// Pixels per tick
    pub vel: Vec2,
    pub size: Vec2,
    /// Participates in interactions and physics
    pub alive: bool,
    /// Admitted by the camera's activation window
    pub active: bool,
    /// Purged at end of tick
    pub remove: bool,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size,
            alive: true,
            active: false,
            remove: false,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.pos.x + self.size.x / 2.0
    }

    #[inline]
    pub fn center_y(&self) -> f32 {
        self.pos.y + self.size.y / 2.0
    }

    /// Standard AABB intersection test
    pub fn overlaps(&self, other: &Body) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

/// Closed set of actor species owned by the level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActorKind {
    Enemy(EnemyState),
    Item(ItemState),
    Question(QuestionState),
    Brick(BrickState),
    Flagpole(FlagpoleState),
}

/// A level-owned actor: base rectangle plus species sub-state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub body: Body,
    pub kind: ActorKind,
}

impl Entity {
    pub fn new(body: Body, kind: ActorKind) -> Self {
        Self { body, kind }
    }

    /// Enemy sub-state, if this actor is an enemy
    pub fn as_enemy(&self) -> Option<&EnemyState> {
        match &self.kind {
            ActorKind::Enemy(e) => Some(e),
            _ => None,
        }
    }
}
