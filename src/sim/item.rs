//! Item controllers
//!
//! Items spawned from blocks start in an emerge phase (scripted rise out of
//! the block, not collectible, no physics). The coin popup stays scripted
//! for its whole life; everything else hands over to the physics integrator
//! once emerged.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{ActorKind, Body, Direction, Entity};
use crate::consts::{FIREBALL_SPEED, MUSHROOM_SPEED, STAR_SPEED, TILE_SIZE};
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ItemKind {
    Mushroom {
        one_up: bool,
    },
    FireFlower,
    Star,
    /// Scripted parabolic coin from a bumped block; pure visual
    CoinPopup {
        start_y: f32,
    },
    Fireball {
        bounces: u8,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemState {
    pub kind: ItemKind,
    pub emerging: bool,
    emerge_target_y: f32,
}

impl ItemState {
    /// Collectible by the player this tick?
    pub fn is_collectible(&self) -> bool {
        !self.emerging
            && matches!(
                self.kind,
                ItemKind::Mushroom { .. } | ItemKind::FireFlower | ItemKind::Star
            )
    }

    /// Free-roaming items get gravity and tile collision from the resolver;
    /// emerging items and the coin popup are scripted.
    pub fn is_simulated(&self) -> bool {
        !self.emerging
            && matches!(self.kind, ItemKind::Mushroom { .. } | ItemKind::Star)
    }

    pub fn update(&mut self, body: &mut Body, tuning: &Tuning) {
        if self.emerging {
            body.pos.y -= 1.0;
            if body.pos.y <= self.emerge_target_y {
                body.pos.y = self.emerge_target_y;
                self.emerging = false;
                if matches!(self.kind, ItemKind::Star) {
                    body.vel.y = tuning.star_bounce_vy;
                }
            }
            return;
        }

        if let ItemKind::CoinPopup { start_y } = self.kind {
            body.vel.y += 0.4;
            body.pos.y += body.vel.y;
            if body.vel.y > 0.0 && body.pos.y >= start_y - 8.0 {
                body.remove = true;
            }
        }
    }

    /// Ground contact for bouncing items
    pub fn on_bounce(&mut self, body: &mut Body, tuning: &Tuning) {
        match &mut self.kind {
            ItemKind::Star => body.vel.y = tuning.star_bounce_vy,
            ItemKind::Fireball { bounces } => {
                body.vel.y = tuning.fireball_bounce_vy;
                *bounces += 1;
                if *bounces > 5 {
                    body.remove = true;
                }
            }
            _ => {}
        }
    }

    /// Wall contact for roaming items. The collision snap has already
    /// zeroed the velocity, so the speed comes back from the item kind.
    pub fn reverse(&mut self, body: &mut Body, dir: Direction) {
        let speed = match self.kind {
            ItemKind::Mushroom { .. } => MUSHROOM_SPEED,
            ItemKind::Star => STAR_SPEED,
            _ => return,
        };
        body.vel.x = dir.sign() * speed;
    }
}

fn emerging_item(pos: Vec2, kind: ItemKind) -> Entity {
    let mut body = Body::new(pos, Vec2::splat(TILE_SIZE));
    body.active = true;
    let state = ItemState {
        kind,
        emerging: true,
        emerge_target_y: pos.y - TILE_SIZE,
    };
    Entity::new(body, ActorKind::Item(state))
}

/// Mushroom rising out of a bumped block
pub fn spawn_mushroom(pos: Vec2, one_up: bool) -> Entity {
    let mut e = emerging_item(pos, ItemKind::Mushroom { one_up });
    e.body.vel.x = MUSHROOM_SPEED;
    e
}

/// Fire flower: emerges, then sits still
pub fn spawn_flower(pos: Vec2) -> Entity {
    emerging_item(pos, ItemKind::FireFlower)
}

/// Star: emerges, then bounces across the level
pub fn spawn_star(pos: Vec2) -> Entity {
    let mut e = emerging_item(pos, ItemKind::Star);
    e.body.vel.x = STAR_SPEED;
    e
}

/// Coin popup launched from a bumped block
pub fn spawn_coin_popup(pos: Vec2) -> Entity {
    let mut body = Body::new(pos, Vec2::splat(TILE_SIZE));
    body.active = true;
    body.vel.y = -8.0;
    let state = ItemState {
        kind: ItemKind::CoinPopup { start_y: pos.y },
        emerging: false,
        emerge_target_y: pos.y,
    };
    Entity::new(body, ActorKind::Item(state))
}

/// Fireball thrown from the player's facing edge
pub fn spawn_fireball(pos: Vec2, dir: Direction) -> Entity {
    let mut body = Body::new(pos, Vec2::new(8.0, 8.0));
    body.active = true;
    body.vel = Vec2::new(dir.sign() * FIREBALL_SPEED, 2.0);
    let state = ItemState {
        kind: ItemKind::Fireball { bounces: 0 },
        emerging: false,
        emerge_target_y: pos.y,
    };
    Entity::new(body, ActorKind::Item(state))
}
