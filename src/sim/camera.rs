//! One-directional scroll-follow camera
//!
//! The offset only ever grows: walking left never scrolls back. The
//! activation zone is slightly wider than the viewport so enemies start
//! moving just before they become visible.

use serde::{Deserialize, Serialize};

use crate::consts::{CAMERA_OFFSET_X, SCREEN_HEIGHT, SCREEN_WIDTH, TILE_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub x: f32,
    pub y: f32,
    max_x: f32,
}

impl Camera {
    pub fn new(level_width_tiles: i32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            max_x: (level_width_tiles as f32 * TILE_SIZE - SCREEN_WIDTH).max(0.0),
        }
    }

    /// Follow the player's x, scrolling right only, clamped to the level
    pub fn follow(&mut self, entity_x: f32) {
        let target = entity_x - CAMERA_OFFSET_X;
        if target > self.x {
            self.x = target;
        }
        self.x = self.x.clamp(0.0, self.max_x);
    }

    pub fn max_x(&self) -> f32 {
        self.max_x
    }

    /// Is a world-space rectangle inside the viewport?
    pub fn is_visible(&self, x: f32, y: f32, w: f32, h: f32) -> bool {
        x + w > self.x
            && x < self.x + SCREEN_WIDTH
            && y + h > self.y
            && y < self.y + SCREEN_HEIGHT
    }

    /// Enemy activation window: one tile behind the left edge, two beyond
    /// the right edge.
    pub fn in_activation_zone(&self, x: f32) -> bool {
        x > self.x - TILE_SIZE && x < self.x + SCREEN_WIDTH + TILE_SIZE * 2.0
    }
}
