//! Gravity integration and tile collision resolution
//!
//! Collision is a separate-axis sweep against the grid: X first, then Y,
//! each driven only by the velocity sign on that axis. Zero velocity on an
//! axis skips that axis entirely; grounded detection therefore has its own
//! probe ([`is_on_ground`]) for the vy == 0 case. This is a deliberate
//! approximation carried over from the reference behavior - not a
//! continuous-time sweep.

use serde::{Deserialize, Serialize};

use super::entity::Body;
use super::level::{TileGrid, to_tile};
use crate::consts::TILE_SIZE;
use crate::tuning::Tuning;

/// Which sides of an entity hit solid tiles during one resolve
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TileHits {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
    /// Cell struck while moving up, for block-bump dispatch
    pub hit_cell: Option<(i32, i32)>,
}

/// Add gravity to vertical velocity, clamped to terminal fall speed
pub fn apply_gravity(body: &mut Body, tuning: &Tuning, mult: f32) {
    body.vel.y += tuning.gravity * mult;
    if body.vel.y > tuning.max_fall_speed {
        body.vel.y = tuning.max_fall_speed;
    }
}

/// Integrate velocity into position, exactly
pub fn apply_velocity(body: &mut Body) {
    body.pos += body.vel;
}

/// Resolve an entity against the grid, snapping it out of solid tiles and
/// zeroing velocity on each blocked axis.
pub fn resolve(grid: &TileGrid, body: &mut Body) -> TileHits {
    let mut hits = TileHits::default();
    resolve_x(grid, body, &mut hits);
    resolve_y(grid, body, &mut hits);
    hits
}

/// Resolve with the Y axis first. For bodies that travel while falling
/// (shells, mushrooms, fireballs): a landing frame can penetrate the floor
/// by several pixels, and the X pass would read that floor row as a wall,
/// killing the horizontal velocity. Settling Y first keeps landings and
/// wall hits distinct.
pub fn resolve_y_first(grid: &TileGrid, body: &mut Body) -> TileHits {
    let mut hits = TileHits::default();
    resolve_y(grid, body, &mut hits);
    resolve_x(grid, body, &mut hits);
    hits
}

fn resolve_x(grid: &TileGrid, body: &mut Body, hits: &mut TileHits) {
    if body.vel.x == 0.0 {
        return;
    }

    let top = to_tile(body.top());
    let bottom = to_tile(body.bottom() - 1.0);

    if body.vel.x > 0.0 {
        let col = to_tile(body.right());
        for row in top..=bottom {
            if grid.is_solid(col, row) {
                body.pos.x = col as f32 * TILE_SIZE - body.size.x;
                body.vel.x = 0.0;
                hits.right = true;
                break;
            }
        }
    } else {
        let col = to_tile(body.left());
        for row in top..=bottom {
            if grid.is_solid(col, row) {
                body.pos.x = (col + 1) as f32 * TILE_SIZE;
                body.vel.x = 0.0;
                hits.left = true;
                break;
            }
        }
    }
}

fn resolve_y(grid: &TileGrid, body: &mut Body, hits: &mut TileHits) {
    if body.vel.y == 0.0 {
        return;
    }

    let left = to_tile(body.left());
    let right = to_tile(body.right() - 1.0);

    if body.vel.y > 0.0 {
        let row = to_tile(body.bottom());
        for col in left..=right {
            if grid.is_solid(col, row) {
                body.pos.y = row as f32 * TILE_SIZE - body.size.y;
                body.vel.y = 0.0;
                hits.bottom = true;
                break;
            }
        }
    } else {
        // Moving up: the struck cell feeds block-bump logic
        let row = to_tile(body.top());
        for col in left..=right {
            if grid.is_solid(col, row) {
                body.pos.y = (row + 1) as f32 * TILE_SIZE;
                body.vel.y = 0.0;
                hits.top = true;
                hits.hit_cell = Some((col, row));
                break;
            }
        }
    }
}

/// Probe the row one pixel below the entity's feet, across its full width.
/// Grounded fallback for ticks where vy is exactly zero.
pub fn is_on_ground(grid: &TileGrid, body: &Body) -> bool {
    let row = to_tile(body.bottom() + 1.0);
    let left = to_tile(body.left());
    let right = to_tile(body.right() - 1.0);

    (left..=right).any(|col| grid.is_solid(col, row))
}
