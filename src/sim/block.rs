//! Interactive block state machines and the flagpole
//!
//! Blocks are pinned to one grid cell; a bump from below is their only
//! input. The grid cell rewrite (question -> used, brick -> empty) is done
//! by the resolver, which owns the grid.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::TILE_SIZE;

/// Transient bump-offset animation shared by both block kinds
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BumpAnim {
    active: bool,
    timer: f32,
}

impl BumpAnim {
    pub fn start(&mut self) {
        self.active = true;
        self.timer = 0.0;
    }

    pub fn update(&mut self, dt: f32) {
        if self.active {
            self.timer += dt;
            if self.timer >= 0.16 {
                self.active = false;
            }
        }
    }

    /// Vertical draw offset for the rendering collaborator
    pub fn offset(&self) -> f32 {
        if !self.active {
            0.0
        } else if self.timer < 0.08 {
            -4.0
        } else {
            -2.0
        }
    }
}

/// What a question block dispenses when first bumped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionPayload {
    Coin,
    /// Mushroom for a small player, fire flower otherwise
    PowerUp,
    Star,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuestionState {
    pub col: i32,
    pub row: i32,
    pub payload: QuestionPayload,
    pub used: bool,
    pub bump: BumpAnim,
}

impl QuestionState {
    pub fn new(col: i32, row: i32, payload: QuestionPayload) -> Self {
        Self {
            col,
            row,
            payload,
            used: false,
            bump: BumpAnim::default(),
        }
    }

    /// One-shot: the payload is dispensed exactly once
    pub fn bump(&mut self) -> Option<QuestionPayload> {
        if self.used {
            return None;
        }
        self.used = true;
        self.bump.start();
        Some(self.payload)
    }
}

/// Outcome of bumping a brick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrickBump {
    /// Dispensed one coin (multi-coin brick)
    Coin,
    /// Shattered (big player, no coins left)
    Break,
    /// Just nudged (small player)
    Nudge,
}

/// Cosmetic brick fragment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Debris {
    pub pos: Vec2,
    pub vel: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrickState {
    pub col: i32,
    pub row: i32,
    /// >0 turns this brick into a coin dispenser instead of breakable
    pub coins_left: u8,
    pub broken: bool,
    pub bump: BumpAnim,
    #[serde(skip)]
    pub debris: Vec<Debris>,
}

impl BrickState {
    pub fn new(col: i32, row: i32, coins: u8) -> Self {
        Self {
            col,
            row,
            coins_left: coins,
            broken: false,
            bump: BumpAnim::default(),
            debris: Vec::new(),
        }
    }

    pub fn bump(&mut self, is_big_player: bool, rng: &mut Pcg32) -> BrickBump {
        if self.coins_left > 0 {
            self.coins_left -= 1;
            self.bump.start();
            return BrickBump::Coin;
        }

        if is_big_player {
            self.broken = true;
            self.spawn_debris(rng);
            return BrickBump::Break;
        }

        self.bump.start();
        BrickBump::Nudge
    }

    fn spawn_debris(&mut self, rng: &mut Pcg32) {
        let cx = self.col as f32 * TILE_SIZE + 8.0;
        let cy = self.row as f32 * TILE_SIZE + 8.0;
        let pattern = [
            (-4.0, -4.0, -2.0, -6.0),
            (4.0, -4.0, 2.0, -6.0),
            (-4.0, 4.0, -1.5, -4.0),
            (4.0, 4.0, 1.5, -4.0),
        ];
        self.debris = pattern
            .iter()
            .map(|&(dx, dy, vx, vy)| Debris {
                pos: Vec2::new(cx + dx, cy + dy),
                vel: Vec2::new(vx + rng.random_range(-0.25..0.25), vy),
            })
            .collect();
    }

    /// Advance bump animation and debris. Returns true once a broken
    /// brick's fragments are all gone and the actor can be removed.
    pub fn update(&mut self, dt: f32) -> bool {
        self.bump.update(dt);

        let floor = self.row as f32 * TILE_SIZE + 200.0;
        for d in &mut self.debris {
            d.pos += d.vel;
            d.vel.y += 0.3;
        }
        self.debris.retain(|d| d.pos.y < floor);

        self.broken && self.debris.is_empty()
    }
}

/// The end-of-level flagpole; its flag descends once the slide starts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlagpoleState {
    pub col: i32,
    pub flag_y: f32,
    pub descending: bool,
}

impl FlagpoleState {
    pub fn new(col: i32) -> Self {
        Self {
            col,
            flag_y: 5.0 * TILE_SIZE,
            descending: false,
        }
    }

    pub fn start_descent(&mut self) {
        self.descending = true;
    }

    pub fn update(&mut self) {
        if self.descending {
            self.flag_y += 2.0;
            let bottom = 12.0 * TILE_SIZE;
            if self.flag_y >= bottom {
                self.flag_y = bottom;
                self.descending = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(7)
    }

    #[test]
    fn test_question_block_dispenses_once() {
        let mut q = QuestionState::new(2, 3, QuestionPayload::Star);
        assert_eq!(q.bump(), Some(QuestionPayload::Star));
        assert!(q.used);
        assert_eq!(q.bump(), None);
        assert_eq!(q.bump(), None);
    }

    #[test]
    fn test_multi_coin_brick_dispenses_exactly_coin_count() {
        let mut rng = rng();
        let mut b = BrickState::new(0, 0, 3);
        for _ in 0..3 {
            assert_eq!(b.bump(true, &mut rng), BrickBump::Coin);
        }
        // Exhausted: behaves like a plain brick from here on
        assert_eq!(b.bump(false, &mut rng), BrickBump::Nudge);
        assert_eq!(b.bump(true, &mut rng), BrickBump::Break);
    }

    #[test]
    fn test_brick_breaks_only_for_big_player() {
        let mut rng = rng();
        let mut b = BrickState::new(0, 0, 0);
        assert_eq!(b.bump(false, &mut rng), BrickBump::Nudge);
        assert!(!b.broken);
        assert_eq!(b.bump(true, &mut rng), BrickBump::Break);
        assert!(b.broken);
        assert_eq!(b.debris.len(), 4);
    }

    #[test]
    fn test_broken_brick_expires_with_its_debris() {
        let mut rng = rng();
        let mut b = BrickState::new(0, 0, 0);
        b.bump(true, &mut rng);
        assert!(!b.update(1.0 / 60.0));

        // Debris accelerates downward and is culled 200 px below the block
        for _ in 0..600 {
            if b.update(1.0 / 60.0) {
                return;
            }
        }
        panic!("debris never expired");
    }

    #[test]
    fn test_bump_offset_timeline() {
        let mut anim = BumpAnim::default();
        assert_eq!(anim.offset(), 0.0);
        anim.start();
        assert_eq!(anim.offset(), -4.0);
        anim.update(0.1);
        assert_eq!(anim.offset(), -2.0);
        anim.update(0.1);
        assert_eq!(anim.offset(), 0.0);
    }

    #[test]
    fn test_flag_descends_to_pole_base() {
        let mut f = FlagpoleState::new(40);
        f.start_descent();
        for _ in 0..100 {
            f.update();
        }
        assert_eq!(f.flag_y, 12.0 * TILE_SIZE);
        assert!(!f.descending);
    }
}
