//! Core simulation tick
//!
//! One call advances the world exactly one fixed step. The order inside a
//! tick is load-bearing:
//!
//! 1. Level timer
//! 2. Player input, physics, tile collision, block-bump dispatch
//! 3. Camera follow
//! 4. Entity advance + physics (insertion order)
//! 5. Interactions: player/enemy, shell/enemy, fireball/enemy, player/item,
//!    player/flagpole. Exactly one branch fires per overlapping pair.
//! 6. Purge of removed actors
//!
//! Same seed + same input sequence = bit-identical state.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{ActorKind, Direction, Entity};
use super::item::{self, ItemKind};
use super::level::{TileKind, to_tile};
use super::physics;
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::{
    DEATH_GRAVITY, MAX_FIREBALLS, SCREEN_HEIGHT, STOMP_BOUNCE_VY, TILE_SIZE,
};
use crate::scores;

/// Sampled input state for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Jump button held
    pub jump: bool,
    /// Jump button pressed this tick (edge)
    pub jump_pressed: bool,
    pub run: bool,
    /// Fire button pressed this tick (edge)
    pub fire_pressed: bool,
}

/// Advance the simulation by one fixed step
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    match state.phase {
        GamePhase::Playing => tick_playing(state, input, dt),
        GamePhase::Dying => tick_dying(state),
        GamePhase::LevelComplete => tick_level_complete(state, dt),
        GamePhase::Dead | GamePhase::GameOver => {}
    }
    state.time_ticks += 1;
}

fn tick_playing(state: &mut GameState, input: &TickInput, dt: f32) {
    advance_level_timer(state, dt);
    if state.phase != GamePhase::Playing {
        return;
    }

    state.player.update_timers(dt);

    let was_jumping = state.player.jumping;
    state.player.handle_input(input, &state.tuning);
    if state.player.jumping && !was_jumping {
        let big = state.player.is_big();
        state.push_event(GameEvent::Jump { big });
    }

    maybe_throw_fireball(state, input);

    player_physics(state, input);
    if state.phase != GamePhase::Playing {
        return;
    }

    state.camera.follow(state.player.body.center_x());

    update_entities(state, dt);
    resolve_interactions(state);

    state.level.cleanup();
}

fn advance_level_timer(state: &mut GameState, dt: f32) {
    state.time_left -= dt;
    if !state.time_warned && state.time_left <= state.tuning.time_warning {
        state.time_warned = true;
        state.push_event(GameEvent::TimeWarning);
    }
    if state.time_left <= 0.0 {
        state.time_left = 0.0;
        kill_player(state);
    }
}

fn maybe_throw_fireball(state: &mut GameState, input: &TickInput) {
    if !input.fire_pressed || !state.player.is_fire() || state.player.input_suppressed() {
        return;
    }
    let live = state
        .level
        .entities
        .iter()
        .filter(|e| {
            matches!(
                &e.kind,
                ActorKind::Item(s) if matches!(s.kind, ItemKind::Fireball { .. })
            ) && !e.body.remove
        })
        .count();
    if live >= MAX_FIREBALLS {
        return;
    }

    let p = state.player.body;
    let dir = state.player.dir;
    let x = match dir {
        Direction::Right => p.right(),
        Direction::Left => p.left() - 8.0,
    };
    state
        .level
        .add_entity(item::spawn_fireball(Vec2::new(x, p.top() + 8.0), dir));
    state.push_event(GameEvent::FireballThrown);
}

fn player_physics(state: &mut GameState, input: &TickInput) {
    let mult = state.player.gravity_multiplier(input, &state.tuning);
    physics::apply_gravity(&mut state.player.body, &state.tuning, mult);
    physics::apply_velocity(&mut state.player.body);

    reveal_hidden_blocks(state);

    let hits = physics::resolve(&state.level.grid, &mut state.player.body);
    state.player.on_ground = hits.bottom
        || (state.player.body.vel.y == 0.0
            && physics::is_on_ground(&state.level.grid, &state.player.body));
    if state.player.on_ground {
        state.player.jumping = false;
    }

    // The camera's left edge is a wall: scroll-back is impossible, so the
    // player can never leave the screen to the left
    if state.player.body.pos.x < state.camera.x {
        state.player.body.pos.x = state.camera.x;
        if state.player.body.vel.x < 0.0 {
            state.player.body.vel.x = 0.0;
        }
    }

    // Pit fall
    if state.player.body.top() > SCREEN_HEIGHT {
        kill_player(state);
        return;
    }

    if let Some(cell) = hits.hit_cell {
        handle_block_hit(state, cell);
    }
}

/// Hidden 1-up blocks are pass-through until struck from below, at which
/// point they solidify and dispense.
fn reveal_hidden_blocks(state: &mut GameState) {
    let body = state.player.body;
    if body.vel.y >= 0.0 {
        return;
    }
    let row = to_tile(body.top());
    for col in to_tile(body.left())..=to_tile(body.right() - 1.0) {
        if state.level.grid.get(col, row) == TileKind::QuestionOneUp {
            state.level.grid.set(col, row, TileKind::UsedBlock);
            state.player.body.pos.y = (row + 1) as f32 * TILE_SIZE;
            state.player.body.vel.y = 0.0;

            let pos = Vec2::new(col as f32 * TILE_SIZE, row as f32 * TILE_SIZE);
            state.level.add_entity(item::spawn_mushroom(pos, true));
            state.push_event(GameEvent::ItemAppear);
            kill_enemies_on_cell(state, col, row);
            break;
        }
    }
}

enum BlockAction {
    Payload(super::block::QuestionPayload),
    BrickCoin { exhausted: bool },
    Break,
    Nudge,
    Spent,
}

fn handle_block_hit(state: &mut GameState, (col, row): (i32, i32)) {
    let Some(idx) = state.level.entities.iter().position(|e| match &e.kind {
        ActorKind::Question(q) => q.col == col && q.row == row,
        ActorKind::Brick(b) => b.col == col && b.row == row,
        _ => false,
    }) else {
        return;
    };

    let is_big = state.player.is_big();
    let mut rng = state.tick_rng();
    let action = match &mut state.level.entities[idx].kind {
        ActorKind::Question(q) => match q.bump() {
            Some(payload) => BlockAction::Payload(payload),
            None => BlockAction::Spent,
        },
        ActorKind::Brick(b) => match b.bump(is_big, &mut rng) {
            super::block::BrickBump::Coin => BlockAction::BrickCoin {
                exhausted: b.coins_left == 0,
            },
            super::block::BrickBump::Break => BlockAction::Break,
            super::block::BrickBump::Nudge => BlockAction::Nudge,
        },
        _ => return,
    };

    let cell_pos = Vec2::new(col as f32 * TILE_SIZE, row as f32 * TILE_SIZE);
    match action {
        BlockAction::Payload(payload) => {
            use super::block::QuestionPayload;
            state.level.grid.set(col, row, TileKind::UsedBlock);
            state.push_event(GameEvent::BlockBump);
            match payload {
                QuestionPayload::Coin => {
                    state.add_coin();
                    state.add_score(scores::COIN, cell_pos.x, cell_pos.y - TILE_SIZE);
                    state
                        .level
                        .add_entity(item::spawn_coin_popup(cell_pos - Vec2::new(0.0, TILE_SIZE)));
                }
                QuestionPayload::PowerUp => {
                    let entity = if is_big {
                        item::spawn_flower(cell_pos)
                    } else {
                        item::spawn_mushroom(cell_pos, false)
                    };
                    state.level.add_entity(entity);
                    state.push_event(GameEvent::ItemAppear);
                }
                QuestionPayload::Star => {
                    state.level.add_entity(item::spawn_star(cell_pos));
                    state.push_event(GameEvent::ItemAppear);
                }
            }
        }
        BlockAction::BrickCoin { exhausted } => {
            state.push_event(GameEvent::BlockBump);
            state.add_coin();
            state.add_score(scores::BRICK_COIN, cell_pos.x, cell_pos.y - TILE_SIZE);
            state
                .level
                .add_entity(item::spawn_coin_popup(cell_pos - Vec2::new(0.0, TILE_SIZE)));
            if exhausted {
                state.level.grid.set(col, row, TileKind::UsedBlock);
            }
        }
        BlockAction::Break => {
            state.level.grid.set(col, row, TileKind::Empty);
            state.push_event(GameEvent::BlockBreak);
        }
        BlockAction::Nudge => {
            state.push_event(GameEvent::BlockBump);
        }
        BlockAction::Spent => return,
    }

    kill_enemies_on_cell(state, col, row);
}

/// A bumped block jolts any enemy standing on it
fn kill_enemies_on_cell(state: &mut GameState, col: i32, row: i32) {
    let cell_top = row as f32 * TILE_SIZE;
    let cell_left = col as f32 * TILE_SIZE;
    for i in 0..state.level.entities.len() {
        let Some(enemy) = state.level.entities[i].as_enemy() else {
            continue;
        };
        if enemy.stomped {
            continue;
        }
        let b = state.level.entities[i].body;
        if !b.active || b.remove {
            continue;
        }
        let on_cell = (b.bottom() - cell_top).abs() <= 2.0
            && b.right() > cell_left
            && b.left() < cell_left + TILE_SIZE;
        if on_cell {
            kill_enemy(state, i, scores::SHELL_KILL);
        }
    }
}

fn kill_enemy(state: &mut GameState, idx: usize, points: u32) {
    let body = &mut state.level.entities[idx].body;
    body.alive = false;
    body.remove = true;
    let (x, y) = (body.pos.x, body.pos.y);
    state.push_event(GameEvent::EnemyKilled);
    state.add_score(points, x, y);
}

fn update_entities(state: &mut GameState, dt: f32) {
    let camera = state.camera;
    for i in 0..state.level.entities.len() {
        let Entity { body, kind } = &mut state.level.entities[i];
        match kind {
            ActorKind::Enemy(e) => {
                e.check_activation(body, &camera);
                if !body.active || body.remove {
                    continue;
                }
                e.update(body, &state.tuning, dt);
                if !e.stomped {
                    physics::apply_gravity(body, &state.tuning, 1.0);
                    physics::apply_velocity(body);
                    let hits = physics::resolve_y_first(&state.level.grid, body);
                    if hits.left || hits.right {
                        e.reverse(body, &state.tuning);
                    }
                }
                if body.top() > SCREEN_HEIGHT + 32.0 {
                    body.remove = true;
                }
            }
            ActorKind::Item(s) => {
                s.update(body, &state.tuning);
                if s.is_simulated() || matches!(s.kind, ItemKind::Fireball { .. }) {
                    physics::apply_gravity(body, &state.tuning, 1.0);
                    physics::apply_velocity(body);
                    let hits = physics::resolve_y_first(&state.level.grid, body);
                    if hits.bottom {
                        s.on_bounce(body, &state.tuning);
                    }
                    if hits.left || hits.right {
                        let away = if hits.right {
                            Direction::Left
                        } else {
                            Direction::Right
                        };
                        match s.kind {
                            // Fireballs burst on walls
                            ItemKind::Fireball { .. } => body.remove = true,
                            _ => s.reverse(body, away),
                        }
                    }
                }
                let offscreen_fireball = matches!(s.kind, ItemKind::Fireball { .. })
                    && !camera.is_visible(body.pos.x, body.pos.y, body.size.x, body.size.y);
                if offscreen_fireball || body.top() > SCREEN_HEIGHT + 32.0 {
                    body.remove = true;
                }
            }
            ActorKind::Question(q) => {
                q.bump.update(dt);
            }
            ActorKind::Brick(b) => {
                if b.update(dt) {
                    body.remove = true;
                }
            }
            ActorKind::Flagpole(f) => {
                f.update();
            }
        }
    }
}

fn resolve_interactions(state: &mut GameState) {
    let n = state.level.entities.len();

    // Player contacts, one branch per overlapping actor
    for i in 0..n {
        if state.phase != GamePhase::Playing {
            return;
        }
        let body = state.level.entities[i].body;
        if !body.active || body.remove || !body.overlaps(&state.player.body) {
            continue;
        }
        enum Contact {
            Enemy,
            Item,
            Flag,
        }
        let contact = match &state.level.entities[i].kind {
            ActorKind::Enemy(_) => Some(Contact::Enemy),
            ActorKind::Item(s) if s.is_collectible() => Some(Contact::Item),
            ActorKind::Flagpole(_) => Some(Contact::Flag),
            _ => None,
        };
        match contact {
            Some(Contact::Enemy) => player_vs_enemy(state, i),
            Some(Contact::Item) => collect_item(state, i),
            Some(Contact::Flag) => reach_flag(state, i),
            None => {}
        }
    }

    // Kicked shells plow through other enemies
    for i in 0..n {
        let shell = state.level.entities[i].body;
        let lethal = state.level.entities[i]
            .as_enemy()
            .is_some_and(|e| e.is_lethal_shell())
            && shell.active
            && !shell.remove;
        if !lethal {
            continue;
        }
        for j in 0..n {
            if j == i {
                continue;
            }
            let Some(other) = state.level.entities[j].as_enemy() else {
                continue;
            };
            if other.stomped {
                continue;
            }
            let b = state.level.entities[j].body;
            if b.active && b.alive && !b.remove && b.overlaps(&shell) {
                kill_enemy(state, j, scores::SHELL_KILL);
            }
        }
    }

    // Fireball hits
    for i in 0..n {
        let fb = state.level.entities[i].body;
        let is_fireball = matches!(
            &state.level.entities[i].kind,
            ActorKind::Item(s) if matches!(s.kind, ItemKind::Fireball { .. })
        );
        if !is_fireball || fb.remove {
            continue;
        }
        for j in 0..n {
            let Some(enemy) = state.level.entities[j].as_enemy() else {
                continue;
            };
            if enemy.stomped {
                continue;
            }
            let b = state.level.entities[j].body;
            if b.active && b.alive && !b.remove && b.overlaps(&fb) {
                kill_enemy(state, j, scores::SHELL_KILL);
                state.level.entities[i].body.remove = true;
                break;
            }
        }
    }
}

fn player_vs_enemy(state: &mut GameState, idx: usize) {
    let Some(enemy) = state.level.entities[idx].as_enemy().copied() else {
        return;
    };
    let ebody = state.level.entities[idx].body;

    // 1. Touching a resting shell kicks it away from the player
    if enemy.is_resting_shell() {
        let dir = if state.player.body.center_x() < ebody.center_x() {
            Direction::Right
        } else {
            Direction::Left
        };
        let Entity { body, kind } = &mut state.level.entities[idx];
        if let ActorKind::Enemy(e) = kind {
            e.kick(body, dir, &state.tuning);
        }
        state.push_event(GameEvent::Kick);
        state.add_score(scores::KICK, ebody.pos.x, ebody.pos.y);
        return;
    }

    // 2. Stomp: falling, and the feet were above the enemy's midline
    let pbody = state.player.body;
    let stomp = pbody.vel.y > 0.0
        && pbody.bottom() - pbody.vel.y <= ebody.top() + ebody.size.y / 2.0;
    if stomp {
        // Halting a moving shell is not worth points, only the bounce
        let mut halted = false;
        let Entity { body, kind } = &mut state.level.entities[idx];
        if let ActorKind::Enemy(e) = kind {
            if e.is_lethal_shell() {
                e.halt(body);
                halted = true;
            } else {
                e.on_stomp(body);
            }
        }
        state.player.body.vel.y = STOMP_BOUNCE_VY;
        state.player.jumping = false;
        state.push_event(GameEvent::Stomp);
        if !halted {
            state.add_score(scores::STOMP, ebody.pos.x, ebody.pos.y);
        }
        return;
    }

    // 3. Star power kills on contact
    if state.player.star_power {
        kill_enemy(state, idx, scores::SHELL_KILL);
        return;
    }

    // 4. Side contact (including a moving shell) damages the player
    match state.player.damage(&state.tuning) {
        super::player::Damage::Ignored => {}
        super::player::Damage::Survived => state.push_event(GameEvent::PowerDown),
        super::player::Damage::Fatal => kill_player(state),
    }
}

fn collect_item(state: &mut GameState, idx: usize) {
    let ActorKind::Item(s) = &state.level.entities[idx].kind else {
        return;
    };
    let kind = s.kind;
    let body = state.level.entities[idx].body;
    state.level.entities[idx].body.remove = true;

    match kind {
        ItemKind::Mushroom { one_up: true } => {
            state.add_life();
            state.add_score(scores::MUSHROOM, body.pos.x, body.pos.y);
        }
        ItemKind::Mushroom { one_up: false } => {
            state
                .player
                .power_up(super::player::PowerState::Big, &state.tuning);
            state.push_event(GameEvent::PowerUp);
            state.add_score(scores::MUSHROOM, body.pos.x, body.pos.y);
        }
        ItemKind::FireFlower => {
            // A flower on a small player grows first; fire needs a second one
            let next = if state.player.is_big() {
                super::player::PowerState::Fire
            } else {
                super::player::PowerState::Big
            };
            state.player.power_up(next, &state.tuning);
            state.push_event(GameEvent::PowerUp);
            state.add_score(scores::FIRE_FLOWER, body.pos.x, body.pos.y);
        }
        ItemKind::Star => {
            state.player.activate_star(&state.tuning);
            state.push_event(GameEvent::PowerUp);
            state.add_score(scores::STAR, body.pos.x, body.pos.y);
        }
        ItemKind::CoinPopup { .. } | ItemKind::Fireball { .. } => {}
    }
}

fn reach_flag(state: &mut GameState, idx: usize) {
    state.push_event(GameEvent::FlagReached);

    // Higher grab on the pole, bigger award; the very top is the jackpot.
    // Height is measured at the player's head.
    let row = to_tile(state.player.body.top());
    let points = if row <= 5 {
        scores::FLAG_TOP
    } else {
        scores::FLAG_BASE * (12 - row).max(1) as u32
    };
    let (px, py) = (state.player.body.pos.x, state.player.body.pos.y);
    state.add_score(points, px, py);

    let Entity { body, kind } = &mut state.level.entities[idx];
    if let ActorKind::Flagpole(f) = kind {
        f.start_descent();
    }
    let pole_left = body.left();

    state.player.flag_sliding = true;
    state.player.body.pos.x = pole_left - state.player.body.size.x / 2.0;
    state.player.body.vel = Vec2::ZERO;
    state.phase = GamePhase::LevelComplete;
}

fn tick_level_complete(state: &mut GameState, dt: f32) {
    for Entity { kind, .. } in &mut state.level.entities {
        match kind {
            ActorKind::Flagpole(f) => f.update(),
            ActorKind::Question(q) => q.bump.update(dt),
            _ => {}
        }
    }

    if state.player.flag_sliding {
        state.player.body.pos.y += 2.0;
        if physics::is_on_ground(&state.level.grid, &state.player.body) {
            state.player.flag_sliding = false;
            state.player.walking_to_castle = true;
            state.player.dir = Direction::Right;
        }
    } else if state.player.walking_to_castle {
        // Scripted walk straight through the castle tiles to the door
        state.player.body.pos.x += 1.0;
        if state.player.body.pos.x >= state.level.castle_x {
            state.player.walking_to_castle = false;
            state.player.body.vel = Vec2::ZERO;
            state.player.body.active = false;
            state.push_event(GameEvent::LevelComplete);
        }
    }
}

fn tick_dying(state: &mut GameState) {
    // Scripted bounce: no tile collision, slower gravity
    state.player.body.vel.y += DEATH_GRAVITY;
    state.player.body.pos.y += state.player.body.vel.y;
    if state.player.body.pos.y > SCREEN_HEIGHT + 32.0 {
        state.lives = state.lives.saturating_sub(1);
        state.phase = if state.lives == 0 {
            GamePhase::GameOver
        } else {
            GamePhase::Dead
        };
    }
}

fn kill_player(state: &mut GameState) {
    if state.player.dead {
        return;
    }
    state.player.kill();
    state.phase = GamePhase::Dying;
    state.push_event(GameEvent::PlayerDied);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::TICK_DT;
    use crate::sim::enemy::EnemySpecies;
    use crate::sim::level::{EnemySpawn, LevelData};
    use crate::sim::player::PowerState;
    use crate::tuning::Tuning;

    /// 15-row level with a solid floor on row 14
    fn flat_level(width: i32) -> LevelData {
        let height = 15;
        let mut tiles = vec![TileKind::Empty; (width * height) as usize];
        for col in 0..width {
            tiles[(14 * width + col) as usize] = TileKind::Ground;
        }
        LevelData {
            width,
            height,
            tiles,
            spawns: vec![],
            player_spawn: (3, 14),
            castle_col: None,
        }
    }

    fn set_tile(data: &mut LevelData, col: i32, row: i32, kind: TileKind) {
        data.tiles[(row * data.width + col) as usize] = kind;
    }

    fn run_ticks(state: &mut GameState, input: &TickInput, n: usize) {
        for _ in 0..n {
            tick(state, input, TICK_DT);
        }
    }

    fn enemy_at(state: &GameState, idx: usize) -> &crate::sim::enemy::EnemyState {
        state.level.entities[idx].as_enemy().expect("enemy actor")
    }

    #[test]
    fn test_idle_player_stays_grounded() {
        let mut state = GameState::new(&flat_level(30), 1);
        run_ticks(&mut state, &TickInput::default(), 10);
        assert!(state.player.on_ground);
        assert_eq!(state.player.body.bottom(), 14.0 * TILE_SIZE);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_walk_right_moves_and_scrolls_camera() {
        let mut state = GameState::new(&flat_level(100), 1);
        let input = TickInput {
            right: true,
            run: true,
            ..Default::default()
        };
        run_ticks(&mut state, &input, 300);
        assert!(state.player.body.pos.x > 300.0);
        assert!(state.camera.x > 0.0);
        // Camera pins the player's anchor once scrolling
        assert!(
            (state.player.body.center_x() - state.camera.x - crate::consts::CAMERA_OFFSET_X).abs()
                < 8.0
        );
    }

    #[test]
    fn test_jump_emits_event_and_leaves_ground() {
        let mut state = GameState::new(&flat_level(30), 1);
        run_ticks(&mut state, &TickInput::default(), 5);

        let jump = TickInput {
            jump: true,
            jump_pressed: true,
            ..Default::default()
        };
        tick(&mut state, &jump, TICK_DT);
        assert!(state.drain_events().contains(&GameEvent::Jump { big: false }));
        assert!(!state.player.on_ground);
        assert!(state.player.body.vel.y < 0.0);
    }

    #[test]
    fn test_question_block_coin_bump() {
        let mut data = flat_level(30);
        // Block two tiles above the player's head
        set_tile(&mut data, 3, 10, TileKind::Question);
        let mut state = GameState::new(&data, 1);
        run_ticks(&mut state, &TickInput::default(), 5);

        let jump = TickInput {
            jump: true,
            jump_pressed: true,
            ..Default::default()
        };
        tick(&mut state, &jump, TICK_DT);
        let held = TickInput {
            jump: true,
            ..Default::default()
        };
        run_ticks(&mut state, &held, 30);

        assert_eq!(state.coins, 1);
        assert_eq!(state.level.grid.get(3, 10), TileKind::UsedBlock);
        assert!(state.score >= scores::COIN);
        // Second hit dispenses nothing
        let coins = state.coins;
        run_ticks(&mut state, &TickInput::default(), 30);
        tick(&mut state, &jump, TICK_DT);
        run_ticks(&mut state, &held, 30);
        assert_eq!(state.coins, coins);
    }

    #[test]
    fn test_block_bump_kills_enemy_standing_on_it() {
        let mut data = flat_level(30);
        set_tile(&mut data, 3, 10, TileKind::Question);
        // Walker patrolling on top of the block
        data.spawns.push(EnemySpawn {
            species: EnemySpecies::Walker,
            col: 3,
            row: 9,
        });
        let mut state = GameState::new(&data, 1);
        run_ticks(&mut state, &TickInput::default(), 5);

        let jump = TickInput {
            jump: true,
            jump_pressed: true,
            ..Default::default()
        };
        tick(&mut state, &jump, TICK_DT);
        let held = TickInput {
            jump: true,
            ..Default::default()
        };
        let mut killed = false;
        for _ in 0..30 {
            tick(&mut state, &held, TICK_DT);
            if state.drain_events().contains(&GameEvent::EnemyKilled) {
                killed = true;
                break;
            }
        }
        assert!(killed, "bump should jolt the walker off the block");
        assert_eq!(state.score, scores::COIN + scores::SHELL_KILL);
    }

    #[test]
    fn test_power_up_question_block_spawns_mushroom_then_big() {
        let mut data = flat_level(30);
        set_tile(&mut data, 3, 10, TileKind::QuestionMushroom);
        let mut state = GameState::new(&data, 1);
        run_ticks(&mut state, &TickInput::default(), 5);

        let jump = TickInput {
            jump: true,
            jump_pressed: true,
            ..Default::default()
        };
        tick(&mut state, &jump, TICK_DT);
        let held = TickInput {
            jump: true,
            ..Default::default()
        };
        // Mushroom emerges (16 ticks), walks right, drops off the block and
        // lands; chase it down to collect
        run_ticks(&mut state, &held, 30);
        let chase = TickInput {
            right: true,
            ..Default::default()
        };
        let mut powered = false;
        for _ in 0..400 {
            tick(&mut state, &chase, TICK_DT);
            if state.drain_events().contains(&GameEvent::PowerUp) {
                powered = true;
                break;
            }
        }
        assert!(powered, "player should catch the mushroom");
        assert_eq!(state.player.power, PowerState::Big);
        assert_eq!(state.player.body.size.y, 32.0);
    }

    #[test]
    fn test_brick_breaks_for_big_player() {
        let mut data = flat_level(30);
        set_tile(&mut data, 3, 10, TileKind::Brick);
        let mut state = GameState::new(&data, 1);
        state.player.power_up(PowerState::Big, &Tuning::default());
        state.player.growing = false;
        run_ticks(&mut state, &TickInput::default(), 5);

        let jump = TickInput {
            jump: true,
            jump_pressed: true,
            ..Default::default()
        };
        tick(&mut state, &jump, TICK_DT);
        let held = TickInput {
            jump: true,
            ..Default::default()
        };
        run_ticks(&mut state, &held, 30);

        assert_eq!(state.level.grid.get(3, 10), TileKind::Empty);
    }

    #[test]
    fn test_stomp_flattens_walker_and_bounces_player() {
        let mut data = flat_level(30);
        data.spawns.push(EnemySpawn {
            species: EnemySpecies::Walker,
            col: 5,
            row: 13,
        });
        let mut state = GameState::new(&data, 1);
        // Drop the player onto the walker
        state.player.body.pos = Vec2::new(
            state.level.entities[0].body.pos.x + 1.0,
            state.level.entities[0].body.top() - 40.0,
        );

        let mut stomped = false;
        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), TICK_DT);
            if state.drain_events().contains(&GameEvent::Stomp) {
                stomped = true;
                break;
            }
        }
        assert!(stomped, "player should land on the walker");
        assert!(enemy_at(&state, 0).stomped);
        assert_eq!(state.player.body.vel.y, STOMP_BOUNCE_VY);
        assert_eq!(state.score, scores::STOMP);
        assert!(!state.player.dead);

        // Flat walker expires and is purged
        run_ticks(&mut state, &TickInput::default(), 60);
        assert!(state.level.entities.is_empty());
    }

    #[test]
    fn test_side_contact_damages_small_player_fatally() {
        let mut data = flat_level(30);
        data.spawns.push(EnemySpawn {
            species: EnemySpecies::Walker,
            col: 5,
            row: 13,
        });
        let mut state = GameState::new(&data, 1);

        let input = TickInput {
            right: true,
            run: true,
            ..Default::default()
        };
        let mut died = false;
        for _ in 0..300 {
            tick(&mut state, &input, TICK_DT);
            if state.drain_events().contains(&GameEvent::PlayerDied) {
                died = true;
                break;
            }
        }
        assert!(died, "walking into the enemy should kill a small player");
        assert_eq!(state.phase, GamePhase::Dying);

        // Death bounce runs to completion and consumes a life
        run_ticks(&mut state, &TickInput::default(), 300);
        assert_eq!(state.phase, GamePhase::Dead);
        assert_eq!(state.lives, 2);
    }

    #[test]
    fn test_big_player_survives_with_downgrade() {
        let mut data = flat_level(30);
        data.spawns.push(EnemySpawn {
            species: EnemySpecies::Walker,
            col: 5,
            row: 13,
        });
        let mut state = GameState::new(&data, 1);
        state.player.power_up(PowerState::Big, &Tuning::default());
        state.player.growing = false;

        let input = TickInput {
            right: true,
            run: true,
            ..Default::default()
        };
        let mut hurt = false;
        for _ in 0..300 {
            tick(&mut state, &input, TICK_DT);
            if state.drain_events().contains(&GameEvent::PowerDown) {
                hurt = true;
                break;
            }
        }
        assert!(hurt);
        assert_eq!(state.player.power, PowerState::Small);
        assert!(state.player.invulnerable);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_star_power_kills_on_any_contact() {
        let mut data = flat_level(30);
        data.spawns.push(EnemySpawn {
            species: EnemySpecies::Walker,
            col: 5,
            row: 13,
        });
        let mut state = GameState::new(&data, 1);
        state.player.activate_star(&Tuning::default());

        // Side contact, not a stomp: the star kills anyway
        let input = TickInput {
            right: true,
            ..Default::default()
        };
        let mut killed = false;
        for _ in 0..120 {
            tick(&mut state, &input, TICK_DT);
            if state.drain_events().contains(&GameEvent::EnemyKilled) {
                killed = true;
                break;
            }
        }
        assert!(killed);
        assert!(!state.player.dead);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.score, scores::SHELL_KILL);
    }

    #[test]
    fn test_shell_stomp_then_kick() {
        let mut data = flat_level(30);
        data.spawns.push(EnemySpawn {
            species: EnemySpecies::Shelled,
            col: 6,
            row: 13,
        });
        let mut state = GameState::new(&data, 1);
        state.player.body.pos = Vec2::new(
            state.level.entities[0].body.pos.x + 1.0,
            state.level.entities[0].body.top() - 40.0,
        );

        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), TICK_DT);
            if enemy_at(&state, 0).is_resting_shell() {
                break;
            }
        }
        assert!(enemy_at(&state, 0).is_resting_shell());

        // Approach the resting shell from its left: it gets kicked away
        // instead of stomped
        state.player.body.pos = Vec2::new(state.level.entities[0].body.pos.x - 30.0, 208.0);
        state.player.body.vel = Vec2::ZERO;
        let mut kicked = false;
        for _ in 0..300 {
            let input = TickInput {
                right: true,
                ..Default::default()
            };
            tick(&mut state, &input, TICK_DT);
            if state.drain_events().contains(&GameEvent::Kick) {
                kicked = true;
                break;
            }
        }
        assert!(kicked);
        assert!(enemy_at(&state, 0).is_lethal_shell());
        // Kicked away from the player's side
        assert!(state.level.entities[0].body.vel.x > 0.0);
    }

    #[test]
    fn test_moving_shell_kills_other_enemy() {
        let mut data = flat_level(40);
        data.spawns.push(EnemySpawn {
            species: EnemySpecies::Shelled,
            col: 6,
            row: 13,
        });
        data.spawns.push(EnemySpawn {
            species: EnemySpecies::Walker,
            col: 12,
            row: 13,
        });
        let mut state = GameState::new(&data, 1);

        // Force the shell state and kick it toward the walker
        {
            let Entity { body, kind } = &mut state.level.entities[0];
            body.active = true;
            if let ActorKind::Enemy(e) = kind {
                e.activated = true;
                e.on_stomp(body);
                e.kick(body, Direction::Right, &Tuning::default());
            }
        }
        // Keep the player far away on the left
        state.player.body.pos = Vec2::new(8.0, 0.0);

        let mut killed = false;
        for _ in 0..120 {
            tick(&mut state, &TickInput::default(), TICK_DT);
            if state.drain_events().contains(&GameEvent::EnemyKilled) {
                killed = true;
                break;
            }
        }
        assert!(killed, "shell should plow through the walker");
    }

    #[test]
    fn test_kicked_shell_bounces_off_walls() {
        let t = Tuning::default();
        let mut data = flat_level(40);
        data.spawns.push(EnemySpawn {
            species: EnemySpecies::Shelled,
            col: 6,
            row: 13,
        });
        set_tile(&mut data, 20, 13, TileKind::HardBlock);
        set_tile(&mut data, 20, 12, TileKind::HardBlock);
        let mut state = GameState::new(&data, 1);

        {
            let Entity { body, kind } = &mut state.level.entities[0];
            body.active = true;
            if let ActorKind::Enemy(e) = kind {
                e.activated = true;
                e.on_stomp(body);
                e.kick(body, Direction::Right, &t);
            }
        }
        state.player.body.pos = Vec2::new(8.0, 0.0);

        let mut reversed = false;
        for _ in 0..120 {
            tick(&mut state, &TickInput::default(), TICK_DT);
            if state.level.entities[0].body.vel.x < 0.0 {
                reversed = true;
                break;
            }
        }
        assert!(reversed, "shell should bounce off the wall");
        assert_eq!(state.level.entities[0].body.vel.x, -t.shell_speed);
        assert!(enemy_at(&state, 0).is_lethal_shell());
        assert!(state.level.entities[0].body.right() <= 20.0 * TILE_SIZE);
    }

    #[test]
    fn test_fireball_throw_cap_and_kill() {
        let mut data = flat_level(40);
        data.spawns.push(EnemySpawn {
            species: EnemySpecies::Walker,
            col: 10,
            row: 13,
        });
        let mut state = GameState::new(&data, 1);
        state.player.power_up(PowerState::Big, &Tuning::default());
        state.player.power_up(PowerState::Fire, &Tuning::default());
        state.player.growing = false;
        run_ticks(&mut state, &TickInput::default(), 5);

        let fire = TickInput {
            fire_pressed: true,
            ..Default::default()
        };
        tick(&mut state, &fire, TICK_DT);
        tick(&mut state, &fire, TICK_DT);
        tick(&mut state, &fire, TICK_DT);
        let live = state
            .level
            .entities
            .iter()
            .filter(|e| {
                matches!(&e.kind, ActorKind::Item(s) if matches!(s.kind, ItemKind::Fireball { .. }))
            })
            .count();
        assert_eq!(live, MAX_FIREBALLS);

        let mut killed = false;
        for _ in 0..120 {
            tick(&mut state, &TickInput::default(), TICK_DT);
            if state.drain_events().contains(&GameEvent::EnemyKilled) {
                killed = true;
                break;
            }
        }
        assert!(killed, "fireball should kill the walker");
    }

    #[test]
    fn test_fireball_bounces_along_open_ground() {
        let mut state = GameState::new(&flat_level(60), 1);
        state.player.power_up(PowerState::Big, &Tuning::default());
        state.player.power_up(PowerState::Fire, &Tuning::default());
        state.player.growing = false;
        run_ticks(&mut state, &TickInput::default(), 5);

        let fire = TickInput {
            fire_pressed: true,
            ..Default::default()
        };
        tick(&mut state, &fire, TICK_DT);
        run_ticks(&mut state, &TickInput::default(), 30);

        // Still live after landing: skipping across the floor, not burst
        let fireball = state
            .level
            .entities
            .iter()
            .find_map(|e| match &e.kind {
                ActorKind::Item(s) => match s.kind {
                    ItemKind::Fireball { bounces } => Some((e.body, bounces)),
                    _ => None,
                },
                _ => None,
            })
            .expect("fireball should survive its first landing");
        let (body, bounces) = fireball;
        assert!(bounces >= 1);
        assert_eq!(body.vel.x, crate::consts::FIREBALL_SPEED);
        assert!(body.pos.x > state.player.body.right() + 60.0);
    }

    #[test]
    fn test_flower_grows_small_player_before_fire() {
        let mut state = GameState::new(&flat_level(30), 1);
        run_ticks(&mut state, &TickInput::default(), 5);
        assert_eq!(state.player.power, PowerState::Small);

        // Flower emerges under the player's feet and is collected in place
        state
            .level
            .add_entity(item::spawn_flower(Vec2::new(48.0, 14.0 * TILE_SIZE)));
        run_ticks(&mut state, &TickInput::default(), 20);
        assert_eq!(state.player.power, PowerState::Big);

        // The second flower upgrades to fire
        state
            .level
            .add_entity(item::spawn_flower(Vec2::new(48.0, 14.0 * TILE_SIZE)));
        run_ticks(&mut state, &TickInput::default(), 20);
        assert_eq!(state.player.power, PowerState::Fire);
    }

    #[test]
    fn test_hidden_one_up_block() {
        let mut data = flat_level(30);
        set_tile(&mut data, 3, 10, TileKind::QuestionOneUp);
        let mut state = GameState::new(&data, 1);
        run_ticks(&mut state, &TickInput::default(), 5);

        let jump = TickInput {
            jump: true,
            jump_pressed: true,
            ..Default::default()
        };
        tick(&mut state, &jump, TICK_DT);
        let held = TickInput {
            jump: true,
            ..Default::default()
        };
        run_ticks(&mut state, &held, 30);

        assert_eq!(state.level.grid.get(3, 10), TileKind::UsedBlock);
        // The 1-up mushroom walks off; chasing it down grants a life
        let chase = TickInput {
            right: true,
            ..Default::default()
        };
        let mut one_up = false;
        for _ in 0..400 {
            tick(&mut state, &chase, TICK_DT);
            if state.drain_events().contains(&GameEvent::OneUp) {
                one_up = true;
                break;
            }
        }
        assert!(one_up, "player should catch the 1-up mushroom");
        assert_eq!(state.lives, 4);
    }

    #[test]
    fn test_pit_fall_kills() {
        let mut data = flat_level(30);
        // Open a pit under the player
        for col in 2..6 {
            set_tile(&mut data, col, 14, TileKind::Empty);
        }
        let mut state = GameState::new(&data, 1);
        run_ticks(&mut state, &TickInput::default(), 120);
        assert_ne!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_time_warning_and_timeout() {
        let mut state = GameState::new(&flat_level(30), 1);
        state.time_left = state.tuning.time_warning + 2.0 * TICK_DT;
        run_ticks(&mut state, &TickInput::default(), 3);
        assert!(state.drain_events().contains(&GameEvent::TimeWarning));

        state.time_left = TICK_DT;
        run_ticks(&mut state, &TickInput::default(), 2);
        assert_eq!(state.phase, GamePhase::Dying);
    }

    #[test]
    fn test_flagpole_sequence() {
        let mut data = flat_level(40);
        set_tile(&mut data, 30, 4, TileKind::FlagpoleTop);
        for row in 5..14 {
            set_tile(&mut data, 30, row, TileKind::Flagpole);
        }
        set_tile(&mut data, 36, 13, TileKind::CastleBlock);
        let mut state = GameState::new(&data, 1);
        // Drop the player straight onto the pole
        state.player.body.pos = Vec2::new(30.0 * TILE_SIZE - 4.0, 8.0 * TILE_SIZE);
        state.camera.follow(state.player.body.center_x());

        let mut reached = false;
        let mut completed = false;
        for _ in 0..1200 {
            tick(&mut state, &TickInput::default(), TICK_DT);
            for event in state.drain_events() {
                match event {
                    GameEvent::FlagReached => reached = true,
                    GameEvent::LevelComplete => completed = true,
                    _ => {}
                }
            }
            if completed {
                break;
            }
        }
        assert!(reached);
        assert_eq!(state.phase, GamePhase::LevelComplete);
        assert!(completed, "player should slide down and walk to the castle");
        assert!(state.score >= scores::FLAG_BASE);
        assert!(!state.player.body.active);
    }

    #[test]
    fn test_flag_grab_at_the_top_scores_jackpot() {
        let mut data = flat_level(40);
        set_tile(&mut data, 30, 4, TileKind::FlagpoleTop);
        for row in 5..14 {
            set_tile(&mut data, 30, row, TileKind::Flagpole);
        }
        set_tile(&mut data, 36, 13, TileKind::CastleBlock);
        let mut state = GameState::new(&data, 1);
        // Head level with the top pole rows
        state.player.body.pos = Vec2::new(30.0 * TILE_SIZE - 4.0, 5.0 * TILE_SIZE);
        state.camera.follow(state.player.body.center_x());

        let mut reached = false;
        for _ in 0..10 {
            tick(&mut state, &TickInput::default(), TICK_DT);
            if state.drain_events().contains(&GameEvent::FlagReached) {
                reached = true;
                break;
            }
        }
        assert!(reached);
        assert_eq!(state.score, scores::FLAG_TOP);
    }

    #[test]
    fn test_mushroom_keeps_rolling_after_landing() {
        let mut state = GameState::new(&flat_level(60), 1);
        // Emerges in midair well away from the player, then free-falls
        state
            .level
            .add_entity(item::spawn_mushroom(Vec2::new(300.0, 100.0), false));

        run_ticks(&mut state, &TickInput::default(), 120);
        let body = state.level.entities[0].body;
        assert_eq!(body.bottom(), 14.0 * TILE_SIZE);
        // Landing must not read the floor as a wall and stall the roll
        assert_eq!(body.vel.x, crate::consts::MUSHROOM_SPEED);
        assert!(body.pos.x > 400.0);
    }

    #[test]
    fn test_game_over_on_last_life() {
        let mut state = GameState::new(&flat_level(30), 1);
        state.lives = 1;
        state.time_left = TICK_DT;
        run_ticks(&mut state, &TickInput::default(), 400);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.lives, 0);
    }

    #[test]
    fn test_determinism() {
        let mut data = flat_level(60);
        set_tile(&mut data, 8, 10, TileKind::Question);
        set_tile(&mut data, 9, 10, TileKind::Brick);
        data.spawns.push(EnemySpawn {
            species: EnemySpecies::Walker,
            col: 14,
            row: 13,
        });
        data.spawns.push(EnemySpawn {
            species: EnemySpecies::Shelled,
            col: 20,
            row: 13,
        });

        let mut a = GameState::new(&data, 1234);
        let mut b = GameState::new(&data, 1234);

        for t in 0..600u32 {
            let input = TickInput {
                right: t % 7 != 0,
                run: t % 3 == 0,
                jump: t % 40 < 12,
                jump_pressed: t % 40 == 0,
                ..Default::default()
            };
            tick(&mut a, &input, TICK_DT);
            tick(&mut b, &input, TICK_DT);
            a.drain_events();
            b.drain_events();
        }

        let ja = serde_json::to_string(&a).expect("serialize a");
        let jb = serde_json::to_string(&b).expect("serialize b");
        assert_eq!(ja, jb);
    }
}
