//! Headless demo run
//!
//! Builds a small built-in level, scripts an input sequence through the
//! fixed-timestep scheduler and prints the events the simulation emits.
//! Useful as a smoke test and as a reference for embedding the crate.

use plumber_panic::consts::TICK_DT;
use plumber_panic::sim::{
    EnemySpawn, EnemySpecies, GameEvent, GamePhase, GameState, LevelData, TickInput, TileKind,
    tick,
};
use plumber_panic::FixedTimestep;

/// A short hand-built course: floor, a block row, two enemies, a pit,
/// the flagpole and a castle.
fn demo_level() -> LevelData {
    let width = 80;
    let height = 15;
    let mut tiles = vec![TileKind::Empty; (width * height) as usize];
    let mut set = |col: i32, row: i32, kind: TileKind| {
        tiles[(row * width + col) as usize] = kind;
    };

    for col in 0..width {
        set(col, 14, TileKind::Ground);
    }
    // A pit
    for col in 34..38 {
        set(col, 14, TileKind::Empty);
    }
    // Block row over the approach
    set(10, 10, TileKind::Question);
    set(11, 10, TileKind::Brick);
    set(12, 10, TileKind::QuestionMushroom);
    set(13, 10, TileKind::Brick);
    set(14, 10, TileKind::CoinBrick);
    // A step before the pit
    set(30, 13, TileKind::HardBlock);
    set(31, 13, TileKind::HardBlock);
    // Flagpole and castle
    set(70, 4, TileKind::FlagpoleTop);
    for row in 5..14 {
        set(70, row, TileKind::Flagpole);
    }
    set(76, 13, TileKind::CastleBlock);

    LevelData {
        width,
        height,
        tiles,
        spawns: vec![
            EnemySpawn {
                species: EnemySpecies::Walker,
                col: 18,
                row: 13,
            },
            EnemySpawn {
                species: EnemySpecies::Shelled,
                col: 26,
                row: 13,
            },
        ],
        player_spawn: (3, 14),
        castle_col: Some(76),
    }
}

/// Scripted input: run right, jump periodically to clear enemies and the pit
fn scripted_input(tick_no: u64) -> TickInput {
    let jump_phase = tick_no % 50;
    TickInput {
        right: true,
        run: tick_no > 120,
        jump: jump_phase < 14,
        jump_pressed: jump_phase == 0,
        ..Default::default()
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let seed = 0xC0FFEE;
    let mut state = GameState::new(&demo_level(), seed);
    let mut scheduler = FixedTimestep::new();

    log::info!("starting demo run, seed {seed:#x}");

    // Simulate a 60 Hz embedding for up to 60 seconds of game time
    let mut frames = 0u64;
    'outer: while frames < 60 * 60 {
        frames += 1;
        for _ in 0..scheduler.advance(TICK_DT) {
            let input = scripted_input(state.time_ticks);
            tick(&mut state, &input, TICK_DT);

            for event in state.drain_events() {
                match event {
                    GameEvent::ScoreAdded { points, x, .. } => {
                        log::debug!("+{points} at x={x:.0}");
                    }
                    other => log::info!("{other:?}"),
                }
            }

            match state.phase {
                GamePhase::Playing | GamePhase::LevelComplete | GamePhase::Dying => {}
                GamePhase::Dead | GamePhase::GameOver => break 'outer,
            }
            if state.phase == GamePhase::LevelComplete && !state.player.body.active {
                break 'outer;
            }
        }
    }

    log::info!(
        "run over: phase {:?}, score {}, coins {}, lives {}, {:.0}s left",
        state.phase,
        state.score,
        state.coins,
        state.lives,
        state.time_left
    );
}
