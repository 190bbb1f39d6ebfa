//! Headless autoplay harness
//!
//! Runs the simulation with a trivial bot (aim at the nearest threat, hold
//! fire, always take the first offer) and prints a JSON run summary. Useful
//! for balance smoke-checks and profiling without a frontend.

use glam::Vec2;
use serde::Serialize;

use turret_defence::sim::{tick, GamePhase, GameState, Offer, TickInput};

const DT: f32 = 1.0 / 60.0;
const MAX_FRAMES: u64 = 60 * 60 * 30; // 30 simulated minutes

#[derive(Serialize)]
struct RunSummary {
    seed: u64,
    frames: u64,
    sim_seconds: f64,
    level: u32,
    score: i64,
    hp: f32,
    max_hp: f32,
    modules: Vec<&'static str>,
    outcome: &'static str,
}

fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0xC0FFEE);
    log::info!("autoplay run, seed {seed}");

    let mut state = GameState::new(seed);
    let mut frames = 0u64;

    while frames < MAX_FRAMES && !state.is_terminal() {
        let input = decide(&state);
        tick(&mut state, input, DT);
        frames += 1;
    }

    let outcome = match state.phase {
        GamePhase::Victory => "victory",
        GamePhase::GameOver => "game_over",
        _ => "timeout",
    };
    let summary = RunSummary {
        seed,
        frames,
        sim_seconds: state.time_ms / 1000.0,
        level: state.level,
        score: state.score,
        hp: state.player.hp,
        max_hp: state.player.max_hp,
        modules: state.player.modules.iter().map(|m| m.def().name).collect(),
        outcome,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).expect("summary serializes")
    );
}

/// Aim at the nearest threat; take the first choice of any offer
fn decide(state: &GameState) -> TickInput {
    if state.phase == GamePhase::LevelChoice {
        return TickInput {
            select: matches!(state.offer, Some(Offer::Upgrades(_) | Offer::Modules(_)))
                .then_some(0),
            ..Default::default()
        };
    }

    let aim = nearest_threat(state).unwrap_or(state.player.pos + Vec2::X);
    TickInput {
        aim,
        fire: true,
        ..Default::default()
    }
}

fn nearest_threat(state: &GameState) -> Option<Vec2> {
    let origin = state.player.pos;
    let nearest_enemy = state
        .enemies
        .iter()
        .map(|e| e.pos)
        .min_by(|a, b| a.distance(origin).total_cmp(&b.distance(origin)));
    match (&state.boss, nearest_enemy) {
        (Some(boss), _) => Some(boss.pos),
        (None, pos) => pos,
    }
}
