//! Per-frame orchestration
//!
//! One `tick` call advances the simulation by `dt` seconds. Commands are
//! consumed first; the run clock and entity motion only advance while the
//! phase is `Running`, so level-choice pauses and terminal screens freeze
//! everything except cosmetic particles.

use glam::Vec2;
use rand::Rng;

use super::boss;
use super::combat;
use super::progression;
use super::state::{Bullet, Enemy, EnemyKind, GameEvent, GamePhase, GameState};
use crate::catalog::ModuleId;
use crate::consts::*;

/// Logical input for one frame. Discrete commands are edge-triggered by the
/// caller (true for exactly the frame the key went down).
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Cursor position in arena coordinates
    pub aim: Vec2,
    /// Fire button held
    pub fire: bool,
    /// Offer choice index during a level-choice pause
    pub select: Option<usize>,
    /// Skip the current module offer
    pub skip: bool,
    /// Toggle the stats panel
    pub toggle_stats: bool,
    /// Restart the run from scratch
    pub restart: bool,
    /// Debug: jump to just before the boss
    pub debug_level_skip: bool,
}

/// Advance the simulation one frame
pub fn tick(state: &mut GameState, input: TickInput, dt: f32) {
    state.events.clear();

    if input.toggle_stats {
        state.stats_minimized = !state.stats_minimized;
    }
    if input.restart {
        let seed = state.rng.random();
        log::info!("restarting run with seed {seed}");
        *state = GameState::new(seed);
        return;
    }

    match state.phase {
        GamePhase::LevelChoice => {
            if let Some(index) = input.select {
                progression::select_choice(state, index);
            } else if input.skip {
                progression::skip_offer(state);
            }
            return;
        }
        GamePhase::GameOver | GamePhase::Victory => return,
        GamePhase::Running => {}
    }

    if input.debug_level_skip {
        progression::debug_level_skip(state);
    }

    state.time_ms += dt as f64 * 1000.0;

    if state.boss.is_none() {
        update_difficulty(state);
    }

    state.player.aim(input.aim);
    if input.fire {
        let bullets = state.player.shoot(state.time_ms);
        if !bullets.is_empty() {
            state.events.push(GameEvent::Shoot);
            state.bullets.extend(bullets);
        }
    }

    for p in &mut state.particles {
        p.advance(dt);
    }
    state.particles.retain(|p| !p.is_expired());

    progression::tick_passives(state, dt);
    // A passive (fire-ring kill cascade) may have paused or ended the run
    if state.phase != GamePhase::Running {
        return;
    }

    if state.boss.is_some() {
        boss::update(state, dt);
    } else {
        spawn_enemies(state);
    }

    advance_bullets(state, dt);
    advance_enemies(state, dt);
    for p in &mut state.boss_projectiles {
        p.advance(dt);
    }
    state.boss_projectiles.retain(|p| !p.is_expired());

    combat::resolve(state);

    if let Some(d) = state.dialogue {
        if state.time_ms - d.shown_at_ms > DIALOGUE_MS {
            state.dialogue = None;
        }
    }
}

/// Difficulty ramps with elapsed time only (not while the boss holds the
/// field): +10% stats per 30s, spawn interval shrinking to a floor. The EXP
/// Magnet spawn-rate downside folds into the same recompute so it holds every
/// frame instead of being overwritten.
fn update_difficulty(state: &mut GameState) {
    let t = (state.time_ms / 1000.0) as f32;
    state.difficulty_scale = 1.0 + (t / 30.0) * 0.1;
    let mut interval = (1500.0 - state.time_ms * 0.01).max(300.0);
    if state.player.modules.contains(ModuleId::ExpMagnet) {
        interval *= 0.85;
    }
    state.spawn_interval_ms = interval;
}

/// Timed spawns at a random point just outside a random edge
fn spawn_enemies(state: &mut GameState) {
    if state.time_ms - state.last_spawn_ms < state.spawn_interval_ms {
        return;
    }
    state.last_spawn_ms = state.time_ms;

    let pos = match state.rng.random_range(0..4u8) {
        0 => Vec2::new(
            state.rng.random_range(0.0..ARENA_WIDTH),
            -OFFSCREEN_MARGIN / 2.0,
        ),
        1 => Vec2::new(
            state.rng.random_range(0.0..ARENA_WIDTH),
            ARENA_HEIGHT + OFFSCREEN_MARGIN / 2.0,
        ),
        2 => Vec2::new(
            -OFFSCREEN_MARGIN / 2.0,
            state.rng.random_range(0.0..ARENA_HEIGHT),
        ),
        _ => Vec2::new(
            ARENA_WIDTH + OFFSCREEN_MARGIN / 2.0,
            state.rng.random_range(0.0..ARENA_HEIGHT),
        ),
    };
    let kind = match state.rng.random_range(0..3u8) {
        0 => EnemyKind::Circle,
        1 => EnemyKind::Square,
        _ => EnemyKind::Triangle,
    };
    state
        .enemies
        .push(Enemy::spawn(kind, pos, state.difficulty_scale));
    log::trace!("spawned {kind:?} at {pos} (scale {})", state.difficulty_scale);
}

fn advance_bullets(state: &mut GameState, dt: f32) {
    let GameState {
        bullets, enemies, ..
    } = state;
    for b in bullets.iter_mut() {
        b.advance(dt, enemies);
    }
    bullets.retain(|b: &Bullet| !b.is_expired());
}

/// Enemies home on the player; the Time Slow field reduces their effective
/// frame time inside its radius
fn advance_enemies(state: &mut GameState, dt: f32) {
    let slow = state.player.modules.contains(ModuleId::TimeSlow);
    let player_pos = state.player.pos;
    for e in &mut state.enemies {
        let dte = if slow && e.pos.distance(player_pos) < TIME_SLOW_RADIUS {
            dt * 0.6
        } else {
            dt
        };
        e.advance(dte, player_pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Offer;

    const DT: f32 = 1.0 / 60.0;

    fn run_frames(state: &mut GameState, input: TickInput, frames: usize) {
        for _ in 0..frames {
            tick(state, input, DT);
        }
    }

    #[test]
    fn test_same_seed_and_inputs_are_deterministic() {
        let input = TickInput {
            aim: Vec2::new(1200.0, 300.0),
            fire: true,
            ..Default::default()
        };
        let mut a = GameState::new(42);
        let mut b = GameState::new(42);
        run_frames(&mut a, input, 600);
        run_frames(&mut b, input, 600);

        assert_eq!(a.time_ms, b.time_ms);
        assert_eq!(a.score, b.score);
        assert_eq!(a.exp, b.exp);
        assert_eq!(a.enemies.len(), b.enemies.len());
        assert_eq!(a.bullets.len(), b.bullets.len());
        for (ea, eb) in a.enemies.iter().zip(&b.enemies) {
            assert_eq!(ea.pos, eb.pos);
            assert_eq!(ea.hp, eb.hp);
        }
    }

    #[test]
    fn test_restart_resets_run() {
        let mut state = GameState::new(42);
        run_frames(
            &mut state,
            TickInput {
                aim: Vec2::new(1200.0, 300.0),
                fire: true,
                ..Default::default()
            },
            600,
        );
        assert!(state.time_ms > 0.0);

        tick(
            &mut state,
            TickInput {
                restart: true,
                ..Default::default()
            },
            DT,
        );
        assert_eq!(state.time_ms, 0.0);
        assert_eq!(state.level, 1);
        assert_eq!(state.score, 0);
        assert!(state.enemies.is_empty());
        assert!(state.bullets.is_empty());
        assert_eq!(state.phase, GamePhase::Running);
    }

    #[test]
    fn test_level_choice_pause_freezes_simulation() {
        let mut state = GameState::new(1);
        state.exp_to_next_level = 1;
        state
            .enemies
            .push(Enemy::spawn(EnemyKind::Circle, Vec2::new(100.0, 100.0), 1.0));
        crate::sim::progression::add_experience(&mut state, 10.0);
        assert_eq!(state.phase, GamePhase::LevelChoice);

        let clock = state.time_ms;
        let enemy_pos = state.enemies[0].pos;
        run_frames(&mut state, TickInput::default(), 120);
        assert_eq!(state.time_ms, clock);
        assert_eq!(state.enemies[0].pos, enemy_pos);
    }

    #[test]
    fn test_select_resumes_from_pause() {
        let mut state = GameState::new(1);
        state.exp_to_next_level = 1;
        crate::sim::progression::add_experience(&mut state, 10.0);
        assert!(matches!(state.offer, Some(Offer::Upgrades(_))));

        tick(
            &mut state,
            TickInput {
                select: Some(0),
                ..Default::default()
            },
            DT,
        );
        assert_eq!(state.phase, GamePhase::Running);
        assert!(state.offer.is_none());
    }

    #[test]
    fn test_enemies_spawn_over_time() {
        let mut state = GameState::new(5);
        run_frames(&mut state, TickInput::default(), 10 * 60);
        assert!(!state.enemies.is_empty());
    }

    #[test]
    fn test_difficulty_ramps_with_time() {
        let mut state = GameState::new(1);
        run_frames(&mut state, TickInput::default(), 60);
        let early_interval = state.spawn_interval_ms;
        let early_scale = state.difficulty_scale;

        run_frames(&mut state, TickInput::default(), 60 * 60);
        assert!(state.difficulty_scale > early_scale);
        assert!(state.spawn_interval_ms < early_interval);
        assert!(state.spawn_interval_ms >= 300.0 * 0.85);
    }

    #[test]
    fn test_fire_rate_limits_bullets() {
        let mut state = GameState::new(1);
        let input = TickInput {
            aim: Vec2::new(1600.0, 450.0),
            fire: true,
            ..Default::default()
        };
        // 1 second at 6 shots/sec; the first shot fires immediately
        run_frames(&mut state, input, 60);
        assert!(state.bullets.len() <= 7);
        assert!(state.bullets.len() >= 5);
    }

    #[test]
    fn test_terminal_phase_ignores_everything_but_restart() {
        let mut state = GameState::new(1);
        state.phase = GamePhase::GameOver;
        let input = TickInput {
            fire: true,
            select: Some(0),
            debug_level_skip: true,
            ..Default::default()
        };
        run_frames(&mut state, input, 60);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.bullets.is_empty());
        assert_eq!(state.level, 1);
    }

    #[test]
    fn test_debug_level_skip_command() {
        let mut state = GameState::new(1);
        tick(
            &mut state,
            TickInput {
                debug_level_skip: true,
                ..Default::default()
            },
            DT,
        );
        assert_eq!(state.level, 28);
        assert_eq!(state.player.damage, 100.0);
    }

    #[test]
    fn test_offscreen_bullets_removed() {
        let mut state = GameState::new(1);
        state.bullets.push(Bullet {
            pos: Vec2::new(ARENA_WIDTH + OFFSCREEN_MARGIN + 10.0, 450.0),
            vel: Vec2::X * 350.0,
            damage: 8.0,
            radius: BULLET_RADIUS,
            explosive: false,
            piercing: false,
            homing: false,
            hits: 0,
        });
        tick(&mut state, TickInput::default(), DT);
        assert!(state.bullets.is_empty());
    }

    #[test]
    fn test_dialogue_expires() {
        let mut state = GameState::new(1);
        state.push_dialogue("hello");
        for _ in 0..(5 * 60) {
            tick(&mut state, TickInput::default(), DT);
        }
        assert!(state.dialogue.is_none());
    }

    #[test]
    fn test_toggle_stats_panel() {
        let mut state = GameState::new(1);
        tick(
            &mut state,
            TickInput {
                toggle_stats: true,
                ..Default::default()
            },
            DT,
        );
        assert!(state.stats_minimized);
    }
}
