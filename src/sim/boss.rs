//! Boss fight: movement, vulnerability cycle and attack patterns
//!
//! The boss re-derives its behavior tier from remaining HP every frame and
//! cycles 8 seconds invulnerable / 3 seconds vulnerable. Movement targets are
//! closed-form curves of the run clock approached by exponential smoothing,
//! with a kiting term that backs away when the player is close.

use glam::Vec2;
use rand::Rng;

use super::state::{Boss, BossPhase, BossProjectile, GameEvent, GameState};
use crate::catalog;
use crate::consts::*;
use crate::{arena_center, clamp_to_arena, dir_from_angle};

/// Attack patterns; availability is gated by behavior tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// One projectile per tick along a slowly rotating angle
    Spiral,
    /// 8 radial projectiles every 30th tick
    Ring,
    /// A slower projectile at the player every 3rd tick
    Aimed,
    /// A random-direction projectile every 2nd tick
    Chaos,
}

impl Pattern {
    pub fn candidates(phase: BossPhase) -> &'static [Pattern] {
        match phase {
            BossPhase::One => &[Pattern::Spiral, Pattern::Ring],
            BossPhase::Two => &[Pattern::Spiral, Pattern::Ring, Pattern::Aimed],
            BossPhase::Three => &[
                Pattern::Spiral,
                Pattern::Ring,
                Pattern::Aimed,
                Pattern::Chaos,
            ],
        }
    }
}

/// Enter the boss fight: spawn the boss in the upper half, clear regular
/// enemies, announce it. Never pauses the run.
pub fn start_fight(state: &mut GameState) {
    let pos = Vec2::new(ARENA_WIDTH / 2.0, ARENA_HEIGHT / 4.0);
    let mut boss = Boss::new(pos);
    boss.last_taunt_ms = state.time_ms;
    state.boss = Some(boss);
    state.enemies.clear();
    state.push_dialogue(catalog::BOSS_INTRO);
    state.events.push(GameEvent::LevelUp);
    log::info!("boss fight started at level {}", state.level);
}

/// Advance the boss one frame: vulnerability cycle, movement, taunts and
/// attack-pattern projectile spawns.
pub fn update(state: &mut GameState, dt: f32) {
    let GameState {
        boss,
        player,
        boss_projectiles,
        rng,
        time_ms,
        dialogue,
        ..
    } = state;
    let Some(boss) = boss.as_mut() else {
        return;
    };
    let phase = boss.phase();
    let t = (*time_ms / 1000.0) as f32;

    // 8s invulnerable, 3s vulnerable, repeat
    boss.vulnerable_timer += dt;
    if boss.vulnerable_timer > BOSS_INVULN_SECS + BOSS_VULN_WINDOW_SECS {
        boss.vulnerable_timer = 0.0;
        boss.vulnerable = false;
    } else {
        boss.vulnerable = boss.vulnerable_timer > BOSS_INVULN_SECS;
    }

    steer(boss, phase, t, player.pos, dt);
    boss.rotation += dt * 0.5;

    if *time_ms - boss.last_taunt_ms >= BOSS_TAUNT_INTERVAL_MS {
        let line = catalog::BOSS_TAUNTS[rng.random_range(0..catalog::BOSS_TAUNTS.len())];
        *dialogue = Some(super::state::Dialogue {
            text: line,
            shown_at_ms: *time_ms,
        });
        boss.last_taunt_ms = *time_ms;
    }

    boss.pattern_cooldown -= dt;
    if boss.pattern_cooldown <= 0.0 {
        let candidates = Pattern::candidates(phase);
        let pattern = candidates[rng.random_range(0..candidates.len())];
        spawn_projectiles(boss, pattern, player.pos, *time_ms, boss_projectiles, rng);
        // Spawn ticks come faster in later tiers
        boss.pattern_cooldown = 0.1 / phase.number() as f32;
    }
}

/// Kiting plus a per-tier curve target, approached by exponential smoothing
fn steer(boss: &mut Boss, phase: BossPhase, t: f32, player_pos: Vec2, dt: f32) {
    let center = arena_center();
    let to_player = player_pos - boss.pos;
    let dist = to_player.length();

    let (kite_dist, kite_speed, smoothing) = match phase {
        BossPhase::One => (250.0, 80.0, 0.02),
        BossPhase::Two => (280.0, 100.0, 0.03),
        BossPhase::Three => (300.0, 120.0, 0.04),
    };

    if dist < kite_dist && dist > 0.0 {
        boss.pos -= to_player / dist * kite_speed * dt;
    }

    let target = match phase {
        BossPhase::One => center + dir_from_angle(t * 0.5) * 200.0,
        BossPhase::Two => {
            center + Vec2::new((t * 0.7).sin() * 250.0, (t * 1.4).sin() * 150.0)
        }
        BossPhase::Three => {
            // Pulsing orbit, plus a hard teleport to the orbit ring on a
            // sparse clock gate while vulnerable
            if boss.vulnerable && (t * 10.0).floor() as i64 % 20 == 0 {
                boss.pos = center + dir_from_angle(t * 0.8) * 200.0;
            }
            let r = 180.0 + 100.0 * (t * 3.0).sin();
            center + dir_from_angle(t * 0.8) * r
        }
    };
    boss.pos += (target - boss.pos) * smoothing;
    boss.pos = clamp_to_arena(boss.pos, boss.radius + 10.0);
}

fn spawn_projectiles(
    boss: &mut Boss,
    pattern: Pattern,
    player_pos: Vec2,
    time_ms: f64,
    out: &mut Vec<BossProjectile>,
    rng: &mut rand_pcg::Pcg32,
) {
    match pattern {
        Pattern::Spiral => {
            let angle = (time_ms * 0.003) as f32 + boss.pattern_counter as f32 * 0.4;
            out.push(BossProjectile::new(
                boss.pos,
                dir_from_angle(angle) * BOSS_PROJECTILE_SPEED,
            ));
        }
        Pattern::Ring => {
            if boss.pattern_counter % 30 == 0 {
                for i in 0..8 {
                    let angle = i as f32 * std::f32::consts::TAU / 8.0;
                    out.push(BossProjectile::new(
                        boss.pos,
                        dir_from_angle(angle) * BOSS_PROJECTILE_SPEED,
                    ));
                }
            }
        }
        Pattern::Aimed => {
            if boss.pattern_counter % 3 == 0 {
                let dir = (player_pos - boss.pos).normalize_or_zero();
                out.push(BossProjectile::new(
                    boss.pos,
                    dir * BOSS_PROJECTILE_SPEED * 0.8,
                ));
            }
        }
        Pattern::Chaos => {
            if boss.pattern_counter % 2 == 0 {
                let angle = rng.random_range(0.0..std::f32::consts::TAU);
                out.push(BossProjectile::new(
                    boss.pos,
                    dir_from_angle(angle) * BOSS_PROJECTILE_SPEED,
                ));
            }
        }
    }
    boss.pattern_counter += 1;
}
