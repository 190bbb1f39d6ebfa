//! Collision detection and damage resolution
//!
//! All collision tests are center-distance checks against per-shape
//! effective radii; no polygon-exact math. Within a frame the resolver runs
//! in a fixed order: bullet vs boss projectile, bullet vs boss body,
//! hazard vs player contacts, bullet vs enemy, then a dead-enemy sweep.
//! "First match wins": a bullet consumed against one target never tests
//! against another in the same frame. List mutation is staged through flag
//! arrays and end-of-stage retains so cascading effects (a kill triggering
//! a level-up pause mid-resolution) cannot corrupt iteration.

use glam::Vec2;

use super::progression;
use super::state::{GameEvent, GamePhase, GameState};
use crate::catalog::{self, ModuleId};
use crate::consts::*;

/// Center-distance collision check
#[inline]
pub fn circles_collide(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance(b) < ra + rb
}

/// Damage-modifier target; the aura bonus depends on what is being hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Enemy,
    BossBody,
}

/// Per-hit damage, computed fresh from the currently active module set.
/// Modifiers stack multiplicatively; order does not matter.
pub fn hit_damage(state: &GameState, base: f32, target: HitTarget) -> f32 {
    let player = &state.player;
    let mut damage = base;
    match target {
        HitTarget::Enemy => {
            if player.modules.contains(ModuleId::DamageAura) {
                damage *= 1.4;
            }
            if player.modules.contains(ModuleId::SniperMode) {
                damage *= 2.0;
            }
            if player.modules.contains(ModuleId::Berserker) && player.hp < player.max_hp * 0.5 {
                damage *= 1.75;
            }
            if player.modules.contains(ModuleId::Overcharge) {
                damage *= 1.15;
            }
        }
        HitTarget::BossBody => {
            // The boss shrugs off everything but the aura
            if player.modules.contains(ModuleId::DamageAura) {
                damage *= 1.25;
            }
        }
    }
    damage
}

/// Resolve every collision for this frame
pub fn resolve(state: &mut GameState) {
    if state.boss.is_some() {
        resolve_boss_fight(state);
        if state.is_terminal() {
            return;
        }
    }
    resolve_player_contacts(state);
    if state.phase == GamePhase::GameOver {
        return;
    }
    resolve_bullet_enemy_hits(state);
    sweep_dead_enemies(state);
}

/// Bullet vs boss projectile, then bullet vs boss body. A bullet consumed by
/// a projectile is removed before the body check (and before the enemy stage),
/// piercing or not.
fn resolve_boss_fight(state: &mut GameState) {
    let (boss_pos, boss_radius) = match &state.boss {
        Some(b) => (b.pos, b.radius),
        None => return,
    };

    let mut consumed = vec![false; state.bullets.len()];
    let mut destroyed = vec![false; state.boss_projectiles.len()];

    for bi in 0..state.bullets.len() {
        let bullet_pos = state.bullets[bi].pos;
        let bullet_radius = state.bullets[bi].radius;

        // Projectiles first, in list order
        let mut matched = false;
        for pi in 0..state.boss_projectiles.len() {
            if destroyed[pi] {
                continue;
            }
            let proj_pos = state.boss_projectiles[pi].pos;
            let proj_radius = state.boss_projectiles[pi].radius;
            if circles_collide(bullet_pos, bullet_radius, proj_pos, proj_radius) {
                consumed[bi] = true;
                matched = true;
                if state.boss_projectiles[pi].hit() {
                    destroyed[pi] = true;
                    state.burst(proj_pos, catalog::color::ORANGE, 8);
                }
                break;
            }
        }
        if matched {
            continue;
        }

        if circles_collide(bullet_pos, bullet_radius, boss_pos, boss_radius) {
            consumed[bi] = true;
            let damage = hit_damage(state, state.bullets[bi].damage, HitTarget::BossBody);
            if let Some(boss) = state.boss.as_mut() {
                if boss.take_damage(damage) {
                    state.events.push(GameEvent::Hit);
                }
                if !boss.is_alive() {
                    state.phase = GamePhase::Victory;
                    state.events.push(GameEvent::Kill);
                    state.push_dialogue(catalog::BOSS_DEFEAT);
                    state.burst(boss_pos, catalog::color::GOLD, 50);
                    log::info!("boss destroyed at {:.1}s", state.time_ms / 1000.0);
                }
            }
        }
    }

    let mut keep = consumed.iter().map(|c| !c);
    state.bullets.retain(|_| keep.next().unwrap_or(true));
    let mut keep = destroyed.iter().map(|d| !d);
    state.boss_projectiles.retain(|_| keep.next().unwrap_or(true));
}

/// Enemy and boss-projectile contacts with the player. Contact damage is
/// scaled by the incoming-damage multiplier, then absorbed by shield before
/// HP. An active phase shift destroys the hazard with zero damage taken.
fn resolve_player_contacts(state: &mut GameState) {
    let player_pos = state.player.pos;
    let player_radius = state.player.radius;

    let mut i = 0;
    while i < state.enemies.len() {
        let enemy = &state.enemies[i];
        if circles_collide(enemy.pos, enemy.effective_radius(), player_pos, player_radius) {
            state.enemies.remove(i);
            if apply_contact_damage(state, ENEMY_CONTACT_DAMAGE) {
                return;
            }
        } else {
            i += 1;
        }
    }

    let mut i = 0;
    while i < state.boss_projectiles.len() {
        let proj = &state.boss_projectiles[i];
        if circles_collide(proj.pos, proj.radius, player_pos, player_radius) {
            state.boss_projectiles.remove(i);
            if apply_contact_damage(state, BOSS_PROJECTILE_DAMAGE) {
                return;
            }
        } else {
            i += 1;
        }
    }
}

/// Returns true when the player died
fn apply_contact_damage(state: &mut GameState, base: f32) -> bool {
    if state.phase_shift_active {
        // Immune window: the hazard is already gone, the player is untouched
        return false;
    }
    let mut damage = base * state.player.incoming_multiplier;
    if state.shield_hp > 0.0 {
        let absorbed = state.shield_hp.min(damage);
        state.shield_hp -= absorbed;
        damage -= absorbed;
    }
    if damage > 0.0 && state.player.take_damage(damage) {
        state.phase = GamePhase::GameOver;
        if state.boss.is_some() {
            state.push_dialogue(catalog::BOSS_WIN);
        }
        log::info!(
            "defeat at level {} ({:.1}s survived)",
            state.level,
            state.time_ms / 1000.0
        );
        return true;
    }
    false
}

/// Bullet vs enemy hits, enumerated in list order. Piercing bullets survive
/// up to 3 effective hits; everything else is consumed by its first.
fn resolve_bullet_enemy_hits(state: &mut GameState) {
    let mut consumed = vec![false; state.bullets.len()];
    // Final hit damage for enemies killed by a direct bullet hit; feeds the
    // on-kill chain lightning amount
    let mut direct_kill: Vec<Option<f32>> = vec![None; state.enemies.len()];

    for bi in 0..state.bullets.len() {
        for ei in 0..state.enemies.len() {
            if consumed[bi] {
                break;
            }
            if !state.enemies[ei].is_alive() {
                continue;
            }
            let bullet_pos = state.bullets[bi].pos;
            let bullet_radius = state.bullets[bi].radius;
            let enemy_pos = state.enemies[ei].pos;
            if !circles_collide(enemy_pos, state.enemies[ei].effective_radius(), bullet_pos, bullet_radius) {
                continue;
            }

            let damage = hit_damage(state, state.bullets[bi].damage, HitTarget::Enemy);
            let lethal = state.enemies[ei].take_damage(damage);
            state.events.push(GameEvent::Hit);

            if state.bullets[bi].explosive {
                state.burst(bullet_pos, catalog::color::ORANGE, 20);
                splash(state, bullet_pos, EXPLOSION_RADIUS, damage * 0.5, ei);
            }

            if state.bullets[bi].piercing {
                state.bullets[bi].hits += 1;
                if state.bullets[bi].hits >= 3 {
                    consumed[bi] = true;
                }
            } else {
                consumed[bi] = true;
            }

            if lethal {
                direct_kill[ei] = Some(damage);
            }
        }
    }

    // On-kill side effects for direct kills only; splash/chain casualties
    // are credited by the sweep below
    for ei in 0..state.enemies.len() {
        let Some(damage) = direct_kill[ei] else {
            continue;
        };
        let pos = state.enemies[ei].pos;
        if state.player.modules.contains(ModuleId::Vampiric) {
            state.player.heal(10.0);
        }
        if state.player.modules.contains(ModuleId::ChainLightning) {
            splash(state, pos, CHAIN_LIGHTNING_RADIUS, damage * 0.5, ei);
            state.burst(pos, catalog::color::CYAN, 5);
        }
    }

    let mut keep = consumed.iter().map(|c| !c);
    state.bullets.retain(|_| keep.next().unwrap_or(true));
}

/// Splash damage to every living enemy within `radius` of `center`, skipping
/// the triggering hit's own target so it is never damaged twice
fn splash(state: &mut GameState, center: Vec2, radius: f32, damage: f32, exclude: usize) {
    for oi in 0..state.enemies.len() {
        if oi == exclude || !state.enemies[oi].is_alive() {
            continue;
        }
        if state.enemies[oi].pos.distance(center) < radius {
            state.enemies[oi].take_damage(damage);
        }
    }
}

/// Remove every dead enemy and credit the kill: experience (EXP Magnet
/// applies), score, audio cue and a particle burst. Credits are collected
/// before any removal or progression call so a level-up (or the boss fight
/// starting and clearing the enemy list) cannot invalidate iteration.
pub(super) fn sweep_dead_enemies(state: &mut GameState) {
    let mut credits = Vec::new();
    for enemy in &state.enemies {
        if !enemy.is_alive() {
            credits.push((enemy.pos, enemy.kind.color(), enemy.exp_reward));
        }
    }
    if credits.is_empty() {
        return;
    }
    state.enemies.retain(|e| e.is_alive());

    let magnet = state.player.modules.contains(ModuleId::ExpMagnet);
    for (pos, color, reward) in credits {
        let reward = if magnet {
            (reward as f32 * 1.5) as i64
        } else {
            reward
        };
        state.score += reward;
        state.events.push(GameEvent::Kill);
        state.burst(pos, color, 15);
        progression::add_experience(state, reward as f32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Boss, BossProjectile, Bullet, Enemy, EnemyKind};
    use glam::Vec2;

    fn test_bullet(pos: Vec2, damage: f32) -> Bullet {
        Bullet {
            pos,
            vel: Vec2::ZERO,
            damage,
            radius: BULLET_RADIUS,
            explosive: false,
            piercing: false,
            homing: false,
            hits: 0,
        }
    }

    #[test]
    fn test_circle_enemy_dies_to_four_base_bullets() {
        let mut state = GameState::new(7);
        let pos = state.player.pos + Vec2::new(200.0, 0.0);
        state.enemies.push(Enemy::spawn(EnemyKind::Circle, pos, 1.0));

        for expected_hp in [17.0, 9.0, 1.0] {
            state.bullets.push(test_bullet(pos, 8.0));
            resolve(&mut state);
            assert_eq!(state.enemies[0].hp, expected_hp);
            assert!(state.bullets.is_empty());
        }

        state.bullets.push(test_bullet(pos, 8.0));
        resolve(&mut state);
        assert!(state.enemies.is_empty());
        assert_eq!(state.exp, 10);
        assert_eq!(state.score, 10);
        assert!(state.events.contains(&GameEvent::Kill));
    }

    #[test]
    fn test_piercing_bullet_removed_after_exactly_three_hits() {
        let mut state = GameState::new(7);
        let base = state.player.pos + Vec2::new(300.0, 0.0);
        for i in 0..4 {
            let mut e = Enemy::spawn(EnemyKind::Square, base + Vec2::new(i as f32 * 5.0, 0.0), 1.0);
            e.hp = 1000.0; // survive the hits; only the pierce count matters
            e.max_hp = 1000.0;
            state.enemies.push(e);
        }
        let mut bullet = test_bullet(base, 8.0);
        bullet.piercing = true;
        state.bullets.push(bullet);

        resolve(&mut state);
        assert!(state.bullets.is_empty());
        // Exactly the first three enemies in list order were damaged
        let damaged = state.enemies.iter().filter(|e| e.hp < 1000.0).count();
        assert_eq!(damaged, 3);
        assert_eq!(state.enemies[3].hp, 1000.0);
    }

    #[test]
    fn test_shield_absorbed_before_hp() {
        let mut state = GameState::new(7);
        state.player.max_hp = 100.0;
        state.player.hp = 100.0;
        state.shield_hp = 15.0;

        apply_contact_damage(&mut state, 20.0);
        assert_eq!(state.shield_hp, 0.0);
        assert_eq!(state.player.hp, 95.0);
    }

    #[test]
    fn test_incoming_multiplier_applied_before_shield() {
        let mut state = GameState::new(7);
        state.player.hp = 100.0;
        state.player.max_hp = 100.0;
        state.player.incoming_multiplier = 0.5;
        state.shield_hp = 8.0;

        // 20 * 0.5 = 10; shield soaks 8, HP takes 2
        apply_contact_damage(&mut state, 20.0);
        assert_eq!(state.shield_hp, 0.0);
        assert_eq!(state.player.hp, 98.0);
    }

    #[test]
    fn test_phase_shift_destroys_hazard_with_zero_damage() {
        let mut state = GameState::new(7);
        state.phase_shift_active = true;
        state.shield_hp = 15.0;
        state.enemies.push(Enemy::spawn(EnemyKind::Circle, state.player.pos, 1.0));

        resolve_player_contacts(&mut state);
        assert!(state.enemies.is_empty());
        assert_eq!(state.player.hp, state.player.max_hp);
        assert_eq!(state.shield_hp, 15.0);
    }

    #[test]
    fn test_explosive_splash_skips_direct_target() {
        let mut state = GameState::new(7);
        let pos = state.player.pos + Vec2::new(200.0, 0.0);
        let mut target = Enemy::spawn(EnemyKind::Square, pos, 1.0);
        target.hp = 100.0;
        target.max_hp = 100.0;
        state.enemies.push(target);
        // Neighbor inside the blast radius
        let mut other = Enemy::spawn(EnemyKind::Square, pos + Vec2::new(60.0, 0.0), 1.0);
        other.hp = 100.0;
        other.max_hp = 100.0;
        state.enemies.push(other);

        let mut bullet = test_bullet(pos, 10.0);
        bullet.explosive = true;
        state.bullets.push(bullet);
        resolve(&mut state);

        // Direct target: full hit only. Neighbor: 50% splash only.
        assert_eq!(state.enemies[0].hp, 90.0);
        assert_eq!(state.enemies[1].hp, 95.0);
    }

    #[test]
    fn test_bullet_consumed_by_projectile_skips_boss_body() {
        let mut state = GameState::new(7);
        let boss_pos = Vec2::new(800.0, 200.0);
        state.boss = Some(Boss::new(boss_pos));
        if let Some(b) = state.boss.as_mut() {
            b.vulnerable = true;
        }
        // Projectile sitting right on the boss center; the bullet overlaps both
        state
            .boss_projectiles
            .push(BossProjectile::new(boss_pos, Vec2::ZERO));
        state.bullets.push(test_bullet(boss_pos, 8.0));

        resolve_boss_fight(&mut state);
        assert!(state.bullets.is_empty());
        assert_eq!(state.boss_projectiles[0].hp, 1);
        // First match won: the boss body was never tested
        assert_eq!(state.boss.as_ref().map(|b| b.hp), Some(BOSS_MAX_HP));
    }

    #[test]
    fn test_boss_damage_rejected_then_accepted() {
        let mut state = GameState::new(7);
        let boss_pos = Vec2::new(800.0, 200.0);
        state.boss = Some(Boss::new(boss_pos));

        state.bullets.push(test_bullet(boss_pos, 500.0));
        resolve_boss_fight(&mut state);
        assert_eq!(state.boss.as_ref().map(|b| b.hp), Some(5000.0));
        assert!(state.bullets.is_empty()); // consumed even when rejected

        if let Some(b) = state.boss.as_mut() {
            b.vulnerable = true;
        }
        state.bullets.push(test_bullet(boss_pos, 500.0));
        resolve_boss_fight(&mut state);
        assert_eq!(state.boss.as_ref().map(|b| b.hp), Some(4500.0));
    }

    #[test]
    fn test_berserker_gated_on_half_hp() {
        let mut state = GameState::new(7);
        state.player.modules.insert(ModuleId::Berserker);

        state.player.hp = state.player.max_hp;
        assert_eq!(hit_damage(&state, 10.0, HitTarget::Enemy), 10.0);

        state.player.hp = state.player.max_hp * 0.4;
        assert!((hit_damage(&state, 10.0, HitTarget::Enemy) - 17.5).abs() < 1e-4);
    }

    #[test]
    fn test_hit_modifiers_stack_multiplicatively() {
        let mut state = GameState::new(7);
        state.player.modules.insert(ModuleId::DamageAura);
        state.player.modules.insert(ModuleId::SniperMode);
        state.player.modules.insert(ModuleId::Overcharge);

        let expected = 10.0 * 1.4 * 2.0 * 1.15;
        assert!((hit_damage(&state, 10.0, HitTarget::Enemy) - expected).abs() < 1e-3);
        // Boss body only honors the aura, at its lower factor
        assert!((hit_damage(&state, 10.0, HitTarget::BossBody) - 12.5).abs() < 1e-3);
    }

    #[test]
    fn test_vampiric_heals_on_direct_kill() {
        let mut state = GameState::new(7);
        state.player.modules.insert(ModuleId::Vampiric);
        state.player.hp = 40.0;
        let pos = state.player.pos + Vec2::new(200.0, 0.0);
        let mut e = Enemy::spawn(EnemyKind::Triangle, pos, 1.0);
        e.hp = 1.0;
        state.enemies.push(e);
        state.bullets.push(test_bullet(pos, 8.0));

        resolve(&mut state);
        assert!(state.enemies.is_empty());
        assert_eq!(state.player.hp, 50.0);
    }

    #[test]
    fn test_chain_lightning_splashes_neighbors_on_kill() {
        let mut state = GameState::new(7);
        state.player.modules.insert(ModuleId::ChainLightning);
        let pos = state.player.pos + Vec2::new(200.0, 0.0);
        let mut victim = Enemy::spawn(EnemyKind::Circle, pos, 1.0);
        victim.hp = 1.0;
        state.enemies.push(victim);
        let mut near = Enemy::spawn(EnemyKind::Square, pos + Vec2::new(80.0, 0.0), 1.0);
        near.hp = 100.0;
        near.max_hp = 100.0;
        state.enemies.push(near);

        // damage 8 kills the victim; chain hits the neighbor for 4
        state.bullets.push(test_bullet(pos, 8.0));
        resolve(&mut state);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.enemies[0].hp, 96.0);
    }

    #[test]
    fn test_player_death_sets_game_over() {
        let mut state = GameState::new(7);
        state.player.hp = 5.0;
        state.enemies.push(Enemy::spawn(EnemyKind::Circle, state.player.pos, 1.0));
        resolve(&mut state);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.player.hp, 0.0);
    }
}
