//! Experience, leveling, upgrade/module selection and passive module effects
//!
//! Current stats never drift on their own: they are recomputed as
//! `base x product of module factors` after every selection, upgrade and
//! debug command. Level-up thresholds grow by x1.2 (floored) and experience
//! gains loop, so one large award can cascade several levels.

use rand::Rng;
use rand_pcg::Pcg32;

use super::boss;
use super::combat;
use super::state::{GameEvent, GamePhase, GameState, Offer, Player};
use crate::catalog::{self, ModuleId, StatFactors, UpgradeEffect, UpgradeId, MODULES, UPGRADES};
use crate::consts::*;

/// Recompute current stats from base stats and the active module set.
/// Idempotent; max-HP reductions clamp current HP.
pub fn recompute_stats(player: &mut Player) {
    let mut f = StatFactors::IDENTITY;
    for module in player.modules.iter() {
        f = f.combine(module.stat_factors());
    }
    player.damage = player.base_damage * f.damage;
    player.fire_rate = player.base_fire_rate * f.fire_rate;
    player.bullet_speed = player.base_bullet_speed * f.bullet_speed;
    player.max_hp = (player.base_max_hp * f.max_hp).floor();
    player.incoming_multiplier = f.incoming;
    player.hp = player.hp.min(player.max_hp);
}

/// Accumulate experience (scaled by the player's multiplier, truncated) and
/// cascade as many level-ups as the total now covers.
pub fn add_experience(state: &mut GameState, amount: f32) {
    state.exp += (amount * state.player.exp_multiplier) as i64;
    while state.exp >= state.exp_to_next_level {
        level_up(state);
    }
}

fn level_up(state: &mut GameState) {
    state.level += 1;
    state.exp -= state.exp_to_next_level;
    state.exp_to_next_level = (state.exp_to_next_level as f32 * THRESHOLD_GROWTH) as i64;
    log::info!(
        "level {} (next threshold {})",
        state.level,
        state.exp_to_next_level
    );

    // Milestone chatter every 5 levels before the fight
    if state.level % 5 == 0 && state.level < BOSS_TRIGGER_LEVEL {
        let idx = (state.level / 5 - 1) as usize;
        if let Some(line) = catalog::LEVEL_DIALOGUES.get(idx) {
            state.push_dialogue(line);
        }
    }

    if state.level == BOSS_TRIGGER_LEVEL {
        // No offer at the trigger level; the fight starts immediately
        boss::start_fight(state);
        return;
    }

    state.phase = GamePhase::LevelChoice;
    state.offer = Some(if state.level % MODULE_OFFER_EVERY == 0 {
        Offer::Modules(roll_modules(state))
    } else {
        Offer::Upgrades(roll_upgrades(&mut state.rng))
    });
    state.events.push(GameEvent::LevelUp);
}

/// Up to 3 modules the player does not own yet, in random order
fn roll_modules(state: &mut GameState) -> Vec<ModuleId> {
    let mut candidates: Vec<ModuleId> = MODULES
        .iter()
        .map(|def| def.id)
        .filter(|id| !state.player.modules.contains(*id))
        .collect();
    let mut offer = Vec::new();
    while offer.len() < OFFER_SIZE && !candidates.is_empty() {
        let idx = state.rng.random_range(0..candidates.len());
        offer.push(candidates.swap_remove(idx));
    }
    offer
}

/// 3 distinct rarity-weighted upgrades; repeatable across offers
fn roll_upgrades(rng: &mut Pcg32) -> Vec<UpgradeId> {
    let total: u32 = UPGRADES.iter().map(|u| u.rarity.weight()).sum();
    let mut offer: Vec<UpgradeId> = Vec::new();
    while offer.len() < OFFER_SIZE.min(UpgradeId::COUNT) {
        let mut roll = rng.random_range(0..total);
        for def in &UPGRADES {
            let w = def.rarity.weight();
            if roll < w {
                if !offer.contains(&def.id) {
                    offer.push(def.id);
                }
                break;
            }
            roll -= w;
        }
    }
    offer
}

/// Handle a "select choice N" command. Out-of-range indices and selections
/// outside a level-choice pause are silently ignored.
pub fn select_choice(state: &mut GameState, index: usize) {
    if state.phase != GamePhase::LevelChoice {
        return;
    }
    let Some(offer) = state.offer.clone() else {
        return;
    };
    match offer {
        Offer::Upgrades(ids) => {
            let Some(&id) = ids.get(index) else { return };
            apply_upgrade(state, id);
        }
        Offer::Modules(ids) => {
            let Some(&id) = ids.get(index) else { return };
            acquire_module(state, id);
        }
    }
    state.offer = None;
    state.phase = GamePhase::Running;
}

/// Skip is only available for module offers
pub fn skip_offer(state: &mut GameState) {
    if state.phase == GamePhase::LevelChoice && matches!(state.offer, Some(Offer::Modules(_))) {
        state.offer = None;
        state.phase = GamePhase::Running;
    }
}

/// Apply an upgrade to *base* stats, then recompute current stats
fn apply_upgrade(state: &mut GameState, id: UpgradeId) {
    let player = &mut state.player;
    match id.def().effect {
        UpgradeEffect::Damage(n) => player.base_damage += n,
        UpgradeEffect::FireRate(n) => player.base_fire_rate += n,
        UpgradeEffect::BulletSpeed(n) => player.base_bullet_speed += n,
        UpgradeEffect::MaxHp(n) => {
            player.base_max_hp += n;
            recompute_stats(player);
            player.heal(n);
        }
        UpgradeEffect::ExpMultiplier(n) => player.exp_multiplier += n,
        UpgradeEffect::Repair(n) => player.heal(n),
    }
    recompute_stats(player);
    log::debug!("upgrade applied: {}", id.def().name);
}

/// Append a module and apply its effects exactly once: the stat recompute
/// picks up the new factors, and any one-shot grants happen here.
fn acquire_module(state: &mut GameState, id: ModuleId) {
    if state.player.modules.contains(id) {
        return;
    }
    state.player.modules.insert(id);
    match id {
        ModuleId::ShieldGenerator => state.shield_hp = SHIELD_CAP,
        ModuleId::PhaseShift => {
            state.phase_shift_anchor_ms = state.time_ms;
            state.phase_shift_active = false;
        }
        _ => {}
    }
    recompute_stats(&mut state.player);
    log::debug!("module acquired: {}", id.def().name);
}

/// Passive module effects, each on its own fixed interval
pub fn tick_passives(state: &mut GameState, _dt: f32) {
    let now = state.time_ms;

    if state.player.modules.contains(ModuleId::Regeneration) && now - state.last_regen_ms >= 1000.0
    {
        state.player.heal(2.0);
        state.last_regen_ms = now;
    }

    if state.player.modules.contains(ModuleId::FireRing)
        && now - state.last_fire_ring_ms >= 1000.0
    {
        let center = state.player.pos;
        for enemy in &mut state.enemies {
            if enemy.pos.distance(center) < FIRE_RING_RADIUS {
                enemy.take_damage(5.0);
            }
        }
        // Fire-ring kills feed progression like any other
        combat::sweep_dead_enemies(state);
        state.last_fire_ring_ms = now;
    }

    if state.player.modules.contains(ModuleId::ShieldGenerator)
        && now - state.last_shield_regen_ms >= 2000.0
    {
        state.shield_hp = (state.shield_hp + 5.0).min(SHIELD_CAP);
        state.last_shield_regen_ms = now;
    }

    if state.player.modules.contains(ModuleId::Overcharge)
        && now - state.last_overcharge_ms >= 1000.0
    {
        // Drain never kills: floored at 1 HP
        state.player.hp = (state.player.hp - 1.0).max(1.0);
        state.last_overcharge_ms = now;
    }

    if state.player.modules.contains(ModuleId::PhaseShift) {
        let elapsed = (now - state.phase_shift_anchor_ms) / 1000.0;
        if elapsed >= 8.0 {
            state.phase_shift_anchor_ms = now;
            state.phase_shift_active = false;
        } else {
            state.phase_shift_active = elapsed >= 6.0;
        }
    }
}

/// Debug level-skip: jump to just before the boss with a loadout strong
/// enough to test the fight
pub fn debug_level_skip(state: &mut GameState) {
    state.level = 28;
    state.exp = 0;
    state.exp_to_next_level = FIRST_LEVEL_THRESHOLD;
    state.player.base_damage = 100.0;
    state.player.base_max_hp = 500.0;
    recompute_stats(&mut state.player);
    state.player.hp = state.player.max_hp;
    log::info!("debug skip to level 28");
}
