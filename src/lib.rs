//! Turret Defence - a stationary-turret arcade combat simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, combat resolution, progression, boss AI)
//! - `catalog`: Immutable module/upgrade definitions and boss dialogue
//!
//! Rendering, audio and input devices live outside this crate. Callers feed
//! logical input (aim position, fire-held flag, discrete commands) into
//! `sim::tick` each frame and read public state back out; audio cues are
//! surfaced as `GameEvent`s that may be freely ignored.

pub mod catalog;
pub mod sim;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed play area (16:9); the player sits at the center
    pub const ARENA_WIDTH: f32 = 1600.0;
    pub const ARENA_HEIGHT: f32 = 900.0;
    /// Entities further outside the play area than this are expired
    pub const OFFSCREEN_MARGIN: f32 = 50.0;

    /// Player base stats
    pub const PLAYER_RADIUS: f32 = 25.0;
    pub const BASE_MAX_HP: f32 = 80.0;
    pub const BASE_DAMAGE: f32 = 8.0;
    pub const BASE_FIRE_RATE: f32 = 6.0;
    pub const BASE_BULLET_SPEED: f32 = 350.0;
    pub const BASE_EXP_MULTIPLIER: f32 = 1.0;

    /// Bullet defaults
    pub const BULLET_RADIUS: f32 = 5.0;
    /// Homing bullets steer toward enemies within this range
    pub const HOMING_RANGE: f32 = 300.0;
    /// Fraction of the ideal heading blended into a homing bullet per frame
    pub const HOMING_TURN_RATE: f32 = 0.1;

    /// Flat contact damage, before the incoming-damage multiplier
    pub const ENEMY_CONTACT_DAMAGE: f32 = 10.0;
    pub const BOSS_PROJECTILE_DAMAGE: f32 = 15.0;

    /// Area-effect radii
    pub const EXPLOSION_RADIUS: f32 = 80.0;
    pub const CHAIN_LIGHTNING_RADIUS: f32 = 100.0;
    pub const FIRE_RING_RADIUS: f32 = 150.0;
    pub const TIME_SLOW_RADIUS: f32 = 200.0;

    /// Shield Generator cap
    pub const SHIELD_CAP: f32 = 50.0;

    /// Progression
    pub const FIRST_LEVEL_THRESHOLD: i64 = 100;
    pub const THRESHOLD_GROWTH: f32 = 1.2;
    pub const BOSS_TRIGGER_LEVEL: u32 = 30;
    /// Every Nth level offers modules instead of upgrades
    pub const MODULE_OFFER_EVERY: u32 = 3;
    pub const OFFER_SIZE: usize = 3;

    /// Boss
    pub const BOSS_MAX_HP: f32 = 5000.0;
    pub const BOSS_RADIUS: f32 = 60.0;
    pub const BOSS_PROJECTILE_RADIUS: f32 = 8.0;
    pub const BOSS_PROJECTILE_SPEED: f32 = 150.0;
    /// Invulnerable for 8s, then a 3s vulnerability window, then reset
    pub const BOSS_INVULN_SECS: f32 = 8.0;
    pub const BOSS_VULN_WINDOW_SECS: f32 = 3.0;
    pub const BOSS_TAUNT_INTERVAL_MS: f64 = 5000.0;

    /// How long a dialogue line stays on screen
    pub const DIALOGUE_MS: f64 = 4000.0;
}

/// Center of the play area (the turret's fixed position)
#[inline]
pub fn arena_center() -> Vec2 {
    Vec2::new(consts::ARENA_WIDTH / 2.0, consts::ARENA_HEIGHT / 2.0)
}

/// True when a point has left the play area plus the out-of-bounds margin
#[inline]
pub fn off_arena(pos: Vec2) -> bool {
    pos.x < -consts::OFFSCREEN_MARGIN
        || pos.x > consts::ARENA_WIDTH + consts::OFFSCREEN_MARGIN
        || pos.y < -consts::OFFSCREEN_MARGIN
        || pos.y > consts::ARENA_HEIGHT + consts::OFFSCREEN_MARGIN
}

/// Clamp a position to the play area minus a margin on every side
#[inline]
pub fn clamp_to_arena(pos: Vec2, margin: f32) -> Vec2 {
    Vec2::new(
        pos.x.clamp(margin, consts::ARENA_WIDTH - margin),
        pos.y.clamp(margin, consts::ARENA_HEIGHT - margin),
    )
}

/// Unit vector for an angle in radians
#[inline]
pub fn dir_from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}
