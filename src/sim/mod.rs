//! Deterministic game simulation
//!
//! `GameState::new(seed)` plus a fixed sequence of `TickInput`s and frame
//! times fully determines a run; all randomness flows through the state's
//! seeded generator.

pub mod boss;
pub mod combat;
pub mod progression;
pub mod state;
pub mod tick;

pub use state::{
    Boss, BossPhase, BossProjectile, Bullet, Dialogue, Enemy, EnemyKind, GameEvent, GamePhase,
    GameState, ModuleSet, Offer, Particle, Player,
};
pub use tick::{tick, TickInput};
