//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Frame-based timestep only
//! - Seeded RNG only
//! - Fixed component order (physics, combat, AI, boss gate, progression)
//! - No rendering or platform dependencies

pub mod aabb;
pub mod ai;
pub mod combat;
pub mod physics;
pub mod progression;
pub mod snapshot;
pub mod stage;
pub mod state;
pub mod tick;

pub use aabb::Aabb;
pub use progression::{Schedule, ScheduledEvent};
pub use snapshot::{EnemyView, PlayerView, ProjectileView, Snapshot};
pub use stage::{StageScaling, build_stage, generate_stage};
pub use state::{
    BossGate, BossPhase, Enemy, EnemyKind, GameEvent, GamePhase, GameState, Pickup, PickupKind,
    Player, Projectile, Stage, SurfaceMetrics, WeaponMode,
};
pub use tick::{Action, InputSnapshot, tick};
