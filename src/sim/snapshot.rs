//! Read-only view of the simulation for renderers
//!
//! Built between ticks; nothing in here points back into `GameState`.

use glam::Vec2;
use serde::Serialize;

use super::aabb::Aabb;
use super::state::{
    BossGate, GamePhase, GameState, PickupKind, PlatformKind, Projectile, ProjectileKind,
    WeaponMode,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub size: Vec2,
    pub facing: f32,
    pub health: f32,
    pub max_health: f32,
    pub grounded: bool,
    pub attacking: bool,
    pub invulnerable: bool,
    pub weapon: WeaponMode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnemyView {
    pub id: u32,
    pub species: String,
    pub pos: Vec2,
    pub size: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub direction: f32,
    pub is_boss: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectileView {
    pub kind: ProjectileKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub hostile: bool,
}

impl ProjectileView {
    fn from_projectile(projectile: &Projectile, hostile: bool) -> Self {
        Self {
            kind: projectile.kind,
            pos: projectile.pos,
            size: projectile.size,
            hostile,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub stage_index: u32,
    pub stage_width: f32,
    pub ground_level: f32,
    /// Left edge of the visible window in stage coordinates
    pub camera_x: f32,
    pub progress: f32,
    pub score: u64,
    pub lives: u8,
    pub time_ticks: u64,
    pub boss_active: bool,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<ProjectileView>,
    pub platforms: Vec<(PlatformKind, Aabb)>,
    pub pickups: Vec<(PickupKind, Aabb)>,
}

impl GameState {
    /// Left edge of a player-centred view, kept inside the stage
    pub fn camera_x(&self) -> f32 {
        let view = self.surface.view_width();
        let max = (self.stage.width - view).max(0.0);
        (self.player.center().x - view * 0.5).clamp(0.0, max)
    }

    /// Capture everything a renderer needs for the current frame
    pub fn snapshot(&self) -> Snapshot {
        let player = &self.player;
        let stage = &self.stage;

        let projectiles = player
            .projectiles
            .iter()
            .map(|p| ProjectileView::from_projectile(p, false))
            .chain(
                stage
                    .hostile_projectiles
                    .iter()
                    .map(|p| ProjectileView::from_projectile(p, true)),
            )
            .collect();

        Snapshot {
            phase: self.phase,
            stage_index: stage.index,
            stage_width: stage.width,
            ground_level: stage.ground_level,
            camera_x: self.camera_x(),
            progress: stage.progress,
            score: self.score,
            lives: self.lives,
            time_ticks: self.time_ticks,
            boss_active: matches!(stage.boss_gate, BossGate::Spawned { .. })
                && stage.boss().is_some(),
            player: PlayerView {
                pos: player.pos,
                size: player.size,
                facing: player.facing,
                health: player.health,
                max_health: player.max_health,
                grounded: player.grounded,
                attacking: player.is_attacking(),
                invulnerable: player.is_invulnerable(),
                weapon: player.weapon,
            },
            enemies: stage
                .enemies
                .iter()
                .map(|e| EnemyView {
                    id: e.id,
                    species: e.species.clone(),
                    pos: e.pos,
                    size: e.size,
                    health: e.health,
                    max_health: e.max_health,
                    direction: e.direction,
                    is_boss: e.is_boss(),
                })
                .collect(),
            projectiles,
            platforms: stage.platforms.iter().map(|p| (p.kind, p.rect)).collect(),
            pickups: stage.pickups.iter().map(|p| (p.kind, p.rect)).collect(),
        }
    }
}
