//! Procedural stage generation
//!
//! Lays out ground and platforms, spreads a scaled enemy population across the
//! stage, scatters pickups, and reserves (but does not spawn) the boss.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::aabb::Aabb;
use super::state::{
    AiState, BossDescriptor, BossGate, BossPhase, BossState, DivePhase, Enemy, EnemyKind,
    EntityIds, FlyingState, FuseState, GameState, Pickup, PickupKind, Platform, PlatformKind,
    Stage, SurfaceMetrics, WeaponMode,
};
use crate::consts::*;
use crate::error::SimError;
use crate::tuning::{Tuning, species};

/// Heights above the ground of the repeating elevated platform pattern
const PLATFORM_PATTERN: [f32; 8] = [100.0, 200.0, 300.0, 400.0, 500.0, 400.0, 300.0, 200.0];
const PLATFORM_SPACING: f32 = 400.0;
const PLATFORM_WIDTH: f32 = 200.0;
/// Right end of the stage kept clear of grunts for the boss arena
const BOSS_ARENA: f32 = 800.0;
/// Boss stands this far from the right edge
const BOSS_OFFSET: f32 = 600.0;
const COIN_SIZE: f32 = 20.0;
const ITEM_SIZE: f32 = 28.0;
const HEAL_PICKUP_COUNT: u32 = 2;
/// Cap on the per-stage chance of a special species
const MAX_SPECIES_CHANCE: f64 = 0.35;

/// Stage-index dependent stat multipliers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageScaling {
    pub enemy_health: f32,
    pub enemy_attack: f32,
    pub enemy_count: f32,
    pub boss_health: f32,
    pub boss_attack: f32,
}

impl StageScaling {
    /// Power-law growth in the stage index; every multiplier is 1.0 at stage 1
    pub fn for_stage(index: u32, tuning: &Tuning) -> Self {
        let n = index.max(1) as f32;
        Self {
            enemy_health: n.powf(tuning.enemy_health_exponent),
            enemy_attack: n.powf(tuning.enemy_attack_exponent),
            enemy_count: n.powf(tuning.enemy_count_exponent),
            boss_health: n.powf(tuning.boss_health_exponent),
            boss_attack: n.powf(tuning.boss_attack_exponent),
        }
    }

    pub fn enemy_count(&self, tuning: &Tuning) -> u32 {
        let scaled = (tuning.base_enemy_count as f32 * self.enemy_count).round() as u32;
        scaled.min(tuning.max_enemy_count)
    }
}

/// Top of the ground strip for a surface, falling back when the metric is unusable
pub fn ground_level_for(surface: &SurfaceMetrics) -> f32 {
    match surface.height {
        Some(height) if height.is_finite() && height > GROUND_INSET => height - GROUND_INSET,
        reported => {
            let err = SimError::MissingSurfaceMetric { reported };
            log::warn!("{}; using ground level {}", err, DEFAULT_GROUND_LEVEL);
            DEFAULT_GROUND_LEVEL
        }
    }
}

/// Accept a generated rectangle only if it is finite and non-negative
fn validated(entity: &'static str, rect: Aabb) -> Result<Aabb, SimError> {
    if rect.is_valid() {
        Ok(rect)
    } else {
        Err(SimError::InvalidGeometry {
            entity,
            x: rect.pos.x,
            y: rect.pos.y,
            w: rect.size.x,
            h: rect.size.y,
        })
    }
}

/// Keep `rect` if valid, otherwise log and drop it
fn accept(entity: &'static str, rect: Aabb) -> Option<Aabb> {
    match validated(entity, rect) {
        Ok(rect) => Some(rect),
        Err(err) => {
            log::warn!("Dropping {}: {}", entity, err);
            None
        }
    }
}

fn chance_for(index: u32, first_stage: u32, per_stage: f64) -> f64 {
    if index < first_stage {
        0.0
    } else {
        ((index - first_stage + 1) as f64 * per_stage).clamp(0.0, MAX_SPECIES_CHANCE)
    }
}

/// Pick a species for a regular enemy slot
fn pick_species(index: u32, tuning: &Tuning, rng: &mut Pcg32) -> &'static str {
    let roll: f64 = rng.random();
    let flying = chance_for(index, 2, tuning.flying_chance_per_stage);
    let bomb = chance_for(index, 3, tuning.bomb_chance_per_stage);
    if roll < flying {
        species::BIRD
    } else if roll < flying + bomb {
        species::BOMB
    } else {
        species::TREELING
    }
}

fn layout_platforms(stage: &mut Stage) {
    let ground = Aabb::new(0.0, stage.ground_level, stage.width, GROUND_THICKNESS);
    if let Some(rect) = accept("ground", ground) {
        stage.platforms.push(Platform {
            kind: PlatformKind::Ground,
            rect,
        });
    }

    let mut x = PLATFORM_SPACING;
    let mut i = 0;
    while x + PLATFORM_WIDTH <= stage.width - PLATFORM_SPACING {
        let lift = PLATFORM_PATTERN[i % PLATFORM_PATTERN.len()];
        let rect = Aabb::new(x, stage.ground_level - lift, PLATFORM_WIDTH, PLATFORM_THICKNESS);
        if let Some(rect) = accept("platform", rect) {
            stage.platforms.push(Platform {
                kind: PlatformKind::Platform,
                rect,
            });
        }
        x += PLATFORM_SPACING;
        i += 1;
    }
}

fn make_enemy(
    id: u32,
    name: &str,
    x: f32,
    stage: &Stage,
    scaling: &StageScaling,
    tuning: &Tuning,
    rng: &mut Pcg32,
) -> Option<Enemy> {
    let stats = tuning.stats_for(name);
    let size = Vec2::new(stats.width, stats.height);

    let (kind, y) = match name {
        species::BIRD => {
            let base_height = stage.ground_level - 200.0 - rng.random_range(0.0f32..100.0);
            let fly = FlyingState {
                base_height,
                wave: rng.random_range(0.0..TAU),
                dive: DivePhase::Cruising,
                dive_cooldown: 0.0,
            };
            (EnemyKind::Flying(fly), base_height)
        }
        species::BOMB => {
            let fuse = FuseState {
                fuse_started_at: None,
                explosion_radius: tuning.explosion_radius,
            };
            (EnemyKind::RollingBomb(fuse), stage.ground_level - size.y)
        }
        _ => (EnemyKind::Walker, stage.ground_level - size.y),
    };

    let rect = accept("enemy", Aabb::from_pos_size(Vec2::new(x, y), size))?;
    let health = stats.health * scaling.enemy_health;
    Some(Enemy {
        id,
        species: name.to_string(),
        kind,
        pos: rect.pos,
        vel: Vec2::ZERO,
        size,
        health,
        max_health: health,
        attack: stats.attack * scaling.enemy_attack,
        direction: -1.0,
        attack_cooldown: 0.0,
        ai: AiState::Patrol,
        grounded: false,
    })
}

fn populate_enemies(
    stage: &mut Stage,
    scaling: &StageScaling,
    tuning: &Tuning,
    rng: &mut Pcg32,
    ids: &mut EntityIds,
) {
    let count = scaling.enemy_count(tuning);
    if count == 0 {
        return;
    }
    let start = stage.spawn_point.x + tuning.min_spawn_distance;
    let end = (stage.width - BOSS_ARENA).max(start);
    let spacing = (end - start) / count as f32;

    for i in 0..count {
        let x = start + spacing * (i as f32 + 0.5);
        let name = pick_species(stage.index, tuning, rng);
        if let Some(enemy) = make_enemy(ids.allocate(), name, x, stage, scaling, tuning, rng) {
            stage.enemies.push(enemy);
        }
    }
}

fn scatter_pickups(stage: &mut Stage, tuning: &Tuning, rng: &mut Pcg32, ids: &mut EntityIds) {
    let left = stage.spawn_point.x + 200.0;
    let right = (stage.width - 200.0).max(left + 1.0);
    if !(left < right) {
        log::warn!(
            "No room for pickups on stage {} (spawn x {}, width {})",
            stage.index,
            stage.spawn_point.x,
            stage.width
        );
        return;
    }

    let mut place = |kind: PickupKind, size: f32, rng: &mut Pcg32, stage: &mut Stage| {
        let x = rng.random_range(left..right);
        let y = stage.ground_level - size - rng.random_range(20.0f32..260.0);
        if let Some(rect) = accept("pickup", Aabb::new(x, y, size, size)) {
            stage.pickups.push(Pickup {
                id: ids.allocate(),
                kind,
                rect,
            });
        }
    };

    for _ in 0..tuning.coin_count {
        place(PickupKind::Coin, COIN_SIZE, rng, stage);
    }
    for _ in 0..HEAL_PICKUP_COUNT {
        place(PickupKind::Heal, ITEM_SIZE, rng, stage);
    }
    for _ in 0..tuning.weapon_pickup_count {
        let weapon = match rng.random_range(0..3) {
            0 => WeaponMode::Hammer,
            1 => WeaponMode::Arrow,
            _ => WeaponMode::Magic,
        };
        place(PickupKind::Weapon(weapon), ITEM_SIZE, rng, stage);
    }
}

/// Describe the stage boss without adding it to the enemy set
fn reserve_boss(stage: &Stage, scaling: &StageScaling, tuning: &Tuning) -> BossGate {
    let name = if stage.index % 5 == 0 {
        species::GOLDEN_KING
    } else {
        species::TREE_KING
    };
    let stats = tuning.stats_for(name);
    let size = Vec2::new(stats.width, stats.height);
    let pos = Vec2::new(stage.width - BOSS_OFFSET, stage.ground_level - size.y);

    match accept("boss", Aabb::from_pos_size(pos, size)) {
        Some(rect) => BossGate::Reserved(BossDescriptor {
            species: name.to_string(),
            pos: rect.pos,
            size,
            health: stats.health * scaling.boss_health,
            attack: stats.attack * scaling.boss_attack,
        }),
        None => BossGate::NotReserved,
    }
}

/// Turn a reserved boss into an active enemy
pub fn boss_from_descriptor(id: u32, descriptor: &BossDescriptor) -> Enemy {
    Enemy {
        id,
        species: descriptor.species.clone(),
        kind: EnemyKind::Boss(BossState {
            phase: BossPhase::Idle,
            phase_timer: 0.0,
            attack_cooldown: 0.0,
        }),
        pos: descriptor.pos,
        vel: Vec2::ZERO,
        size: descriptor.size,
        health: descriptor.health,
        max_health: descriptor.health,
        attack: descriptor.attack,
        direction: -1.0,
        attack_cooldown: 0.0,
        ai: AiState::Patrol,
        grounded: false,
    }
}

/// Build a complete stage for `index`
pub fn build_stage(
    index: u32,
    tuning: &Tuning,
    surface: &SurfaceMetrics,
    rng: &mut Pcg32,
    ids: &mut EntityIds,
) -> Stage {
    let index = index.max(1);
    let scaling = StageScaling::for_stage(index, tuning);
    let ground_level = ground_level_for(surface);

    let mut stage = Stage::empty(index, tuning.stage_width, ground_level);
    stage.spawn_point = Vec2::new(tuning.spawn_x, ground_level - tuning.player_height);

    layout_platforms(&mut stage);
    populate_enemies(&mut stage, &scaling, tuning, rng, ids);
    scatter_pickups(&mut stage, tuning, rng, ids);
    stage.boss_gate = reserve_boss(&stage, &scaling, tuning);

    stage.initial_enemy_count = stage.enemies.len() as u32;
    stage.initial_pickup_count = stage.pickups.len() as u32;

    log::info!(
        "Stage {}: ground={}, platforms={}, enemies={}, pickups={}, scaling={:?}",
        index,
        ground_level,
        stage.platforms.len(),
        stage.enemies.len(),
        stage.pickups.len(),
        scaling
    );

    stage
}

/// Replace the state's stage with a freshly generated one at `index`
pub fn generate_stage(state: &mut GameState, index: u32) {
    state.stage = build_stage(
        index,
        &state.tuning,
        &state.surface,
        &mut state.rng,
        &mut state.ids,
    );
}
