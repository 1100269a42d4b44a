//! Attacks, projectiles, contact damage and enemy deaths
//!
//! Damage is applied immediately; removal and scoring happen once, in
//! `resolve_deaths`, at the end of the combat step.

use glam::Vec2;

use super::aabb::Aabb;
use super::state::{
    BossGate, GameEvent, GameState, Projectile, ProjectileKind, ProjectileOwner, Stage, WeaponMode,
};
use super::tick::{Action, InputSnapshot};

/// Projectiles above this y are considered gone
const TRACKED_CEILING: f32 = -400.0;

/// Size of an arrow
const ARROW_SIZE: Vec2 = Vec2::new(24.0, 6.0);
/// Size of a magic bolt
const BOLT_SIZE: Vec2 = Vec2::new(10.0, 24.0);

/// Run the combat step: timers, attack input, projectiles, contact damage, deaths
pub fn step(state: &mut GameState, input: &InputSnapshot, dt: f32) {
    update_player_timers(state, dt);

    if input.is_held(Action::Attack) {
        try_attack(state);
    }

    update_player_projectiles(state, dt);
    update_hostile_projectiles(state, dt);
    apply_contact_damage(state);
    resolve_deaths(state);
}

/// Count down cooldowns, invulnerability and weapon upgrades
pub fn update_player_timers(state: &mut GameState, dt: f32) {
    let player = &mut state.player;
    player.attack_cooldown = (player.attack_cooldown - dt).max(0.0);
    player.attack_timer = (player.attack_timer - dt).max(0.0);
    player.invulnerable_timer = (player.invulnerable_timer - dt).max(0.0);

    if player.weapon != WeaponMode::Sword {
        player.weapon_timer -= dt;
        if player.weapon_timer <= 0.0 {
            player.weapon = WeaponMode::Sword;
            player.weapon_timer = 0.0;
            state.events.push(GameEvent::WeaponExpired);
        }
    }
}

/// Attack with the active weapon. No-op while the cooldown runs.
pub fn try_attack(state: &mut GameState) -> bool {
    if state.player.attack_cooldown > 0.0 {
        return false;
    }

    let weapon = state.player.weapon;
    state.player.attack_cooldown = state.tuning.attack_cooldown;
    state.player.attack_timer = state.tuning.attack_active_frames;
    state.emit(GameEvent::Attacked { weapon });

    match weapon {
        WeaponMode::Sword => {
            let (radius, damage) = (state.tuning.sword_radius, state.tuning.sword_damage);
            melee(state, radius, damage);
        }
        WeaponMode::Hammer => {
            let (radius, damage) = (state.tuning.hammer_radius, state.tuning.hammer_damage);
            melee(state, radius, damage);
        }
        WeaponMode::Arrow | WeaponMode::Magic => {
            let projectile = player_projectile(state, weapon);
            state.player.projectiles.push(projectile);
        }
    }
    true
}

/// Damage every living enemy whose center is within `radius` of the player's
fn melee(state: &mut GameState, radius: f32, damage: f32) {
    let origin = state.player.center();
    for enemy in &mut state.stage.enemies {
        if enemy.is_dead() {
            continue;
        }
        if enemy.center().distance(origin) < radius {
            enemy.health -= damage;
            state.events.push(GameEvent::EnemyHit { id: enemy.id });
        }
    }
}

/// Build the projectile a ranged weapon fires from the player's current pose
fn player_projectile(state: &mut GameState, weapon: WeaponMode) -> Projectile {
    let center = state.player.center();
    let speed = state.tuning.projectile_speed;
    let (kind, size, vel, damage) = match weapon {
        WeaponMode::Magic => (
            ProjectileKind::MagicBolt,
            BOLT_SIZE,
            Vec2::new(0.0, -speed),
            state.tuning.magic_damage,
        ),
        _ => (
            ProjectileKind::Arrow,
            ARROW_SIZE,
            Vec2::new(state.player.facing * speed, 0.0),
            state.tuning.arrow_damage,
        ),
    };
    Projectile {
        id: state.ids.allocate(),
        kind,
        pos: center - size * 0.5,
        vel,
        size,
        damage,
        lifespan: state.tuning.projectile_lifespan,
        owner: ProjectileOwner::Player,
    }
}

/// True while a projectile is inside the region the simulation tracks
fn in_tracked_bounds(projectile: &Projectile, stage: &Stage) -> bool {
    let b = projectile.bounds();
    b.right() >= 0.0 && b.left() <= stage.width && b.bottom() >= TRACKED_CEILING && b.top() <= stage.fall_limit
}

/// Advance a projectile. Returns false once it has expired or left the stage.
fn advance(projectile: &mut Projectile, stage: &Stage, dt: f32) -> bool {
    projectile.pos += projectile.vel * dt;
    projectile.lifespan -= dt;
    projectile.lifespan > 0.0 && in_tracked_bounds(projectile, stage)
}

/// Move player projectiles; each one damages at most one enemy, then is destroyed
pub fn update_player_projectiles(state: &mut GameState, dt: f32) {
    let pad = state.tuning.upward_hitbox_pad;
    let stage = &mut state.stage;
    let events = &mut state.events;
    let mut projectiles = std::mem::take(&mut state.player.projectiles);

    projectiles.retain_mut(|projectile| {
        if !advance(projectile, stage, dt) {
            return false;
        }
        let hit_box = projectile.hit_box(pad);
        let target = stage
            .enemies
            .iter_mut()
            .find(|enemy| !enemy.is_dead() && enemy.bounds().overlaps(&hit_box));
        match target {
            Some(enemy) => {
                enemy.health -= projectile.damage;
                events.push(GameEvent::EnemyHit { id: enemy.id });
                false
            }
            None => true,
        }
    });

    state.player.projectiles = projectiles;
}

/// Move enemy projectiles and apply their hits to the player
pub fn update_hostile_projectiles(state: &mut GameState, dt: f32) {
    let multiplier = state.tuning.difficulty.damage_multiplier();
    let invulnerability = state.tuning.invulnerability_frames;
    let mut projectiles = std::mem::take(&mut state.stage.hostile_projectiles);
    let player_box = state.player.bounds();

    projectiles.retain_mut(|projectile| {
        if !advance(projectile, &state.stage, dt) {
            return false;
        }
        if !projectile.bounds().overlaps(&player_box) {
            return true;
        }
        let damage = projectile.damage * multiplier;
        if state.player.take_damage(damage, invulnerability) {
            state.events.push(GameEvent::PlayerHit { damage });
        }
        false
    });

    state.stage.hostile_projectiles = projectiles;
}

/// Touching an enemy hurts, gated by enemy cooldown, invulnerability and swings
pub fn apply_contact_damage(state: &mut GameState) {
    let multiplier = state.tuning.difficulty.damage_multiplier();
    let invulnerability = state.tuning.invulnerability_frames;
    let contact_cooldown = state.tuning.enemy_contact_cooldown;
    let player = &mut state.player;

    for enemy in &mut state.stage.enemies {
        if enemy.is_dead() || !enemy.bounds().overlaps(&player.bounds()) {
            continue;
        }
        if enemy.attack_cooldown > 0.0 || player.is_invulnerable() || player.is_attacking() {
            continue;
        }
        let damage = enemy.attack * multiplier;
        if player.take_damage(damage, invulnerability) {
            enemy.attack_cooldown = contact_cooldown;
            state.events.push(GameEvent::PlayerHit { damage });
        }
    }
}

/// Damage the player from an area effect centered at `origin`
pub fn area_damage_player(state: &mut GameState, origin: Vec2, radius: f32, damage: f32) -> bool {
    let player_box: Aabb = state.player.bounds();
    // Closest point of the player's box to the blast center
    let closest = origin.clamp(player_box.pos, player_box.pos + player_box.size);
    if closest.distance(origin) > radius {
        return false;
    }
    let damage = damage * state.tuning.difficulty.damage_multiplier();
    let applied = state
        .player
        .take_damage(damage, state.tuning.invulnerability_frames);
    if applied {
        state.emit(GameEvent::PlayerHit { damage });
    }
    applied
}

/// Remove dead enemies and award their score exactly once
pub fn resolve_deaths(state: &mut GameState) {
    let mut dead = Vec::new();
    state.stage.enemies.retain(|enemy| {
        if enemy.is_dead() {
            dead.push((enemy.id, enemy.is_boss()));
            false
        } else {
            true
        }
    });

    for (id, is_boss) in dead {
        let gated_boss = matches!(state.stage.boss_gate, BossGate::Spawned { boss_id } if boss_id == id);
        if is_boss && gated_boss {
            let reward = state.tuning.boss_reward;
            state.score += reward;
            state.stage.boss_defeated = true;
            log::info!("Boss {} defeated on stage {}", id, state.stage.index);
            state.emit(GameEvent::BossDefeated { id, reward });
        } else {
            let reward = state.tuning.kill_reward;
            state.score += reward;
            state.stage.enemies_defeated += 1;
            state.emit(GameEvent::EnemyKilled { id, reward });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{AiState, Enemy, EnemyKind, SurfaceMetrics};
    use crate::tuning::{Difficulty, Tuning};

    fn arena() -> GameState {
        let mut state = GameState::new(42, Tuning::default(), SurfaceMetrics::new(1280.0, 800.0));
        state.stage.enemies.clear();
        state.stage.boss_gate = BossGate::NotReserved;
        state.drain_events();
        state
    }

    fn walker(id: u32, pos: Vec2, health: f32) -> Enemy {
        Enemy {
            id,
            species: "treeling".into(),
            kind: EnemyKind::Walker,
            pos,
            vel: Vec2::ZERO,
            size: Vec2::new(40.0, 60.0),
            health,
            max_health: health,
            attack: 20.0,
            direction: -1.0,
            attack_cooldown: 0.0,
            ai: AiState::Patrol,
            grounded: true,
        }
    }

    fn bolt_at(state: &mut GameState, center: Vec2, damage: f32) {
        let id = state.ids.allocate();
        state.player.projectiles.push(Projectile {
            id,
            kind: ProjectileKind::Arrow,
            pos: center - ARROW_SIZE * 0.5,
            vel: Vec2::ZERO,
            size: ARROW_SIZE,
            damage,
            lifespan: 90.0,
            owner: ProjectileOwner::Player,
        });
    }

    #[test]
    fn test_two_hits_kill_once() {
        let mut state = arena();
        let enemy = walker(900, Vec2::new(3000.0, 600.0), 80.0);
        let center = enemy.center();
        state.stage.enemies.push(enemy);

        bolt_at(&mut state, center, 50.0);
        update_player_projectiles(&mut state, 1.0);
        resolve_deaths(&mut state);
        assert_eq!(state.stage.enemies[0].health, 30.0);
        assert!(state.player.projectiles.is_empty());
        assert_eq!(state.score, 0);

        bolt_at(&mut state, center, 50.0);
        update_player_projectiles(&mut state, 1.0);
        assert_eq!(state.stage.enemies[0].health, -20.0);
        resolve_deaths(&mut state);
        resolve_deaths(&mut state);
        assert!(state.stage.enemies.is_empty());
        assert_eq!(state.score, state.tuning.kill_reward);
        assert_eq!(state.stage.enemies_defeated, 1);
    }

    #[test]
    fn test_projectile_expires_without_collision() {
        let mut state = arena();
        let start = state.player.center() + Vec2::new(0.0, -100.0);
        bolt_at(&mut state, start, 10.0);
        state.player.projectiles[0].lifespan = 5.0;
        for _ in 0..5 {
            update_player_projectiles(&mut state, 1.0);
        }
        assert!(state.player.projectiles.is_empty());
    }

    #[test]
    fn test_attack_is_cooldown_gated() {
        let mut state = arena();
        let near = state.player.center() + Vec2::new(30.0, 0.0) - Vec2::new(20.0, 30.0);
        state.stage.enemies.push(walker(900, near, 500.0));

        assert!(try_attack(&mut state));
        let after_first = state.stage.enemies[0].health;
        assert_eq!(after_first, 500.0 - state.tuning.sword_damage);

        assert!(!try_attack(&mut state));
        assert_eq!(state.stage.enemies[0].health, after_first);
    }

    #[test]
    fn test_arrow_spawns_projectile_in_facing_direction() {
        let mut state = arena();
        state.player.weapon = WeaponMode::Arrow;
        state.player.weapon_timer = 100.0;
        state.player.facing = -1.0;
        assert!(try_attack(&mut state));
        assert_eq!(state.player.projectiles.len(), 1);
        assert!(state.player.projectiles[0].vel.x < 0.0);
    }

    #[test]
    fn test_contact_damage_sets_cooldowns() {
        let mut state = arena();
        let pos = state.player.pos;
        state.stage.enemies.push(walker(900, pos, 100.0));

        apply_contact_damage(&mut state);
        let health = state.player.health;
        assert_eq!(health, state.player.max_health - 20.0);
        assert!(state.player.is_invulnerable());
        assert_eq!(state.stage.enemies[0].attack_cooldown, state.tuning.enemy_contact_cooldown);

        // Sustained overlap on the next tick does nothing
        apply_contact_damage(&mut state);
        assert_eq!(state.player.health, health);
    }

    #[test]
    fn test_contact_damage_scales_with_difficulty() {
        let mut state = arena();
        state.tuning.difficulty = Difficulty::Hard;
        let pos = state.player.pos;
        state.stage.enemies.push(walker(900, pos, 100.0));

        apply_contact_damage(&mut state);
        assert_eq!(state.player.health, state.player.max_health - 30.0);
        assert!(state.events.contains(&GameEvent::PlayerHit { damage: 30.0 }));

        let mut state = arena();
        state.tuning.difficulty = Difficulty::Easy;
        state.stage.enemies.push(walker(901, pos, 100.0));
        apply_contact_damage(&mut state);
        assert_eq!(state.player.health, state.player.max_health - 15.0);
    }

    #[test]
    fn test_hostile_orb_hits_player_once() {
        let mut state = arena();
        let center = state.player.center();
        let far = center + Vec2::new(600.0, 0.0);
        for (origin, id) in [(center, 1), (far, 2)] {
            state.stage.hostile_projectiles.push(Projectile {
                id,
                kind: ProjectileKind::BossOrb,
                pos: origin - Vec2::splat(10.0),
                vel: Vec2::ZERO,
                size: Vec2::splat(20.0),
                damage: 25.0,
                lifespan: 100.0,
                owner: ProjectileOwner::Enemy(77),
            });
        }

        update_hostile_projectiles(&mut state, 1.0);
        assert_eq!(state.player.health, state.player.max_health - 25.0);
        assert!(state.events.contains(&GameEvent::PlayerHit { damage: 25.0 }));
        assert_eq!(state.stage.hostile_projectiles.len(), 1);
        assert_eq!(state.stage.hostile_projectiles[0].id, 2);

        // Invulnerable players still absorb (and destroy) the orb
        state.stage.hostile_projectiles[0].pos = center - Vec2::splat(10.0);
        update_hostile_projectiles(&mut state, 1.0);
        assert!(state.stage.hostile_projectiles.is_empty());
        assert_eq!(state.player.health, state.player.max_health - 25.0);
    }

    #[test]
    fn test_no_contact_damage_mid_attack() {
        let mut state = arena();
        let pos = state.player.pos;
        state.stage.enemies.push(walker(900, pos, 100.0));
        state.player.attack_timer = 5.0;
        apply_contact_damage(&mut state);
        assert_eq!(state.player.health, state.player.max_health);
    }

    #[test]
    fn test_weapon_upgrade_expires() {
        let mut state = arena();
        state.player.weapon = WeaponMode::Hammer;
        state.player.weapon_timer = 2.0;
        update_player_timers(&mut state, 1.0);
        assert_eq!(state.player.weapon, WeaponMode::Hammer);
        update_player_timers(&mut state, 1.0);
        assert_eq!(state.player.weapon, WeaponMode::Sword);
        assert!(state.events.contains(&GameEvent::WeaponExpired));
    }

    #[test]
    fn test_area_damage_reaches_box_edge() {
        let mut state = arena();
        let right_edge = Vec2::new(state.player.bounds().right() + 50.0, state.player.center().y);
        assert!(area_damage_player(&mut state, right_edge, 60.0, 10.0));
        state.player.invulnerable_timer = 0.0;
        let far = right_edge + Vec2::new(500.0, 0.0);
        assert!(!area_damage_player(&mut state, far, 60.0, 10.0));
    }
}
