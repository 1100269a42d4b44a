//! Enemy and boss behavior
//!
//! Every non-boss enemy runs the same distance-driven patrol/alert/chase
//! machine. Flying and timed-fuse enemies layer extra behavior on top of it.
//! Bosses run their own time-boxed idle/attack/recover cycle.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::combat::area_damage_player;
use super::state::{
    AiState, BossPhase, BossState, DivePhase, Enemy, EnemyKind, FlyingState, FuseState, GameEvent,
    GameState, Projectile, ProjectileKind, ProjectileOwner,
};
use crate::tuning::Tuning;
use crate::{approach, facing_toward};

/// Size of a boss special-attack orb
const BOSS_ORB_SIZE: Vec2 = Vec2::new(20.0, 20.0);

/// Per-tick facts every enemy reads
#[derive(Debug, Clone, Copy)]
struct AiContext {
    player_center: Vec2,
    ground_level: f32,
    clock: f32,
    dt: f32,
}

/// A fuse that ran out this tick
#[derive(Debug, Clone, Copy)]
struct Explosion {
    id: u32,
    center: Vec2,
    radius: f32,
}

/// A boss special attack fired this tick
#[derive(Debug, Clone, Copy)]
struct BossShot {
    owner: u32,
    origin: Vec2,
    target: Vec2,
    damage: f32,
}

/// Bernoulli roll that tolerates out-of-range tuning values
fn roll(rng: &mut Pcg32, chance: f64) -> bool {
    rng.random_bool(chance.clamp(0.0, 1.0))
}

/// Update every enemy's intent (velocities, sub-states) for this tick
pub fn step(state: &mut GameState, dt: f32) {
    let ctx = AiContext {
        player_center: state.player.center(),
        ground_level: state.stage.ground_level,
        clock: state.clock,
        dt,
    };

    let mut explosions = Vec::new();
    let mut shots = Vec::new();
    let tuning = &state.tuning;
    let rng = &mut state.rng;
    let events = &mut state.events;

    for enemy in &mut state.stage.enemies {
        enemy.attack_cooldown = (enemy.attack_cooldown - dt).max(0.0);

        match enemy.kind {
            EnemyKind::Boss(mut boss) => {
                if let Some(shot) = update_boss(enemy, &mut boss, &ctx, tuning, events) {
                    shots.push(shot);
                }
                enemy.kind = EnemyKind::Boss(boss);
            }
            EnemyKind::Flying(mut fly) => {
                update_base(enemy, &ctx, tuning, rng);
                update_flying(enemy, &mut fly, &ctx, tuning);
                enemy.kind = EnemyKind::Flying(fly);
            }
            EnemyKind::RollingBomb(mut fuse) => {
                update_base(enemy, &ctx, tuning, rng);
                if let Some(explosion) = update_fuse(enemy, &mut fuse, &ctx, tuning, events) {
                    explosions.push(explosion);
                }
                enemy.kind = EnemyKind::RollingBomb(fuse);
            }
            EnemyKind::Walker => update_base(enemy, &ctx, tuning, rng),
        }
    }

    for shot in shots {
        let projectile = boss_projectile(state, shot);
        state.stage.hostile_projectiles.push(projectile);
    }

    for explosion in explosions {
        // Self-destruct: removed regardless of health, no score
        state.stage.enemies.retain(|e| e.id != explosion.id);
        state.emit(GameEvent::Exploded { id: explosion.id });
        let damage = state.tuning.explosion_damage;
        area_damage_player(state, explosion.center, explosion.radius, damage);
    }
}

/// Distance-threshold patrol/alert/chase machine
fn update_base(enemy: &mut Enemy, ctx: &AiContext, tuning: &Tuning, rng: &mut Pcg32) {
    let center = enemy.center();
    let distance = (ctx.player_center.x - center.x).abs();

    let next = if distance < tuning.near_threshold {
        AiState::Chase
    } else if distance < tuning.mid_threshold {
        AiState::Alert
    } else {
        AiState::Patrol
    };
    if next != enemy.ai {
        log::debug!("Enemy {} {:?} -> {:?}", enemy.id, enemy.ai, next);
        enemy.ai = next;
    }

    match enemy.ai {
        AiState::Chase => {
            enemy.direction = facing_toward(center.x, ctx.player_center.x);
            enemy.vel.x = enemy.direction * tuning.chase_speed;

            let player_above = center.y - ctx.player_center.y > tuning.chase_jump_height_gap;
            if player_above && enemy.grounded && roll(rng, tuning.chase_jump_chance) {
                enemy.vel.y = -tuning.enemy_jump_power;
                enemy.grounded = false;
            }
        }
        AiState::Alert => {
            enemy.direction = facing_toward(center.x, ctx.player_center.x);
            enemy.vel.x = enemy.direction * tuning.alert_speed;
        }
        AiState::Patrol => {
            // Stage-edge and wall flips happen in the physics step
            if roll(rng, tuning.patrol_flip_chance) {
                enemy.direction = -enemy.direction;
            }
            enemy.vel.x = enemy.direction * tuning.patrol_speed;
        }
    }
}

/// Hover around the base height; dive at a nearby player, then climb back
fn update_flying(enemy: &mut Enemy, fly: &mut FlyingState, ctx: &AiContext, tuning: &Tuning) {
    fly.dive_cooldown = (fly.dive_cooldown - ctx.dt).max(0.0);
    let distance = enemy.center().distance(ctx.player_center);

    match fly.dive {
        DivePhase::Cruising => {
            fly.wave += tuning.fly_frequency * ctx.dt;
            let target_y = fly.base_height + fly.wave.sin() * tuning.fly_amplitude;
            let next_y = approach(enemy.pos.y, target_y, tuning.dive_speed * ctx.dt);
            enemy.vel.y = (next_y - enemy.pos.y) / ctx.dt;

            if distance < tuning.dive_range && fly.dive_cooldown <= 0.0 {
                let target_y = ctx.player_center.y - enemy.size.y * 0.5;
                log::debug!("Flyer {} diving toward y={}", enemy.id, target_y);
                fly.dive = DivePhase::Descending { target_y };
            }
        }
        DivePhase::Descending { target_y } => {
            enemy.vel.y = tuning.dive_speed;
            if enemy.pos.y >= target_y || enemy.bounds().bottom() >= ctx.ground_level {
                fly.dive = DivePhase::Ascending;
            }
        }
        DivePhase::Ascending => {
            enemy.vel.y = -tuning.dive_speed;
            if enemy.pos.y <= fly.base_height {
                fly.dive = DivePhase::Cruising;
                fly.dive_cooldown = tuning.dive_cooldown;
            }
        }
    }
}

/// Light the fuse when the player comes close; report the explosion when it burns out
fn update_fuse(
    enemy: &Enemy,
    fuse: &mut FuseState,
    ctx: &AiContext,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) -> Option<Explosion> {
    match fuse.fuse_started_at {
        None => {
            if enemy.center().distance(ctx.player_center) < tuning.fuse_detection_radius {
                fuse.fuse_started_at = Some(ctx.clock);
                events.push(GameEvent::FuseLit { id: enemy.id });
            }
            None
        }
        Some(started) if ctx.clock - started >= tuning.fuse_frames => Some(Explosion {
            id: enemy.id,
            center: enemy.center(),
            radius: fuse.explosion_radius,
        }),
        Some(_) => None,
    }
}

fn enter_phase(
    enemy: &Enemy,
    boss: &mut BossState,
    phase: BossPhase,
    duration: f32,
    events: &mut Vec<GameEvent>,
) {
    log::debug!("Boss {} {:?} -> {:?}", enemy.id, boss.phase, phase);
    boss.phase = phase;
    boss.phase_timer = duration;
    events.push(GameEvent::BossPhaseChanged { id: enemy.id, phase });
}

/// Time-boxed idle -> attack -> recover cycle
fn update_boss(
    enemy: &mut Enemy,
    boss: &mut BossState,
    ctx: &AiContext,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) -> Option<BossShot> {
    let center = enemy.center();
    let mut shot = None;

    match boss.phase {
        BossPhase::Idle => {
            enemy.vel.x = 0.0;
            if center.distance(ctx.player_center) < tuning.boss_aggro_range {
                enter_phase(enemy, boss, BossPhase::Attack, tuning.boss_attack_frames, events);
                boss.attack_cooldown = tuning.boss_special_interval;
            }
        }
        BossPhase::Attack => {
            enemy.ai = AiState::Chase;
            enemy.direction = facing_toward(center.x, ctx.player_center.x);
            enemy.vel.x = enemy.direction * tuning.boss_speed;

            boss.attack_cooldown -= ctx.dt;
            if boss.attack_cooldown <= 0.0 {
                boss.attack_cooldown = tuning.boss_special_interval;
                events.push(GameEvent::BossSpecialAttack { id: enemy.id });
                shot = Some(BossShot {
                    owner: enemy.id,
                    origin: center,
                    target: ctx.player_center,
                    damage: enemy.attack * tuning.boss_projectile_damage_ratio,
                });
            }

            boss.phase_timer -= ctx.dt;
            if boss.phase_timer <= 0.0 {
                enter_phase(enemy, boss, BossPhase::Recover, tuning.boss_recover_frames, events);
            }
        }
        BossPhase::Recover => {
            enemy.ai = AiState::Patrol;
            enemy.vel.x = 0.0;
            enemy.health = (enemy.health + tuning.boss_regen_per_frame * ctx.dt).min(enemy.max_health);

            boss.phase_timer -= ctx.dt;
            if boss.phase_timer <= 0.0 {
                enter_phase(enemy, boss, BossPhase::Idle, 0.0, events);
            }
        }
    }

    shot
}

fn boss_projectile(state: &mut GameState, shot: BossShot) -> Projectile {
    let direction = (shot.target - shot.origin).normalize_or(Vec2::new(-1.0, 0.0));
    Projectile {
        id: state.ids.allocate(),
        kind: ProjectileKind::BossOrb,
        pos: shot.origin - BOSS_ORB_SIZE * 0.5,
        vel: direction * state.tuning.boss_projectile_speed,
        size: BOSS_ORB_SIZE,
        damage: shot.damage,
        lifespan: state.tuning.projectile_lifespan * 2.0,
        owner: ProjectileOwner::Enemy(shot.owner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{BossGate, SurfaceMetrics};

    fn arena() -> GameState {
        let mut state = GameState::new(3, Tuning::default(), SurfaceMetrics::new(1280.0, 800.0));
        state.stage.enemies.clear();
        state.stage.boss_gate = BossGate::NotReserved;
        state.drain_events();
        state
    }

    fn enemy(id: u32, kind: EnemyKind, x: f32, state: &GameState) -> Enemy {
        Enemy {
            id,
            species: "test".into(),
            kind,
            pos: Vec2::new(x, state.stage.ground_level - 60.0),
            vel: Vec2::ZERO,
            size: Vec2::new(40.0, 60.0),
            health: 100.0,
            max_health: 100.0,
            attack: 20.0,
            direction: -1.0,
            attack_cooldown: 0.0,
            ai: AiState::Patrol,
            grounded: true,
        }
    }

    fn place_player(state: &mut GameState, x: f32) {
        state.player.pos.x = x;
        state.player.pos.y = state.stage.ground_level - state.player.size.y;
    }

    #[test]
    fn test_distance_thresholds() {
        let mut state = arena();
        place_player(&mut state, 1000.0);
        let player_x = state.player.center().x;
        state.stage.enemies.push(enemy(1, EnemyKind::Walker, player_x + 100.0, &state));
        state.stage.enemies.push(enemy(2, EnemyKind::Walker, player_x + 300.0, &state));
        state.stage.enemies.push(enemy(3, EnemyKind::Walker, player_x + 2000.0, &state));

        step(&mut state, 1.0);

        let enemies = &state.stage.enemies;
        assert_eq!(enemies[0].ai, AiState::Chase);
        assert_eq!(enemies[0].vel.x, -state.tuning.chase_speed);
        assert_eq!(enemies[1].ai, AiState::Alert);
        assert_eq!(enemies[1].vel.x, -state.tuning.alert_speed);
        assert_eq!(enemies[2].ai, AiState::Patrol);
        assert_eq!(enemies[2].vel.x.abs(), state.tuning.patrol_speed);
    }

    #[test]
    fn test_fuse_explodes_and_removes_without_score() {
        let mut state = arena();
        place_player(&mut state, 1000.0);
        let player_x = state.player.pos.x;
        let fuse = FuseState {
            fuse_started_at: None,
            explosion_radius: 130.0,
        };
        state
            .stage
            .enemies
            .push(enemy(9, EnemyKind::RollingBomb(fuse), player_x + 60.0, &state));

        step(&mut state, 1.0);
        assert!(state.events.contains(&GameEvent::FuseLit { id: 9 }));

        state.clock += state.tuning.fuse_frames;
        step(&mut state, 1.0);

        assert!(state.stage.enemies.is_empty());
        assert!(state.events.contains(&GameEvent::Exploded { id: 9 }));
        assert!(state.player.health < state.player.max_health);
        assert_eq!(state.score, 0);
        assert_eq!(state.stage.enemies_defeated, 0);
    }

    #[test]
    fn test_flyer_dives_when_player_close() {
        let mut state = arena();
        place_player(&mut state, 1000.0);
        let fly = FlyingState {
            base_height: state.player.pos.y - 150.0,
            wave: 0.0,
            dive: DivePhase::Cruising,
            dive_cooldown: 0.0,
        };
        let mut flyer = enemy(4, EnemyKind::Flying(fly), state.player.pos.x, &state);
        flyer.pos.y = fly.base_height;
        state.stage.enemies.push(flyer);

        step(&mut state, 1.0);
        let EnemyKind::Flying(fly) = state.stage.enemies[0].kind else {
            panic!("flyer changed kind");
        };
        assert!(matches!(fly.dive, DivePhase::Descending { .. }));

        step(&mut state, 1.0);
        assert_eq!(state.stage.enemies[0].vel.y, state.tuning.dive_speed);
    }

    #[test]
    fn test_chaser_jumps_toward_player_above() {
        let mut state = arena();
        state.tuning.chase_jump_chance = 1.0;
        place_player(&mut state, 1000.0);
        let player_x = state.player.center().x;
        state.stage.enemies.push(enemy(5, EnemyKind::Walker, player_x + 60.0, &state));

        // Same height: chasing, but no reason to jump
        step(&mut state, 1.0);
        assert_eq!(state.stage.enemies[0].ai, AiState::Chase);
        assert_eq!(state.stage.enemies[0].vel.y, 0.0);

        state.player.pos.y -= 150.0;
        step(&mut state, 1.0);
        let chaser = &state.stage.enemies[0];
        assert_eq!(chaser.vel.y, -state.tuning.enemy_jump_power);
        assert!(!chaser.grounded);

        // Airborne enemies cannot jump again
        state.stage.enemies[0].vel.y = 0.0;
        step(&mut state, 1.0);
        assert_eq!(state.stage.enemies[0].vel.y, 0.0);
    }

    #[test]
    fn test_flyer_climbs_back_and_rearms() {
        let mut state = arena();
        place_player(&mut state, 1000.0);
        let base_height = state.player.pos.y - 150.0;
        let target_y = base_height + 100.0;
        let fly = FlyingState {
            base_height,
            wave: 0.0,
            dive: DivePhase::Descending { target_y },
            dive_cooldown: 0.0,
        };
        let mut flyer = enemy(6, EnemyKind::Flying(fly), state.player.pos.x, &state);
        flyer.pos.y = target_y;
        flyer.grounded = false;
        state.stage.enemies.push(flyer);

        let dive = |state: &GameState| match state.stage.enemies[0].kind {
            EnemyKind::Flying(fly) => fly,
            _ => panic!("flyer changed kind"),
        };

        step(&mut state, 1.0);
        assert_eq!(dive(&state).dive, DivePhase::Ascending);

        step(&mut state, 1.0);
        assert_eq!(state.stage.enemies[0].vel.y, -state.tuning.dive_speed);
        assert_eq!(dive(&state).dive, DivePhase::Ascending);

        state.stage.enemies[0].pos.y = base_height - 1.0;
        step(&mut state, 1.0);
        assert_eq!(dive(&state).dive, DivePhase::Cruising);
        assert_eq!(dive(&state).dive_cooldown, state.tuning.dive_cooldown);

        // Player still in range, but the cooldown holds the next dive back
        step(&mut state, 1.0);
        assert_eq!(dive(&state).dive, DivePhase::Cruising);
    }

    #[test]
    fn test_boss_phase_cycle_is_time_boxed() {
        let mut state = arena();
        state.tuning.boss_attack_frames = 3.0;
        state.tuning.boss_recover_frames = 2.0;
        place_player(&mut state, 1000.0);
        let boss = BossState {
            phase: BossPhase::Idle,
            phase_timer: 0.0,
            attack_cooldown: 0.0,
        };
        let mut king = enemy(50, EnemyKind::Boss(boss), 1200.0, &state);
        king.health = 10.0;
        king.max_health = 1000.0;
        state.stage.enemies.push(king);

        let phase = |state: &GameState| match state.stage.enemies[0].kind {
            EnemyKind::Boss(boss) => boss.phase,
            _ => panic!("not a boss"),
        };

        step(&mut state, 1.0);
        assert_eq!(phase(&state), BossPhase::Attack);
        for _ in 0..3 {
            step(&mut state, 1.0);
        }
        assert_eq!(phase(&state), BossPhase::Recover);

        let before = state.stage.enemies[0].health;
        step(&mut state, 1.0);
        assert!(state.stage.enemies[0].health > before);
        step(&mut state, 1.0);
        assert_eq!(phase(&state), BossPhase::Idle);
    }

    #[test]
    fn test_boss_special_attack_spawns_hostile_projectile() {
        let mut state = arena();
        state.tuning.boss_special_interval = 1.0;
        place_player(&mut state, 1000.0);
        let boss = BossState {
            phase: BossPhase::Attack,
            phase_timer: 100.0,
            attack_cooldown: 1.0,
        };
        state
            .stage
            .enemies
            .push(enemy(51, EnemyKind::Boss(boss), 1300.0, &state));

        step(&mut state, 1.0);
        assert_eq!(state.stage.hostile_projectiles.len(), 1);
        let orb = &state.stage.hostile_projectiles[0];
        assert_eq!(orb.owner, ProjectileOwner::Enemy(51));
        assert!(orb.vel.x < 0.0);
    }
}
