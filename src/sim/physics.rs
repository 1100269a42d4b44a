//! Gravity integration and platform collision
//!
//! Bodies move one axis at a time. After each axis move every overlapping
//! platform pushes the body out on the side implied by its velocity sign.
//! Ground state is derived fresh each tick from the vertical pass.

use glam::Vec2;

use super::aabb::{Aabb, VerticalContact, resolve_x, resolve_y};
use super::state::{EnemyKind, GameEvent, GameState, Platform};
use super::tick::{Action, InputSnapshot};

/// Contacts produced by one move
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Contacts {
    /// Landed on a platform this tick
    pub grounded: bool,
    /// Hit the underside of a platform
    pub ceiling: bool,
    /// Pushed out of a platform side
    pub wall: bool,
    /// Clamped to the stage's horizontal extent
    pub boundary: bool,
}

/// Result of the physics step that later steps care about
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhysicsOutcome {
    pub player_fell: bool,
}

/// Apply gravity to a vertical velocity, capped at terminal velocity
#[inline]
pub fn apply_gravity(vel: &mut Vec2, gravity: f32, terminal_velocity: f32, dt: f32) {
    vel.y = (vel.y + gravity * dt).min(terminal_velocity);
}

/// Integrate a body by its velocity and resolve platform overlaps per axis
pub fn move_and_collide(
    pos: &mut Vec2,
    vel: &mut Vec2,
    size: Vec2,
    platforms: &[Platform],
    stage_width: f32,
    dt: f32,
) -> Contacts {
    let mut contacts = Contacts::default();

    // Horizontal pass
    pos.x += vel.x * dt;
    for platform in platforms {
        let body = Aabb::from_pos_size(*pos, size);
        if !body.overlaps(&platform.rect) {
            continue;
        }
        if let Some(x) = resolve_x(&body, &platform.rect, vel.x) {
            pos.x = x;
            vel.x = 0.0;
            contacts.wall = true;
        }
    }

    contacts.boundary = clamp_to_stage(pos, size, stage_width);

    // Vertical pass
    pos.y += vel.y * dt;
    for platform in platforms {
        let body = Aabb::from_pos_size(*pos, size);
        if !body.overlaps(&platform.rect) {
            continue;
        }
        match resolve_y(&body, &platform.rect, vel.y) {
            Some((y, VerticalContact::Top)) => {
                pos.y = y;
                vel.y = 0.0;
                contacts.grounded = true;
            }
            Some((y, VerticalContact::Bottom)) => {
                pos.y = y;
                vel.y = 0.0;
                contacts.ceiling = true;
            }
            None => {}
        }
    }

    contacts
}

/// Keep a body within [0, stage_width]. Returns true if it had to be clamped.
pub fn clamp_to_stage(pos: &mut Vec2, size: Vec2, stage_width: f32) -> bool {
    let max_x = (stage_width - size.x).max(0.0);
    if pos.x < 0.0 {
        pos.x = 0.0;
        true
    } else if pos.x > max_x {
        pos.x = max_x;
        true
    } else {
        false
    }
}

/// Translate held actions into player velocity; handles edge-triggered jumps
fn apply_player_controls(state: &mut GameState, input: &InputSnapshot, dt: f32) {
    let tuning = &state.tuning;
    let player = &mut state.player;

    if input.is_held(Action::MoveLeft) && !input.is_held(Action::MoveRight) {
        player.vel.x = -tuning.move_speed;
        player.facing = -1.0;
    } else if input.is_held(Action::MoveRight) && !input.is_held(Action::MoveLeft) {
        player.vel.x = tuning.move_speed;
        player.facing = 1.0;
    } else {
        player.vel.x *= tuning.friction.powf(dt);
        if player.vel.x.abs() < 0.01 {
            player.vel.x = 0.0;
        }
    }

    let jump_pressed = input.pressed_since(&state.prev_input, Action::Jump);
    if jump_pressed && player.jump_count < player.max_jumps {
        player.vel.y = -tuning.jump_power;
        player.jump_count += 1;
        player.grounded = false;
        state.events.push(GameEvent::Jumped);
    }
}

/// Move the player and every enemy for one tick
pub fn step(state: &mut GameState, input: &InputSnapshot, dt: f32) -> PhysicsOutcome {
    apply_player_controls(state, input, dt);

    let gravity = state.tuning.gravity;
    let terminal = state.tuning.terminal_velocity;
    let width = state.stage.width;
    let fall_limit = state.stage.fall_limit;

    // --- Player ---
    let player = &mut state.player;
    let was_grounded = player.grounded;
    apply_gravity(&mut player.vel, gravity, terminal, dt);
    let contacts = move_and_collide(
        &mut player.pos,
        &mut player.vel,
        player.size,
        &state.stage.platforms,
        width,
        dt,
    );
    player.grounded = contacts.grounded;
    if player.grounded {
        player.jump_count = 0;
        if !was_grounded {
            state.events.push(GameEvent::Landed);
        }
    }
    let player_fell = state.player.pos.y > fall_limit;

    // --- Enemies ---
    let platforms = &state.stage.platforms;
    for enemy in &mut state.stage.enemies {
        if let EnemyKind::Flying(_) = enemy.kind {
            // Flyers ignore platforms; AI drives both axes
            enemy.pos += enemy.vel * dt;
            if clamp_to_stage(&mut enemy.pos, enemy.size, width) {
                enemy.direction = -enemy.direction;
            }
            enemy.grounded = false;
            continue;
        }

        apply_gravity(&mut enemy.vel, gravity, terminal, dt);
        let contacts = move_and_collide(
            &mut enemy.pos,
            &mut enemy.vel,
            enemy.size,
            platforms,
            width,
            dt,
        );
        enemy.grounded = contacts.grounded;
        if contacts.boundary || contacts.wall {
            enemy.direction = -enemy.direction;
        }

        // Knocked into a pit: dies through the normal death path
        if enemy.pos.y > fall_limit && enemy.health > 0.0 {
            log::debug!("Enemy {} fell out of the stage", enemy.id);
            enemy.health = 0.0;
        }
    }

    PhysicsOutcome { player_fell }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{AiState, BossGate, Enemy, PlatformKind, SurfaceMetrics};
    use crate::tuning::Tuning;

    fn floor() -> Vec<Platform> {
        vec![Platform {
            kind: PlatformKind::Ground,
            rect: Aabb::new(0.0, 500.0, 1000.0, 100.0),
        }]
    }

    #[test]
    fn test_landing_zeroes_velocity_and_grounds() {
        let platforms = floor();
        let size = Vec2::new(50.0, 50.0);
        let mut pos = Vec2::new(100.0, 445.0);
        let mut vel = Vec2::new(0.0, 10.0);

        let contacts = move_and_collide(&mut pos, &mut vel, size, &platforms, 1000.0, 1.0);
        assert!(contacts.grounded);
        assert_eq!(vel.y, 0.0);
        assert_eq!(pos.y, 450.0);

        // Next tick: gravity pulls into the floor, resolution puts it back on top
        apply_gravity(&mut vel, 0.8, 18.0, 1.0);
        let contacts = move_and_collide(&mut pos, &mut vel, size, &platforms, 1000.0, 1.0);
        assert!(contacts.grounded);
        assert_eq!(vel.y, 0.0);
        assert!(!Aabb::from_pos_size(pos, size).overlaps(&platforms[0].rect));
    }

    #[test]
    fn test_bump_from_below_does_not_ground() {
        let platforms = vec![Platform {
            kind: PlatformKind::Platform,
            rect: Aabb::new(0.0, 200.0, 400.0, 20.0),
        }];
        let size = Vec2::new(50.0, 50.0);
        let mut pos = Vec2::new(100.0, 225.0);
        let mut vel = Vec2::new(0.0, -10.0);

        let contacts = move_and_collide(&mut pos, &mut vel, size, &platforms, 1000.0, 1.0);
        assert!(!contacts.grounded);
        assert!(contacts.ceiling);
        assert_eq!(vel.y, 0.0);
        assert_eq!(pos.y, 220.0);
    }

    #[test]
    fn test_side_approach_zeroes_horizontal_velocity() {
        let platforms = vec![Platform {
            kind: PlatformKind::Platform,
            rect: Aabb::new(200.0, 100.0, 100.0, 100.0),
        }];
        let size = Vec2::new(50.0, 50.0);
        let mut pos = Vec2::new(145.0, 120.0);
        let mut vel = Vec2::new(6.0, 0.0);

        let contacts = move_and_collide(&mut pos, &mut vel, size, &platforms, 1000.0, 1.0);
        assert!(contacts.wall);
        assert_eq!(vel.x, 0.0);
        assert_eq!(pos.x, 150.0);
    }

    #[test]
    fn test_stage_clamp() {
        let size = Vec2::new(50.0, 50.0);
        let mut pos = Vec2::new(-20.0, 0.0);
        assert!(clamp_to_stage(&mut pos, size, 1000.0));
        assert_eq!(pos.x, 0.0);
        pos.x = 990.0;
        assert!(clamp_to_stage(&mut pos, size, 1000.0));
        assert_eq!(pos.x, 950.0);
        pos.x = 400.0;
        assert!(!clamp_to_stage(&mut pos, size, 1000.0));
    }

    #[test]
    fn test_airborne_without_contact() {
        let platforms = floor();
        let size = Vec2::new(50.0, 50.0);
        let mut pos = Vec2::new(100.0, 100.0);
        let mut vel = Vec2::ZERO;
        apply_gravity(&mut vel, 0.8, 18.0, 1.0);
        let contacts = move_and_collide(&mut pos, &mut vel, size, &platforms, 1000.0, 1.0);
        assert!(!contacts.grounded);
        assert!((vel.y - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_terminal_velocity_cap() {
        let mut vel = Vec2::new(0.0, 17.9);
        apply_gravity(&mut vel, 0.8, 18.0, 1.0);
        assert_eq!(vel.y, 18.0);
    }

    #[test]
    fn test_walkers_turn_at_stage_edges() {
        let mut state = GameState::new(5, Tuning::default(), SurfaceMetrics::new(1280.0, 800.0));
        state.stage.enemies.clear();
        state.stage.boss_gate = BossGate::NotReserved;
        let y = state.stage.ground_level - 60.0;
        let walker = |id: u32, x: f32, direction: f32| Enemy {
            id,
            species: "treeling".into(),
            kind: EnemyKind::Walker,
            pos: Vec2::new(x, y),
            vel: Vec2::new(direction * 5.0, 0.0),
            size: Vec2::new(40.0, 60.0),
            health: 100.0,
            max_health: 100.0,
            attack: 20.0,
            direction,
            attack_cooldown: 0.0,
            ai: AiState::Patrol,
            grounded: true,
        };
        let width = state.stage.width;
        state.stage.enemies.push(walker(1, width - 42.0, 1.0));
        state.stage.enemies.push(walker(2, 2.0, -1.0));
        state.stage.enemies.push(walker(3, width * 0.5, 1.0));

        step(&mut state, &InputSnapshot::default(), 1.0);

        let enemies = &state.stage.enemies;
        assert_eq!(enemies[0].direction, -1.0);
        assert_eq!(enemies[0].pos.x, width - 40.0);
        assert_eq!(enemies[1].direction, 1.0);
        assert_eq!(enemies[1].pos.x, 0.0);
        assert_eq!(enemies[2].direction, 1.0);
        assert!(enemies.iter().all(|e| e.grounded));
    }
}
