//! Game state and core simulation types
//!
//! Everything the tick mutates lives in one owned `GameState` aggregate.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::progression::Schedule;
use super::tick::InputSnapshot;
use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Game is paused (nothing advances)
    Paused,
    /// Stage completed, waiting for the scheduled advance
    StageClear,
    /// Lives exhausted
    GameOver,
}

/// Player weapon modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WeaponMode {
    #[default]
    Sword,
    Hammer,
    Arrow,
    /// Fires straight up
    Magic,
}

impl WeaponMode {
    pub fn is_melee(&self) -> bool {
        matches!(self, WeaponMode::Sword | WeaponMode::Hammer)
    }
}

/// The player character. Persists across stage rebuilds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    /// +1 facing right, -1 facing left
    pub facing: f32,
    pub health: f32,
    pub max_health: f32,
    pub grounded: bool,
    pub jump_count: u8,
    pub max_jumps: u8,
    pub attack_cooldown: f32,
    /// Frames remaining in the current swing
    pub attack_timer: f32,
    pub invulnerable_timer: f32,
    pub weapon: WeaponMode,
    /// Frames until a weapon upgrade expires back to the sword
    pub weapon_timer: f32,
    /// Live projectiles fired by the player
    pub projectiles: Vec<Projectile>,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            size: Vec2::new(tuning.player_width, tuning.player_height),
            facing: 1.0,
            health: tuning.player_max_health,
            max_health: tuning.player_max_health,
            grounded: false,
            jump_count: 0,
            max_jumps: tuning.max_jumps,
            attack_cooldown: 0.0,
            attack_timer: 0.0,
            invulnerable_timer: 0.0,
            weapon: WeaponMode::Sword,
            weapon_timer: 0.0,
            projectiles: Vec::new(),
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_timer > 0.0
    }

    pub fn is_attacking(&self) -> bool {
        self.attack_timer > 0.0
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Apply damage unless invulnerable. Returns true when health changed.
    pub fn take_damage(&mut self, amount: f32, invulnerability_frames: f32) -> bool {
        if self.is_invulnerable() || !amount.is_finite() || amount <= 0.0 {
            return false;
        }
        self.health = (self.health - amount).clamp(0.0, self.max_health);
        self.invulnerable_timer = invulnerability_frames;
        true
    }

    /// Restore health, never past `max_health`
    pub fn heal(&mut self, amount: f32) {
        if amount.is_finite() && amount > 0.0 {
            self.health = (self.health + amount).clamp(0.0, self.max_health);
        }
    }

    /// Put the player back at a spawn point with motion and combat state cleared
    pub fn reset_at(&mut self, spawn: Vec2) {
        self.pos = spawn;
        self.vel = Vec2::ZERO;
        self.facing = 1.0;
        self.grounded = false;
        self.jump_count = 0;
        self.attack_cooldown = 0.0;
        self.attack_timer = 0.0;
        self.invulnerable_timer = 0.0;
        self.projectiles.clear();
    }
}

/// Distance-driven behavior state shared by all non-boss enemies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AiState {
    #[default]
    Patrol,
    Alert,
    Chase,
}

/// Scripted dive of a flying enemy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DivePhase {
    /// Oscillating around the base height
    Cruising,
    Descending { target_y: f32 },
    Ascending,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlyingState {
    pub base_height: f32,
    /// Oscillation phase (radians)
    pub wave: f32,
    pub dive: DivePhase,
    pub dive_cooldown: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuseState {
    /// Simulation clock (frames) when the player was first detected
    pub fuse_started_at: Option<f32>,
    pub explosion_radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossPhase {
    Idle,
    Attack,
    Recover,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BossState {
    pub phase: BossPhase,
    pub phase_timer: f32,
    /// Frames until the next special attack
    pub attack_cooldown: f32,
}

/// Enemy capability block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EnemyKind {
    Walker,
    Flying(FlyingState),
    RollingBomb(FuseState),
    Boss(BossState),
}

/// An enemy entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    /// Stat table key
    pub species: String,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub health: f32,
    pub max_health: f32,
    /// Contact damage (already stage-scaled)
    pub attack: f32,
    /// Movement direction (+1 / -1)
    pub direction: f32,
    /// Frames until contact damage may fire again
    pub attack_cooldown: f32,
    pub ai: AiState,
    pub grounded: bool,
}

impl Enemy {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    pub fn is_boss(&self) -> bool {
        matches!(self.kind, EnemyKind::Boss(_))
    }

    pub fn is_flying(&self) -> bool {
        matches!(self.kind, EnemyKind::Flying(_))
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }
}

/// Who fired a projectile (it never hits its own side)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileOwner {
    Player,
    Enemy(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileKind {
    Arrow,
    MagicBolt,
    BossOrb,
}

/// A projectile entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub kind: ProjectileKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub damage: f32,
    /// Frames left before the projectile expires
    pub lifespan: f32,
    pub owner: ProjectileOwner,
}

impl Projectile {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }

    /// Collision box, widened horizontally for upward shots
    pub fn hit_box(&self, upward_pad: f32) -> Aabb {
        if self.vel.y < 0.0 {
            self.bounds().expanded(upward_pad, 0.0)
        } else {
            self.bounds()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformKind {
    Ground,
    Platform,
}

/// Static collision geometry
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Platform {
    pub kind: PlatformKind,
    pub rect: Aabb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    Coin,
    Heal,
    Weapon(WeaponMode),
}

/// A collectible item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub id: u32,
    pub kind: PickupKind,
    pub rect: Aabb,
}

/// A boss waiting behind the gate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossDescriptor {
    pub species: String,
    pub pos: Vec2,
    pub size: Vec2,
    pub health: f32,
    pub attack: f32,
}

/// Boss lifecycle for the current stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BossGate {
    NotReserved,
    Reserved(BossDescriptor),
    Spawned { boss_id: u32 },
}

/// The current stage and everything it owns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage {
    /// 1-based stage index
    pub index: u32,
    pub width: f32,
    pub ground_level: f32,
    /// Falling below this y costs a life
    pub fall_limit: f32,
    pub spawn_point: Vec2,
    pub platforms: Vec<Platform>,
    pub enemies: Vec<Enemy>,
    pub pickups: Vec<Pickup>,
    /// Projectiles fired by enemies
    pub hostile_projectiles: Vec<Projectile>,
    /// Completion meter in [0, 100]
    pub progress: f32,
    pub completed: bool,
    pub boss_gate: BossGate,
    pub boss_defeated: bool,
    pub initial_enemy_count: u32,
    pub initial_pickup_count: u32,
    pub enemies_defeated: u32,
    pub pickups_collected: u32,
}

impl Stage {
    /// A stage with nothing in it
    pub fn empty(index: u32, width: f32, ground_level: f32) -> Self {
        Self {
            index,
            width,
            ground_level,
            fall_limit: ground_level + GROUND_THICKNESS + FALL_MARGIN,
            spawn_point: Vec2::ZERO,
            platforms: Vec::new(),
            enemies: Vec::new(),
            pickups: Vec::new(),
            hostile_projectiles: Vec::new(),
            progress: 0.0,
            completed: false,
            boss_gate: BossGate::NotReserved,
            boss_defeated: false,
            initial_enemy_count: 0,
            initial_pickup_count: 0,
            enemies_defeated: 0,
            pickups_collected: 0,
        }
    }

    /// Number of living non-boss enemies
    pub fn non_boss_remaining(&self) -> usize {
        self.enemies.iter().filter(|e| !e.is_boss()).count()
    }

    pub fn boss(&self) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.is_boss())
    }
}

/// Simulation events for collaborators (audio, UI, persistence)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    StageStarted { index: u32 },
    Jumped,
    Landed,
    Attacked { weapon: WeaponMode },
    EnemyHit { id: u32 },
    EnemyKilled { id: u32, reward: u64 },
    PlayerHit { damage: f32 },
    CoinCollected,
    Healed { amount: f32 },
    WeaponUpgraded { weapon: WeaponMode },
    WeaponExpired,
    FuseLit { id: u32 },
    Exploded { id: u32 },
    BossSpawned { id: u32 },
    BossPhaseChanged { id: u32, phase: BossPhase },
    BossSpecialAttack { id: u32 },
    BossDefeated { id: u32, reward: u64 },
    StageCleared { index: u32 },
    LifeLost { lives_left: u8 },
    GameOver { score: u64, stage: u32 },
    Paused,
    Resumed,
}

/// Surface size reported by the renderer (either value may be missing)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceMetrics {
    pub width: Option<f32>,
    pub height: Option<f32>,
}

impl SurfaceMetrics {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
        }
    }

    /// Reported width if usable, otherwise `DEFAULT_VIEW_WIDTH`
    pub fn view_width(&self) -> f32 {
        match self.width {
            Some(width) if width.is_finite() && width > 0.0 => width,
            _ => DEFAULT_VIEW_WIDTH,
        }
    }
}

/// Monotonic entity id allocator
#[derive(Debug, Clone)]
pub struct EntityIds {
    next: u32,
}

impl Default for EntityIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl EntityIds {
    pub fn allocate(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub surface: SurfaceMetrics,
    pub stage: Stage,
    pub player: Player,
    pub score: u64,
    pub lives: u8,
    pub phase: GamePhase,
    /// Simulation tick counter (advances only while unpaused)
    pub time_ticks: u64,
    /// Simulated frames elapsed (sum of dt)
    pub clock: f32,
    /// Deferred transitions
    pub schedule: Schedule,
    /// Events emitted since the last drain
    pub events: Vec<GameEvent>,
    /// Input held on the previous tick (for press edges)
    pub prev_input: InputSnapshot,
    pub ids: EntityIds,
}

impl GameState {
    /// Create a new game and start stage 1
    pub fn new(seed: u64, tuning: Tuning, surface: SurfaceMetrics) -> Self {
        let player = Player::new(&tuning);
        let lives = tuning.starting_lives;
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            stage: Stage::empty(0, tuning.stage_width, DEFAULT_GROUND_LEVEL),
            tuning,
            surface,
            player,
            score: 0,
            lives,
            phase: GamePhase::Playing,
            time_ticks: 0,
            clock: 0.0,
            schedule: Schedule::default(),
            events: Vec::new(),
            prev_input: InputSnapshot::default(),
            ids: EntityIds::default(),
        };

        state.start_stage(1);

        state
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events emitted since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Damage the player from outside the simulation. Returns true if applied.
    ///
    /// Life loss is resolved by the progression step of the next tick.
    pub fn apply_damage_to_player(&mut self, amount: f32) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }
        let applied = self
            .player
            .take_damage(amount, self.tuning.invulnerability_frames);
        if applied {
            self.emit(GameEvent::PlayerHit { damage: amount });
        }
        applied
    }

    /// Suspend physics, AI, combat and progression
    pub fn request_pause(&mut self) {
        if self.phase == GamePhase::Playing {
            self.phase = GamePhase::Paused;
            self.emit(GameEvent::Paused);
        }
    }

    pub fn request_resume(&mut self) {
        if self.phase == GamePhase::Paused {
            self.phase = GamePhase::Playing;
            self.emit(GameEvent::Resumed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_damage_respects_invulnerability() {
        let tuning = Tuning::default();
        let mut player = Player::new(&tuning);
        assert!(player.take_damage(50.0, 60.0));
        assert_eq!(player.health, 250.0);
        assert!(!player.take_damage(50.0, 60.0));
        assert_eq!(player.health, 250.0);
    }

    #[test]
    fn test_player_health_clamped() {
        let tuning = Tuning::default();
        let mut player = Player::new(&tuning);
        player.take_damage(10_000.0, 60.0);
        assert_eq!(player.health, 0.0);
        player.heal(10_000.0);
        assert_eq!(player.health, player.max_health);
        player.heal(f32::NAN);
        assert_eq!(player.health, player.max_health);
    }

    #[test]
    fn test_projectile_upward_hit_box_is_wider() {
        let mut projectile = Projectile {
            id: 1,
            kind: ProjectileKind::MagicBolt,
            pos: Vec2::new(100.0, 100.0),
            vel: Vec2::new(0.0, -12.0),
            size: Vec2::new(8.0, 20.0),
            damage: 10.0,
            lifespan: 10.0,
            owner: ProjectileOwner::Player,
        };
        assert_eq!(projectile.hit_box(12.0).size.x, 32.0);
        projectile.vel = Vec2::new(12.0, 0.0);
        assert_eq!(projectile.hit_box(12.0).size.x, 8.0);
    }

    #[test]
    fn test_new_game_starts_stage_one() {
        let state = GameState::new(7, Tuning::default(), SurfaceMetrics::new(1280.0, 800.0));
        assert_eq!(state.stage.index, 1);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.lives, 5);
        assert!(!state.stage.enemies.is_empty());
        assert!(matches!(state.stage.boss_gate, BossGate::Reserved(_)));
    }

    #[test]
    fn test_pause_and_resume() {
        let mut state = GameState::new(7, Tuning::default(), SurfaceMetrics::default());
        state.request_pause();
        assert_eq!(state.phase, GamePhase::Paused);
        assert!(!state.apply_damage_to_player(10.0));
        state.request_resume();
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.apply_damage_to_player(10.0));
    }
}
