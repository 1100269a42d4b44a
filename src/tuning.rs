//! Game balance and difficulty settings
//!
//! Every gameplay constant lives here so balance can be tuned from a JSON file
//! without recompiling. Missing fields fall back to the defaults below.
//! Durations and speeds are expressed in display frames.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, StorageError};

/// Difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    /// Multiplier applied to damage the player receives
    pub fn damage_multiplier(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.75,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.5,
        }
    }
}

/// Base stat block for one enemy species (before stage scaling)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    pub health: f32,
    pub attack: f32,
    pub width: f32,
    pub height: f32,
}

/// Stats used for any species missing from the table
pub const DEFAULT_ENEMY_STATS: EnemyStats = EnemyStats {
    health: 100.0,
    attack: 20.0,
    width: 40.0,
    height: 60.0,
};

/// Species names used by the stage generator
pub mod species {
    pub const TREELING: &str = "treeling";
    pub const BIRD: &str = "bird";
    pub const BOMB: &str = "bomb";
    pub const TREE_KING: &str = "tree_king";
    pub const GOLDEN_KING: &str = "golden_king";
}

fn default_stat_table() -> BTreeMap<String, EnemyStats> {
    let mut table = BTreeMap::new();
    table.insert(species::TREELING.to_string(), DEFAULT_ENEMY_STATS);
    table.insert(
        species::BIRD.to_string(),
        EnemyStats {
            health: 60.0,
            attack: 15.0,
            width: 40.0,
            height: 30.0,
        },
    );
    table.insert(
        species::BOMB.to_string(),
        EnemyStats {
            health: 40.0,
            attack: 10.0,
            width: 36.0,
            height: 36.0,
        },
    );
    table.insert(
        species::TREE_KING.to_string(),
        EnemyStats {
            health: 1000.0,
            attack: 40.0,
            width: 120.0,
            height: 150.0,
        },
    );
    table.insert(
        species::GOLDEN_KING.to_string(),
        EnemyStats {
            health: 1500.0,
            attack: 50.0,
            width: 140.0,
            height: 170.0,
        },
    );
    table
}

/// Tunable balance parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub difficulty: Difficulty,

    // === Physics ===
    pub gravity: f32,
    pub jump_power: f32,
    pub move_speed: f32,
    /// Horizontal velocity retained per frame when no move key is held
    pub friction: f32,
    pub terminal_velocity: f32,
    pub max_jumps: u8,
    pub stage_width: f32,

    // === Player ===
    pub player_width: f32,
    pub player_height: f32,
    pub player_max_health: f32,
    pub starting_lives: u8,
    pub spawn_x: f32,

    // === Combat ===
    pub attack_cooldown: f32,
    /// Frames the player counts as mid-attack after swinging
    pub attack_active_frames: f32,
    pub invulnerability_frames: f32,
    pub enemy_contact_cooldown: f32,
    pub sword_radius: f32,
    pub sword_damage: f32,
    pub hammer_radius: f32,
    pub hammer_damage: f32,
    pub arrow_damage: f32,
    pub magic_damage: f32,
    pub projectile_speed: f32,
    pub projectile_lifespan: f32,
    /// Extra horizontal reach for projectiles moving upward
    pub upward_hitbox_pad: f32,
    pub weapon_upgrade_frames: f32,

    // === AI ===
    pub near_threshold: f32,
    pub mid_threshold: f32,
    pub chase_speed: f32,
    pub alert_speed: f32,
    pub patrol_speed: f32,
    pub patrol_flip_chance: f64,
    pub chase_jump_chance: f64,
    /// How far above an enemy the player must be before it tries to jump
    pub chase_jump_height_gap: f32,
    pub enemy_jump_power: f32,

    // === Flying ===
    pub fly_amplitude: f32,
    pub fly_frequency: f32,
    pub dive_range: f32,
    pub dive_cooldown: f32,
    pub dive_speed: f32,

    // === Timed fuse ===
    pub fuse_detection_radius: f32,
    pub fuse_frames: f32,
    pub explosion_radius: f32,
    pub explosion_damage: f32,

    // === Boss ===
    pub boss_aggro_range: f32,
    pub boss_attack_frames: f32,
    pub boss_recover_frames: f32,
    pub boss_special_interval: f32,
    pub boss_regen_per_frame: f32,
    pub boss_speed: f32,
    pub boss_projectile_speed: f32,
    /// Fraction of boss attack carried by its special projectile
    pub boss_projectile_damage_ratio: f32,

    // === Stage generation ===
    pub base_enemy_count: u32,
    pub max_enemy_count: u32,
    pub enemy_health_exponent: f32,
    pub enemy_attack_exponent: f32,
    pub enemy_count_exponent: f32,
    pub boss_health_exponent: f32,
    pub boss_attack_exponent: f32,
    pub min_spawn_distance: f32,
    pub flying_chance_per_stage: f64,
    pub bomb_chance_per_stage: f64,
    pub coin_count: u32,
    pub weapon_pickup_count: u32,

    // === Scoring & progress ===
    pub kill_reward: u64,
    pub boss_reward: u64,
    pub coin_value: u64,
    pub heal_amount: f32,
    pub progress_weight_distance: f32,
    pub progress_weight_pickups: f32,
    pub progress_weight_enemies: f32,
    /// Frames between a stage clear and the next stage starting
    pub stage_clear_delay: f32,

    /// Per-species base stats
    pub stats: BTreeMap<String, EnemyStats>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,

            gravity: 0.8,
            jump_power: 18.0,
            move_speed: 6.0,
            friction: 0.8,
            terminal_velocity: 18.0,
            max_jumps: 2,
            stage_width: 8000.0,

            player_width: 50.0,
            player_height: 50.0,
            player_max_health: 300.0,
            starting_lives: 5,
            spawn_x: 100.0,

            attack_cooldown: 30.0,
            attack_active_frames: 10.0,
            invulnerability_frames: 60.0,
            enemy_contact_cooldown: 60.0,
            sword_radius: 80.0,
            sword_damage: 50.0,
            hammer_radius: 130.0,
            hammer_damage: 90.0,
            arrow_damage: 50.0,
            magic_damage: 70.0,
            projectile_speed: 12.0,
            projectile_lifespan: 90.0,
            upward_hitbox_pad: 12.0,
            weapon_upgrade_frames: 600.0,

            near_threshold: 200.0,
            mid_threshold: 450.0,
            chase_speed: 3.0,
            alert_speed: 1.0,
            patrol_speed: 1.2,
            patrol_flip_chance: 0.005,
            chase_jump_chance: 0.02,
            chase_jump_height_gap: 80.0,
            enemy_jump_power: 14.0,

            fly_amplitude: 30.0,
            fly_frequency: 0.05,
            dive_range: 220.0,
            dive_cooldown: 180.0,
            dive_speed: 7.0,

            fuse_detection_radius: 160.0,
            fuse_frames: 120.0,
            explosion_radius: 130.0,
            explosion_damage: 80.0,

            boss_aggro_range: 600.0,
            boss_attack_frames: 300.0,
            boss_recover_frames: 180.0,
            boss_special_interval: 90.0,
            boss_regen_per_frame: 0.5,
            boss_speed: 2.5,
            boss_projectile_speed: 7.0,
            boss_projectile_damage_ratio: 0.5,

            base_enemy_count: 12,
            max_enemy_count: 40,
            enemy_health_exponent: 0.35,
            enemy_attack_exponent: 0.25,
            enemy_count_exponent: 0.3,
            boss_health_exponent: 0.6,
            boss_attack_exponent: 0.45,
            min_spawn_distance: 400.0,
            flying_chance_per_stage: 0.06,
            bomb_chance_per_stage: 0.05,
            coin_count: 30,
            weapon_pickup_count: 3,

            kill_reward: 200,
            boss_reward: 5000,
            coin_value: 100,
            heal_amount: 80.0,
            progress_weight_distance: 0.4,
            progress_weight_pickups: 0.2,
            progress_weight_enemies: 0.4,
            stage_clear_delay: 180.0,

            stats: default_stat_table(),
        }
    }
}

impl Tuning {
    /// Default tuning with a different difficulty preset
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// Parse tuning from JSON (missing fields keep their defaults)
    pub fn from_json_str(json: &str) -> Result<Self, StorageError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load tuning from a JSON file
    pub fn load(path: &Path) -> Result<Self, StorageError> {
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json_str(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Load tuning, falling back to defaults on any error
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(tuning) => tuning,
            Err(err) => {
                log::warn!("Using default tuning ({})", err);
                Self::default()
            }
        }
    }

    /// Look up the base stats for a species, falling back to the default block
    pub fn stats_for(&self, species: &str) -> EnemyStats {
        match self.stats.get(species) {
            Some(stats) => *stats,
            None => {
                let err = SimError::UnknownStatTable {
                    species: species.to_string(),
                };
                log::warn!("{}; using default stats", err);
                DEFAULT_ENEMY_STATS
            }
        }
    }
}
