//! Stage progression
//!
//! Pickup collection, the boss gate, the weighted completion meter, life loss
//! and the scheduled stage advance all live here.

use super::physics::PhysicsOutcome;
use super::stage::{boss_from_descriptor, generate_stage};
use super::state::{BossGate, GameEvent, GamePhase, GameState, PickupKind, Player};
use crate::consts::PROGRESS_COMPLETE;

/// Deferred one-shot transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledEvent {
    /// Move on from the given stage index
    AdvanceStage { from: u32 },
}

/// Queue of deferred transitions keyed on the simulation clock (frames)
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    pending: Vec<(f32, ScheduledEvent)>,
}

impl Schedule {
    pub fn schedule(&mut self, due_at: f32, event: ScheduledEvent) {
        self.pending.push((due_at, event));
    }

    pub fn cancel_all(&mut self) {
        if !self.pending.is_empty() {
            log::debug!("Cancelling {} scheduled event(s)", self.pending.len());
        }
        self.pending.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Remove and return every event due at or before `now`, in schedule order
    pub fn drain_due(&mut self, now: f32) -> Vec<ScheduledEvent> {
        let mut due = Vec::new();
        self.pending.retain(|&(at, event)| {
            if at <= now {
                due.push(event);
                false
            } else {
                true
            }
        });
        due
    }
}

impl GameState {
    /// Build stage `index` and put the player at its spawn point.
    ///
    /// Game over is terminal; use `restart` to begin a new run.
    pub fn start_stage(&mut self, index: u32) {
        if self.phase == GamePhase::GameOver {
            log::warn!("Refusing to start stage {} after game over", index);
            return;
        }
        let index = index.max(1);
        self.schedule.cancel_all();
        generate_stage(self, index);
        self.player.reset_at(self.stage.spawn_point);
        self.phase = GamePhase::Playing;
        log::info!("Starting stage {} (score {}, lives {})", index, self.score, self.lives);
        self.emit(GameEvent::StageStarted { index });
    }

    /// Begin a fresh run from stage 1 with full lives and no score
    pub fn restart(&mut self) {
        log::info!("Restarting run (previous score {})", self.score);
        self.schedule.cancel_all();
        self.score = 0;
        self.lives = self.tuning.starting_lives;
        self.player = Player::new(&self.tuning);
        self.phase = GamePhase::Playing;
        self.start_stage(1);
    }
}

/// Per-tick progression after physics, combat, AI and the boss gate
pub fn step(state: &mut GameState, outcome: PhysicsOutcome) {
    collect_pickups(state);

    if outcome.player_fell || state.player.is_dead() {
        lose_life(state);
        return;
    }

    update_progress(state);
    if !state.stage.completed
        && (state.stage.progress >= PROGRESS_COMPLETE || state.stage.boss_defeated)
    {
        complete_stage(state);
    }

    process_schedule(state);
}

/// Apply every pickup the player overlaps
pub fn collect_pickups(state: &mut GameState) {
    let player_box = state.player.bounds();
    let mut collected = Vec::new();
    state.stage.pickups.retain(|pickup| {
        if player_box.overlaps(&pickup.rect) {
            collected.push(pickup.kind);
            false
        } else {
            true
        }
    });

    for kind in collected {
        state.stage.pickups_collected += 1;
        match kind {
            PickupKind::Coin => {
                state.score += state.tuning.coin_value;
                state.emit(GameEvent::CoinCollected);
            }
            PickupKind::Heal => {
                let amount = state.tuning.heal_amount;
                state.player.heal(amount);
                state.emit(GameEvent::Healed { amount });
            }
            PickupKind::Weapon(weapon) => {
                state.player.weapon = weapon;
                state.player.weapon_timer = state.tuning.weapon_upgrade_frames;
                state.emit(GameEvent::WeaponUpgraded { weapon });
            }
        }
    }
}

/// Spawn the reserved boss once no regular enemy remains. Safe to call every tick.
pub fn update_boss_gate(state: &mut GameState) {
    if !matches!(state.stage.boss_gate, BossGate::Reserved(_))
        || state.stage.non_boss_remaining() > 0
    {
        return;
    }

    let gate = std::mem::replace(&mut state.stage.boss_gate, BossGate::NotReserved);
    let BossGate::Reserved(descriptor) = gate else {
        return;
    };

    if let Some(existing) = state.stage.boss() {
        log::warn!("Boss {} already active; keeping it", existing.id);
        let boss_id = existing.id;
        state.stage.boss_gate = BossGate::Spawned { boss_id };
        return;
    }

    let boss_id = state.ids.allocate();
    state.stage.enemies.push(boss_from_descriptor(boss_id, &descriptor));
    state.stage.boss_gate = BossGate::Spawned { boss_id };
    log::info!(
        "Boss {} ({}) spawned on stage {} with {} health",
        boss_id,
        descriptor.species,
        state.stage.index,
        descriptor.health
    );
    state.emit(GameEvent::BossSpawned { id: boss_id });
}

fn ratio(done: u32, total: u32) -> f32 {
    if total == 0 {
        1.0
    } else {
        (done as f32 / total as f32).clamp(0.0, 1.0)
    }
}

/// Recompute the weighted completion meter. It never moves backwards within a stage.
pub fn update_progress(state: &mut GameState) {
    let tuning = &state.tuning;
    let stage = &mut state.stage;

    let travel = (stage.width - stage.spawn_point.x - state.player.size.x).max(1.0);
    let distance = ((state.player.pos.x - stage.spawn_point.x) / travel).clamp(0.0, 1.0);
    let pickups = ratio(stage.pickups_collected, stage.initial_pickup_count);
    let enemies = ratio(stage.enemies_defeated, stage.initial_enemy_count);

    let total_weight = (tuning.progress_weight_distance
        + tuning.progress_weight_pickups
        + tuning.progress_weight_enemies)
        .max(f32::EPSILON);
    let weighted = tuning.progress_weight_distance * distance
        + tuning.progress_weight_pickups * pickups
        + tuning.progress_weight_enemies * enemies;
    let progress = (weighted / total_weight * PROGRESS_COMPLETE).clamp(0.0, PROGRESS_COMPLETE);
    stage.progress = stage.progress.max(progress);
}

fn complete_stage(state: &mut GameState) {
    let index = state.stage.index;
    state.stage.completed = true;
    state.stage.progress = PROGRESS_COMPLETE;
    state.phase = GamePhase::StageClear;

    let due = state.clock + state.tuning.stage_clear_delay.max(0.0);
    state
        .schedule
        .schedule(due, ScheduledEvent::AdvanceStage { from: index });

    log::info!(
        "Stage {} cleared (boss defeated: {}), advancing at frame {:.0}",
        index,
        state.stage.boss_defeated,
        due
    );
    state.emit(GameEvent::StageCleared { index });
}

/// Fire every due scheduled event, skipping any that no longer match the state
pub fn process_schedule(state: &mut GameState) {
    for event in state.schedule.drain_due(state.clock) {
        match event {
            ScheduledEvent::AdvanceStage { from } => {
                if state.stage.index != from || state.phase != GamePhase::StageClear {
                    log::debug!(
                        "Ignoring stale advance from stage {} (now stage {}, {:?})",
                        from,
                        state.stage.index,
                        state.phase
                    );
                    continue;
                }
                state.start_stage(from + 1);
            }
        }
    }
}

/// Spend a life: respawn into a regenerated stage, or end the game
pub fn lose_life(state: &mut GameState) {
    state.lives = state.lives.saturating_sub(1);
    state.emit(GameEvent::LifeLost {
        lives_left: state.lives,
    });

    if state.lives == 0 {
        state.schedule.cancel_all();
        state.phase = GamePhase::GameOver;
        log::info!(
            "Game over on stage {} with score {}",
            state.stage.index,
            state.score
        );
        state.emit(GameEvent::GameOver {
            score: state.score,
            stage: state.stage.index,
        });
        return;
    }

    log::info!("Life lost on stage {}, {} left", state.stage.index, state.lives);
    state.player.health = state.player.max_health;
    state.player.weapon = Default::default();
    state.player.weapon_timer = 0.0;
    let index = state.stage.index;
    state.start_stage(index);
}
