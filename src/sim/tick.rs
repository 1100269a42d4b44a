//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically. Each call runs
//! physics, combat, AI and progression in that order against one input snapshot.

use serde::{Deserialize, Serialize};

use super::state::{GamePhase, GameState};
use super::{ai, combat, physics, progression};
use crate::consts::MAX_DT_FRAMES;

/// Abstract player actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    MoveLeft,
    MoveRight,
    Jump,
    Attack,
    Pause,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::MoveLeft,
        Action::MoveRight,
        Action::Jump,
        Action::Attack,
        Action::Pause,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Action::MoveLeft => "moveLeft",
            Action::MoveRight => "moveRight",
            Action::Jump => "jump",
            Action::Attack => "attack",
            Action::Pause => "pause",
        }
    }

    pub fn from_name(name: &str) -> Option<Action> {
        Action::ALL.into_iter().find(|a| a.name() == name)
    }
}

/// Which actions are held for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
    pub attack: bool,
    /// Pause toggle (edge-triggered)
    pub pause: bool,
}

impl InputSnapshot {
    pub fn is_held(&self, action: Action) -> bool {
        match action {
            Action::MoveLeft => self.move_left,
            Action::MoveRight => self.move_right,
            Action::Jump => self.jump,
            Action::Attack => self.attack,
            Action::Pause => self.pause,
        }
    }

    pub fn set(&mut self, action: Action, held: bool) {
        let slot = match action {
            Action::MoveLeft => &mut self.move_left,
            Action::MoveRight => &mut self.move_right,
            Action::Jump => &mut self.jump,
            Action::Attack => &mut self.attack,
            Action::Pause => &mut self.pause,
        };
        *slot = held;
    }

    /// Builder form of `set(action, true)`
    pub fn with(mut self, action: Action) -> Self {
        self.set(action, true);
        self
    }

    /// Held now but not on the previous tick
    pub fn pressed_since(&self, prev: &InputSnapshot, action: Action) -> bool {
        self.is_held(action) && !prev.is_held(action)
    }
}

/// Advance the game state by one timestep of `dt_frames` display frames
pub fn tick(state: &mut GameState, input: &InputSnapshot, dt_frames: f32) {
    if !dt_frames.is_finite() || dt_frames <= 0.0 {
        log::warn!("Ignoring tick with invalid dt_frames {}", dt_frames);
        return;
    }
    let dt = dt_frames.min(MAX_DT_FRAMES);

    // Handle pause toggle
    if input.pressed_since(&state.prev_input, Action::Pause) {
        match state.phase {
            GamePhase::Playing => state.request_pause(),
            GamePhase::Paused => state.request_resume(),
            _ => {}
        }
    }

    // Don't tick if paused or game over
    if matches!(state.phase, GamePhase::Paused | GamePhase::GameOver) {
        state.prev_input = *input;
        return;
    }

    state.time_ticks += 1;
    state.clock += dt;

    match state.phase {
        GamePhase::StageClear => {
            // Gameplay is frozen until the scheduled advance fires
            progression::process_schedule(state);
        }
        _ => {
            let outcome = physics::step(state, input, dt);
            combat::step(state, input, dt);
            ai::step(state, dt);
            progression::update_boss_gate(state);
            progression::step(state, outcome);
        }
    }

    state.prev_input = *input;
}
