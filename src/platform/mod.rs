//! Platform abstraction layer
//!
//! Turns host input into per-tick `InputSnapshot`s:
//! - `KeyMap`: physical key names to abstract actions
//! - `InputProvider`: anything that can produce the next snapshot
//! - `Autopilot` / `ScriptedInput`: headless providers

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use crate::sim::state::SurfaceMetrics;
use crate::sim::snapshot::Snapshot;
use crate::sim::tick::{Action, InputSnapshot};

/// Key name to action bindings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyMap {
    pub bindings: BTreeMap<String, Action>,
}

impl Default for KeyMap {
    fn default() -> Self {
        let bindings = [
            ("ArrowLeft", Action::MoveLeft),
            ("KeyA", Action::MoveLeft),
            ("ArrowRight", Action::MoveRight),
            ("KeyD", Action::MoveRight),
            ("ArrowUp", Action::Jump),
            ("Space", Action::Jump),
            ("KeyW", Action::Jump),
            ("KeyZ", Action::Attack),
            ("KeyJ", Action::Attack),
            ("Escape", Action::Pause),
            ("KeyP", Action::Pause),
        ]
        .into_iter()
        .map(|(key, action)| (key.to_string(), action))
        .collect();
        Self { bindings }
    }
}

impl KeyMap {
    pub fn action_for(&self, key: &str) -> Option<Action> {
        self.bindings.get(key).copied()
    }

    /// Snapshot for the set of keys currently held. Unbound keys are ignored.
    pub fn snapshot<'a>(&self, held: impl IntoIterator<Item = &'a str>) -> InputSnapshot {
        let mut input = InputSnapshot::default();
        for action in held.into_iter().filter_map(|key| self.action_for(key)) {
            input.set(action, true);
        }
        input
    }
}

/// Source of per-tick input
pub trait InputProvider {
    /// Input for the next tick, given what the renderer last saw
    fn next_input(&mut self, view: &Snapshot) -> InputSnapshot;
}

/// Replays a fixed list of snapshots, then idles
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: Vec<InputSnapshot>,
    cursor: usize,
}

impl ScriptedInput {
    pub fn new(frames: Vec<InputSnapshot>) -> Self {
        Self { frames, cursor: 0 }
    }
}

impl InputProvider for ScriptedInput {
    fn next_input(&mut self, _view: &Snapshot) -> InputSnapshot {
        let input = self.frames.get(self.cursor).copied().unwrap_or_default();
        self.cursor += 1;
        input
    }
}

/// Simple bot: runs right, hops over threats and swings at anything close
#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    frame: u64,
}

impl Autopilot {
    /// How close an enemy must be before the bot reacts
    const REACH: f32 = 120.0;
    /// Frames between jump presses (press edges need a release in between)
    const JUMP_PERIOD: u64 = 50;
}

impl InputProvider for Autopilot {
    fn next_input(&mut self, view: &Snapshot) -> InputSnapshot {
        self.frame += 1;
        let player_center = view.player.pos + view.player.size * 0.5;

        let nearest = view
            .enemies
            .iter()
            .map(|e| {
                let center = e.pos + e.size * 0.5;
                (center.x - player_center.x, e.is_boss)
            })
            .filter(|(dx, _)| dx.abs() < Self::REACH * 3.0)
            .min_by(|a, b| a.0.abs().total_cmp(&b.0.abs()));

        let mut input = InputSnapshot::default();
        match nearest {
            Some((dx, _)) if dx.abs() < Self::REACH => {
                // Face the enemy and swing
                input.set(if dx < 0.0 { Action::MoveLeft } else { Action::MoveRight }, true);
                input.set(Action::Attack, true);
            }
            Some((_, is_boss)) => {
                input.set(Action::MoveRight, true);
                input.set(Action::Jump, !is_boss && self.frame % Self::JUMP_PERIOD < 2);
            }
            None => {
                input.set(Action::MoveRight, true);
                input.set(Action::Jump, self.frame % (Self::JUMP_PERIOD * 3) < 2);
            }
        }
        input
    }
}
