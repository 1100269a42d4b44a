//! Grove Runner - side-scrolling action platformer core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, combat, AI, stage generation, progression)
//! - `renderer`: Snapshot consumer seam (drawing lives outside the core)
//! - `platform`: Input action map and surface metrics
//! - `audio`: Fire-and-forget sound cue sink
//! - `persistence`: Leaderboard storage
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod error;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod sim;
pub mod tuning;

pub use error::{SimError, StorageError};
pub use highscores::HighScores;
pub use tuning::{Difficulty, Tuning};

/// Game configuration constants
pub mod consts {
    /// Nominal display refresh the frame-based tuning values assume
    pub const FRAMES_PER_SECOND: f32 = 60.0;
    /// One display frame, the unit of `dt_frames`
    pub const FRAME_DT: f32 = 1.0;
    /// Largest step a single tick may integrate (keeps velocities bounded)
    pub const MAX_DT_FRAMES: f32 = 2.0;

    /// Ground level used when the renderer cannot report its surface height
    pub const DEFAULT_GROUND_LEVEL: f32 = 700.0;
    /// View width used when the renderer cannot report its surface width
    pub const DEFAULT_VIEW_WIDTH: f32 = 1280.0;
    /// Distance from the bottom of the surface to the top of the ground strip
    pub const GROUND_INSET: f32 = 100.0;
    /// Thickness of the ground strip
    pub const GROUND_THICKNESS: f32 = 100.0;
    /// Thickness of elevated platforms
    pub const PLATFORM_THICKNESS: f32 = 20.0;
    /// How far below the ground the player may fall before losing a life
    pub const FALL_MARGIN: f32 = 200.0;

    /// Completion threshold of the stage progress meter
    pub const PROGRESS_COMPLETE: f32 = 100.0;
}

/// Move `current` toward `target` by at most `max_delta`
#[inline]
pub fn approach(current: f32, target: f32, max_delta: f32) -> f32 {
    if current < target {
        (current + max_delta).min(target)
    } else {
        (current - max_delta).max(target)
    }
}

/// Unit facing (+1 / -1) pointing from `from` toward `to`
#[inline]
pub fn facing_toward(from: f32, to: f32) -> f32 {
    if to >= from { 1.0 } else { -1.0 }
}
