//! Rendering seam
//!
//! Drawing lives outside the simulation core. A renderer reports its surface
//! size (used for the ground level) and receives a read-only `Snapshot` after
//! every tick.

use crate::sim::snapshot::Snapshot;
use crate::sim::state::{GamePhase, SurfaceMetrics};

pub trait Renderer {
    /// Current drawable size; either dimension may be unknown
    fn surface_metrics(&self) -> SurfaceMetrics;

    fn render(&mut self, snapshot: &Snapshot);
}

/// Headless renderer that logs a one-line summary every `interval` ticks
#[derive(Debug, Clone)]
pub struct LogRenderer {
    surface: SurfaceMetrics,
    interval: u64,
    last_phase: Option<GamePhase>,
    pub frames: u64,
}

impl LogRenderer {
    pub fn new(surface: SurfaceMetrics, interval: u64) -> Self {
        Self {
            surface,
            interval: interval.max(1),
            last_phase: None,
            frames: 0,
        }
    }
}

impl Renderer for LogRenderer {
    fn surface_metrics(&self) -> SurfaceMetrics {
        self.surface
    }

    fn render(&mut self, snapshot: &Snapshot) {
        self.frames += 1;

        if self.last_phase != Some(snapshot.phase) {
            log::info!("Phase {:?} on stage {}", snapshot.phase, snapshot.stage_index);
            self.last_phase = Some(snapshot.phase);
        }

        if self.frames % self.interval == 0 {
            log::info!(
                "[t={}] stage {} {:.0}% | score {} | lives {} | hp {:.0}/{:.0} | x {:.0} (cam {:.0}) | enemies {}{}",
                snapshot.time_ticks,
                snapshot.stage_index,
                snapshot.progress,
                snapshot.score,
                snapshot.lives,
                snapshot.player.health,
                snapshot.player.max_health,
                snapshot.player.pos.x,
                snapshot.camera_x,
                snapshot.enemies.len(),
                if snapshot.boss_active { " (boss)" } else { "" }
            );
        }
    }
}
