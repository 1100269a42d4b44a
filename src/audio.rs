//! Audio triggers
//!
//! The simulation never plays sound itself. Hosts drain `GameEvent`s and hand
//! them to an `AudioManager`, which maps them to named cues and forwards them
//! to whatever `AudioSink` the platform provides.

use crate::sim::state::{BossPhase, GameEvent, WeaponMode};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    Jump,
    Landing,
    Coin,
    /// Weapon upgrade or heal collected
    PowerUp,
    Sword,
    Hammer,
    Arrow,
    Magic,
    EnemyHit,
    PlayerHit,
    /// Bomb explosion
    Explosion,
    BossIntro,
    BossDefeat,
    StageClear,
    GameOver,
}

impl SoundEffect {
    /// Cue name as used by asset packs
    pub fn name(&self) -> &'static str {
        match self {
            SoundEffect::Jump => "jump",
            SoundEffect::Landing => "landing",
            SoundEffect::Coin => "coin",
            SoundEffect::PowerUp => "power_up",
            SoundEffect::Sword => "sword",
            SoundEffect::Hammer => "hammer",
            SoundEffect::Arrow => "arrow",
            SoundEffect::Magic => "magic",
            SoundEffect::EnemyHit => "enemy_hit",
            SoundEffect::PlayerHit => "player_hit",
            SoundEffect::Explosion => "explosion",
            SoundEffect::BossIntro => "boss_intro",
            SoundEffect::BossDefeat => "boss_defeat",
            SoundEffect::StageClear => "stage_clear",
            SoundEffect::GameOver => "game_over",
        }
    }

    /// Conventional asset path for the cue
    pub fn asset_path(&self) -> String {
        format!("sfx/{}.wav", self.name())
    }

    /// Relative loudness of the cue
    fn base_gain(&self) -> f32 {
        match self {
            SoundEffect::Landing => 0.4,
            SoundEffect::Coin | SoundEffect::Jump => 0.6,
            SoundEffect::Explosion | SoundEffect::BossIntro | SoundEffect::BossDefeat => 1.0,
            _ => 0.8,
        }
    }
}

fn weapon_sound(weapon: WeaponMode) -> SoundEffect {
    match weapon {
        WeaponMode::Sword => SoundEffect::Sword,
        WeaponMode::Hammer => SoundEffect::Hammer,
        WeaponMode::Arrow => SoundEffect::Arrow,
        WeaponMode::Magic => SoundEffect::Magic,
    }
}

/// The cue a simulation event should trigger, if any
pub fn sound_for(event: &GameEvent) -> Option<SoundEffect> {
    let effect = match event {
        GameEvent::Jumped => SoundEffect::Jump,
        GameEvent::Landed => SoundEffect::Landing,
        GameEvent::Attacked { weapon } => weapon_sound(*weapon),
        GameEvent::EnemyHit { .. } => SoundEffect::EnemyHit,
        GameEvent::PlayerHit { .. } => SoundEffect::PlayerHit,
        GameEvent::CoinCollected => SoundEffect::Coin,
        GameEvent::Healed { .. } | GameEvent::WeaponUpgraded { .. } => SoundEffect::PowerUp,
        GameEvent::Exploded { .. } => SoundEffect::Explosion,
        GameEvent::BossSpawned { .. } => SoundEffect::BossIntro,
        GameEvent::BossPhaseChanged {
            phase: BossPhase::Attack,
            ..
        } => SoundEffect::BossIntro,
        GameEvent::BossDefeated { .. } => SoundEffect::BossDefeat,
        GameEvent::StageCleared { .. } => SoundEffect::StageClear,
        GameEvent::GameOver { .. } => SoundEffect::GameOver,
        _ => return None,
    };
    Some(effect)
}

/// Platform-side playback
pub trait AudioSink {
    /// Fire-and-forget playback at `volume` in [0, 1]
    fn play(&mut self, effect: SoundEffect, volume: f32);
}

/// Sink that only logs cues (headless runs)
#[derive(Debug, Default)]
pub struct LogAudioSink {
    pub played: usize,
}

impl AudioSink for LogAudioSink {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        self.played += 1;
        log::debug!("♪ {} ({}) at {:.2}", effect.name(), effect.asset_path(), volume);
    }
}

/// Audio manager for the game
pub struct AudioManager<S: AudioSink> {
    sink: S,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl<S: AudioSink> AudioManager<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume() * effect.base_gain();
        if vol <= 0.0 {
            return;
        }
        self.sink.play(effect, vol);
    }

    /// Play the cue for every event that has one
    pub fn handle_events(&mut self, events: &[GameEvent]) {
        for effect in events.iter().filter_map(sound_for) {
            self.play(effect);
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<(SoundEffect, f32)>);

    impl AudioSink for Recorder {
        fn play(&mut self, effect: SoundEffect, volume: f32) {
            self.0.push((effect, volume));
        }
    }

    #[test]
    fn test_event_mapping() {
        assert_eq!(sound_for(&GameEvent::Jumped), Some(SoundEffect::Jump));
        assert_eq!(
            sound_for(&GameEvent::Attacked {
                weapon: WeaponMode::Magic
            }),
            Some(SoundEffect::Magic)
        );
        assert_eq!(sound_for(&GameEvent::Paused), None);
        assert_eq!(
            sound_for(&GameEvent::BossPhaseChanged {
                id: 1,
                phase: BossPhase::Recover
            }),
            None
        );
        assert_eq!(SoundEffect::BossDefeat.asset_path(), "sfx/boss_defeat.wav");
    }

    #[test]
    fn test_muted_manager_plays_nothing() {
        let mut audio = AudioManager::new(Recorder::default());
        audio.set_muted(true);
        audio.handle_events(&[GameEvent::Jumped, GameEvent::CoinCollected]);
        assert!(audio.sink().0.is_empty());

        audio.set_muted(false);
        audio.set_master_volume(2.0);
        audio.handle_events(&[GameEvent::Jumped, GameEvent::Paused]);
        assert_eq!(audio.sink().0.len(), 1);
        assert!(audio.sink().0[0].1 <= 1.0);
    }
}
