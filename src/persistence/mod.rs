//! Leaderboard persistence
//!
//! Features:
//! - JSON file store with write-to-temp-then-rename
//! - In-memory store for tests and embedding hosts
//! - Missing files load as an empty leaderboard

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::highscores::HighScores;

/// Where the leaderboard lives
pub trait ScoreStore {
    fn load(&self) -> Result<HighScores, StorageError>;
    fn save(&mut self, scores: &HighScores) -> Result<(), StorageError>;

    /// Load, falling back to an empty board on any error
    fn load_or_default(&self) -> HighScores {
        match self.load() {
            Ok(scores) => scores,
            Err(err) => {
                log::warn!("Starting with an empty leaderboard ({})", err);
                HighScores::new()
            }
        }
    }
}

/// Leaderboard stored as a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

impl ScoreStore for JsonFileStore {
    fn load(&self) -> Result<HighScores, StorageError> {
        if !self.path.exists() {
            log::info!("No high scores at {}, starting fresh", self.path.display());
            return Ok(HighScores::new());
        }
        let json = fs::read_to_string(&self.path)?;
        let scores: HighScores = serde_json::from_str(&json)?;
        log::info!("Loaded {} high scores", scores.entries.len());
        Ok(scores)
    }

    fn save(&mut self, scores: &HighScores) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(scores)?;
        let tmp = self.tmp_path();
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        log::info!("High scores saved ({} entries)", scores.entries.len());
        Ok(())
    }
}

/// Leaderboard kept in memory only
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    scores: HighScores,
    pub saves: usize,
}

impl ScoreStore for MemoryStore {
    fn load(&self) -> Result<HighScores, StorageError> {
        Ok(self.scores.clone())
    }

    fn save(&mut self, scores: &HighScores) -> Result<(), StorageError> {
        self.scores = scores.clone();
        self.saves += 1;
        Ok(())
    }
}
