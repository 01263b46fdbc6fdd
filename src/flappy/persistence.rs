//! Best-score persistence (~/.handflap/high_score.json).
//!
//! The file holds a single integer. A missing or unreadable file reads as 0,
//! and a failed write is logged and skipped; neither is ever fatal.

use crate::core::constants::HIGH_SCORE_FILE;
use crate::utils::persistence;
use std::io;
use std::path::{Path, PathBuf};

/// Location of the best-score file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighScoreFile {
    path: Option<PathBuf>,
}

impl HighScoreFile {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// `~/.handflap/high_score.json`. Without a home directory nothing is
    /// read or written.
    pub fn default_location() -> Self {
        match persistence::save_path(HIGH_SCORE_FILE) {
            Ok(path) => Self::at(path),
            Err(e) => {
                tracing::warn!("best score will not be saved: {}", e);
                Self { path: None }
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn load_best(&self) -> u32 {
        match &self.path {
            Some(path) => persistence::load_json_or_default_at(path),
            None => 0,
        }
    }

    pub fn try_save_best(&self, best: u32) -> io::Result<()> {
        match &self.path {
            Some(path) => persistence::save_json_at(path, &best),
            None => Ok(()),
        }
    }

    /// Write `best`, logging instead of failing.
    pub fn save_best(&self, best: u32) {
        match self.try_save_best(best) {
            Ok(()) => tracing::debug!(best, "best score saved"),
            Err(e) => tracing::warn!(best, "could not save best score: {}", e),
        }
    }
}
