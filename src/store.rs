use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::constants::{APP_DIR_NAME, STORAGE_FILE_NAME};
use crate::history::HistoryLog;
use crate::state::Language;

/// The subset of the editor state that survives restarts: the
/// credential, the history log, and the interface language.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub history: HistoryLog,
    #[serde(default)]
    pub language: Language,
}

/// Durable local storage for the [`Snapshot`], kept under a fixed file
/// name. Reading and writing never fail loudly: a missing, unreadable,
/// or corrupt file degrades to an empty snapshot, and write errors are
/// the caller's to log and ignore. Editing must never block on disk.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl Default for StateStore {
    fn default() -> Self {
        let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(APP_DIR_NAME);
        path.push(STORAGE_FILE_NAME);
        Self { path }
    }
}

impl StateStore {
    /// Store rooted at an explicit file path (tests, portable setups).
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    pub fn load(&self) -> Snapshot {
        if !self.path.exists() {
            return Snapshot::default();
        }
        match fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    tracing::warn!("Discarding corrupt editor snapshot: {e}");
                    Snapshot::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read editor snapshot: {e}");
                Snapshot::default()
            }
        }
    }

    /// Writes through a temporary file and renames, so a crash mid-write
    /// cannot leave a truncated snapshot behind.
    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create storage directory: {parent:?}"))?;
        }

        let content = serde_json::to_string_pretty(snapshot)
            .context("Failed to serialize editor snapshot")?;

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, content)
            .with_context(|| format!("Failed to write temporary snapshot: {temp_path:?}"))?;
        fs::rename(&temp_path, &self.path)
            .with_context(|| format!("Failed to rename snapshot into place: {:?}", self.path))?;

        Ok(())
    }
}
