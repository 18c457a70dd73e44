//! Checkpoint persistence
//!
//! Checkpoints are JSON documents in the save dir, written atomically
//! (temp file then rename) so a crash mid-write never corrupts the only
//! record of a week-long campaign.

use super::checkpoint::Checkpoint;
use crate::domain::{Result, TiderunError};
use std::fs;
use std::path::{Path, PathBuf};

/// Loads and saves campaign checkpoints
#[derive(Debug, Clone)]
pub struct StateManager {
    path: PathBuf,
}

impl StateManager {
    /// Creates a manager for a checkpoint file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The checkpoint file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the checkpoint if one exists
    pub fn load(&self) -> Result<Option<Checkpoint>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)
            .map_err(|e| TiderunError::State(format!("Failed to read checkpoint: {e}")))?;
        let checkpoint = serde_json::from_str(&contents)
            .map_err(|e| TiderunError::State(format!("Failed to parse checkpoint: {e}")))?;
        Ok(Some(checkpoint))
    }

    /// Saves the checkpoint atomically
    pub fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(checkpoint)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents)
            .map_err(|e| TiderunError::State(format!("Failed to write checkpoint: {e}")))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| TiderunError::State(format!("Failed to replace checkpoint: {e}")))?;
        tracing::debug!(path = %self.path.display(), "Checkpoint saved");
        Ok(())
    }

    /// Removes the checkpoint file if present
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .map_err(|e| TiderunError::State(format!("Failed to remove checkpoint: {e}")))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::checkpoint::MemberStatus;
    use crate::domain::{Array2, RunId};
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_returns_none() {
        let dir = TempDir::new().unwrap();
        let manager = StateManager::new(dir.path().join("checkpoint.json"));
        assert!(manager.load().unwrap().is_none());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let manager = StateManager::new(dir.path().join("checkpoint.json"));

        let mut cp = Checkpoint::new(RunId::generate(), "d".to_string(), Array2::zeros(1, 3));
        cp.mark(1, MemberStatus::Completed);
        manager.save(&cp).unwrap();

        let loaded = manager.load().unwrap().unwrap();
        assert_eq!(loaded.run_id, cp.run_id);
        assert_eq!(loaded.remaining(), vec![0, 2]);
    }

    #[test]
    fn test_save_overwrites() {
        let dir = TempDir::new().unwrap();
        let manager = StateManager::new(dir.path().join("checkpoint.json"));

        let mut cp = Checkpoint::new(RunId::generate(), "d".to_string(), Array2::zeros(1, 2));
        manager.save(&cp).unwrap();
        cp.mark(0, MemberStatus::Completed);
        manager.save(&cp).unwrap();

        let loaded = manager.load().unwrap().unwrap();
        assert_eq!(loaded.completed_count(), 1);
    }

    #[test]
    fn test_clear() {
        let dir = TempDir::new().unwrap();
        let manager = StateManager::new(dir.path().join("checkpoint.json"));
        let cp = Checkpoint::new(RunId::generate(), "d".to_string(), Array2::zeros(1, 1));
        manager.save(&cp).unwrap();
        manager.clear().unwrap();
        assert!(manager.load().unwrap().is_none());
        // clearing twice is fine
        manager.clear().unwrap();
    }

    #[test]
    fn test_corrupt_checkpoint_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("checkpoint.json");
        std::fs::write(&path, "not json").unwrap();
        let manager = StateManager::new(&path);
        assert!(manager.load().is_err());
    }
}
