//! Run-directory staging
//!
//! Each concurrent solve gets its own slot directory (`rf_dir_1`,
//! `rf_dir_2`, ...) under the save dir. Static inputs are symlinked from
//! the grid dir so a campaign does not duplicate multi-gigabyte meshes;
//! only the per-member fort.13 is written fresh into each slot.

use crate::domain::{Result, TiderunError};
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix of slot directory names under the save dir
const RUN_DIR_PREFIX: &str = "rf_dir_";

/// Stages and tears down slot directories
#[derive(Debug, Clone)]
pub struct Stager {
    grid_dir: PathBuf,
    save_dir: PathBuf,
    base_dir: PathBuf,
}

impl Stager {
    /// Creates a stager over the campaign's directories
    pub fn new(
        grid_dir: impl Into<PathBuf>,
        save_dir: impl Into<PathBuf>,
        base_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            grid_dir: grid_dir.into(),
            save_dir: save_dir.into(),
            base_dir: base_dir.into(),
        }
    }

    /// Name of slot `i` (0-based in code, 1-based on disk)
    pub fn run_dir_name(slot: usize) -> String {
        format!("{RUN_DIR_PREFIX}{}", slot + 1)
    }

    /// Creates or refreshes `count` slot directories
    ///
    /// Existing slots are reused; their links are refreshed so a config
    /// change between campaigns takes effect.
    pub fn ensure_run_directories(&self, count: usize) -> Result<Vec<PathBuf>> {
        if !self.save_dir.exists() {
            fs::create_dir_all(&self.save_dir)?;
        }
        let mut dirs = Vec::with_capacity(count);
        for slot in 0..count {
            let dir = self.save_dir.join(Self::run_dir_name(slot));
            self.setup_run_dir(&dir)?;
            dirs.push(dir);
        }
        tracing::debug!(count, save_dir = %self.save_dir.display(), "Staged run directories");
        Ok(dirs)
    }

    /// Deletes every slot directory under the save dir
    ///
    /// Returns how many were removed.
    pub fn remove_run_directories(&self) -> Result<usize> {
        let mut removed = 0;
        if !self.save_dir.exists() {
            return Ok(0);
        }
        for entry in fs::read_dir(&self.save_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            if name.to_string_lossy().starts_with(RUN_DIR_PREFIX) && entry.path().is_dir() {
                fs::remove_dir_all(entry.path())?;
                removed += 1;
            }
        }
        tracing::debug!(removed, "Removed run directories");
        Ok(removed)
    }

    /// Creates one slot: baseline fort.13 copy, static input links, solver links
    fn setup_run_dir(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;

        // Baseline nodal attributes; overwritten per member later
        let baseline = self.save_dir.join("fort.13");
        if baseline.exists() {
            fs::copy(&baseline, dir.join("fort.13"))?;
        }

        for input in self.static_inputs()? {
            let name = input
                .file_name()
                .ok_or_else(|| TiderunError::Staging(format!("Bad input path: {}", input.display())))?;
            replace_with_link(&input, &dir.join(name))?;
        }

        for exe in ["adcprep", "padcirc"] {
            let src = self.base_dir.join(exe);
            if src.exists() {
                replace_with_link(&src, &dir.join(exe))?;
            }
        }
        Ok(())
    }

    /// Static solver inputs in the grid dir: fort.1*, fort.2*, fort.01*,
    /// minus fort.13 which is generated per member
    fn static_inputs(&self) -> Result<Vec<PathBuf>> {
        let mut inputs = Vec::new();
        if !self.grid_dir.is_dir() {
            return Err(TiderunError::Staging(format!(
                "Grid directory not found: {}",
                self.grid_dir.display()
            )));
        }
        for entry in fs::read_dir(&self.grid_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == "fort.13" || !entry.path().is_file() {
                continue;
            }
            if name.starts_with("fort.1") || name.starts_with("fort.2") || name.starts_with("fort.01")
            {
                inputs.push(entry.path());
            }
        }
        inputs.sort();
        Ok(inputs)
    }
}

/// Replaces whatever is at `dst` with a link to `src`
fn replace_with_link(src: &Path, dst: &Path) -> Result<()> {
    if dst.symlink_metadata().is_ok() {
        fs::remove_file(dst)?;
    }
    #[cfg(unix)]
    std::os::unix::fs::symlink(src, dst)?;
    #[cfg(not(unix))]
    fs::copy(src, dst).map(|_| ())?;
    Ok(())
}
