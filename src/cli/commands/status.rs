//! Status command implementation
//!
//! Reads the checkpoint in the save dir and reports campaign progress.

use crate::config::load_config;
use crate::core::state::StateManager;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Configuration error: {e}");
                return Ok(3);
            }
        };

        let checkpoint_path =
            PathBuf::from(&config.paths.save_dir).join(&config.state.checkpoint_file);
        let state = StateManager::new(&checkpoint_path);

        match state.load()? {
            Some(checkpoint) => {
                let pending = checkpoint.remaining().len();
                println!("Campaign {}", checkpoint.run_id);
                println!("  Started:   {}", checkpoint.created_at.to_rfc3339());
                println!("  Updated:   {}", checkpoint.updated_at.to_rfc3339());
                println!("  Members:   {}", checkpoint.members.len());
                println!("  Completed: {}", checkpoint.completed_count());
                println!("  Failed:    {}", checkpoint.failed_count());
                println!("  Pending:   {pending}");
                if pending > 0 {
                    println!();
                    println!("Run `tiderun run` with the same weights to resume.");
                }
                Ok(0)
            }
            None => {
                println!(
                    "No checkpoint found at {}",
                    checkpoint_path.display()
                );
                Ok(0)
            }
        }
    }
}
