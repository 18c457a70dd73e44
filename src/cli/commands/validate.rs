//! Validate-config command implementation

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config = config_path, "Validating configuration");

        match load_config(config_path) {
            Ok(config) => {
                println!("Configuration is valid: {config_path}");
                println!("  Grid dir:  {}", config.paths.grid_dir);
                println!("  Save dir:  {}", config.paths.save_dir);
                println!("  Basis dir: {}", config.paths.basis_dir);
                println!(
                    "  Harvest:   {} + {}",
                    config.outputs.timeseries.join(", "),
                    config.outputs.non_timeseries.join(", ")
                );
                Ok(0)
            }
            Err(e) => {
                tracing::error!(error = %e, "Configuration validation failed");
                eprintln!("Configuration is invalid: {e}");
                Ok(3)
            }
        }
    }
}
