//! Init command implementation
//!
//! Generates a commented template configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "tiderun.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            eprintln!("Configuration file already exists: {}", self.output);
            eprintln!("Use --force to overwrite");
            return Ok(3);
        }

        match fs::write(&self.output, Self::template()) {
            Ok(_) => {
                println!("Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Point [paths] at your grid, save, basis, and executable dirs");
                println!("  2. Set run.procs_per_job to match your allocation");
                println!("  3. Validate: tiderun validate-config");
                println!("  4. Launch:   tiderun run --samples 50");
                Ok(0)
            }
            Err(e) => {
                eprintln!("Failed to write configuration file: {e}");
                Ok(5)
            }
        }
    }

    /// The template configuration
    fn template() -> &'static str {
        r#"# Tiderun configuration
# Ensemble run framework for the ADCIRC coastal circulation model

[application]
log_level = "info"   # trace | debug | info | warn | error
dry_run = false

# development | staging | production
environment = "development"

[paths]
# Directory containing fort.14, fort.15, and fort.22*
grid_dir = "/scratch/inlet/grid"
# Directory for run slots, checkpoints, results, and the baseline fort.13
save_dir = "/scratch/inlet/runs"
# Directory containing landuse_* basis folders
basis_dir = "/scratch/inlet/landuse"
# Directory containing the adcprep and padcirc executables
base_dir = "/work/adcirc/bin"

[run]
concurrent_runs = 10
procs_per_job = 12
# tasks_per_node = 12
# writers = 1
screen_output = false
cleanup = true
# timeout_seconds = 86400
mpirun = "mpirun"
adcprep = "adcprep"
padcirc = "padcirc"

[outputs]
timeseries = ["fort.61"]
non_timeseries = ["maxele.63"]

# Uniform sampling ranges, one entry per landuse_* basis vector.
# Used by `tiderun run --samples N`.
# [sampling]
# lower = [0.02, 0.02, 0.02]
# upper = [0.20, 0.20, 0.20]

[state]
enabled = true
checkpoint_file = "checkpoint.json"
results_file = "results.json"

[verification]
enable_verification = false

[logging]
file_enabled = false
file_path = "logs"
rotation = "daily"   # daily | hourly
"#
    }
}
