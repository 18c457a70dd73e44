//! Run command implementation
//!
//! Executes an ensemble campaign: weight matrix from a JSON file or
//! uniform sampling, full-output or quantity-of-interest harvesting.

use crate::config::load_config;
use crate::core::ensemble::EnsembleCoordinator;
use crate::core::sampling;
use crate::domain::Array2;
use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::watch;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Dry run mode - stage directories and generate fields, never solve
    #[arg(long)]
    pub dry_run: bool,

    /// JSON file holding the weight matrix, shape (basis, member)
    #[arg(long, value_name = "FILE")]
    pub weights: Option<String>,

    /// Sample this many members uniformly from [sampling] ranges
    #[arg(long, value_name = "N", conflicts_with = "weights")]
    pub samples: Option<usize>,

    /// Seed for --samples, for reproducible campaigns
    #[arg(long, requires = "samples")]
    pub seed: Option<u64>,

    /// Harvest only station quantities of interest (maximum elevation)
    #[arg(long)]
    pub stations: bool,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting run command");

        let mut config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Configuration is invalid");
                eprintln!("Configuration error: {e}");
                return Ok(3);
            }
        };

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        let weights = match self.resolve_weights(&config) {
            Ok(weights) => weights,
            Err(e) => {
                eprintln!("Error: {e}");
                return Ok(3);
            }
        };

        if config.application.dry_run {
            println!("DRY RUN - directories will be staged but the solver will not run");
            println!();
        }

        if !self.yes && !config.application.dry_run {
            println!("Campaign configuration:");
            println!("  Members: {}", weights.cols());
            println!("  Basis vectors: {}", weights.rows());
            println!("  Concurrent runs: {}", config.run.concurrent_runs);
            println!("  Processors per job: {}", config.run.procs_per_job);
            println!("  Save dir: {}", config.paths.save_dir);
            println!();
            print!("Proceed with the campaign? [y/N]: ");
            use std::io::{self, Write};
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Campaign cancelled.");
                return Ok(0);
            }
        }

        let coordinator = EnsembleCoordinator::new(config).await?;

        let summary = if self.stations {
            let (qoi, summary) = coordinator
                .execute_stations(&weights, None, shutdown_signal)
                .await?;
            println!(
                "Harvested quantities of interest for {} members at {} stations",
                qoi.rows(),
                qoi.cols()
            );
            summary
        } else {
            coordinator.execute(&weights, shutdown_signal).await?
        };

        println!();
        println!("Campaign finished:");
        println!("  Successful: {}", summary.successful);
        println!("  Failed:     {}", summary.failed);
        if summary.skipped > 0 {
            println!("  Skipped:    {} (already settled by checkpoint)", summary.skipped);
        }
        println!("  Duration:   {:.1}s", summary.duration.as_secs_f64());

        if summary.interrupted {
            println!("  Interrupted by shutdown signal; re-run to resume.");
            return Ok(130);
        }
        if !summary.is_successful() {
            return Ok(2);
        }
        Ok(0)
    }

    /// Builds the weight matrix from --weights or --samples
    fn resolve_weights(
        &self,
        config: &crate::config::TiderunConfig,
    ) -> Result<Array2, String> {
        if let Some(path) = &self.weights {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| format!("Failed to read weights file {path}: {e}"))?;
            let weights: Array2 = serde_json::from_str(&contents)
                .map_err(|e| format!("Failed to parse weights file {path}: {e}"))?;
            if !weights.is_consistent() {
                return Err(format!("Weights file {path} has inconsistent shape"));
            }
            return Ok(weights);
        }

        let samples = self
            .samples
            .ok_or_else(|| "Provide --weights FILE or --samples N".to_string())?;
        let sampling = config
            .sampling
            .as_ref()
            .ok_or_else(|| "--samples needs [sampling] ranges in the config".to_string())?;
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        sampling::uniform_weights(&sampling.lower, &sampling.upper, samples, &mut rng)
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::SamplingConfig;

    fn base_config() -> crate::config::TiderunConfig {
        toml::from_str(
            r#"
[paths]
grid_dir = "/g"
save_dir = "/s"
basis_dir = "/b"
base_dir = "/e"
"#,
        )
        .unwrap()
    }

    fn args() -> RunArgs {
        RunArgs {
            yes: true,
            dry_run: false,
            weights: None,
            samples: None,
            seed: None,
            stations: false,
        }
    }

    #[test]
    fn test_resolve_weights_requires_source() {
        let result = args().resolve_weights(&base_config());
        assert!(result.unwrap_err().contains("--weights"));
    }

    #[test]
    fn test_resolve_weights_samples_need_ranges() {
        let mut a = args();
        a.samples = Some(4);
        let result = a.resolve_weights(&base_config());
        assert!(result.unwrap_err().contains("[sampling]"));
    }

    #[test]
    fn test_resolve_weights_samples() {
        let mut a = args();
        a.samples = Some(4);
        a.seed = Some(11);
        let mut config = base_config();
        config.sampling = Some(SamplingConfig {
            lower: vec![0.0, 0.1],
            upper: vec![1.0, 0.2],
        });
        let weights = a.resolve_weights(&config).unwrap();
        assert_eq!(weights.rows(), 2);
        assert_eq!(weights.cols(), 4);
    }

    #[test]
    fn test_resolve_weights_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("weights.json");
        let weights = Array2::from_rows(2, 3, vec![0.0; 6]).unwrap();
        std::fs::write(&path, serde_json::to_string(&weights).unwrap()).unwrap();

        let mut a = args();
        a.weights = Some(path.to_string_lossy().into_owned());
        let loaded = a.resolve_weights(&base_config()).unwrap();
        assert_eq!(loaded, weights);
    }

    #[test]
    fn test_resolve_weights_bad_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("weights.json");
        std::fs::write(&path, "not json").unwrap();

        let mut a = args();
        a.weights = Some(path.to_string_lossy().into_owned());
        assert!(a.resolve_weights(&base_config()).is_err());
    }
}
