//! Configuration schema types

use crate::domain::ids::OutputKey;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Runtime environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    #[default]
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    Production,
}

/// Main Tiderun configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TiderunConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: Environment,

    /// Campaign directories
    pub paths: PathsConfig,

    /// Solver execution settings
    #[serde(default)]
    pub run: RunConfig,

    /// Output files to harvest
    #[serde(default)]
    pub outputs: OutputsConfig,

    /// Random sampling ranges (optional; campaigns can supply weights)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampling: Option<SamplingConfig>,

    /// State management configuration
    #[serde(default)]
    pub state: StateConfig,

    /// Verification configuration
    #[serde(default)]
    pub verification: VerificationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TiderunConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.paths.validate()?;
        self.run.validate()?;
        self.outputs.validate()?;
        if let Some(sampling) = &self.sampling {
            sampling.validate()?;
        }
        self.state.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (stage and generate fields, never invoke the solver)
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Campaign directory layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory containing fort.14, fort.15, and fort.22*
    pub grid_dir: String,

    /// Directory for run slots, checkpoints, and results; also holds the
    /// baseline fort.13
    pub save_dir: String,

    /// Directory containing landuse_* basis folders
    pub basis_dir: String,

    /// Directory containing the adcprep and padcirc executables
    pub base_dir: String,
}

impl PathsConfig {
    fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("paths.grid_dir", &self.grid_dir),
            ("paths.save_dir", &self.save_dir),
            ("paths.basis_dir", &self.basis_dir),
            ("paths.base_dir", &self.base_dir),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{name} cannot be empty"));
            }
        }
        Ok(())
    }
}

/// Solver execution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Concurrent solver jobs (run slot count)
    #[serde(default = "default_concurrent_runs")]
    pub concurrent_runs: usize,

    /// MPI processes per solver job
    #[serde(default = "default_procs_per_job")]
    pub procs_per_job: usize,

    /// MPI tasks per node (mpirun --npernode), when pinning matters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks_per_node: Option<usize>,

    /// Dedicated ascii-writer processes (padcirc -W)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writers: Option<usize>,

    /// Pass solver output through instead of logging to files
    #[serde(default = "default_true")]
    pub screen_output: bool,

    /// Delete run slots after a successful campaign
    #[serde(default = "default_true")]
    pub cleanup: bool,

    /// Kill a solver stage after this many seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,

    /// MPI launcher command; omit to run padcirc without one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mpirun: Option<String>,

    /// adcprep executable name or path, resolved against base_dir
    #[serde(default = "default_adcprep")]
    pub adcprep: String,

    /// padcirc executable name or path, resolved against base_dir
    #[serde(default = "default_padcirc")]
    pub padcirc: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            concurrent_runs: default_concurrent_runs(),
            procs_per_job: default_procs_per_job(),
            tasks_per_node: None,
            writers: None,
            screen_output: true,
            cleanup: true,
            timeout_seconds: None,
            mpirun: None,
            adcprep: default_adcprep(),
            padcirc: default_padcirc(),
        }
    }
}

impl RunConfig {
    fn validate(&self) -> Result<(), String> {
        if self.concurrent_runs == 0 {
            return Err("run.concurrent_runs must be at least 1".to_string());
        }
        if self.procs_per_job == 0 {
            return Err("run.procs_per_job must be at least 1".to_string());
        }
        if let Some(writers) = self.writers {
            if writers >= self.procs_per_job {
                return Err(format!(
                    "run.writers ({writers}) must be less than run.procs_per_job ({})",
                    self.procs_per_job
                ));
            }
        }
        if let Some(tasks) = self.tasks_per_node {
            if tasks == 0 {
                return Err("run.tasks_per_node must be at least 1".to_string());
            }
        }
        if self.adcprep.trim().is_empty() || self.padcirc.trim().is_empty() {
            return Err("run.adcprep and run.padcirc cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Output files to harvest after each solve
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputsConfig {
    /// Time-series output files (fort.61, fort.63)
    #[serde(default = "default_timeseries")]
    pub timeseries: Vec<String>,

    /// Non-time-series output files (maxele.63, timemax.63, tinun.63)
    #[serde(default = "default_non_timeseries")]
    pub non_timeseries: Vec<String>,
}

impl Default for OutputsConfig {
    fn default() -> Self {
        Self {
            timeseries: default_timeseries(),
            non_timeseries: default_non_timeseries(),
        }
    }
}

impl OutputsConfig {
    fn validate(&self) -> Result<(), String> {
        for name in &self.timeseries {
            let key = OutputKey::from_str(name)
                .map_err(|e| format!("outputs.timeseries: {e}"))?;
            if !key.is_timeseries() {
                return Err(format!(
                    "outputs.timeseries: {name} is not a time-series output"
                ));
            }
        }
        for name in &self.non_timeseries {
            let key = OutputKey::from_str(name)
                .map_err(|e| format!("outputs.non_timeseries: {e}"))?;
            if key.is_timeseries() {
                return Err(format!(
                    "outputs.non_timeseries: {name} is a time-series output"
                ));
            }
        }
        if self.timeseries.is_empty() && self.non_timeseries.is_empty() {
            return Err("outputs must name at least one file to harvest".to_string());
        }
        Ok(())
    }

    /// Parsed time-series keys
    pub fn timeseries_keys(&self) -> Vec<OutputKey> {
        self.timeseries
            .iter()
            .filter_map(|n| OutputKey::from_str(n).ok())
            .collect()
    }

    /// Parsed non-time-series keys
    pub fn non_timeseries_keys(&self) -> Vec<OutputKey> {
        self.non_timeseries
            .iter()
            .filter_map(|n| OutputKey::from_str(n).ok())
            .collect()
    }
}

/// Uniform sampling ranges, one per basis vector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Lower weight bound per basis vector
    pub lower: Vec<f64>,

    /// Upper weight bound per basis vector
    pub upper: Vec<f64>,
}

impl SamplingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.lower.len() != self.upper.len() {
            return Err(format!(
                "sampling.lower has {} entries but sampling.upper has {}",
                self.lower.len(),
                self.upper.len()
            ));
        }
        if self.lower.is_empty() {
            return Err("sampling ranges cannot be empty".to_string());
        }
        for (i, (lo, hi)) in self.lower.iter().zip(&self.upper).enumerate() {
            if lo > hi {
                return Err(format!("sampling range {i} is inverted: {lo} > {hi}"));
            }
        }
        Ok(())
    }
}

/// State management configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// Write checkpoints and honor them on restart
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Checkpoint file name under save_dir
    #[serde(default = "default_checkpoint_file")]
    pub checkpoint_file: String,

    /// Results file name under save_dir
    #[serde(default = "default_results_file")]
    pub results_file: String,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            checkpoint_file: default_checkpoint_file(),
            results_file: default_results_file(),
        }
    }
}

impl StateConfig {
    fn validate(&self) -> Result<(), String> {
        if self.checkpoint_file.trim().is_empty() || self.results_file.trim().is_empty() {
            return Err("state.checkpoint_file and state.results_file cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Verification configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VerificationConfig {
    /// Run the post-campaign verification pass
    #[serde(default)]
    pub enable_verification: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write JSON logs to rotating files
    #[serde(default)]
    pub file_enabled: bool,

    /// Log directory for file output
    #[serde(default = "default_log_path")]
    pub file_path: String,

    /// Rotation policy: daily or hourly
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file_enabled: false,
            file_path: default_log_path(),
            rotation: default_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        if !["daily", "hourly"].contains(&self.rotation.as_str()) {
            return Err(format!(
                "Invalid logging.rotation '{}'. Must be daily or hourly",
                self.rotation
            ));
        }
        if self.file_enabled && self.file_path.trim().is_empty() {
            return Err("logging.file_path cannot be empty when file logging is on".to_string());
        }
        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_concurrent_runs() -> usize {
    10
}

fn default_procs_per_job() -> usize {
    12
}

fn default_adcprep() -> String {
    "adcprep".to_string()
}

fn default_padcirc() -> String {
    "padcirc".to_string()
}

fn default_timeseries() -> Vec<String> {
    vec!["fort.61".to_string()]
}

fn default_non_timeseries() -> Vec<String> {
    vec!["maxele.63".to_string()]
}

fn default_checkpoint_file() -> String {
    "checkpoint.json".to_string()
}

fn default_results_file() -> String {
    "results.json".to_string()
}

fn default_log_path() -> String {
    "logs".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_config() -> TiderunConfig {
        TiderunConfig {
            application: ApplicationConfig::default(),
            environment: Environment::default(),
            paths: PathsConfig {
                grid_dir: "/data/grid".to_string(),
                save_dir: "/data/save".to_string(),
                basis_dir: "/data/basis".to_string(),
                base_dir: "/data/base".to_string(),
            },
            run: RunConfig::default(),
            outputs: OutputsConfig::default(),
            sampling: None,
            state: StateConfig::default(),
            verification: VerificationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_minimal_config_validates() {
        assert!(minimal_config().validate().is_ok());
    }

    #[test]
    fn test_empty_path_rejected() {
        let mut config = minimal_config();
        config.paths.grid_dir = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_log_level_rejected() {
        let mut config = minimal_config();
        config.application.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_writers_must_be_less_than_procs() {
        let mut config = minimal_config();
        config.run.procs_per_job = 4;
        config.run.writers = Some(4);
        assert!(config.validate().is_err());
        config.run.writers = Some(3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_concurrent_runs_rejected() {
        let mut config = minimal_config();
        config.run.concurrent_runs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_output_rejected() {
        let mut config = minimal_config();
        config.outputs.non_timeseries = vec!["fort.67".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_misclassified_output_rejected() {
        let mut config = minimal_config();
        config.outputs.timeseries = vec!["maxele.63".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_output_keys_parse() {
        let outputs = OutputsConfig::default();
        assert_eq!(outputs.timeseries_keys(), vec![OutputKey::Fort61]);
        assert_eq!(outputs.non_timeseries_keys(), vec![OutputKey::Maxele63]);
    }

    #[test]
    fn test_inverted_sampling_range_rejected() {
        let mut config = minimal_config();
        config.sampling = Some(SamplingConfig {
            lower: vec![0.5],
            upper: vec![0.1],
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_rotation_rejected() {
        let mut config = minimal_config();
        config.logging.rotation = "weekly".to_string();
        assert!(config.validate().is_err());
    }
}
