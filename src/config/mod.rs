//! Configuration management for Tiderun.
//!
//! TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! Tiderun uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `TIDERUN_*` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [paths]
//! grid_dir = "/scratch/inlet/grid"
//! save_dir = "/scratch/inlet/runs"
//! basis_dir = "/scratch/inlet/landuse"
//! base_dir = "/work/adcirc/bin"
//!
//! [run]
//! concurrent_runs = 10
//! procs_per_job = 12
//! mpirun = "mpirun"
//!
//! [outputs]
//! timeseries = ["fort.61"]
//! non_timeseries = ["maxele.63"]
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, Environment, LoggingConfig, OutputsConfig, PathsConfig, RunConfig,
    SamplingConfig, StateConfig, TiderunConfig, VerificationConfig,
};
