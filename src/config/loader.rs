//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::TiderunConfig;
use crate::domain::errors::TiderunError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into TiderunConfig
/// 4. Applies environment variable overrides (TIDERUN_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
pub fn load_config(path: impl AsRef<Path>) -> Result<TiderunConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(TiderunError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        TiderunError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: TiderunConfig = toml::from_str(&contents)
        .map_err(|e| TiderunError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        TiderunError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are passed through untouched so commented-out examples
/// never force variables to be set.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("static pattern");
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(TiderunError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the TIDERUN_* prefix
///
/// Variables follow the pattern TIDERUN_<SECTION>_<KEY>, for example
/// TIDERUN_PATHS_SAVE_DIR or TIDERUN_RUN_CONCURRENT_RUNS.
fn apply_env_overrides(config: &mut TiderunConfig) {
    if let Ok(val) = std::env::var("TIDERUN_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("TIDERUN_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    if let Ok(val) = std::env::var("TIDERUN_PATHS_GRID_DIR") {
        config.paths.grid_dir = val;
    }
    if let Ok(val) = std::env::var("TIDERUN_PATHS_SAVE_DIR") {
        config.paths.save_dir = val;
    }
    if let Ok(val) = std::env::var("TIDERUN_PATHS_BASIS_DIR") {
        config.paths.basis_dir = val;
    }
    if let Ok(val) = std::env::var("TIDERUN_PATHS_BASE_DIR") {
        config.paths.base_dir = val;
    }

    if let Ok(val) = std::env::var("TIDERUN_RUN_CONCURRENT_RUNS") {
        if let Ok(parsed) = val.parse() {
            config.run.concurrent_runs = parsed;
        }
    }
    if let Ok(val) = std::env::var("TIDERUN_RUN_PROCS_PER_JOB") {
        if let Ok(parsed) = val.parse() {
            config.run.procs_per_job = parsed;
        }
    }
    if let Ok(val) = std::env::var("TIDERUN_RUN_SCREEN_OUTPUT") {
        config.run.screen_output = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("TIDERUN_RUN_MPIRUN") {
        config.run.mpirun = if val.is_empty() { None } else { Some(val) };
    }

    if let Ok(val) = std::env::var("TIDERUN_STATE_RESULTS_FILE") {
        config.state.results_file = val;
    }
}
