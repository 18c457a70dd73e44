//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Tiderun using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Tiderun - ADCIRC ensemble run framework
#[derive(Parser, Debug)]
#[command(name = "tiderun")]
#[command(version, about, long_about = None)]
#[command(author = "Tiderun Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "tiderun.toml", env = "TIDERUN_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "TIDERUN_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run an ensemble campaign
    Run(commands::run::RunArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show campaign checkpoint status
    Status(commands::status::StatusArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_run() {
        let cli = Cli::parse_from(["tiderun", "run"]);
        assert_eq!(cli.config, "tiderun.toml");
        assert!(matches!(cli.command, Commands::Run(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["tiderun", "--config", "custom.toml", "run"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["tiderun", "--log-level", "debug", "run"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_run_flags() {
        let cli = Cli::parse_from(["tiderun", "run", "--dry-run", "--samples", "8", "--seed", "7"]);
        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert!(args.dry_run);
        assert_eq!(args.samples, Some(8));
        assert_eq!(args.seed, Some(7));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["tiderun", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_status() {
        let cli = Cli::parse_from(["tiderun", "status"]);
        assert!(matches!(cli.command, Commands::Status(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["tiderun", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
