//! Logging and observability
//!
//! Structured logging via `tracing`, with console output and optional
//! rotated JSON files for unattended cluster runs.
//!
//! # Example
//!
//! ```no_run
//! use tiderun::logging::init_logging;
//! use tiderun::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Campaign starting");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the start of a campaign
#[macro_export]
macro_rules! log_campaign_start {
    ($run_id:expr, $members:expr) => {
        tracing::info!(
            run_id = %$run_id,
            members = $members,
            "Starting campaign"
        );
    };
}

/// Log campaign completion
#[macro_export]
macro_rules! log_campaign_complete {
    ($successful:expr, $failed:expr, $duration:expr) => {
        tracing::info!(
            successful = $successful,
            failed = $failed,
            duration_secs = $duration.as_secs(),
            "Campaign completed"
        );
    };
}

/// Log batch progress
#[macro_export]
macro_rules! log_batch_progress {
    ($current:expr, $total:expr) => {
        tracing::debug!(
            current = $current,
            total = $total,
            progress_pct = ($current as f64 / $total as f64 * 100.0),
            "Processing batch"
        );
    };
}
