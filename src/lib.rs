// Tiderun - ADCIRC Ensemble Run Framework
// Copyright (c) 2026 Tiderun Contributors
// Licensed under the MIT License

//! # Tiderun - ADCIRC Ensemble Run Framework
//!
//! Tiderun drives ensembles of the ADCIRC coastal circulation model over
//! sampled Manning's n roughness fields: it stages run directories,
//! generates each member's nodal-attribute file from weighted land-use
//! basis vectors, executes `adcprep`/`padcirc` in bounded-concurrency
//! batches, and harvests the solver's outputs into dense arrays with
//! checkpointed resume.
//!
//! ## Architecture
//!
//! Tiderun follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (ensemble, field, sampling, staging,
//!   collect, state, verification)
//! - [`adapters`] - The outside world (grid file formats, output parsers,
//!   solver processes)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tiderun::config::load_config;
//! use tiderun::core::ensemble::EnsembleCoordinator;
//! use tiderun::domain::Array2;
//! use tokio::sync::watch;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load configuration
//!     let config = load_config("tiderun.toml")?;
//!
//!     // Load the mesh, control file, and basis set
//!     let coordinator = EnsembleCoordinator::new(config).await?;
//!
//!     // One column of basis weights per ensemble member
//!     let weights = Array2::from_rows(3, 2, vec![
//!         0.03, 0.05,
//!         0.10, 0.12,
//!         0.02, 0.02,
//!     ])?;
//!
//!     let (_tx, shutdown) = watch::channel(false);
//!     let summary = coordinator.execute(&weights, shutdown).await?;
//!
//!     println!("{} members completed", summary.successful);
//!     Ok(())
//! }
//! ```
//!
//! ## Resume
//!
//! Tiderun checkpoints member completion after every batch. Re-running the
//! same campaign (same inputs, same weights) picks up where it stopped:
//!
//! ```rust,no_run
//! use tiderun::core::state::StateManager;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let state = StateManager::new("/scratch/inlet/runs/checkpoint.json");
//! if let Some(checkpoint) = state.load()? {
//!     println!("{} members still pending", checkpoint.remaining().len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Tiderun uses the [`domain::TiderunError`] type for all errors:
//!
//! ```rust,no_run
//! use tiderun::domain::TiderunError;
//!
//! fn example() -> Result<(), TiderunError> {
//!     let config = tiderun::config::load_config("tiderun.toml")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Tiderun uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!(members = 50, "Starting campaign");
//! warn!(member = 12, stage = "solve", "Member failed");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
