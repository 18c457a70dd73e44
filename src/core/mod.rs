//! Core business logic
//!
//! - [`ensemble`] - campaign orchestration (coordinator, batches, summary)
//! - [`field`] - Manning's n field generation from land-use basis vectors
//! - [`sampling`] - weight-matrix generation (grids, uniform draws)
//! - [`staging`] - run-slot directories and input linking
//! - [`collect`] - output harvesting and station interpolation
//! - [`state`] - checkpoints and results persistence
//! - [`verification`] - input-drift and shape checks

pub mod collect;
pub mod ensemble;
pub mod field;
pub mod sampling;
pub mod staging;
pub mod state;
pub mod verification;
