//! Solver backend seam
//!
//! The batch processor talks to the solver through this trait so queued
//! submission backends can slot in next to direct process execution.

use super::prep::PrepStage;
use super::runner::{JobOutcome, JobRunner};
use crate::domain::Result;
use async_trait::async_trait;
use std::path::Path;

/// Executes solver stages in run directories
#[async_trait]
pub trait SolverBackend: Send + Sync {
    /// Runs one adcprep stage in `dir`
    async fn run_prep(&self, dir: &Path, stage: PrepStage) -> Result<JobOutcome>;

    /// Runs one padcirc solve in `dir`
    async fn run_solve(&self, dir: &Path) -> Result<JobOutcome>;
}

#[async_trait]
impl SolverBackend for JobRunner {
    async fn run_prep(&self, dir: &Path, stage: PrepStage) -> Result<JobOutcome> {
        JobRunner::run_prep(self, dir, stage).await
    }

    async fn run_solve(&self, dir: &Path) -> Result<JobOutcome> {
        JobRunner::run_solve(self, dir).await
    }
}
