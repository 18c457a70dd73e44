//! Batch processing of ensemble members
//!
//! One batch fills the available run slots: each member gets its roughness
//! field written, its fort.13 re-prepped, and its solve launched. The
//! solves run concurrently; harvesting happens afterwards because the
//! destination arrays take one writer at a time.

use super::summary::MemberError;
use crate::adapters::grid::fort13::write_manning_field;
use crate::adapters::solver::{PrepStage, SolverBackend};
use crate::core::collect::Harvester;
use crate::core::field::BasisSet;
use crate::domain::{Array2, Result, RunData};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One member's place in a batch
///
/// `member` indexes the weight matrix; `data_index` indexes the destination
/// arrays. They coincide for whole-campaign arrays and differ for per-batch
/// arrays in quantity-of-interest mode.
#[derive(Debug, Clone, Copy)]
pub struct BatchMember {
    pub member: usize,
    pub data_index: usize,
}

/// Result of processing one batch
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    /// Members that solved and harvested, in batch order
    pub successful: Vec<usize>,
    /// Members that failed, with the failing stage
    pub failed: Vec<MemberError>,
}

impl BatchResult {
    /// Creates an empty batch result
    pub fn new() -> Self {
        Self::default()
    }
}

/// Runs batches of ensemble members through the solver
pub struct BatchProcessor {
    runner: Arc<dyn SolverBackend>,
    basis: Arc<BasisSet>,
    harvester: Arc<Harvester>,
    default_manning: f64,
    node_count: usize,
    field_header: String,
    dry_run: bool,
}

impl BatchProcessor {
    /// Creates a batch processor
    pub fn new(
        runner: Arc<dyn SolverBackend>,
        basis: Arc<BasisSet>,
        harvester: Arc<Harvester>,
        default_manning: f64,
        node_count: usize,
        field_header: String,
        dry_run: bool,
    ) -> Self {
        Self {
            runner,
            basis,
            harvester,
            default_manning,
            node_count,
            field_header,
            dry_run,
        }
    }

    /// Processes one batch of members in the given slots
    ///
    /// `slots` must be at least as long as `batch`; member `batch[i]` runs
    /// in `slots[i]`. Failures are isolated per member; the batch result
    /// names each one with its failing stage.
    pub async fn process_batch(
        &self,
        batch: &[BatchMember],
        slots: &[PathBuf],
        weights: &Array2,
        data: &mut RunData,
    ) -> BatchResult {
        let mut result = BatchResult::new();

        let runs = batch.iter().enumerate().map(|(i, bm)| {
            let slot = slots[i].clone();
            let member_weights = weights.column(bm.member);
            async move {
                self.run_member(&slot, &member_weights)
                    .await
                    .map_err(|(stage, e)| MemberError::new(bm.member, stage, e.to_string()))
            }
        });
        let outcomes = futures::future::join_all(runs).await;

        for ((i, bm), outcome) in batch.iter().enumerate().zip(outcomes) {
            match outcome {
                Ok(()) if self.dry_run => {
                    result.successful.push(bm.member);
                }
                Ok(()) => {
                    match self
                        .harvester
                        .harvest_member(&slots[i], bm.data_index, data)
                    {
                        Ok(()) => result.successful.push(bm.member),
                        Err(e) => result
                            .failed
                            .push(MemberError::new(bm.member, "harvest", e.to_string())),
                    }
                }
                Err(e) => result.failed.push(e),
            }
        }

        result
    }

    /// Stages and solves one member in its slot
    async fn run_member(
        &self,
        slot: &Path,
        member_weights: &[f64],
    ) -> std::result::Result<(), (String, crate::domain::TiderunError)> {
        self.write_field(slot, member_weights)
            .map_err(|e| ("field".to_string(), e))?;
        if self.dry_run {
            return Ok(());
        }
        self.runner
            .run_prep(slot, PrepStage::NodalAttributes)
            .await
            .map_err(|e| ("prep".to_string(), e))?;
        self.runner
            .run_solve(slot)
            .await
            .map_err(|e| ("solve".to_string(), e))?;
        Ok(())
    }

    /// Generates and writes one member's fort.13
    fn write_field(&self, slot: &Path, member_weights: &[f64]) -> Result<()> {
        let field = self
            .basis
            .combine(member_weights, self.default_manning, self.node_count)?;
        write_manning_field(
            slot.join("fort.13"),
            &self.field_header,
            self.default_manning,
            &field,
        )
    }
}
