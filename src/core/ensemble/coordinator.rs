//! Ensemble coordinator - main orchestrator for a campaign
//!
//! Owns the loaded mesh, control data, and basis set, and drives the
//! stage / prep / solve / harvest / checkpoint cycle batch by batch.

use crate::adapters::grid::{fort13, fort14, fort15};
use crate::adapters::solver::{JobRunner, PrepStage, SolverCommand};
use crate::config::TiderunConfig;
use crate::core::collect::{interpolate_to_stations, Harvester};
use crate::core::ensemble::batch::{BatchMember, BatchProcessor};
use crate::core::ensemble::summary::{EnsembleSummary, MemberError};
use crate::core::field::BasisSet;
use crate::core::staging::Stager;
use crate::core::state::{Checkpoint, MemberStatus, ResultsFile, ResultsStore, StateManager};
use crate::core::verification::{InputManifest, Verifier};
use crate::domain::ids::{OutputKey, RunId};
use crate::domain::mesh::Mesh;
use crate::domain::station::{ModelControl, Station};
use crate::domain::{Array2, Result, TiderunError};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Ensemble coordinator
pub struct EnsembleCoordinator {
    config: TiderunConfig,
    mesh: Mesh,
    control: ModelControl,
    basis: Arc<BasisSet>,
    default_manning: f64,
    stager: Stager,
    runner: Arc<JobRunner>,
    harvester: Arc<Harvester>,
}

impl EnsembleCoordinator {
    /// Loads everything a campaign needs: mesh, control, baseline
    /// attributes, and the basis set
    pub async fn new(config: TiderunConfig) -> Result<Self> {
        let grid_dir = PathBuf::from(&config.paths.grid_dir);
        let save_dir = PathBuf::from(&config.paths.save_dir);
        let basis_dir = PathBuf::from(&config.paths.basis_dir);
        let base_dir = PathBuf::from(&config.paths.base_dir);

        let mesh = fort14::read_mesh(grid_dir.join("fort.14"))?;
        tracing::info!(
            nodes = mesh.node_count(),
            elements = mesh.element_count(),
            name = %mesh.name,
            "Mesh loaded"
        );

        let mut control = fort15::read_control(grid_dir.join("fort.15"), mesh.node_count())?;
        control.set_station_depths(&mesh);
        tracing::debug!(
            stations = control.stations.len(),
            rnday = control.time.rnday,
            "Model control loaded"
        );

        let basis = BasisSet::load(&basis_dir)?;
        tracing::info!(vectors = basis.len(), "Basis set loaded");

        let default_manning = read_default_manning(&save_dir, &grid_dir)?;

        let stager = Stager::new(&grid_dir, &save_dir, &base_dir);
        let runner = Arc::new(JobRunner::new(solver_command(&config, &base_dir)));
        let harvester = Arc::new(Harvester::new(&control));

        Ok(Self {
            config,
            mesh,
            control,
            basis: Arc::new(basis),
            default_manning,
            stager,
            runner,
            harvester,
        })
    }

    /// The loaded mesh
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// The loaded model control
    pub fn control(&self) -> &ModelControl {
        &self.control
    }

    /// Executes a full-output campaign
    ///
    /// Harvests every configured output file into whole-campaign arrays,
    /// checkpointing after each batch. A shutdown signal finishes the
    /// current batch, checkpoints, and returns with `interrupted` set.
    pub async fn execute(
        &self,
        weights: &Array2,
        shutdown: watch::Receiver<bool>,
    ) -> Result<EnsembleSummary> {
        let start = Instant::now();
        let mut summary = EnsembleSummary::new(weights.cols());
        self.check_weights(weights)?;

        let dry_run = self.config.application.dry_run;
        if !dry_run {
            self.runner.command().validate()?;
        }

        let manifest = self.capture_manifest()?;
        let digest = manifest.combined_digest();

        let state = StateManager::new(self.save_dir().join(&self.config.state.checkpoint_file));
        let mut checkpoint = self.load_or_create_checkpoint(&state, &digest, weights)?;
        summary.skipped = checkpoint.completed_count() + checkpoint.failed_count();

        let ts_keys = self.config.outputs.timeseries_keys();
        let nts_keys = self.config.outputs.non_timeseries_keys();
        let store = ResultsStore::new(self.save_dir().join(&self.config.state.results_file));
        let mut results = if summary.skipped > 0 && store.path().exists() {
            store.load()?
        } else {
            if !dry_run {
                store.archive_existing()?;
            }
            ResultsFile::new(
                checkpoint.run_id,
                weights.clone(),
                self.harvester
                    .allocate(&ts_keys, &nts_keys, weights.cols())?,
            )
        };
        if !dry_run {
            // Persist the weight matrix before any solver time is spent
            store.save(&results)?;
        }

        let pending = checkpoint.remaining();
        if pending.is_empty() {
            tracing::info!("Checkpoint shows no pending members; nothing to run");
            return Ok(summary.with_duration(start.elapsed()));
        }

        let slot_count = self.config.run.concurrent_runs.min(pending.len());
        let slots = self.stager.ensure_run_directories(slot_count)?;
        if !dry_run {
            self.initial_prep(&slots).await?;
        }

        let processor = self.batch_processor(dry_run);
        let mut shutdown = shutdown;
        for batch in pending.chunks(slots.len()) {
            if *shutdown.borrow_and_update() {
                tracing::info!("Shutdown requested; stopping before the next batch");
                summary.interrupted = true;
                break;
            }
            let members: Vec<BatchMember> = batch
                .iter()
                .map(|&member| BatchMember {
                    member,
                    data_index: member,
                })
                .collect();
            let outcome = processor
                .process_batch(&members, &slots, weights, &mut results.data)
                .await;

            for &member in &outcome.successful {
                checkpoint.mark(member, MemberStatus::Completed);
                summary.record_success();
            }
            for error in outcome.failed {
                checkpoint.mark(error.member, MemberStatus::Failed);
                summary.record_failure(error);
            }
            if self.config.state.enabled && !dry_run {
                state.save(&checkpoint)?;
            }
            if !dry_run {
                results.saved_at = Utc::now();
                store.save(&results)?;
            }

            tracing::info!(
                completed = checkpoint.completed_count(),
                failed = checkpoint.failed_count(),
                total = weights.cols(),
                "Batch finished"
            );
        }

        if self.config.verification.enable_verification && !dry_run {
            let verifier = Verifier::new(manifest);
            let report = verifier.verify(&results.data, &self.harvester);
            report.log_report();
            summary.verification_report = Some(report);
        }

        if self.config.run.cleanup && !dry_run && !summary.interrupted {
            self.stager.remove_run_directories()?;
        }

        let summary = summary.with_duration(start.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    /// Executes a quantity-of-interest campaign
    ///
    /// Harvests only the maximum-elevation field per member, applies the
    /// dry fix, and interpolates onto the given stations (or the control
    /// file's recording stations). Returns the QoI matrix, shape
    /// (member, station), alongside the summary.
    pub async fn execute_stations(
        &self,
        weights: &Array2,
        stations: Option<Vec<Station>>,
        shutdown: watch::Receiver<bool>,
    ) -> Result<(Array2, EnsembleSummary)> {
        let start = Instant::now();
        let mut summary = EnsembleSummary::new(weights.cols());
        self.check_weights(weights)?;

        let dry_run = self.config.application.dry_run;
        if !dry_run {
            self.runner.command().validate()?;
        }

        let stations = match stations {
            Some(stations) => stations,
            None => self.control.stations.clone(),
        };
        if stations.is_empty() {
            return Err(TiderunError::Validation(
                "Quantity-of-interest campaigns need at least one station".to_string(),
            ));
        }

        let manifest = self.capture_manifest()?;
        let digest = manifest.combined_digest();
        let state = StateManager::new(self.save_dir().join(&self.config.state.checkpoint_file));
        let mut checkpoint = self.load_or_create_checkpoint(&state, &digest, weights)?;
        summary.skipped = checkpoint.completed_count() + checkpoint.failed_count();

        let store = ResultsStore::new(self.save_dir().join(&self.config.state.results_file));
        let mut qoi = Array2::zeros(weights.cols(), stations.len());
        if summary.skipped > 0 && store.path().exists() {
            if let Some(saved) = store.load()?.qoi {
                if saved.rows() == qoi.rows() && saved.cols() == qoi.cols() {
                    qoi = saved;
                }
            }
        } else if !dry_run {
            store.archive_existing()?;
        }
        let mut results = ResultsFile::new(
            checkpoint.run_id,
            weights.clone(),
            crate::domain::RunData::new(),
        );
        results.qoi = Some(qoi.clone());
        if !dry_run {
            store.save(&results)?;
        }

        let pending = checkpoint.remaining();
        if pending.is_empty() {
            tracing::info!("Checkpoint shows no pending members; nothing to run");
            return Ok((qoi, summary.with_duration(start.elapsed())));
        }

        let slot_count = self.config.run.concurrent_runs.min(pending.len());
        let slots = self.stager.ensure_run_directories(slot_count)?;
        if !dry_run {
            self.initial_prep(&slots).await?;
        }

        let processor = self.batch_processor(dry_run);
        let mut shutdown = shutdown;
        for batch in pending.chunks(slots.len()) {
            if *shutdown.borrow_and_update() {
                tracing::info!("Shutdown requested; stopping before the next batch");
                summary.interrupted = true;
                break;
            }
            let members: Vec<BatchMember> = batch
                .iter()
                .enumerate()
                .map(|(i, &member)| BatchMember {
                    member,
                    data_index: i,
                })
                .collect();
            let mut batch_data = self
                .harvester
                .allocate(&[], &[OutputKey::Maxele63], batch.len())?;
            let outcome = processor
                .process_batch(&members, &slots, weights, &mut batch_data)
                .await;

            if !dry_run {
                batch_data.fix_dry_nodes_nts(&self.mesh);
            }
            for (i, &member) in batch.iter().enumerate() {
                if !outcome.successful.contains(&member) {
                    continue;
                }
                let values = batch_data
                    .nts_data
                    .get(&OutputKey::Maxele63)
                    .map(|a| a.column(i))
                    .unwrap_or_default();
                if dry_run {
                    checkpoint.mark(member, MemberStatus::Completed);
                    summary.record_success();
                    continue;
                }
                match interpolate_to_stations(&self.mesh, &values, &stations) {
                    Ok(interpolated) => {
                        for (s, value) in interpolated.iter().enumerate() {
                            qoi.set(member, s, *value);
                        }
                        checkpoint.mark(member, MemberStatus::Completed);
                        summary.record_success();
                    }
                    Err(e) => {
                        checkpoint.mark(member, MemberStatus::Failed);
                        summary.record_failure(MemberError::new(
                            member,
                            "interpolate",
                            e.to_string(),
                        ));
                    }
                }
            }
            for error in outcome.failed {
                checkpoint.mark(error.member, MemberStatus::Failed);
                summary.record_failure(error);
            }
            if self.config.state.enabled && !dry_run {
                state.save(&checkpoint)?;
            }
            if !dry_run {
                results.qoi = Some(qoi.clone());
                results.saved_at = Utc::now();
                store.save(&results)?;
            }

            tracing::info!(
                completed = checkpoint.completed_count(),
                failed = checkpoint.failed_count(),
                total = weights.cols(),
                "Batch finished"
            );
        }

        if self.config.run.cleanup && !dry_run && !summary.interrupted {
            self.stager.remove_run_directories()?;
        }

        let summary = summary.with_duration(start.elapsed());
        summary.log_summary();
        Ok((qoi, summary))
    }

    fn save_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.paths.save_dir)
    }

    fn check_weights(&self, weights: &Array2) -> Result<()> {
        if weights.rows() != self.basis.len() {
            return Err(TiderunError::Validation(format!(
                "Weight matrix has {} rows for {} basis vectors",
                weights.rows(),
                self.basis.len()
            )));
        }
        if weights.cols() == 0 {
            return Err(TiderunError::Validation(
                "Weight matrix has no members".to_string(),
            ));
        }
        Ok(())
    }

    /// Digests the static inputs that must not drift mid-campaign
    fn capture_manifest(&self) -> Result<InputManifest> {
        let grid_dir = PathBuf::from(&self.config.paths.grid_dir);
        InputManifest::capture(&[
            grid_dir.join("fort.14"),
            grid_dir.join("fort.15"),
            grid_dir.join("fort.22"),
            self.save_dir().join("fort.13"),
        ])
    }

    fn load_or_create_checkpoint(
        &self,
        state: &StateManager,
        digest: &str,
        weights: &Array2,
    ) -> Result<Checkpoint> {
        if self.config.state.enabled {
            if let Some(existing) = state.load()? {
                if existing.matches(digest, weights) {
                    tracing::info!(
                        run_id = %existing.run_id,
                        completed = existing.completed_count(),
                        "Resuming campaign from checkpoint"
                    );
                    return Ok(existing);
                }
                tracing::warn!(
                    "Checkpoint on disk belongs to different inputs; starting fresh"
                );
            }
        }
        Ok(Checkpoint::new(
            RunId::generate(),
            digest.to_string(),
            weights.clone(),
        ))
    }

    /// Partitions the mesh and preps all inputs once per slot
    async fn initial_prep(&self, slots: &[PathBuf]) -> Result<()> {
        let preps = slots.iter().map(|slot| async move {
            self.runner.run_prep(slot, PrepStage::Partition).await?;
            self.runner.run_prep(slot, PrepStage::Full).await?;
            Ok::<(), TiderunError>(())
        });
        for outcome in futures::future::join_all(preps).await {
            outcome?;
        }
        tracing::debug!(slots = slots.len(), "Initial prep finished");
        Ok(())
    }

    fn batch_processor(&self, dry_run: bool) -> BatchProcessor {
        BatchProcessor::new(
            self.runner.clone(),
            self.basis.clone(),
            self.harvester.clone(),
            self.default_manning,
            self.mesh.node_count(),
            format!("{} roughness field", self.mesh.name),
            dry_run,
        )
    }
}

/// Reads the baseline Manning's n default, preferring the save dir copy
fn read_default_manning(save_dir: &Path, grid_dir: &Path) -> Result<f64> {
    let save_copy = save_dir.join("fort.13");
    if save_copy.exists() {
        return fort13::read_manning_default(save_copy);
    }
    let grid_copy = grid_dir.join("fort.13");
    if grid_copy.exists() {
        return fort13::read_manning_default(grid_copy);
    }
    Err(TiderunError::Configuration(format!(
        "No baseline fort.13 found in {} or {}",
        save_dir.display(),
        grid_dir.display()
    )))
}

/// Builds the solver command from config, resolving names against base_dir
fn solver_command(config: &TiderunConfig, base_dir: &Path) -> SolverCommand {
    let resolve = |name: &str| -> PathBuf {
        let path = PathBuf::from(name);
        if path.is_absolute() {
            path
        } else {
            base_dir.join(path)
        }
    };
    SolverCommand {
        adcprep: resolve(&config.run.adcprep),
        padcirc: resolve(&config.run.padcirc),
        mpirun: config.run.mpirun.as_ref().map(PathBuf::from),
        procs_per_job: config.run.procs_per_job,
        tasks_per_node: config.run.tasks_per_node,
        writers: config.run.writers,
        screen_output: config.run.screen_output,
        timeout_seconds: config.run.timeout_seconds,
    }
}
