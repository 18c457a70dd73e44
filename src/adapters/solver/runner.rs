//! Async solver process execution
//!
//! Runs one adcprep or padcirc step in a run directory with an optional
//! time budget. Children that outlive the budget are killed. Solver output
//! either passes through to the console or lands in a per-directory log
//! file, mirroring the screen/no-screen switch HPC operators expect.

use super::prep::{write_prep_input, PrepStage};
use crate::domain::errors::SolverError;
use crate::domain::Result;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::time::timeout;

/// Configuration of the external executables
#[derive(Debug, Clone)]
pub struct SolverCommand {
    /// Path to the adcprep executable
    pub adcprep: PathBuf,
    /// Path to the padcirc executable
    pub padcirc: PathBuf,
    /// MPI launcher; `None` runs padcirc without one
    pub mpirun: Option<PathBuf>,
    /// MPI processes per solve
    pub procs_per_job: usize,
    /// Tasks per node for the launcher (mpirun --npernode)
    pub tasks_per_node: Option<usize>,
    /// Dedicated ascii-writer processes (padcirc -W), must be < procs_per_job
    pub writers: Option<usize>,
    /// Pass solver output through instead of logging it to a file
    pub screen_output: bool,
    /// Kill a stage after this many seconds
    pub timeout_seconds: Option<u64>,
}

impl SolverCommand {
    /// Checks that the configured executables exist
    pub fn validate(&self) -> Result<()> {
        for exe in [&self.adcprep, &self.padcirc] {
            if !exe.exists() {
                return Err(SolverError::MissingExecutable(exe.display().to_string()).into());
            }
        }
        if let Some(mpirun) = &self.mpirun {
            // Bare names resolve through PATH at spawn time
            if mpirun.components().count() > 1 && !mpirun.exists() {
                return Err(SolverError::MissingExecutable(mpirun.display().to_string()).into());
            }
        }
        Ok(())
    }
}

/// Result of one completed stage
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub stage: String,
    pub exit_code: i32,
    pub duration: Duration,
}

/// Runs solver stages in run directories
#[derive(Debug, Clone)]
pub struct JobRunner {
    command: SolverCommand,
}

impl JobRunner {
    /// Creates a runner for the given solver configuration
    pub fn new(command: SolverCommand) -> Self {
        Self { command }
    }

    /// The solver configuration
    pub fn command(&self) -> &SolverCommand {
        &self.command
    }

    /// Runs one adcprep stage in `dir`
    ///
    /// Writes the stage's answer file first, then pipes it to adcprep's
    /// stdin.
    pub async fn run_prep(&self, dir: &Path, stage: PrepStage) -> Result<JobOutcome> {
        let input = write_prep_input(dir, stage, self.command.procs_per_job)?;
        let stdin = std::fs::File::open(&input).map_err(|e| SolverError::LaunchFailed {
            stage: stage.name().to_string(),
            message: e.to_string(),
        })?;

        let mut cmd = Command::new(&self.command.adcprep);
        cmd.current_dir(dir).stdin(Stdio::from(stdin));
        self.wire_output(&mut cmd, dir, "adcprep_o.txt")?;
        self.wait(cmd, stage.name()).await
    }

    /// Runs one padcirc solve in `dir`
    ///
    /// The run directory is passed as both input and output directory so
    /// every member's files stay in its own slot.
    pub async fn run_solve(&self, dir: &Path) -> Result<JobOutcome> {
        let mut cmd = match &self.command.mpirun {
            Some(mpirun) => {
                let mut cmd = Command::new(mpirun);
                cmd.arg("-np").arg(self.command.procs_per_job.to_string());
                if let Some(tasks) = self.command.tasks_per_node {
                    cmd.arg("--npernode").arg(tasks.to_string());
                }
                cmd.arg(&self.command.padcirc);
                cmd
            }
            None => Command::new(&self.command.padcirc),
        };
        cmd.arg("-I").arg(dir).arg("-O").arg(dir);
        if let Some(writers) = self.command.writers {
            cmd.arg("-W").arg(writers.to_string());
        }
        cmd.current_dir(dir).stdin(Stdio::null());
        self.wire_output(&mut cmd, dir, "padcirc_o.txt")?;
        self.wait(cmd, "padcirc").await
    }

    /// Points child stdout/stderr at the console or a log file
    fn wire_output(&self, cmd: &mut Command, dir: &Path, log_name: &str) -> Result<()> {
        if self.command.screen_output {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        } else {
            let log = std::fs::File::create(dir.join(log_name))?;
            let log_err = log.try_clone()?;
            cmd.stdout(Stdio::from(log)).stderr(Stdio::from(log_err));
        }
        Ok(())
    }

    /// Spawns and waits, enforcing the configured time budget
    async fn wait(&self, mut cmd: Command, stage: &str) -> Result<JobOutcome> {
        let start = Instant::now();
        let mut child = cmd.spawn().map_err(|e| SolverError::LaunchFailed {
            stage: stage.to_string(),
            message: e.to_string(),
        })?;

        let status = match self.command.timeout_seconds {
            Some(seconds) => match timeout(Duration::from_secs(seconds), child.wait()).await {
                Ok(status) => status,
                Err(_) => {
                    let _ = child.kill().await;
                    tracing::warn!(stage, seconds, "Stage timed out and was killed");
                    return Err(SolverError::Timeout {
                        stage: stage.to_string(),
                        seconds,
                    }
                    .into());
                }
            },
            None => child.wait().await,
        };

        let status = status.map_err(|e| SolverError::LaunchFailed {
            stage: stage.to_string(),
            message: e.to_string(),
        })?;

        let duration = start.elapsed();
        match status.code() {
            Some(0) => {
                tracing::debug!(stage, duration_ms = duration.as_millis() as u64, "Stage completed");
                Ok(JobOutcome {
                    stage: stage.to_string(),
                    exit_code: 0,
                    duration,
                })
            }
            Some(code) => Err(SolverError::Failed {
                stage: stage.to_string(),
                code,
            }
            .into()),
            None => Err(SolverError::Killed {
                stage: stage.to_string(),
            }
            .into()),
        }
    }
}
