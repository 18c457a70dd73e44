//! Campaign summary and reporting

use crate::core::verification::VerificationReport;
use std::time::Duration;

/// One member's failure, with the stage that broke
#[derive(Debug, Clone)]
pub struct MemberError {
    /// Ensemble member index
    pub member: usize,
    /// Stage that failed: field, prep, solve, or harvest
    pub stage: String,
    /// Error message
    pub message: String,
}

impl MemberError {
    /// Creates a member error
    pub fn new(member: usize, stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            member,
            stage: stage.into(),
            message: message.into(),
        }
    }
}

/// Summary of an ensemble campaign
#[derive(Debug, Clone)]
pub struct EnsembleSummary {
    /// Total members in the weight matrix
    pub total_members: usize,

    /// Members solved and harvested this invocation
    pub successful: usize,

    /// Members that failed this invocation
    pub failed: usize,

    /// Members skipped because a checkpoint already settled them
    pub skipped: usize,

    /// True when a shutdown signal stopped the campaign early
    pub interrupted: bool,

    /// Wall-clock duration
    pub duration: Duration,

    /// Member failures in occurrence order
    pub errors: Vec<MemberError>,

    /// Verification report, when verification ran
    pub verification_report: Option<VerificationReport>,
}

impl EnsembleSummary {
    /// Creates an empty summary for a campaign size
    pub fn new(total_members: usize) -> Self {
        Self {
            total_members,
            successful: 0,
            failed: 0,
            skipped: 0,
            interrupted: false,
            duration: Duration::from_secs(0),
            errors: Vec::new(),
            verification_report: None,
        }
    }

    /// Sets the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Records a completed member
    pub fn record_success(&mut self) {
        self.successful += 1;
    }

    /// Records a failed member
    pub fn record_failure(&mut self, error: MemberError) {
        self.failed += 1;
        self.errors.push(error);
    }

    /// True when nothing failed and verification (if run) passed
    pub fn is_successful(&self) -> bool {
        self.failed == 0
            && self
                .verification_report
                .as_ref()
                .map(|r| r.passed())
                .unwrap_or(true)
    }

    /// Completed fraction of attempted members, as a percentage
    pub fn success_rate(&self) -> f64 {
        let attempted = self.successful + self.failed;
        if attempted == 0 {
            return 100.0;
        }
        (self.successful as f64 / attempted as f64) * 100.0
    }

    /// Logs the summary
    pub fn log_summary(&self) {
        tracing::info!(
            total_members = self.total_members,
            successful = self.successful,
            failed = self.failed,
            skipped = self.skipped,
            interrupted = self.interrupted,
            duration_secs = self.duration.as_secs(),
            success_rate = format!("{:.2}%", self.success_rate()),
            "Campaign finished"
        );

        if !self.errors.is_empty() {
            tracing::warn!(error_count = self.errors.len(), "Campaign had member failures");
            for error in &self.errors {
                tracing::warn!(
                    member = error.member,
                    stage = %error.stage,
                    message = %error.message,
                    "Member failed"
                );
            }
        }
    }
}
