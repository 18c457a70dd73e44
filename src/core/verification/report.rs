//! Verification reporting

use serde::{Deserialize, Serialize};

/// Outcome of one verification check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationCheck {
    /// What was checked
    pub name: String,
    /// Whether the check passed
    pub passed: bool,
    /// Failure detail, absent on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl VerificationCheck {
    /// A passing check
    pub fn pass(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            detail: None,
        }
    }

    /// A failing check with detail
    pub fn fail(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            detail: Some(detail.into()),
        }
    }
}

/// Collected verification results for a campaign
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationReport {
    pub checks: Vec<VerificationCheck>,
}

impl VerificationReport {
    /// An empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a check
    pub fn add(&mut self, check: VerificationCheck) {
        self.checks.push(check);
    }

    /// True when every check passed
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// Number of failed checks
    pub fn failure_count(&self) -> usize {
        self.checks.iter().filter(|c| !c.passed).count()
    }

    /// Logs the report
    pub fn log_report(&self) {
        if self.passed() {
            tracing::info!(checks = self.checks.len(), "Verification passed");
        } else {
            tracing::warn!(
                checks = self.checks.len(),
                failures = self.failure_count(),
                "Verification found problems"
            );
            for check in self.checks.iter().filter(|c| !c.passed) {
                tracing::warn!(
                    check = %check.name,
                    detail = check.detail.as_deref().unwrap_or(""),
                    "Verification failure"
                );
            }
        }
    }
}
