//! Campaign checkpoint model
//!
//! A checkpoint records which ensemble members have finished so an
//! interrupted campaign resumes where it stopped instead of re-running
//! days of solver time.

use crate::domain::ids::RunId;
use crate::domain::Array2;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Completion status of one ensemble member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    /// Not yet run
    #[default]
    Pending,
    /// Ran and harvested successfully
    Completed,
    /// Ran and failed; will not be retried within this campaign
    Failed,
}

/// Persisted campaign state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Campaign identity
    pub run_id: RunId,

    /// When the campaign started
    pub created_at: DateTime<Utc>,

    /// When the checkpoint was last written
    pub updated_at: DateTime<Utc>,

    /// SHA-256 over the staged static inputs at campaign start
    pub input_digest: String,

    /// The weight matrix the campaign is running, shape (basis, member)
    pub weights: Array2,

    /// Per-member completion status, indexed by member
    pub members: Vec<MemberStatus>,
}

impl Checkpoint {
    /// Starts a fresh checkpoint for a weight matrix
    pub fn new(run_id: RunId, input_digest: String, weights: Array2) -> Self {
        let now = Utc::now();
        let members = vec![MemberStatus::Pending; weights.cols()];
        Self {
            run_id,
            created_at: now,
            updated_at: now,
            input_digest,
            weights,
            members,
        }
    }

    /// Records a member's outcome and bumps the update time
    pub fn mark(&mut self, member: usize, status: MemberStatus) {
        if let Some(slot) = self.members.get_mut(member) {
            *slot = status;
        }
        self.updated_at = Utc::now();
    }

    /// Members still pending, in order
    pub fn remaining(&self) -> Vec<usize> {
        self.members
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == MemberStatus::Pending)
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of completed members
    pub fn completed_count(&self) -> usize {
        self.members
            .iter()
            .filter(|s| **s == MemberStatus::Completed)
            .count()
    }

    /// Number of failed members
    pub fn failed_count(&self) -> usize {
        self.members
            .iter()
            .filter(|s| **s == MemberStatus::Failed)
            .count()
    }

    /// True once no member is pending
    pub fn is_complete(&self) -> bool {
        self.remaining().is_empty()
    }

    /// True when this checkpoint belongs to the same inputs and weights
    ///
    /// Used to decide whether a checkpoint on disk can resume the requested
    /// campaign or must be discarded.
    pub fn matches(&self, input_digest: &str, weights: &Array2) -> bool {
        self.input_digest == input_digest && &self.weights == weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkpoint() -> Checkpoint {
        Checkpoint::new(
            RunId::generate(),
            "digest".to_string(),
            Array2::zeros(2, 4),
        )
    }

    #[test]
    fn test_new_checkpoint_all_pending() {
        let cp = checkpoint();
        assert_eq!(cp.members.len(), 4);
        assert_eq!(cp.remaining(), vec![0, 1, 2, 3]);
        assert!(!cp.is_complete());
    }

    #[test]
    fn test_mark_and_counts() {
        let mut cp = checkpoint();
        cp.mark(0, MemberStatus::Completed);
        cp.mark(2, MemberStatus::Failed);
        assert_eq!(cp.remaining(), vec![1, 3]);
        assert_eq!(cp.completed_count(), 1);
        assert_eq!(cp.failed_count(), 1);
    }

    #[test]
    fn test_complete_when_no_pending() {
        let mut cp = checkpoint();
        for i in 0..4 {
            cp.mark(i, MemberStatus::Completed);
        }
        assert!(cp.is_complete());
    }

    #[test]
    fn test_mark_out_of_range_is_ignored() {
        let mut cp = checkpoint();
        cp.mark(99, MemberStatus::Completed);
        assert_eq!(cp.completed_count(), 0);
    }

    #[test]
    fn test_matches() {
        let cp = checkpoint();
        assert!(cp.matches("digest", &Array2::zeros(2, 4)));
        assert!(!cp.matches("other", &Array2::zeros(2, 4)));
        assert!(!cp.matches("digest", &Array2::zeros(2, 5)));
    }

    #[test]
    fn test_serde_roundtrip() {
        let cp = checkpoint();
        let json = serde_json::to_string(&cp).unwrap();
        let back: Checkpoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back.run_id, cp.run_id);
        assert_eq!(back.members, cp.members);
    }
}
