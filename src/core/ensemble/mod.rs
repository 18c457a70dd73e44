//! Ensemble campaign orchestration
//!
//! The coordinator drives the whole cycle: stage run slots, generate each
//! member's roughness field, prep and solve in bounded-concurrency batches,
//! harvest outputs, and checkpoint after every batch.

pub mod batch;
pub mod coordinator;
pub mod summary;

pub use batch::{BatchMember, BatchProcessor, BatchResult};
pub use coordinator::EnsembleCoordinator;
pub use summary::{EnsembleSummary, MemberError};
