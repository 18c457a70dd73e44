//! External solver processes
//!
//! Everything that touches the `adcprep` and `padcirc` executables lives
//! here: building the launch command lines, writing the adcprep answer
//! files, and waiting on the children with a time budget.

pub mod prep;
pub mod runner;
pub mod traits;

pub use prep::PrepStage;
pub use runner::{JobOutcome, JobRunner, SolverCommand};
pub use traits::SolverBackend;
