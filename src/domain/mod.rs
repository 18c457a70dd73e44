//! Domain models and types for Tiderun.
//!
//! This module contains the core domain models, types, and invariants of the
//! ensemble framework: the computational mesh, recording stations, dense
//! harvest arrays, and the error hierarchy.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`NodeId`], [`RunId`], [`OutputKey`])
//! - **Mesh and control models** ([`Mesh`], [`Station`], [`ModelControl`])
//! - **Harvest data** ([`Array2`], [`Array3`], [`RunData`])
//! - **Error types** ([`TiderunError`], [`GridError`], [`SolverError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Node ids are 1-based in ADCIRC files; the [`NodeId`] newtype keeps the
//! off-by-one conversion in one place:
//!
//! ```rust
//! use tiderun::domain::NodeId;
//!
//! # fn example() -> Result<(), String> {
//! let node = NodeId::new(12)?;
//! assert_eq!(node.index(), 11);
//! # Ok(())
//! # }
//! ```

pub mod array;
pub mod errors;
pub mod ids;
pub mod mesh;
pub mod result;
pub mod run;
pub mod station;

// Re-export commonly used types
pub use array::{Array2, Array3};
pub use errors::{GridError, SolverError, TiderunError};
pub use ids::{NodeId, OutputKey, RunId};
pub use mesh::{Element, Mesh, Node};
pub use result::Result;
pub use run::{RunData, DRY_VALUE};
pub use station::{ModelControl, RecordingInfo, Station, TimeControl};
