//! Manning's n field generation
//!
//! Roughness fields are linear combinations of land-use basis vectors: each
//! `landuse_*` directory under the basis dir contributes one vector of
//! per-node coverage multipliers, and an ensemble member's weight vector
//! scales them into a full nodal field.

pub mod basis;

pub use basis::{BasisSet, BasisVector};
