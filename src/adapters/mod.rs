//! External-facing adapters
//!
//! This module contains everything that touches the world outside the
//! process: the ADCIRC file formats on disk and the solver executables.
//!
//! - [`grid`] - fort.14 / fort.13 / fort.15 readers and writers
//! - [`output`] - solver output parsers (fort.61, fort.63, maxele.63, ...)
//! - [`solver`] - adcprep / padcirc process execution

pub mod grid;
pub mod output;
pub mod solver;
