//! Domain error types
//!
//! This module defines the error hierarchy for Tiderun. All errors are
//! domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main Tiderun error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum TiderunError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// ADCIRC input/output file format errors
    #[error("Grid file error: {0}")]
    Grid(#[from] GridError),

    /// External solver process errors
    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    /// Run-directory staging errors
    #[error("Staging error: {0}")]
    Staging(String),

    /// Parameter sampling errors
    #[error("Sampling error: {0}")]
    Sampling(String),

    /// Output collection errors
    #[error("Collection error: {0}")]
    Collect(String),

    /// State management errors
    #[error("State management error: {0}")]
    State(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// ADCIRC file format errors
///
/// Errors that occur when reading or writing the Fortran-style input and
/// output files (`fort.14`, `fort.13`, `fort.15`, `fort.61`, `maxele.63`, ...).
#[derive(Debug, Error)]
pub enum GridError {
    /// Input file does not exist
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// A line failed to parse
    #[error("Malformed {file} at line {line}: {message}")]
    Malformed {
        file: String,
        line: usize,
        message: String,
    },

    /// File ended before the declared record count was reached
    #[error("Truncated {file}: ended during record {record}")]
    Truncated { file: String, record: usize },

    /// Output file name does not map to a supported key
    #[error("Unsupported output file: {0}")]
    UnknownOutputKey(String),

    /// A required nodal attribute is missing from fort.13
    #[error("Nodal attribute not found: {0}")]
    MissingAttribute(String),

    /// Node count disagrees between files
    #[error("Node count mismatch: expected {expected}, found {found}")]
    NodeCountMismatch { expected: usize, found: usize },

    /// Element references a node outside the mesh
    #[error("Element {element} references unknown node {node}")]
    DanglingNode { element: usize, node: u32 },
}

/// External solver process errors
///
/// Errors that occur when launching or waiting on `adcprep`/`padcirc`.
#[derive(Debug, Error)]
pub enum SolverError {
    /// The executable could not be found or spawned
    #[error("Failed to launch {stage}: {message}")]
    LaunchFailed { stage: String, message: String },

    /// The process exited with a non-zero status
    #[error("{stage} failed with exit code {code}")]
    Failed { stage: String, code: i32 },

    /// The process was killed by a signal
    #[error("{stage} terminated by signal")]
    Killed { stage: String },

    /// The process exceeded its time budget and was killed
    #[error("{stage} timed out after {seconds}s")]
    Timeout { stage: String, seconds: u64 },

    /// A configured executable path does not exist
    #[error("Executable not found: {0}")]
    MissingExecutable(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for TiderunError {
    fn from(err: std::io::Error) -> Self {
        TiderunError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for TiderunError {
    fn from(err: serde_json::Error) -> Self {
        TiderunError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for TiderunError {
    fn from(err: toml::de::Error) -> Self {
        TiderunError::Configuration(format!("TOML parse error: {err}"))
    }
}
