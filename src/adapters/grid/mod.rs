//! ADCIRC grid and control file formats
//!
//! Readers and writers for the Fortran-style whitespace-separated input
//! files: `fort.14` (mesh), `fort.13` (nodal attributes), and `fort.15`
//! (model control). Parse errors carry the file name and line number.

pub mod fort13;
pub mod fort14;
pub mod fort15;

use crate::domain::errors::GridError;
use std::path::Path;

/// Name a path for error messages
pub(crate) fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Parse one whitespace-separated field from a line
pub(crate) fn parse_field<T: std::str::FromStr>(
    field: Option<&str>,
    file: &str,
    line: usize,
    what: &str,
) -> Result<T, GridError> {
    field
        .and_then(|f| f.parse().ok())
        .ok_or_else(|| GridError::Malformed {
            file: file.to_string(),
            line,
            message: format!("expected {what}"),
        })
}
