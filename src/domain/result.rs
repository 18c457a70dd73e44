//! Result type alias for Tiderun operations

use crate::domain::errors::TiderunError;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, TiderunError>;
