//! Checksum calculation for input verification

use crate::domain::Result;
use sha2::{Digest, Sha256};
use std::path::Path;

/// SHA-256 of raw bytes, hex encoded
pub fn checksum_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    format!("{result:x}")
}

/// SHA-256 of a file's contents, hex encoded
pub fn checksum_file(path: impl AsRef<Path>) -> Result<String> {
    let contents = std::fs::read(path.as_ref())?;
    Ok(checksum_bytes(&contents))
}
