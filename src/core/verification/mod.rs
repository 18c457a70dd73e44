//! Campaign verification
//!
//! Input-digest capture at campaign start, drift detection at the end, and
//! shape checks on the harvested arrays.

pub mod checksum;
pub mod report;
pub mod verify;

pub use checksum::{checksum_bytes, checksum_file};
pub use report::{VerificationCheck, VerificationReport};
pub use verify::{InputManifest, Verifier};
