//! Post-campaign verification
//!
//! Long campaigns leave days between staging and the final harvest; this
//! pass detects static inputs that drifted on disk mid-campaign and
//! harvested arrays whose shapes disagree with the recording table.

use super::checksum::checksum_file;
use super::report::{VerificationCheck, VerificationReport};
use crate::core::collect::Harvester;
use crate::domain::{Result, RunData};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Digests of the static inputs captured at campaign start
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputManifest {
    /// Absolute path to hex digest
    pub entries: BTreeMap<PathBuf, String>,
}

impl InputManifest {
    /// Digests the given files, skipping ones that do not exist
    pub fn capture(paths: &[PathBuf]) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for path in paths {
            if path.exists() {
                entries.insert(path.clone(), checksum_file(path)?);
            }
        }
        Ok(Self { entries })
    }

    /// Combined digest over every entry, for checkpoint identity
    pub fn combined_digest(&self) -> String {
        let mut joined = String::new();
        for (path, digest) in &self.entries {
            joined.push_str(&path.to_string_lossy());
            joined.push('=');
            joined.push_str(digest);
            joined.push('\n');
        }
        super::checksum::checksum_bytes(joined.as_bytes())
    }
}

/// Runs verification checks against a finished campaign
pub struct Verifier {
    manifest: InputManifest,
}

impl Verifier {
    /// Creates a verifier from the captured manifest
    pub fn new(manifest: InputManifest) -> Self {
        Self { manifest }
    }

    /// Recomputes every input digest and compares
    pub fn verify_inputs(&self) -> VerificationReport {
        let mut report = VerificationReport::new();
        for (path, expected) in &self.manifest.entries {
            let name = format!("input digest {}", display_name(path));
            match checksum_file(path) {
                Ok(actual) if &actual == expected => report.add(VerificationCheck::pass(name)),
                Ok(_) => report.add(VerificationCheck::fail(
                    name,
                    "contents changed during the campaign",
                )),
                Err(e) => report.add(VerificationCheck::fail(name, e.to_string())),
            }
        }
        report
    }

    /// Checks harvested arrays against the recording table
    pub fn verify_shapes(&self, data: &RunData, harvester: &Harvester) -> VerificationReport {
        let mut report = VerificationReport::new();
        let members = data.member_count();
        for (key, array) in &data.ts_data {
            let name = format!("shape {key}");
            match harvester.recording_info(*key) {
                Some(info) => {
                    let expected = (info.locations, info.records, members);
                    if array.shape() == expected && array.is_consistent() {
                        report.add(VerificationCheck::pass(name));
                    } else {
                        report.add(VerificationCheck::fail(
                            name,
                            format!("expected {:?}, found {:?}", expected, array.shape()),
                        ));
                    }
                }
                None => report.add(VerificationCheck::fail(name, "no recording info")),
            }
        }
        for (key, array) in &data.nts_data {
            let name = format!("shape {key}");
            match harvester.recording_info(*key) {
                Some(info) => {
                    if array.rows() == info.locations
                        && array.cols() == members
                        && array.is_consistent()
                    {
                        report.add(VerificationCheck::pass(name));
                    } else {
                        report.add(VerificationCheck::fail(
                            name,
                            format!(
                                "expected ({}, {members}), found ({}, {})",
                                info.locations,
                                array.rows(),
                                array.cols()
                            ),
                        ));
                    }
                }
                None => report.add(VerificationCheck::fail(name, "no recording info")),
            }
        }
        report
    }

    /// Full verification: inputs plus shapes
    pub fn verify(&self, data: &RunData, harvester: &Harvester) -> VerificationReport {
        let mut report = self.verify_inputs();
        let shapes = self.verify_shapes(data, harvester);
        for check in shapes.checks {
            report.add(check);
        }
        report
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::OutputKey;
    use crate::domain::station::{ModelControl, RecordingInfo, TimeControl};
    use crate::domain::Array2;
    use tempfile::TempDir;

    #[test]
    fn test_manifest_capture_and_verify() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fort.14");
        std::fs::write(&path, "mesh").unwrap();

        let manifest = InputManifest::capture(&[path.clone()]).unwrap();
        assert_eq!(manifest.entries.len(), 1);

        let verifier = Verifier::new(manifest);
        assert!(verifier.verify_inputs().passed());

        std::fs::write(&path, "tampered mesh").unwrap();
        let report = verifier.verify_inputs();
        assert!(!report.passed());
    }

    #[test]
    fn test_manifest_skips_missing_files() {
        let manifest =
            InputManifest::capture(&[PathBuf::from("/nonexistent/fort.22")]).unwrap();
        assert!(manifest.entries.is_empty());
    }

    #[test]
    fn test_combined_digest_changes_with_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fort.14");
        std::fs::write(&path, "one").unwrap();
        let a = InputManifest::capture(&[path.clone()]).unwrap().combined_digest();
        std::fs::write(&path, "two").unwrap();
        let b = InputManifest::capture(&[path]).unwrap().combined_digest();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_shapes() {
        let mut recording = std::collections::BTreeMap::new();
        recording.insert(
            OutputKey::Maxele63,
            RecordingInfo {
                locations: 3,
                records: 1,
                value_dims: 1,
            },
        );
        let control = ModelControl {
            time: TimeControl { rnday: 1.0, dt: 1.0 },
            stations: Vec::new(),
            recording,
        };
        let harvester = Harvester::new(&control);

        let mut data = RunData::new();
        data.nts_data.insert(OutputKey::Maxele63, Array2::zeros(3, 2));

        let verifier = Verifier::new(InputManifest {
            entries: BTreeMap::new(),
        });
        assert!(verifier.verify_shapes(&data, &harvester).passed());

        data.nts_data.insert(OutputKey::Maxele63, Array2::zeros(4, 2));
        assert!(!verifier.verify_shapes(&data, &harvester).passed());
    }
}
