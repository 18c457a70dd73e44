//! Results persistence
//!
//! Aggregated run data is saved after every batch so a killed campaign
//! loses at most one batch of solver time. An existing results file from a
//! previous campaign is archived under a counted prefix rather than
//! clobbered.

use crate::domain::ids::RunId;
use crate::domain::mesh::Mesh;
use crate::domain::station::Station;
use crate::domain::{Array2, Result, RunData, TiderunError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One campaign's persisted results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsFile {
    /// Campaign identity
    pub run_id: RunId,

    /// When this file was last written
    pub saved_at: DateTime<Utc>,

    /// Weight matrix, shape (basis, member)
    pub weights: Array2,

    /// Harvested output arrays
    pub data: RunData,

    /// Station quantities of interest, shape (member, station), when the
    /// campaign ran in QoI mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qoi: Option<Array2>,
}

impl ResultsFile {
    /// Creates a results file for a campaign
    pub fn new(run_id: RunId, weights: Array2, data: RunData) -> Self {
        Self {
            run_id,
            saved_at: Utc::now(),
            weights,
            data,
            qoi: None,
        }
    }

    /// Reapplies the dry-value fix to whichever keys are present
    ///
    /// Persisted arrays hold the solver's raw sentinel values; loading for
    /// analysis undoes them against the mesh and stations.
    pub fn apply_dry_fix(&mut self, mesh: &Mesh, stations: &[Station]) {
        self.data.fix_dry_stations(stations);
        self.data.fix_dry_nodes(mesh);
        self.data.fix_dry_nodes_nts(mesh);
    }
}

/// Saves and loads results files
#[derive(Debug, Clone)]
pub struct ResultsStore {
    path: PathBuf,
}

impl ResultsStore {
    /// Creates a store for a results file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The results file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saves results atomically
    pub fn save(&self, results: &ResultsFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string(results)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents)
            .map_err(|e| TiderunError::State(format!("Failed to write results: {e}")))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| TiderunError::State(format!("Failed to replace results: {e}")))?;
        Ok(())
    }

    /// Loads results
    pub fn load(&self) -> Result<ResultsFile> {
        let contents = fs::read_to_string(&self.path)
            .map_err(|e| TiderunError::State(format!("Failed to read results: {e}")))?;
        let results: ResultsFile = serde_json::from_str(&contents)
            .map_err(|e| TiderunError::State(format!("Failed to parse results: {e}")))?;
        for (key, array) in &results.data.ts_data {
            if !array.is_consistent() {
                return Err(TiderunError::State(format!(
                    "Results file is corrupt: {key} array shape disagrees with its data"
                )));
            }
        }
        for (key, array) in &results.data.nts_data {
            if !array.is_consistent() {
                return Err(TiderunError::State(format!(
                    "Results file is corrupt: {key} array shape disagrees with its data"
                )));
            }
        }
        Ok(results)
    }

    /// Moves an existing results file out of the way
    ///
    /// Renames to `{n}{name}` where n counts prior archives, and returns the
    /// archive path if a file was moved.
    pub fn archive_existing(&self) -> Result<Option<PathBuf>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let dir = self
            .path
            .parent()
            .ok_or_else(|| TiderunError::State("Results path has no parent".to_string()))?;
        let name = self
            .path
            .file_name()
            .ok_or_else(|| TiderunError::State("Results path has no file name".to_string()))?
            .to_string_lossy()
            .into_owned();
        let prior = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                let entry_name = entry.file_name().to_string_lossy().into_owned();
                entry_name.ends_with(&name) && entry_name != name
            })
            .count();
        let archive = dir.join(format!("{prior}{name}"));
        fs::rename(&self.path, &archive)
            .map_err(|e| TiderunError::State(format!("Failed to archive results: {e}")))?;
        tracing::info!(archive = %archive.display(), "Archived previous results file");
        Ok(Some(archive))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::OutputKey;
    use crate::domain::run::DRY_VALUE;
    use crate::domain::Array3;
    use tempfile::TempDir;

    fn results() -> ResultsFile {
        let mut data = RunData::new();
        data.nts_data.insert(OutputKey::Maxele63, Array2::zeros(3, 2));
        ResultsFile::new(RunId::generate(), Array2::zeros(2, 2), data)
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = ResultsStore::new(dir.path().join("results.json"));
        let saved = results();
        store.save(&saved).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded.run_id, saved.run_id);
        assert_eq!(loaded.weights, saved.weights);
        assert!(loaded.qoi.is_none());
    }

    #[test]
    fn test_archive_existing_counts_up() {
        let dir = TempDir::new().unwrap();
        let store = ResultsStore::new(dir.path().join("results.json"));
        assert!(store.archive_existing().unwrap().is_none());

        store.save(&results()).unwrap();
        let first = store.archive_existing().unwrap().unwrap();
        assert_eq!(first.file_name().unwrap(), "0results.json");

        store.save(&results()).unwrap();
        let second = store.archive_existing().unwrap().unwrap();
        assert_eq!(second.file_name().unwrap(), "1results.json");
    }

    #[test]
    fn test_load_missing_is_error() {
        let dir = TempDir::new().unwrap();
        let store = ResultsStore::new(dir.path().join("results.json"));
        assert!(store.load().is_err());
    }

    #[test]
    fn test_apply_dry_fix() {
        use crate::domain::ids::NodeId;
        use crate::domain::mesh::{Element, Node};

        let mesh = Mesh {
            name: "m".to_string(),
            nodes: vec![
                Node { x: 0.0, y: 0.0, depth: 2.0 },
                Node { x: 1.0, y: 0.0, depth: 3.0 },
            ],
            elements: vec![Element {
                nodes: [
                    NodeId::new(1).unwrap(),
                    NodeId::new(2).unwrap(),
                    NodeId::new(1).unwrap(),
                ],
            }],
            boundary_lines: Vec::new(),
        };

        let mut data = RunData::new();
        let mut elevations = Array3::zeros(1, 1, 1);
        elevations.set(0, 0, 0, DRY_VALUE);
        data.ts_data.insert(OutputKey::Fort61, elevations);
        let mut maxele = Array2::zeros(2, 1);
        maxele.set(0, 0, DRY_VALUE);
        data.nts_data.insert(OutputKey::Maxele63, maxele);
        let mut file = ResultsFile::new(RunId::generate(), Array2::zeros(1, 1), data);

        let stations = vec![Station { x: 0.0, y: 0.0, depth: 5.0 }];
        file.apply_dry_fix(&mesh, &stations);

        assert_eq!(file.data.ts_data[&OutputKey::Fort61].get(0, 0, 0), 0.0);
        assert_eq!(file.data.nts_data[&OutputKey::Maxele63].get(0, 0), 0.0);
    }
}
