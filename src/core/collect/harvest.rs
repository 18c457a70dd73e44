//! Output harvesting into dense arrays

use crate::adapters::output::{parse_scalar_field, parse_timeseries};
use crate::domain::ids::OutputKey;
use crate::domain::station::{ModelControl, RecordingInfo};
use crate::domain::{Array2, Array3, Result, RunData, TiderunError};
use std::collections::BTreeMap;
use std::path::Path;

/// Pulls solver output files into preallocated ensemble arrays
#[derive(Debug, Clone)]
pub struct Harvester {
    recording: BTreeMap<OutputKey, RecordingInfo>,
}

impl Harvester {
    /// Creates a harvester from the parsed model control
    pub fn new(control: &ModelControl) -> Self {
        Self {
            recording: control.recording.clone(),
        }
    }

    /// Recording info for a key
    pub fn recording_info(&self, key: OutputKey) -> Option<RecordingInfo> {
        self.recording.get(&key).copied()
    }

    /// Preallocates arrays for a campaign
    ///
    /// # Errors
    ///
    /// Returns an error for keys the control file does not enable.
    pub fn allocate(
        &self,
        ts_keys: &[OutputKey],
        nts_keys: &[OutputKey],
        members: usize,
    ) -> Result<RunData> {
        let mut data = RunData::new();
        for &key in ts_keys {
            let info = self.require(key)?;
            data.ts_data
                .insert(key, Array3::zeros(info.locations, info.records, members));
            data.time_obs.insert(key, vec![0.0; info.records]);
        }
        for &key in nts_keys {
            let info = self.require(key)?;
            data.nts_data
                .insert(key, Array2::zeros(info.locations, members));
        }
        Ok(data)
    }

    /// Harvests one member's output files from its run directory
    ///
    /// Fills the member's slab in every allocated array. Observation times
    /// are recorded from the first member seen; later members must agree on
    /// record count by construction (same control file).
    pub fn harvest_member(&self, dir: &Path, member: usize, data: &mut RunData) -> Result<()> {
        let ts_keys: Vec<OutputKey> = data.ts_data.keys().copied().collect();
        for key in ts_keys {
            let info = self.require(key)?;
            let parsed = parse_timeseries(dir.join(key.file_name()), info.locations)?;
            let array = data
                .ts_data
                .get_mut(&key)
                .expect("key came from ts_data");
            let records = parsed.times.len().min(info.records);
            if parsed.times.len() < info.records {
                tracing::warn!(
                    key = %key,
                    expected = info.records,
                    found = parsed.times.len(),
                    member,
                    "Output file has fewer records than the control file promised"
                );
            }
            for (record, values) in parsed.values.iter().take(records).enumerate() {
                for (location, value) in values.iter().enumerate() {
                    array.set(location, record, member, *value);
                }
            }
            let times = data.time_obs.get_mut(&key).expect("allocated with ts key");
            for (record, time) in parsed.times.iter().take(records).enumerate() {
                times[record] = *time;
            }
        }

        let nts_keys: Vec<OutputKey> = data.nts_data.keys().copied().collect();
        for key in nts_keys {
            let info = self.require(key)?;
            let values = parse_scalar_field(dir.join(key.file_name()), info.locations)?;
            let array = data
                .nts_data
                .get_mut(&key)
                .expect("key came from nts_data");
            array
                .set_column(member, &values)
                .map_err(TiderunError::Collect)?;
        }
        Ok(())
    }

    fn require(&self, key: OutputKey) -> Result<RecordingInfo> {
        self.recording_info(key).ok_or_else(|| {
            TiderunError::Collect(format!(
                "Output {key} is not enabled by the model control file"
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::station::{Station, TimeControl};
    use tempfile::TempDir;

    fn control() -> ModelControl {
        let mut recording = BTreeMap::new();
        recording.insert(
            OutputKey::Fort61,
            RecordingInfo {
                locations: 2,
                records: 2,
                value_dims: 1,
            },
        );
        recording.insert(
            OutputKey::Maxele63,
            RecordingInfo {
                locations: 3,
                records: 1,
                value_dims: 1,
            },
        );
        ModelControl {
            time: TimeControl { rnday: 1.0, dt: 2.0 },
            stations: vec![Station::new(0.0, 0.0), Station::new(1.0, 1.0)],
            recording,
        }
    }

    fn write_outputs(dir: &Path) {
        std::fs::write(
            dir.join("fort.61"),
            "run\n2 2 3600.0 1800 1\n3600.0 1800\n1 0.5\n2 0.6\n7200.0 3600\n1 0.7\n2 0.8\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("maxele.63"),
            "run\n1 3 0.0 0 1\n86400.0 43200\n1 1.0\n2 2.0\n3 3.0\n",
        )
        .unwrap();
    }

    #[test]
    fn test_allocate_shapes() {
        let harvester = Harvester::new(&control());
        let data = harvester
            .allocate(&[OutputKey::Fort61], &[OutputKey::Maxele63], 5)
            .unwrap();
        assert_eq!(data.ts_data[&OutputKey::Fort61].shape(), (2, 2, 5));
        assert_eq!(data.nts_data[&OutputKey::Maxele63].cols(), 5);
        assert_eq!(data.time_obs[&OutputKey::Fort61].len(), 2);
    }

    #[test]
    fn test_allocate_rejects_disabled_key() {
        let harvester = Harvester::new(&control());
        assert!(harvester
            .allocate(&[OutputKey::Fort63], &[], 1)
            .is_err());
    }

    #[test]
    fn test_harvest_member() {
        let dir = TempDir::new().unwrap();
        write_outputs(dir.path());

        let harvester = Harvester::new(&control());
        let mut data = harvester
            .allocate(&[OutputKey::Fort61], &[OutputKey::Maxele63], 2)
            .unwrap();
        harvester.harvest_member(dir.path(), 1, &mut data).unwrap();

        let ts = &data.ts_data[&OutputKey::Fort61];
        assert_eq!(ts.get(0, 0, 1), 0.5);
        assert_eq!(ts.get(1, 1, 1), 0.8);
        // member 0 untouched
        assert_eq!(ts.get(0, 0, 0), 0.0);
        assert_eq!(data.time_obs[&OutputKey::Fort61], vec![3600.0, 7200.0]);

        let nts = &data.nts_data[&OutputKey::Maxele63];
        assert_eq!(nts.get(0, 1), 1.0);
        assert_eq!(nts.get(2, 1), 3.0);
    }

    #[test]
    fn test_harvest_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let harvester = Harvester::new(&control());
        let mut data = harvester
            .allocate(&[OutputKey::Fort61], &[], 1)
            .unwrap();
        assert!(harvester.harvest_member(dir.path(), 0, &mut data).is_err());
    }
}
