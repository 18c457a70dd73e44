//! Record-oriented output parsing
//!
//! A solver that dies mid-write leaves a short final record; that surfaces
//! as [`GridError::Truncated`] so the harvester can fail one member without
//! sinking the campaign.

use crate::adapters::grid::{file_label, parse_field};
use crate::domain::errors::GridError;
use crate::domain::Result;
use std::fs;
use std::path::Path;

/// Parsed contents of one time-series output file
#[derive(Debug, Clone)]
pub struct TimeseriesFile {
    /// Observation time in seconds per record
    pub times: Vec<f64>,
    /// Values per record, each `locations` long, in file order
    pub values: Vec<Vec<f64>>,
    /// Locations per record, from the description line
    pub locations: usize,
}

/// Parses a time-series output file (`fort.61`, `fort.63`)
///
/// `expected_locations` cross-checks the description line against the
/// recording info derived from fort.15.
pub fn parse_timeseries(
    path: impl AsRef<Path>,
    expected_locations: usize,
) -> Result<TimeseriesFile> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(GridError::FileNotFound(path.display().to_string()).into());
    }
    let file = file_label(path);
    let contents = fs::read_to_string(path)?;
    let mut lines = contents.lines().enumerate();

    let _header = lines.next().ok_or_else(|| GridError::Truncated {
        file: file.clone(),
        record: 0,
    })?;
    let (line_no, desc) = lines.next().ok_or_else(|| GridError::Truncated {
        file: file.clone(),
        record: 0,
    })?;
    let mut fields = desc.split_whitespace();
    let _record_count: usize = parse_field(fields.next(), &file, line_no + 1, "record count")?;
    let locations: usize = parse_field(fields.next(), &file, line_no + 1, "location count")?;
    if locations != expected_locations {
        return Err(GridError::NodeCountMismatch {
            expected: expected_locations,
            found: locations,
        }
        .into());
    }

    let mut times = Vec::new();
    let mut values = Vec::new();
    loop {
        let Some((line_no, line)) = lines.next() else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.split_whitespace();
        let time: f64 = parse_field(fields.next(), &file, line_no + 1, "record time")?;

        let mut record = Vec::with_capacity(locations);
        for _ in 0..locations {
            let (line_no, line) = lines.next().ok_or(GridError::Truncated {
                file: file.clone(),
                record: times.len() + 1,
            })?;
            let mut fields = line.split_whitespace();
            let _id: u64 = parse_field(fields.next(), &file, line_no + 1, "location id")?;
            let value: f64 = parse_field(fields.next(), &file, line_no + 1, "value")?;
            record.push(value);
        }
        times.push(time);
        values.push(record);
    }

    Ok(TimeseriesFile {
        times,
        values,
        locations,
    })
}

/// Parses a single-record extremum file (`maxele.63`, `timemax.63`, `tinun.63`)
///
/// Returns the nodal values of the first record.
pub fn parse_scalar_field(path: impl AsRef<Path>, expected_nodes: usize) -> Result<Vec<f64>> {
    let parsed = parse_timeseries(path, expected_nodes)?;
    parsed
        .values
        .into_iter()
        .next()
        .ok_or_else(|| {
            GridError::Truncated {
                file: "scalar field".to_string(),
                record: 1,
            }
            .into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TiderunError;
    use tempfile::TempDir;

    const SAMPLE_61: &str = "\
elevation recording
48 2 3600.0 1800 1
3600.0 1800
1 0.52
2 -99999.0
7200.0 3600
1 0.61
2 0.08
";

    const SAMPLE_MAXELE: &str = "\
maximum elevation
1 3 0.0 0 1
172800.0 86400
1 1.20
2 -99999.0
3 0.85
";

    fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_parse_timeseries() {
        let dir = TempDir::new().unwrap();
        let parsed = parse_timeseries(write(&dir, "fort.61", SAMPLE_61), 2).unwrap();
        assert_eq!(parsed.locations, 2);
        assert_eq!(parsed.times, vec![3600.0, 7200.0]);
        assert_eq!(parsed.values[0], vec![0.52, -99999.0]);
        assert_eq!(parsed.values[1], vec![0.61, 0.08]);
    }

    #[test]
    fn test_parse_timeseries_location_mismatch() {
        let dir = TempDir::new().unwrap();
        let err = parse_timeseries(write(&dir, "fort.61", SAMPLE_61), 5).unwrap_err();
        assert!(matches!(
            err,
            TiderunError::Grid(GridError::NodeCountMismatch { expected: 5, found: 2 })
        ));
    }

    #[test]
    fn test_parse_timeseries_truncated_record() {
        let dir = TempDir::new().unwrap();
        let truncated = "\
elevation recording
48 2 3600.0 1800 1
3600.0 1800
1 0.52
";
        let err = parse_timeseries(write(&dir, "fort.61", truncated), 2).unwrap_err();
        assert!(matches!(err, TiderunError::Grid(GridError::Truncated { .. })));
    }

    #[test]
    fn test_parse_scalar_field() {
        let dir = TempDir::new().unwrap();
        let values = parse_scalar_field(write(&dir, "maxele.63", SAMPLE_MAXELE), 3).unwrap();
        assert_eq!(values, vec![1.2, -99999.0, 0.85]);
    }

    #[test]
    fn test_parse_scalar_field_missing_file() {
        let err = parse_scalar_field("/nonexistent/maxele.63", 3).unwrap_err();
        assert!(matches!(
            err,
            TiderunError::Grid(GridError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_empty_records_are_allowed() {
        let dir = TempDir::new().unwrap();
        let empty = "header\n0 2 0.0 0 1\n";
        let parsed = parse_timeseries(write(&dir, "fort.61", empty), 2).unwrap();
        assert!(parsed.times.is_empty());
    }
}
