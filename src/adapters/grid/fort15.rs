//! fort.15 model control file reader
//!
//! The control file is position-dependent in full generality (its layout
//! shifts with NWS, IM, and friends), so this reader keys off the trailing
//! `! NAME` comments that ADCIRC distributions and mesh vendors ship on
//! every line. Only the parameters the run framework needs are extracted:
//! the clock (DT, RNDAY), the elevation recording block (NOUTE, TOUTSE,
//! TOUTFE, NSPOOLE, NSTAE plus station coordinates), and the global
//! elevation block (NOUTGE, TOUTSGE, TOUTFGE, NSPOOLGE).

use super::{file_label, parse_field};
use crate::domain::errors::GridError;
use crate::domain::ids::OutputKey;
use crate::domain::station::{ModelControl, RecordingInfo, Station, TimeControl};
use crate::domain::Result;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Splits a control line into its value fields and comment tokens
fn split_line(line: &str) -> (Vec<&str>, Vec<String>) {
    match line.split_once('!') {
        Some((values, comment)) => (
            values.split_whitespace().collect(),
            comment
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|t| !t.is_empty())
                .map(|t| t.to_uppercase())
                .collect(),
        ),
        None => (line.split_whitespace().collect(), Vec::new()),
    }
}

/// Reads model control data from a fort.15 file
///
/// `node_count` sizes the whole-mesh output arrays (`fort.63` and the
/// non-time-series fields), which the control file does not state itself.
pub fn read_control(path: impl AsRef<Path>, node_count: usize) -> Result<ModelControl> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(GridError::FileNotFound(path.display().to_string()).into());
    }
    let file = file_label(path);
    let contents = fs::read_to_string(path)?;

    let mut dt: Option<f64> = None;
    let mut rnday: Option<f64> = None;
    let mut station_block: Option<(i64, f64, f64, i64)> = None;
    let mut global_block: Option<(i64, f64, f64, i64)> = None;
    let mut stations: Vec<Station> = Vec::new();
    let mut stations_wanted = 0usize;

    let mut lines = contents.lines().enumerate();
    while let Some((line_no, line)) = lines.next() {
        let (values, labels) = split_line(line);
        let has = |name: &str| labels.iter().any(|l| l == name);

        if has("DT") && dt.is_none() && !has("NSPOOLE") && !has("NSPOOLGE") {
            dt = Some(parse_field(
                values.first().copied(),
                &file,
                line_no + 1,
                "DT",
            )?);
        }
        if has("RNDAY") && rnday.is_none() {
            rnday = Some(parse_field(
                values.first().copied(),
                &file,
                line_no + 1,
                "RNDAY",
            )?);
        }
        if has("NOUTE") && station_block.is_none() {
            station_block = Some(read_output_block(&values, &file, line_no + 1)?);
        }
        if has("NSTAE") && stations.is_empty() {
            stations_wanted = parse_field(
                values.first().copied(),
                &file,
                line_no + 1,
                "NSTAE",
            )?;
            for i in 0..stations_wanted {
                let (line_no, line) = lines.next().ok_or(GridError::Truncated {
                    file: file.clone(),
                    record: i,
                })?;
                let (values, _) = split_line(line);
                let x: f64 = parse_field(
                    values.first().copied(),
                    &file,
                    line_no + 1,
                    "station x",
                )?;
                let y: f64 = parse_field(
                    values.get(1).copied(),
                    &file,
                    line_no + 1,
                    "station y",
                )?;
                stations.push(Station::new(x, y));
            }
        }
        if has("NOUTGE") && global_block.is_none() {
            global_block = Some(read_output_block(&values, &file, line_no + 1)?);
        }
    }

    let dt = dt.ok_or_else(|| missing(&file, "DT"))?;
    let rnday = rnday.ok_or_else(|| missing(&file, "RNDAY"))?;
    if stations.len() != stations_wanted {
        return Err(GridError::NodeCountMismatch {
            expected: stations_wanted,
            found: stations.len(),
        }
        .into());
    }

    let mut recording: BTreeMap<OutputKey, RecordingInfo> = BTreeMap::new();
    if let Some((noute, toutse, toutfe, nspoole)) = station_block {
        if noute != 0 && nspoole > 0 && !stations.is_empty() {
            recording.insert(
                OutputKey::Fort61,
                RecordingInfo {
                    locations: stations.len(),
                    records: record_count(toutse, toutfe, dt, nspoole),
                    value_dims: 1,
                },
            );
        }
    }
    if let Some((noutge, toutsge, toutfge, nspoolge)) = global_block {
        if noutge != 0 && nspoolge > 0 {
            recording.insert(
                OutputKey::Fort63,
                RecordingInfo {
                    locations: node_count,
                    records: record_count(toutsge, toutfge, dt, nspoolge),
                    value_dims: 1,
                },
            );
        }
    }
    // Whole-mesh extremum files are always one record deep
    for key in [OutputKey::Maxele63, OutputKey::Timemax63, OutputKey::Tinun63] {
        recording.insert(
            key,
            RecordingInfo {
                locations: node_count,
                records: 1,
                value_dims: 1,
            },
        );
    }

    Ok(ModelControl {
        time: TimeControl { rnday, dt },
        stations,
        recording,
    })
}

/// Parses a 4-field output specification line (NOUT*, TOUTS*, TOUTF*, NSPOOL*)
fn read_output_block(values: &[&str], file: &str, line_no: usize) -> Result<(i64, f64, f64, i64)> {
    let nout: i64 = parse_field(values.first().copied(), file, line_no, "NOUT flag")?;
    let touts: f64 = parse_field(values.get(1).copied(), file, line_no, "TOUTS")?;
    let toutf: f64 = parse_field(values.get(2).copied(), file, line_no, "TOUTF")?;
    let nspool: i64 = parse_field(values.get(3).copied(), file, line_no, "NSPOOL")?;
    Ok((nout, touts, toutf, nspool))
}

/// Number of records the solver will write for an output window
///
/// TOUTS/TOUTF are in days, DT in seconds, NSPOOL in timesteps.
fn record_count(touts: f64, toutf: f64, dt: f64, nspool: i64) -> usize {
    let window_steps = ((toutf - touts) * 86_400.0 / dt).round();
    if window_steps <= 0.0 {
        return 0;
    }
    (window_steps / nspool as f64).floor() as usize
}

fn missing(file: &str, what: &str) -> crate::domain::TiderunError {
    GridError::Malformed {
        file: file.to_string(),
        line: 0,
        message: format!("no line labeled {what}"),
    }
    .into()
}
