//! Harvested ensemble run data
//!
//! [`RunData`] is the aggregate of everything pulled out of the solver's
//! output files across an ensemble: observation times, time-series arrays
//! shaped (location, record, member), and non-time-series arrays shaped
//! (node, member).

use crate::domain::array::{Array2, Array3};
use crate::domain::ids::OutputKey;
use crate::domain::mesh::Mesh;
use crate::domain::station::{Station, TimeControl};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sentinel the solver writes for dry (de-watered) locations
pub const DRY_VALUE: f64 = -99999.0;

/// Aggregated output data for one ensemble campaign
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunData {
    /// Observation times in seconds, per time-series key
    pub time_obs: BTreeMap<OutputKey, Vec<f64>>,
    /// Time-series arrays, shape (location, record, member)
    pub ts_data: BTreeMap<OutputKey, Array3>,
    /// Non-time-series arrays, shape (node, member)
    pub nts_data: BTreeMap<OutputKey, Array2>,
}

impl RunData {
    /// Creates an empty run data set
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ensemble members, taken from any present array
    pub fn member_count(&self) -> usize {
        if let Some(a) = self.ts_data.values().next() {
            return a.shape().2;
        }
        if let Some(a) = self.nts_data.values().next() {
            return a.cols();
        }
        0
    }

    /// Undoes the dry sentinel in station elevation series (`fort61`)
    ///
    /// Wet values get the station's bathymetric depth added so the series
    /// becomes total water column height; dry values become 0.
    pub fn fix_dry_stations(&mut self, stations: &[Station]) {
        if let Some(array) = self.ts_data.get_mut(&OutputKey::Fort61) {
            let depths: Vec<f64> = stations.iter().map(|s| s.depth).collect();
            array.fix_sentinel(DRY_VALUE, &depths);
        }
    }

    /// Undoes the dry sentinel in nodal elevation series (`fort63`)
    pub fn fix_dry_nodes(&mut self, mesh: &Mesh) {
        if let Some(array) = self.ts_data.get_mut(&OutputKey::Fort63) {
            array.fix_sentinel(DRY_VALUE, &mesh.depths());
        }
    }

    /// Undoes the dry sentinel in maximum-elevation fields (`maxele63`)
    pub fn fix_dry_nodes_nts(&mut self, mesh: &Mesh) {
        if let Some(array) = self.nts_data.get_mut(&OutputKey::Maxele63) {
            array.fix_sentinel(DRY_VALUE, &mesh.depths());
        }
    }

    /// Converts observation times from seconds to hours
    pub fn convert_to_hours(&mut self) {
        for times in self.time_obs.values_mut() {
            for t in times.iter_mut() {
                *t /= 3600.0;
            }
        }
    }

    /// Converts observation times from seconds to days
    pub fn convert_to_days(&mut self) {
        for times in self.time_obs.values_mut() {
            for t in times.iter_mut() {
                *t /= 86_400.0;
            }
        }
    }

    /// Converts `tinun63` from seconds to the fraction of the run duration
    pub fn convert_to_percent(&mut self, time: &TimeControl) {
        if let Some(array) = self.nts_data.get_mut(&OutputKey::Tinun63) {
            array.scale(1.0 / time.duration_seconds());
        }
    }

    /// Appends another campaign's members after this one's
    ///
    /// Key sets must match exactly and leading shapes must agree; the
    /// observation times of `self` are kept (they are identical across
    /// campaigns run against the same control file).
    ///
    /// # Errors
    ///
    /// Returns a message naming the first mismatched key or shape.
    pub fn concatenate(&mut self, other: &RunData) -> Result<(), String> {
        let self_ts: Vec<_> = self.ts_data.keys().copied().collect();
        let other_ts: Vec<_> = other.ts_data.keys().copied().collect();
        if self_ts != other_ts {
            return Err(format!(
                "Time-series keys differ: {self_ts:?} vs {other_ts:?}"
            ));
        }
        let self_nts: Vec<_> = self.nts_data.keys().copied().collect();
        let other_nts: Vec<_> = other.nts_data.keys().copied().collect();
        if self_nts != other_nts {
            return Err(format!(
                "Non-time-series keys differ: {self_nts:?} vs {other_nts:?}"
            ));
        }
        for (key, array) in &mut self.ts_data {
            array
                .concat_members(&other.ts_data[key])
                .map_err(|e| format!("{key}: {e}"))?;
        }
        for (key, array) in &mut self.nts_data {
            array
                .concat_columns(&other.nts_data[key])
                .map_err(|e| format!("{key}: {e}"))?;
        }
        Ok(())
    }
}
