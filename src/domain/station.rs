//! Recording stations and model control data
//!
//! Stations are the fixed locations where the solver records time series;
//! the recording table and time control come from `fort.15`.

use crate::domain::ids::OutputKey;
use crate::domain::mesh::Mesh;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A recording station
///
/// Depth is filled in from the nearest mesh node after the control file is
/// read; it is needed to undo the dry-value sentinel in harvested data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub depth: f64,
}

impl Station {
    /// Creates a station at (x, y) with unknown depth
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, depth: 0.0 }
    }

    /// Sets the depth from the nearest mesh node
    pub fn set_depth_from(&mut self, mesh: &Mesh) {
        if let Some(id) = mesh.nearest_node(self.x, self.y) {
            if let Some(node) = mesh.node(id) {
                self.depth = node.depth;
            }
        }
    }
}

/// Recording dimensions for one output file type
///
/// Sizes the harvest arrays before any member runs: `locations` rows,
/// `records` time levels, `value_dims` values per location per record
/// (1 for elevation, 2 for velocity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingInfo {
    pub locations: usize,
    pub records: usize,
    pub value_dims: usize,
}

/// Simulation time control from fort.15
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeControl {
    /// Simulation duration in days (RNDAY)
    pub rnday: f64,
    /// Timestep in seconds (DT)
    pub dt: f64,
}

impl TimeControl {
    /// Total simulated seconds
    pub fn duration_seconds(&self) -> f64 {
        self.rnday * 86_400.0
    }
}

/// Parsed model control data
///
/// Everything the run framework needs from fort.15: the clock, the
/// elevation recording stations, and per-output-key recording dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelControl {
    pub time: TimeControl,
    /// Elevation recording stations in file order
    pub stations: Vec<Station>,
    /// Harvest dimensions per supported output key
    pub recording: BTreeMap<OutputKey, RecordingInfo>,
}

impl ModelControl {
    /// Recording info for a key, if the control file enables that output
    pub fn recording_info(&self, key: OutputKey) -> Option<RecordingInfo> {
        self.recording.get(&key).copied()
    }

    /// Fills station depths from the mesh
    pub fn set_station_depths(&mut self, mesh: &Mesh) {
        for station in &mut self.stations {
            station.set_depth_from(mesh);
        }
    }

    /// Station depths in file order
    pub fn station_depths(&self) -> Vec<f64> {
        self.stations.iter().map(|s| s.depth).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::NodeId;
    use crate::domain::mesh::{Element, Node};

    fn mesh_with_depths() -> Mesh {
        Mesh {
            name: "m".to_string(),
            nodes: vec![
                Node { x: 0.0, y: 0.0, depth: 5.0 },
                Node { x: 10.0, y: 0.0, depth: 7.0 },
                Node { x: 0.0, y: 10.0, depth: 9.0 },
            ],
            elements: vec![Element {
                nodes: [
                    NodeId::new(1).unwrap(),
                    NodeId::new(2).unwrap(),
                    NodeId::new(3).unwrap(),
                ],
            }],
            boundary_lines: Vec::new(),
        }
    }

    #[test]
    fn test_station_depth_from_nearest_node() {
        let mesh = mesh_with_depths();
        let mut station = Station::new(9.0, 1.0);
        station.set_depth_from(&mesh);
        assert_eq!(station.depth, 7.0);
    }

    #[test]
    fn test_time_control_duration() {
        let time = TimeControl { rnday: 2.0, dt: 1.0 };
        assert_eq!(time.duration_seconds(), 172_800.0);
    }

    #[test]
    fn test_model_control_station_depths() {
        let mesh = mesh_with_depths();
        let mut control = ModelControl {
            time: TimeControl { rnday: 1.0, dt: 2.0 },
            stations: vec![Station::new(0.1, 0.1), Station::new(0.5, 9.5)],
            recording: BTreeMap::new(),
        };
        control.set_station_depths(&mesh);
        assert_eq!(control.station_depths(), vec![5.0, 9.0]);
    }
}
