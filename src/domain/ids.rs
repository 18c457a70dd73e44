//! Domain identifier types with validation
//!
//! Newtype wrappers for mesh node identifiers, ensemble campaign identifiers,
//! and the keys of supported ADCIRC output files.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Mesh node identifier newtype wrapper
///
/// ADCIRC numbers mesh nodes from 1; the id maps to an array index by
/// subtracting one.
///
/// # Examples
///
/// ```
/// use tiderun::domain::ids::NodeId;
///
/// let node = NodeId::new(7).unwrap();
/// assert_eq!(node.index(), 6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Creates a new NodeId
    ///
    /// # Errors
    ///
    /// Returns an error for id 0; ADCIRC node numbering starts at 1.
    pub fn new(id: u32) -> Result<Self, String> {
        if id == 0 {
            return Err("Node ids are 1-based; 0 is not a valid node".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the raw 1-based id
    pub fn get(&self) -> u32 {
        self.0
    }

    /// Returns the 0-based array index for this node
    pub fn index(&self) -> usize {
        (self.0 - 1) as usize
    }

    /// Builds a NodeId from a 0-based array index
    pub fn from_index(index: usize) -> Self {
        Self(index as u32 + 1)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id: u32 = s
            .parse()
            .map_err(|_| format!("Invalid node id: {s}"))?;
        Self::new(id)
    }
}

/// Ensemble campaign identifier newtype wrapper
///
/// A v4 UUID minted when a campaign starts, recorded in the checkpoint and
/// results files so partial runs can be matched up when concatenating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    /// Mints a fresh campaign id
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RunId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| format!("Invalid run id: {e}"))
    }
}

/// Supported ADCIRC output file keys
///
/// File names map to keys by deleting the dot (`fort.61` -> `fort61`),
/// matching the key convention of downstream analysis tooling. Hot-start
/// output (`fort.67`, `fort.68`) is deliberately unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKey {
    /// Elevation time series at recording stations
    Fort61,
    /// Elevation time series at all nodes
    Fort63,
    /// Maximum elevation at all nodes
    Maxele63,
    /// Time of maximum elevation at all nodes
    Timemax63,
    /// Cumulative inundation time at all nodes
    Tinun63,
}

impl OutputKey {
    /// Maps an output file name (`fort.61`, `maxele.63`) to its key
    pub fn from_file_name(name: &str) -> Result<Self, String> {
        match name {
            "fort.61" => Ok(Self::Fort61),
            "fort.63" => Ok(Self::Fort63),
            "maxele.63" => Ok(Self::Maxele63),
            "timemax.63" => Ok(Self::Timemax63),
            "tinun.63" => Ok(Self::Tinun63),
            other => Err(format!("Unsupported output file: {other}")),
        }
    }

    /// Returns the dotted file name the solver writes
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Fort61 => "fort.61",
            Self::Fort63 => "fort.63",
            Self::Maxele63 => "maxele.63",
            Self::Timemax63 => "timemax.63",
            Self::Tinun63 => "tinun.63",
        }
    }

    /// Returns the undotted key string used in persisted results
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fort61 => "fort61",
            Self::Fort63 => "fort63",
            Self::Maxele63 => "maxele63",
            Self::Timemax63 => "timemax63",
            Self::Tinun63 => "tinun63",
        }
    }

    /// True for keys harvested as time series, false for single-record fields
    pub fn is_timeseries(&self) -> bool {
        matches!(self, Self::Fort61 | Self::Fort63)
    }

    /// True for keys recorded at stations rather than every node
    pub fn is_station_based(&self) -> bool {
        matches!(self, Self::Fort61)
    }
}

impl fmt::Display for OutputKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fort61" => Ok(Self::Fort61),
            "fort63" => Ok(Self::Fort63),
            "maxele63" => Ok(Self::Maxele63),
            "timemax63" => Ok(Self::Timemax63),
            "tinun63" => Ok(Self::Tinun63),
            other => Self::from_file_name(other),
        }
    }
}
