//! adcprep answer files
//!
//! adcprep reads its menu selections from stdin. Each stage gets an
//! `in.prep{n}` file in the run directory and the runner pipes it in.

use crate::domain::Result;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// adcprep menu stages used by the run framework
///
/// `Partition` decomposes the mesh across processors and `Full` preps
/// every input file. `NodalAttributes` re-preps only fort.13; that is the
/// cheap path taken once per member after the roughness field is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrepStage {
    Partition,
    Full,
    NodalAttributes,
}

impl PrepStage {
    /// The adcprep menu option for this stage
    pub fn menu_option(&self) -> u8 {
        match self {
            Self::Partition => 1,
            Self::Full => 2,
            Self::NodalAttributes => 5,
        }
    }

    /// Answer file name for this stage
    pub fn input_file_name(&self) -> String {
        format!("in.prep{}", self.menu_option())
    }

    /// Stage name for logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            Self::Partition => "adcprep-partition",
            Self::Full => "adcprep-full",
            Self::NodalAttributes => "adcprep-fort13",
        }
    }
}

/// Writes the answer file for a prep stage into a run directory
///
/// Returns the path to the written file.
pub fn write_prep_input(dir: impl AsRef<Path>, stage: PrepStage, procs: usize) -> Result<PathBuf> {
    let path = dir.as_ref().join(stage.input_file_name());
    let mut out = fs::File::create(&path)?;
    writeln!(out, "{procs}")?;
    writeln!(out, "{}", stage.menu_option())?;
    if stage != PrepStage::Partition {
        writeln!(out, "fort.14")?;
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_menu_options() {
        assert_eq!(PrepStage::Partition.menu_option(), 1);
        assert_eq!(PrepStage::Full.menu_option(), 2);
        assert_eq!(PrepStage::NodalAttributes.menu_option(), 5);
    }

    #[test]
    fn test_input_file_names() {
        assert_eq!(PrepStage::Partition.input_file_name(), "in.prep1");
        assert_eq!(PrepStage::NodalAttributes.input_file_name(), "in.prep5");
    }

    #[test]
    fn test_write_prep_input() {
        let dir = TempDir::new().unwrap();
        let path = write_prep_input(dir.path(), PrepStage::NodalAttributes, 12).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "12\n5\nfort.14\n");
    }

    #[test]
    fn test_partition_skips_grid_name() {
        let dir = TempDir::new().unwrap();
        let path = write_prep_input(dir.path(), PrepStage::Partition, 4).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "4\n1\n");
    }
}
