//! Land-use basis vectors
//!
//! Each `landuse_*` directory holds a fort.13 whose Manning exception table
//! is that land class's coverage multiplier per node (the fraction of the
//! node's area covered by the class). A node's combined coverage across all
//! classes must not exceed 1; uncovered area keeps the default roughness.

use crate::adapters::grid::fort13;
use crate::domain::errors::GridError;
use crate::domain::{Result, TiderunError};
use std::collections::BTreeMap;
use std::path::Path;

/// Coverage may overshoot 1 by this much before the set is rejected
const COVERAGE_TOLERANCE: f64 = 1e-6;

/// One land class's coverage multipliers
#[derive(Debug, Clone)]
pub struct BasisVector {
    /// Directory name the vector was loaded from (`landuse_00`, ...)
    pub class: String,
    /// Node id (1-based) to coverage multiplier
    pub multipliers: BTreeMap<u32, f64>,
}

/// Ordered collection of land-use basis vectors
#[derive(Debug, Clone)]
pub struct BasisSet {
    vectors: Vec<BasisVector>,
}

impl BasisSet {
    /// Loads every `landuse_*` directory under `basis_dir`, in name order
    ///
    /// # Errors
    ///
    /// Returns an error if no basis directories exist, a fort.13 is missing
    /// or malformed, or combined coverage exceeds 1 at any node.
    pub fn load(basis_dir: impl AsRef<Path>) -> Result<Self> {
        let basis_dir = basis_dir.as_ref();
        if !basis_dir.is_dir() {
            return Err(GridError::FileNotFound(basis_dir.display().to_string()).into());
        }

        let mut class_dirs: Vec<_> = std::fs::read_dir(basis_dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry.path().is_dir()
                    && entry.file_name().to_string_lossy().starts_with("landuse_")
            })
            .map(|entry| entry.path())
            .collect();
        class_dirs.sort();

        if class_dirs.is_empty() {
            return Err(TiderunError::Validation(format!(
                "No landuse_* directories found in {}",
                basis_dir.display()
            )));
        }

        let mut vectors = Vec::with_capacity(class_dirs.len());
        for dir in class_dirs {
            let class = dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let attribute = fort13::read_manning(dir.join("fort.13"))?;
            vectors.push(BasisVector {
                class,
                multipliers: attribute.exceptions,
            });
        }

        let set = Self { vectors };
        set.check_coverage()?;
        Ok(set)
    }

    /// Builds a set directly from vectors (used by tests)
    pub fn from_vectors(vectors: Vec<BasisVector>) -> Result<Self> {
        let set = Self { vectors };
        set.check_coverage()?;
        Ok(set)
    }

    /// Number of basis vectors
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// True when the set holds no vectors
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Class names in load order
    pub fn classes(&self) -> Vec<&str> {
        self.vectors.iter().map(|v| v.class.as_str()).collect()
    }

    /// Combines the basis vectors into a full nodal field
    ///
    /// Per node: the weighted sum of coverage multipliers plus the default
    /// roughness over whatever area no class covers. Weight count must
    /// equal the basis count.
    pub fn combine(&self, weights: &[f64], default: f64, node_count: usize) -> Result<Vec<f64>> {
        if weights.len() != self.vectors.len() {
            return Err(TiderunError::Sampling(format!(
                "Weight vector has {} entries for {} basis vectors",
                weights.len(),
                self.vectors.len()
            )));
        }
        let mut field = vec![0.0; node_count];
        let mut coverage = vec![0.0; node_count];
        for (vector, weight) in self.vectors.iter().zip(weights) {
            for (&node, &multiplier) in &vector.multipliers {
                let index = (node - 1) as usize;
                if index >= node_count {
                    return Err(GridError::NodeCountMismatch {
                        expected: node_count,
                        found: node as usize,
                    }
                    .into());
                }
                field[index] += weight * multiplier;
                coverage[index] += multiplier;
            }
        }
        for (value, covered) in field.iter_mut().zip(&coverage) {
            *value += default * (1.0 - covered);
        }
        Ok(field)
    }

    /// Rejects sets whose combined coverage exceeds 1 anywhere
    fn check_coverage(&self) -> Result<()> {
        let mut coverage: BTreeMap<u32, f64> = BTreeMap::new();
        for vector in &self.vectors {
            for (&node, &multiplier) in &vector.multipliers {
                *coverage.entry(node).or_default() += multiplier;
            }
        }
        if let Some((&node, &total)) = coverage
            .iter()
            .find(|(_, &total)| total > 1.0 + COVERAGE_TOLERANCE)
        {
            return Err(TiderunError::Validation(format!(
                "Combined land-use coverage at node {node} is {total:.6}, above 1"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::grid::fort13::write_manning_field;
    use tempfile::TempDir;

    fn vector(class: &str, pairs: &[(u32, f64)]) -> BasisVector {
        BasisVector {
            class: class.to_string(),
            multipliers: pairs.iter().copied().collect(),
        }
    }

    #[test]
    fn test_combine_with_full_coverage() {
        let set = BasisSet::from_vectors(vec![
            vector("landuse_00", &[(1, 1.0), (2, 0.5)]),
            vector("landuse_01", &[(2, 0.5), (3, 1.0)]),
        ])
        .unwrap();

        let field = set.combine(&[0.03, 0.09], 0.02, 4).unwrap();
        assert!((field[0] - 0.03).abs() < 1e-12);
        // node 2: half of each class
        assert!((field[1] - (0.5 * 0.03 + 0.5 * 0.09)).abs() < 1e-12);
        assert!((field[2] - 0.09).abs() < 1e-12);
        // node 4 uncovered, keeps the default
        assert!((field[3] - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_combine_partial_coverage_blends_default() {
        let set = BasisSet::from_vectors(vec![vector("landuse_00", &[(1, 0.25)])]).unwrap();
        let field = set.combine(&[0.1], 0.02, 1).unwrap();
        assert!((field[0] - (0.25 * 0.1 + 0.75 * 0.02)).abs() < 1e-12);
    }

    #[test]
    fn test_combine_rejects_wrong_weight_count() {
        let set = BasisSet::from_vectors(vec![vector("landuse_00", &[(1, 1.0)])]).unwrap();
        assert!(set.combine(&[0.1, 0.2], 0.02, 2).is_err());
    }

    #[test]
    fn test_combine_rejects_out_of_range_node() {
        let set = BasisSet::from_vectors(vec![vector("landuse_00", &[(5, 1.0)])]).unwrap();
        assert!(set.combine(&[0.1], 0.02, 3).is_err());
    }

    #[test]
    fn test_overlapping_coverage_rejected() {
        let result = BasisSet::from_vectors(vec![
            vector("landuse_00", &[(1, 0.8)]),
            vector("landuse_01", &[(1, 0.5)]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_directories() {
        let dir = TempDir::new().unwrap();
        for (i, nodes) in [(1u32, 1.0f64), (2, 1.0)].iter().enumerate() {
            let class_dir = dir.path().join(format!("landuse_0{i}"));
            std::fs::create_dir(&class_dir).unwrap();
            // exception table doubles as the multiplier table; default 0
            let mut field = vec![0.0; 3];
            field[(nodes.0 - 1) as usize] = nodes.1;
            write_manning_field(class_dir.join("fort.13"), "basis", 0.0, &field).unwrap();
        }

        let set = BasisSet::load(dir.path()).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.classes(), vec!["landuse_00", "landuse_01"]);
        let field = set.combine(&[0.5, 0.7], 0.02, 3).unwrap();
        assert!((field[0] - 0.5).abs() < 1e-12);
        assert!((field[1] - 0.7).abs() < 1e-12);
        assert!((field[2] - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_load_empty_dir_fails() {
        let dir = TempDir::new().unwrap();
        assert!(BasisSet::load(dir.path()).is_err());
    }
}
