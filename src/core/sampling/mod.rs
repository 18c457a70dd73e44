//! Parameter sample generation
//!
//! Weight matrices have shape (basis, member): one column of basis-vector
//! weights per ensemble member. They come from an explicit file, a
//! cartesian grid over per-basis coordinate vectors, or uniform random
//! draws over per-basis ranges.

use crate::domain::{Array2, Result, TiderunError};
use rand::Rng;

/// Cartesian product of coordinate vectors into a sample matrix
///
/// Rows are sample points, columns are axes, with the first axis varying
/// slowest. Transpose-read as columns, this feeds [`Array2`] weight
/// matrices for exhaustive parameter sweeps.
pub fn grid_points(axes: &[Vec<f64>]) -> Result<Array2> {
    if axes.is_empty() || axes.iter().any(|a| a.is_empty()) {
        return Err(TiderunError::Sampling(
            "Every grid axis needs at least one coordinate".to_string(),
        ));
    }
    let point_count: usize = axes.iter().map(|a| a.len()).product();
    // stride of the last axis is 1, of the first the product of the rest
    let mut strides = vec![1usize; axes.len()];
    for axis in (0..axes.len().saturating_sub(1)).rev() {
        strides[axis] = strides[axis + 1] * axes[axis + 1].len();
    }
    let mut data = Vec::with_capacity(point_count * axes.len());
    for i in 0..point_count {
        let mut remainder = i;
        for (axis, coords) in axes.iter().enumerate() {
            let index = remainder / strides[axis];
            remainder %= strides[axis];
            data.push(coords[index]);
        }
    }
    Array2::from_rows(point_count, axes.len(), data).map_err(TiderunError::Sampling)
}

/// Transposes a (point, axis) sample grid into a (basis, member) weight matrix
pub fn to_weight_matrix(points: &Array2) -> Array2 {
    let mut weights = Array2::zeros(points.cols(), points.rows());
    for r in 0..points.rows() {
        for c in 0..points.cols() {
            weights.set(c, r, points.get(r, c));
        }
    }
    weights
}

/// Uniform random weight matrix over per-basis ranges
///
/// Shape (basis, members); each member's weight for basis `i` is drawn
/// uniformly from `[lower[i], upper[i]]`.
pub fn uniform_weights(
    lower: &[f64],
    upper: &[f64],
    members: usize,
    rng: &mut impl Rng,
) -> Result<Array2> {
    if lower.len() != upper.len() {
        return Err(TiderunError::Sampling(format!(
            "Range bounds disagree: {} lower vs {} upper",
            lower.len(),
            upper.len()
        )));
    }
    if lower.is_empty() || members == 0 {
        return Err(TiderunError::Sampling(
            "Need at least one basis range and one member".to_string(),
        ));
    }
    for (i, (lo, hi)) in lower.iter().zip(upper).enumerate() {
        if lo > hi {
            return Err(TiderunError::Sampling(format!(
                "Range for basis {i} is inverted: {lo} > {hi}"
            )));
        }
    }
    let mut weights = Array2::zeros(lower.len(), members);
    for basis in 0..lower.len() {
        for member in 0..members {
            let value = if lower[basis] == upper[basis] {
                lower[basis]
            } else {
                rng.gen_range(lower[basis]..=upper[basis])
            };
            weights.set(basis, member, value);
        }
    }
    Ok(weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_grid_points_two_axes() {
        let grid = grid_points(&[vec![0.0, 1.0], vec![10.0, 20.0, 30.0]]).unwrap();
        assert_eq!(grid.rows(), 6);
        assert_eq!(grid.cols(), 2);
        // first axis varies slowest
        assert_eq!(grid.row(0), &[0.0, 10.0]);
        assert_eq!(grid.row(1), &[0.0, 20.0]);
        assert_eq!(grid.row(2), &[0.0, 30.0]);
        assert_eq!(grid.row(3), &[1.0, 10.0]);
        assert_eq!(grid.row(5), &[1.0, 30.0]);
    }

    #[test]
    fn test_grid_points_single_axis() {
        let grid = grid_points(&[vec![1.0, 2.0, 3.0]]).unwrap();
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 1);
        assert_eq!(grid.row(2), &[3.0]);
    }

    #[test]
    fn test_grid_points_rejects_empty_axis() {
        assert!(grid_points(&[]).is_err());
        assert!(grid_points(&[vec![1.0], vec![]]).is_err());
    }

    #[test]
    fn test_to_weight_matrix_transposes() {
        let grid = grid_points(&[vec![0.0, 1.0], vec![5.0]]).unwrap();
        let weights = to_weight_matrix(&grid);
        assert_eq!(weights.rows(), 2);
        assert_eq!(weights.cols(), 2);
        assert_eq!(weights.column(0), vec![0.0, 5.0]);
        assert_eq!(weights.column(1), vec![1.0, 5.0]);
    }

    #[test]
    fn test_uniform_weights_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let weights = uniform_weights(&[0.0, 1.0], &[1.0, 3.0], 20, &mut rng).unwrap();
        assert_eq!(weights.rows(), 2);
        assert_eq!(weights.cols(), 20);
        for member in 0..20 {
            let a = weights.get(0, member);
            let b = weights.get(1, member);
            assert!((0.0..=1.0).contains(&a));
            assert!((1.0..=3.0).contains(&b));
        }
    }

    #[test]
    fn test_uniform_weights_degenerate_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let weights = uniform_weights(&[0.5], &[0.5], 3, &mut rng).unwrap();
        for member in 0..3 {
            assert_eq!(weights.get(0, member), 0.5);
        }
    }

    #[test]
    fn test_uniform_weights_validation() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(uniform_weights(&[0.0], &[1.0, 2.0], 3, &mut rng).is_err());
        assert!(uniform_weights(&[2.0], &[1.0], 3, &mut rng).is_err());
        assert!(uniform_weights(&[0.0], &[1.0], 0, &mut rng).is_err());
    }

    #[test]
    fn test_uniform_weights_deterministic_with_seed() {
        let a = uniform_weights(&[0.0], &[1.0], 5, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = uniform_weights(&[0.0], &[1.0], 5, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }
}
