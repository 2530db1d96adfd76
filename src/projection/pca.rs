//! Principal Component Analysis
//!
//! The sample count is tiny compared to the embedding dimension, so the
//! decomposition runs on the n x n Gram matrix of the centered data instead
//! of the d x d covariance matrix.

use super::linalg::{symmetric_eigen, Matrix};
use super::{common_dimension, ProjectionError};

/// Eigenvalues below this fraction of the largest are treated as zero variance
const RANK_TOLERANCE: f64 = 1e-10;

/// Project `vectors` onto their first `target_dims` principal components.
///
/// Deterministic: each axis is oriented so its largest-magnitude loading is
/// positive. Axes without variance project every sample to 0.
pub fn project_linear<V: AsRef<[f32]>>(
    vectors: &[V],
    target_dims: usize,
) -> Result<Vec<Vec<f64>>, ProjectionError> {
    if target_dims == 0 {
        return Err(ProjectionError::InvalidParameter(
            "target_dims must be at least 1".to_string(),
        ));
    }
    if vectors.len() < target_dims {
        return Err(ProjectionError::InsufficientData {
            required: target_dims,
            actual: vectors.len(),
            reason: "fewer samples than target dimensions".to_string(),
        });
    }
    let dim = common_dimension(vectors)?;
    if dim < target_dims {
        return Err(ProjectionError::InsufficientData {
            required: target_dims,
            actual: dim,
            reason: "input dimension below target dimensions".to_string(),
        });
    }

    let n = vectors.len();
    let centered = center(vectors, dim);

    let gram: Matrix = (0..n)
        .map(|i| (0..n).map(|j| dot(&centered[i], &centered[j])).collect())
        .collect();
    let (values, vectors_u) = symmetric_eigen(&gram);
    let largest = values.first().copied().unwrap_or(0.0).max(0.0);

    let mut coords = vec![vec![0.0; target_dims]; n];
    for (k, (lambda, u)) in values.iter().zip(&vectors_u).take(target_dims).enumerate() {
        if *lambda <= largest * RANK_TOLERANCE || *lambda <= 0.0 {
            continue;
        }
        let sigma = lambda.sqrt();

        // Loading vector in feature space: Xcᵀ u / sigma
        let mut loading = vec![0.0; dim];
        for (row, ui) in centered.iter().zip(u) {
            for (l, x) in loading.iter_mut().zip(row) {
                *l += x * ui;
            }
        }
        let pivot = loading
            .iter()
            .copied()
            .max_by(|a, b| a.abs().total_cmp(&b.abs()))
            .unwrap_or(0.0);
        let sign = if pivot < 0.0 { -1.0 } else { 1.0 };

        for (point, ui) in coords.iter_mut().zip(u) {
            point[k] = sign * ui * sigma;
        }
    }

    Ok(coords)
}

fn center<V: AsRef<[f32]>>(vectors: &[V], dim: usize) -> Vec<Vec<f64>> {
    let n = vectors.len() as f64;
    let mut mean = vec![0.0; dim];
    for v in vectors {
        for (m, x) in mean.iter_mut().zip(v.as_ref()) {
            *m += f64::from(*x);
        }
    }
    for m in mean.iter_mut() {
        *m /= n;
    }

    vectors
        .iter()
        .map(|v| {
            v.as_ref()
                .iter()
                .zip(&mean)
                .map(|(x, m)| f64::from(*x) - m)
                .collect()
        })
        .collect()
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Vec<f32>> {
        vec![
            vec![1.0, 1.0, 0.0],
            vec![1.0, 0.9, 0.1],
            vec![1.0, 0.6, 0.3],
            vec![0.2, 1.0, 1.0],
        ]
    }

    #[test]
    fn test_one_point_per_input() {
        let coords = project_linear(&sample(), 2).unwrap();
        assert_eq!(coords.len(), 4);
        assert!(coords.iter().all(|c| c.len() == 2));
    }

    #[test]
    fn test_single_vector_is_insufficient() {
        let result = project_linear(&[vec![1.0, 2.0, 3.0]], 2);
        assert!(matches!(
            result,
            Err(ProjectionError::InsufficientData { required: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn test_low_dimension_is_insufficient() {
        let result = project_linear(&[vec![1.0], vec![2.0], vec![3.0]], 2);
        assert!(matches!(result, Err(ProjectionError::InsufficientData { .. })));
    }

    #[test]
    fn test_deterministic() {
        let a = project_linear(&sample(), 2).unwrap();
        let b = project_linear(&sample(), 2).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_points_on_a_line() {
        // All variance along (1, 2, 0); second axis is empty.
        let data = vec![
            vec![0.0, 0.0, 0.0],
            vec![1.0, 2.0, 0.0],
            vec![2.0, 4.0, 0.0],
        ];
        let coords = project_linear(&data, 2).unwrap();
        let spread = 5.0f64.sqrt();

        assert!((coords[0][0] + spread).abs() < 1e-9);
        assert!(coords[1][0].abs() < 1e-9);
        assert!((coords[2][0] - spread).abs() < 1e-9);
        assert!(coords.iter().all(|c| c[1] == 0.0));
    }

    #[test]
    fn test_components_are_centered_and_ordered() {
        let coords = project_linear(&sample(), 2).unwrap();
        let var = |k: usize| coords.iter().map(|c| c[k] * c[k]).sum::<f64>();
        let mean = |k: usize| coords.iter().map(|c| c[k]).sum::<f64>();

        assert!(mean(0).abs() < 1e-9);
        assert!(mean(1).abs() < 1e-9);
        assert!(var(0) >= var(1));
    }

    #[test]
    fn test_two_samples_allowed() {
        let coords = project_linear(&[vec![0.0, 0.0], vec![2.0, 0.0]], 2).unwrap();
        assert_eq!(coords.len(), 2);
        assert!((coords[0][0] + 1.0).abs() < 1e-9);
        assert!((coords[1][0] - 1.0).abs() < 1e-9);
    }
}
