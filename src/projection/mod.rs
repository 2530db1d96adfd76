//! Projection Engine
//!
//! Reduces a handful of embedding vectors to 2D coordinates with a linear
//! (PCA) and a nonlinear (t-SNE) method. Both are pure functions and fail
//! independently of each other.

mod linalg;
mod pca;
mod tsne;

use thiserror::Error;

pub use pca::project_linear;
pub use tsne::{project_nonlinear, TsneParams};

/// Errors raised by a projection
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    /// Too few samples or dimensions for the requested projection
    #[error("insufficient data: {reason} (need {required}, have {actual})")]
    InsufficientData {
        required: usize,
        actual: usize,
        reason: String,
    },
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Check that every vector has the same, non-zero length and return it
fn common_dimension<V: AsRef<[f32]>>(vectors: &[V]) -> Result<usize, ProjectionError> {
    let first = match vectors.first() {
        Some(v) => v.as_ref().len(),
        None => {
            return Err(ProjectionError::InsufficientData {
                required: 1,
                actual: 0,
                reason: "no input vectors".to_string(),
            })
        }
    };
    if first == 0 {
        return Err(ProjectionError::InvalidParameter(
            "input vectors are empty".to_string(),
        ));
    }
    if let Some(pos) = vectors.iter().position(|v| v.as_ref().len() != first) {
        return Err(ProjectionError::InvalidParameter(format!(
            "vector {} has dimension {}, expected {}",
            pos,
            vectors[pos].as_ref().len(),
            first
        )));
    }
    Ok(first)
}
