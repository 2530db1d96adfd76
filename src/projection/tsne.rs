//! t-Distributed Stochastic Neighbor Embedding
//!
//! Exact O(n²) t-SNE. Inputs here are a few dozen points at most, so no
//! Barnes-Hut approximation is needed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::linalg::Matrix;
use super::{common_dimension, ProjectionError};
use crate::vector::squared_distance;

/// Iterations run with early exaggeration and low momentum
const EXAGGERATION_ITERS: usize = 250;
const INITIAL_MOMENTUM: f64 = 0.5;
const FINAL_MOMENTUM: f64 = 0.8;
const MIN_GAIN: f64 = 0.01;
const MIN_GRAD_NORM: f64 = 1e-7;
const INIT_STD: f64 = 1e-4;

/// Bandwidth search
const ENTROPY_TOLERANCE: f64 = 1e-5;
const SEARCH_STEPS: usize = 100;
const MIN_PROBABILITY: f64 = 1e-12;

/// t-SNE parameters
#[derive(Debug, Clone, PartialEq)]
pub struct TsneParams {
    /// Output dimensionality
    pub target_dims: usize,
    /// Effective neighborhood size; must be below `samples - 1`
    pub perplexity: f64,
    /// Hard cap on gradient steps
    pub max_iterations: usize,
    /// RNG seed for the initial layout
    pub seed: u64,
    /// Step size (None = max(n / exaggeration / 4, 50))
    pub learning_rate: Option<f64>,
    /// Attraction multiplier during the first iterations
    pub early_exaggeration: f64,
}

impl Default for TsneParams {
    fn default() -> Self {
        Self {
            target_dims: 2,
            perplexity: 15.0,
            max_iterations: 3000,
            seed: 42,
            learning_rate: None,
            early_exaggeration: 12.0,
        }
    }
}

impl TsneParams {
    pub fn with_perplexity(mut self, perplexity: f64) -> Self {
        self.perplexity = perplexity;
        self
    }

    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_learning_rate(mut self, rate: f64) -> Self {
        self.learning_rate = Some(rate);
        self
    }

    /// Largest perplexity usable with `samples` points, if any
    pub fn max_perplexity_for(samples: usize) -> Option<f64> {
        let limit = samples as f64 - 2.0;
        (limit >= 1.0).then_some(limit)
    }

    fn validate(&self) -> Result<(), ProjectionError> {
        if self.target_dims == 0 {
            return Err(ProjectionError::InvalidParameter(
                "target_dims must be at least 1".to_string(),
            ));
        }
        if !self.perplexity.is_finite() || self.perplexity <= 0.0 {
            return Err(ProjectionError::InvalidParameter(format!(
                "perplexity must be positive, got {}",
                self.perplexity
            )));
        }
        if self.max_iterations == 0 {
            return Err(ProjectionError::InvalidParameter(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if !self.early_exaggeration.is_finite() || self.early_exaggeration <= 0.0 {
            return Err(ProjectionError::InvalidParameter(format!(
                "early_exaggeration must be positive, got {}",
                self.early_exaggeration
            )));
        }
        if let Some(rate) = self.learning_rate {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(ProjectionError::InvalidParameter(format!(
                    "learning_rate must be positive, got {}",
                    rate
                )));
            }
        }
        Ok(())
    }
}

/// Embed `vectors` with t-SNE.
///
/// Requires `perplexity < vectors.len() - 1`. The same seed and input always
/// produce the same layout.
pub fn project_nonlinear<V: AsRef<[f32]>>(
    vectors: &[V],
    params: &TsneParams,
) -> Result<Vec<Vec<f64>>, ProjectionError> {
    params.validate()?;

    let n = vectors.len();
    if params.perplexity >= n as f64 - 1.0 {
        return Err(ProjectionError::InsufficientData {
            required: (params.perplexity.floor() as usize).saturating_add(2),
            actual: n,
            reason: format!("perplexity {} must be below samples - 1", params.perplexity),
        });
    }
    common_dimension(vectors)?;

    let distances: Matrix = (0..n)
        .map(|i| {
            (0..n)
                .map(|j| squared_distance(vectors[i].as_ref(), vectors[j].as_ref()))
                .collect()
        })
        .collect();
    let p = joint_probabilities(&distances, params.perplexity);

    let learning_rate = params
        .learning_rate
        .unwrap_or_else(|| (n as f64 / params.early_exaggeration / 4.0).max(50.0));

    let dims = params.target_dims;
    let mut y = initial_layout(n, dims, params.seed);
    let mut update = vec![vec![0.0; dims]; n];
    let mut gains = vec![vec![1.0f64; dims]; n];
    let mut grad = vec![vec![0.0; dims]; n];
    let mut num: Matrix = vec![vec![0.0; n]; n];

    let mut iterations = 0;
    for iter in 0..params.max_iterations {
        iterations = iter + 1;
        let exaggerating = iter < EXAGGERATION_ITERS;
        let exaggeration = if exaggerating { params.early_exaggeration } else { 1.0 };
        let momentum = if exaggerating { INITIAL_MOMENTUM } else { FINAL_MOMENTUM };

        let sum_q = student_t_kernel(&y, &mut num);

        for i in 0..n {
            grad[i].iter_mut().for_each(|g| *g = 0.0);
            for j in 0..n {
                if i == j {
                    continue;
                }
                let mult = 4.0 * (exaggeration * p[i][j] - num[i][j] / sum_q) * num[i][j];
                for d in 0..dims {
                    grad[i][d] += mult * (y[i][d] - y[j][d]);
                }
            }
        }

        for i in 0..n {
            for d in 0..dims {
                let g = grad[i][d];
                let u = update[i][d];
                let gain = if g * u < 0.0 {
                    gains[i][d] + 0.2
                } else {
                    gains[i][d] * 0.8
                };
                gains[i][d] = gain.max(MIN_GAIN);
                update[i][d] = momentum * u - learning_rate * gains[i][d] * g;
                y[i][d] += update[i][d];
            }
        }
        recenter(&mut y);

        if (iter + 1) % EXAGGERATION_ITERS == 0 {
            debug!(
                iteration = iter + 1,
                kl_divergence = kl_divergence(&p, &num, sum_q),
                "t-SNE progress"
            );
        }

        let grad_norm = grad.iter().flatten().map(|g| g * g).sum::<f64>().sqrt();
        if !exaggerating && grad_norm < MIN_GRAD_NORM {
            break;
        }
    }

    debug!(samples = n, iterations, "t-SNE finished");
    Ok(y)
}

/// Symmetric joint probabilities P from squared input distances
fn joint_probabilities(distances: &Matrix, perplexity: f64) -> Matrix {
    let n = distances.len();
    let target = perplexity.ln();
    let mut conditional: Matrix = vec![vec![0.0; n]; n];

    for i in 0..n {
        let row = &distances[i];
        let shift = (0..n)
            .filter(|&j| j != i)
            .map(|j| row[j])
            .fold(f64::INFINITY, f64::min);

        let mut beta = 1.0;
        let mut beta_min = f64::NEG_INFINITY;
        let mut beta_max = f64::INFINITY;

        for _ in 0..SEARCH_STEPS {
            let mut sum = 0.0;
            let mut weighted = 0.0;
            for j in 0..n {
                if j == i {
                    conditional[i][j] = 0.0;
                    continue;
                }
                let d = row[j] - shift;
                let pj = (-d * beta).exp();
                conditional[i][j] = pj;
                sum += pj;
                weighted += d * pj;
            }
            let entropy = sum.ln() + beta * weighted / sum;
            for pj in conditional[i].iter_mut() {
                *pj /= sum;
            }

            let diff = entropy - target;
            if diff.abs() < ENTROPY_TOLERANCE {
                break;
            }
            if diff > 0.0 {
                beta_min = beta;
                beta = if beta_max.is_infinite() { beta * 2.0 } else { (beta + beta_max) / 2.0 };
            } else {
                beta_max = beta;
                beta = if beta_min.is_infinite() { beta / 2.0 } else { (beta + beta_min) / 2.0 };
            }
        }
    }

    let denom = 2.0 * n as f64;
    (0..n)
        .map(|i| {
            (0..n)
                .map(|j| {
                    if i == j {
                        0.0
                    } else {
                        ((conditional[i][j] + conditional[j][i]) / denom).max(MIN_PROBABILITY)
                    }
                })
                .collect()
        })
        .collect()
}

/// Fill `num` with 1 / (1 + |yi - yj|²) and return the off-diagonal sum
fn student_t_kernel(y: &[Vec<f64>], num: &mut Matrix) -> f64 {
    let n = y.len();
    let mut sum = 0.0;
    for i in 0..n {
        num[i][i] = 0.0;
        for j in (i + 1)..n {
            let d: f64 = y[i].iter().zip(&y[j]).map(|(a, b)| (a - b) * (a - b)).sum();
            let q = 1.0 / (1.0 + d);
            num[i][j] = q;
            num[j][i] = q;
            sum += 2.0 * q;
        }
    }
    sum.max(f64::MIN_POSITIVE)
}

fn kl_divergence(p: &Matrix, num: &Matrix, sum_q: f64) -> f64 {
    let mut kl = 0.0;
    for (i, row) in p.iter().enumerate() {
        for (j, &pij) in row.iter().enumerate() {
            if i != j {
                let qij = (num[i][j] / sum_q).max(MIN_PROBABILITY);
                kl += pij * (pij / qij).ln();
            }
        }
    }
    kl
}

/// Small Gaussian cloud around the origin
fn initial_layout(n: usize, dims: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| (0..dims).map(|_| INIT_STD * standard_normal(&mut rng)).collect())
        .collect()
}

/// Box-Muller transform
fn standard_normal<R: Rng>(rng: &mut R) -> f64 {
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

fn recenter(y: &mut [Vec<f64>]) {
    let n = y.len() as f64;
    let dims = y.first().map_or(0, Vec::len);
    for d in 0..dims {
        let mean = y.iter().map(|p| p[d]).sum::<f64>() / n;
        for p in y.iter_mut() {
            p[d] -= mean;
        }
    }
}
