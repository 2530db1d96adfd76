//! Explorer
//!
//! One interaction cycle: neighbor lookup followed by two independent
//! projections of the neighbor vectors.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::projection::{project_linear, project_nonlinear, ProjectionError, TsneParams};
use crate::vector::{nearest, EmbeddingStore, Neighbor};

/// Explorer configuration
#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    /// Word shown before the user asks for anything
    pub default_word: String,
    /// Neighbor count used when none is given
    pub default_top_n: usize,
    /// Smallest accepted neighbor count
    pub min_top_n: usize,
    /// Largest accepted neighbor count
    pub max_top_n: usize,
    /// t-SNE settings
    pub tsne: TsneParams,
    /// Lower the perplexity when the neighbor set is too small for it
    pub clamp_perplexity: bool,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            default_word: "king".to_string(),
            default_top_n: 10,
            min_top_n: 1,
            max_top_n: 20,
            tsne: TsneParams::default(),
            clamp_perplexity: true,
        }
    }
}

impl ExplorerConfig {
    pub fn with_default_word(mut self, word: impl Into<String>) -> Self {
        self.default_word = word.into();
        self
    }

    pub fn with_default_top_n(mut self, top_n: usize) -> Self {
        self.default_top_n = top_n;
        self
    }

    pub fn with_top_n_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_top_n = min.max(1);
        self.max_top_n = max.max(self.min_top_n);
        self
    }

    pub fn with_tsne(mut self, tsne: TsneParams) -> Self {
        self.tsne = tsne;
        self
    }

    pub fn with_clamp_perplexity(mut self, clamp: bool) -> Self {
        self.clamp_perplexity = clamp;
        self
    }

    /// Clamp a requested neighbor count into the configured bounds
    pub fn bound_top_n(&self, top_n: usize) -> usize {
        top_n.clamp(self.min_top_n, self.max_top_n)
    }
}

/// Which projection produced a set of coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionKind {
    Pca,
    Tsne,
}

impl ProjectionKind {
    pub fn title(&self) -> &'static str {
        match self {
            ProjectionKind::Pca => "PCA Visualization of Word Embeddings",
            ProjectionKind::Tsne => "t-SNE Visualization of Word Embeddings",
        }
    }

    pub fn subheading(&self) -> &'static str {
        match self {
            ProjectionKind::Pca => "PCA Visualization of Embeddings",
            ProjectionKind::Tsne => "t-SNE Visualization of Embeddings",
        }
    }

    pub fn axis_labels(&self) -> (&'static str, &'static str) {
        match self {
            ProjectionKind::Pca => ("PC1", "PC2"),
            ProjectionKind::Tsne => ("x", "y"),
        }
    }
}

/// A word placed in the 2D plane
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedPoint {
    pub word: String,
    pub x: f64,
    pub y: f64,
}

/// Coordinates from one projection
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub kind: ProjectionKind,
    pub points: Vec<ProjectedPoint>,
    /// Adjustment made to the parameters, if any
    pub note: Option<String>,
}

/// Outcome of one interaction
#[derive(Debug, Clone)]
pub enum Exploration {
    /// The query word is not in the vocabulary
    NotFound { word: String },
    /// Neighbors with independently computed projections
    Found {
        word: String,
        top_n: usize,
        neighbors: Vec<Neighbor>,
        pca: Result<Projection, ProjectionError>,
        tsne: Result<Projection, ProjectionError>,
    },
}

impl Exploration {
    pub fn word(&self) -> &str {
        match self {
            Exploration::NotFound { word } | Exploration::Found { word, .. } => word,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Exploration::Found { .. })
    }

    /// Neighbors, empty when not found
    pub fn neighbors(&self) -> &[Neighbor] {
        match self {
            Exploration::NotFound { .. } => &[],
            Exploration::Found { neighbors, .. } => neighbors,
        }
    }
}

/// Runs interactions against a shared, read-only store
#[derive(Debug, Clone)]
pub struct Explorer {
    store: Arc<EmbeddingStore>,
    config: ExplorerConfig,
}

impl Explorer {
    pub fn new(store: Arc<EmbeddingStore>, config: ExplorerConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &EmbeddingStore {
        &self.store
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    /// Neighbor lookup only, with `top_n` clamped to the configured bounds
    pub fn neighbors(&self, word: &str, top_n: usize) -> Vec<Neighbor> {
        nearest(&self.store, word, self.config.bound_top_n(top_n))
    }

    /// Run a full interaction
    pub fn explore(&self, word: &str, top_n: usize) -> Exploration {
        let start = Instant::now();
        let top_n = self.config.bound_top_n(top_n);
        let neighbors = nearest(&self.store, word, top_n);

        if neighbors.is_empty() {
            info!(word, "Word not in vocabulary");
            return Exploration::NotFound {
                word: word.to_string(),
            };
        }

        let words: Vec<&str> = neighbors.iter().map(|n| n.word.as_str()).collect();
        let vectors: Vec<&[f32]> = words
            .iter()
            .filter_map(|w| self.store.get(w))
            .collect();

        let pca = self.run_pca(&words, &vectors);
        let tsne = self.run_tsne(&words, &vectors);

        debug!(
            word,
            top_n,
            neighbors = neighbors.len(),
            elapsed = ?start.elapsed(),
            "Exploration complete"
        );

        Exploration::Found {
            word: word.to_string(),
            top_n,
            neighbors,
            pca,
            tsne,
        }
    }

    fn run_pca(&self, words: &[&str], vectors: &[&[f32]]) -> Result<Projection, ProjectionError> {
        let coords = project_linear(vectors, 2).inspect_err(|e| {
            warn!(error = %e, "PCA projection failed");
        })?;
        Ok(Projection {
            kind: ProjectionKind::Pca,
            points: label(words, coords),
            note: None,
        })
    }

    fn run_tsne(&self, words: &[&str], vectors: &[&[f32]]) -> Result<Projection, ProjectionError> {
        let (params, note) = self.tsne_params_for(vectors.len());
        let coords = project_nonlinear(vectors, &params).inspect_err(|e| {
            warn!(error = %e, "t-SNE projection failed");
        })?;
        Ok(Projection {
            kind: ProjectionKind::Tsne,
            points: label(words, coords),
            note,
        })
    }

    /// t-SNE parameters for `samples` points, lowering the perplexity when allowed
    pub fn tsne_params_for(&self, samples: usize) -> (TsneParams, Option<String>) {
        let mut params = self.config.tsne.clone();
        params.target_dims = 2;

        if !self.config.clamp_perplexity || params.perplexity < samples as f64 - 1.0 {
            return (params, None);
        }

        match TsneParams::max_perplexity_for(samples) {
            Some(limit) => {
                warn!(
                    requested = params.perplexity,
                    used = limit,
                    samples,
                    "Lowering t-SNE perplexity for small neighbor set"
                );
                let note = format!(
                    "perplexity lowered from {} to {} for {} samples",
                    params.perplexity, limit, samples
                );
                params.perplexity = limit;
                (params, Some(note))
            }
            None => (params, None),
        }
    }
}

fn label(words: &[&str], coords: Vec<Vec<f64>>) -> Vec<ProjectedPoint> {
    words
        .iter()
        .zip(coords)
        .map(|(word, c)| ProjectedPoint {
            word: word.to_string(),
            x: c.first().copied().unwrap_or(0.0),
            y: c.get(1).copied().unwrap_or(0.0),
        })
        .collect()
}
