//! Nearest Neighbor Query
//!
//! Exhaustive cosine scan over the embedding store.

use std::cmp::Ordering;

use tracing::debug;

use super::embedding_store::EmbeddingStore;
use super::similarity::cosine_with_norms;

/// A neighbor of the query word
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    /// Vocabulary word
    pub word: String,
    /// Cosine similarity to the query word
    pub score: f32,
}

/// Descending score, then ascending word
fn rank(a: &Neighbor, b: &Neighbor) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.word.cmp(&b.word))
}

/// Find the `top_n` words most similar to `word`.
///
/// The query word itself is never returned. An unknown word yields an
/// empty result rather than an error.
pub fn nearest(store: &EmbeddingStore, word: &str, top_n: usize) -> Vec<Neighbor> {
    let query = match store.entry(word) {
        Some(entry) => entry,
        None => {
            debug!(word, "Query word not in vocabulary");
            return Vec::new();
        }
    };
    if top_n == 0 {
        return Vec::new();
    }

    let mut results: Vec<Neighbor> = store
        .entries()
        .iter()
        .filter(|e| e.word != query.word)
        .map(|e| Neighbor {
            word: e.word.clone(),
            score: cosine_with_norms(&query.embedding, query.norm, &e.embedding, e.norm),
        })
        .collect();

    // Partition around the cut first so large vocabularies only sort the head.
    if results.len() > top_n {
        results.select_nth_unstable_by(top_n - 1, rank);
        results.truncate(top_n);
    }
    results.sort_by(rank);
    results
}
