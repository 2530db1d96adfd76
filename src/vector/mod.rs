//! Vector Module
//!
//! Embedding table loading, storage and cosine neighbor lookup.

mod embedding_store;
pub mod loader;
mod neighbors;
mod similarity;

pub use embedding_store::{EmbeddingEntry, EmbeddingStore, EmbeddingStoreBuilder};
pub use loader::{load, EmbeddingFormat, EmbeddingSource, LoadError, DATA_DIR_ENV, DEFAULT_MODEL};
pub use neighbors::{nearest, Neighbor};
pub use similarity::{cosine_similarity, cosine_with_norms, dot_product, l2_norm, squared_distance};
