//! Embedding Store
//!
//! Immutable word -> vector table, built once at startup.

use hashbrown::HashMap;

use super::loader::LoadError;
use super::similarity::l2_norm;

/// A vocabulary entry
#[derive(Debug, Clone)]
pub struct EmbeddingEntry {
    /// The vocabulary word
    pub word: String,
    /// The embedding vector
    pub embedding: Vec<f32>,
    /// Cached L2 norm of `embedding`
    pub norm: f32,
}

impl EmbeddingEntry {
    pub fn new(word: impl Into<String>, embedding: Vec<f32>) -> Self {
        let norm = l2_norm(&embedding);
        Self {
            word: word.into(),
            embedding,
            norm,
        }
    }
}

/// Read-only embedding table.
///
/// There is no way to mutate a store once built; share it with `Arc`.
#[derive(Debug)]
pub struct EmbeddingStore {
    /// Word -> position in `entries`
    index: HashMap<String, usize>,
    /// Entries in load order
    entries: Vec<EmbeddingEntry>,
    /// Embedding dimension shared by every entry
    dimension: usize,
}

impl EmbeddingStore {
    /// Start building a store of the given dimension
    pub fn builder(dimension: usize) -> EmbeddingStoreBuilder {
        EmbeddingStoreBuilder::new(dimension)
    }

    /// Build a store from `(word, vector)` pairs
    pub fn from_pairs<I, W>(dimension: usize, pairs: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = (W, Vec<f32>)>,
        W: Into<String>,
    {
        let mut builder = EmbeddingStoreBuilder::new(dimension);
        for (word, embedding) in pairs {
            builder.insert(word, embedding)?;
        }
        builder.build()
    }

    /// Get embedding dimension
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of vocabulary entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if word is in the vocabulary
    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    /// Look up a word's entry
    pub fn entry(&self, word: &str) -> Option<&EmbeddingEntry> {
        self.index.get(word).map(|&i| &self.entries[i])
    }

    /// Look up a word's vector
    pub fn get(&self, word: &str) -> Option<&[f32]> {
        self.entry(word).map(|e| e.embedding.as_slice())
    }

    /// All entries in load order
    pub fn entries(&self) -> &[EmbeddingEntry] {
        &self.entries
    }

    /// All words in load order
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.word.as_str())
    }
}

/// Accumulates entries before freezing them into an [`EmbeddingStore`]
#[derive(Debug)]
pub struct EmbeddingStoreBuilder {
    index: HashMap<String, usize>,
    entries: Vec<EmbeddingEntry>,
    dimension: usize,
}

impl EmbeddingStoreBuilder {
    pub fn new(dimension: usize) -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
            dimension,
        }
    }

    /// Reserve room for `additional` more entries
    pub fn reserve(&mut self, additional: usize) {
        self.index.reserve(additional);
        self.entries.reserve(additional);
    }

    /// Expected embedding dimension
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of entries inserted so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert an entry.
    ///
    /// Returns `Ok(false)` when the word was already present; the first
    /// occurrence is kept.
    pub fn insert(&mut self, word: impl Into<String>, embedding: Vec<f32>) -> Result<bool, LoadError> {
        let word = word.into();
        if embedding.len() != self.dimension {
            return Err(LoadError::DimensionMismatch {
                word,
                expected: self.dimension,
                got: embedding.len(),
            });
        }
        if embedding.iter().any(|x| !x.is_finite()) {
            return Err(LoadError::NonFinite { word });
        }
        if self.index.contains_key(&word) {
            return Ok(false);
        }

        self.index.insert(word.clone(), self.entries.len());
        self.entries.push(EmbeddingEntry::new(word, embedding));
        Ok(true)
    }

    /// Freeze into a read-only store
    pub fn build(self) -> Result<EmbeddingStore, LoadError> {
        if self.entries.is_empty() {
            return Err(LoadError::Empty);
        }
        Ok(EmbeddingStore {
            index: self.index,
            entries: self.entries,
            dimension: self.dimension,
        })
    }
}
