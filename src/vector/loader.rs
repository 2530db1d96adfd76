//! Embedding Loader
//!
//! Resolves a pretrained table by identifier inside a local model directory
//! and parses word2vec (binary or text) and GloVe files into an
//! [`EmbeddingStore`].

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info};

use super::embedding_store::{EmbeddingStore, EmbeddingStoreBuilder};

/// Identifier of the default pretrained table
pub const DEFAULT_MODEL: &str = "word2vec-google-news-300";

/// Environment variable overriding the model directory
pub const DATA_DIR_ENV: &str = "WORDLENS_DATA_DIR";

/// Upper bound on capacity reserved from a header count
const MAX_RESERVE: usize = 1 << 20;

/// Largest vector length accepted from a binary header
const MAX_DIMENSION: usize = 1 << 16;

/// Errors raised while locating or parsing an embedding table
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("io error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("embedding model '{model}' not found (looked for: {candidates})")]
    ModelNotFound { model: String, candidates: String },
    #[error("invalid header: {0}")]
    Header(String),
    #[error("parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("dimension mismatch for '{word}': expected {expected}, got {got}")]
    DimensionMismatch {
        word: String,
        expected: usize,
        got: usize,
    },
    #[error("non-finite component in vector for '{word}'")]
    NonFinite { word: String },
    #[error("table ended after {read} of {expected} entries")]
    Truncated { expected: usize, read: usize },
    #[error("embedding table is empty")]
    Empty,
}

/// On-disk layout of an embedding table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbeddingFormat {
    /// Pick by extension, then by sniffing the first line
    #[default]
    Auto,
    /// word2vec C binary format
    Word2VecBinary,
    /// word2vec text format with `<count> <dim>` header
    Word2VecText,
    /// GloVe text format, no header
    Glove,
}

impl fmt::Display for EmbeddingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbeddingFormat::Auto => write!(f, "auto"),
            EmbeddingFormat::Word2VecBinary => write!(f, "word2vec-bin"),
            EmbeddingFormat::Word2VecText => write!(f, "word2vec-text"),
            EmbeddingFormat::Glove => write!(f, "glove"),
        }
    }
}

impl FromStr for EmbeddingFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(EmbeddingFormat::Auto),
            "word2vec-bin" | "bin" | "binary" => Ok(EmbeddingFormat::Word2VecBinary),
            "word2vec-text" | "text" | "txt" => Ok(EmbeddingFormat::Word2VecText),
            "glove" => Ok(EmbeddingFormat::Glove),
            other => Err(format!(
                "unknown format '{}' (expected auto, word2vec-bin, word2vec-text, glove)",
                other
            )),
        }
    }
}

/// Where to find the embedding table
#[derive(Debug, Clone)]
pub struct EmbeddingSource {
    /// Model identifier, resolved inside `data_dir`
    pub model: String,
    /// Local model repository root
    pub data_dir: PathBuf,
    /// Explicit file, bypasses identifier resolution
    pub path: Option<PathBuf>,
    /// File layout
    pub format: EmbeddingFormat,
    /// Keep only the first N entries
    pub limit: Option<usize>,
}

impl Default for EmbeddingSource {
    fn default() -> Self {
        let data_dir = std::env::var_os(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./models"));
        Self {
            model: DEFAULT_MODEL.to_string(),
            data_dir,
            path: None,
            format: EmbeddingFormat::Auto,
            limit: None,
        }
    }
}

impl EmbeddingSource {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_data_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_format(mut self, format: EmbeddingFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Candidate files for the model identifier, in lookup order
    pub fn candidates(&self) -> Vec<PathBuf> {
        let nested = self.data_dir.join(&self.model);
        vec![
            self.data_dir.join(format!("{}.bin", self.model)),
            self.data_dir.join(format!("{}.txt", self.model)),
            nested.join(format!("{}.bin", self.model)),
            nested.join(format!("{}.txt", self.model)),
        ]
    }

    /// Resolve to a concrete file path
    pub fn resolve(&self) -> Result<PathBuf, LoadError> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }

        let candidates = self.candidates();
        candidates
            .iter()
            .find(|p| p.is_file())
            .cloned()
            .ok_or_else(|| LoadError::ModelNotFound {
                model: self.model.clone(),
                candidates: candidates
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// Load the embedding table named by `source`
pub fn load(source: &EmbeddingSource) -> Result<EmbeddingStore, LoadError> {
    let path = source.resolve()?;
    let start = Instant::now();
    info!(path = %path.display(), format = %source.format, "Loading embedding table");

    let file = File::open(&path).map_err(|e| LoadError::Io {
        path: path.clone(),
        source: e,
    })?;
    let reader = BufReader::new(file);

    let format = match source.format {
        EmbeddingFormat::Auto if has_extension(&path, "bin") => EmbeddingFormat::Word2VecBinary,
        other => other,
    };

    let store = match format {
        EmbeddingFormat::Word2VecBinary => read_word2vec_binary(reader, source.limit),
        text => read_text(reader, text, source.limit),
    }
    .map_err(|e| match e {
        LoadError::Io { source, .. } => LoadError::Io { path: path.clone(), source },
        other => other,
    })?;

    info!(
        words = store.len(),
        dimension = store.dimension(),
        elapsed = ?start.elapsed(),
        "Embedding table loaded"
    );
    Ok(store)
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

fn io_err(source: io::Error) -> LoadError {
    LoadError::Io {
        path: PathBuf::new(),
        source,
    }
}

/// Parse a `<count> <dim>` header line
fn parse_header(line: &str) -> Option<(usize, usize)> {
    let mut parts = line.split_whitespace();
    let count = parts.next()?.parse().ok()?;
    let dim = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((count, dim))
}

/// Read the word2vec C binary format
pub fn read_word2vec_binary<R: BufRead>(
    mut reader: R,
    limit: Option<usize>,
) -> Result<EmbeddingStore, LoadError> {
    let mut header = String::new();
    reader.read_line(&mut header).map_err(io_err)?;
    let (count, dim) = parse_header(&header)
        .ok_or_else(|| LoadError::Header(header.trim().to_string()))?;
    if dim == 0 {
        return Err(LoadError::Header("dimension must be positive".to_string()));
    }
    if dim > MAX_DIMENSION {
        return Err(LoadError::Header(format!("dimension {} too large", dim)));
    }

    let wanted = limit.map_or(count, |l| l.min(count));
    let mut builder = EmbeddingStoreBuilder::new(dim);
    builder.reserve(wanted.min(MAX_RESERVE));

    let mut word_buf = Vec::with_capacity(64);
    let record_len = dim
        .checked_mul(4)
        .ok_or_else(|| LoadError::Header(format!("dimension {} too large", dim)))?;
    let mut vec_buf = vec![0u8; record_len];

    for read in 0..wanted {
        word_buf.clear();
        let n = reader.read_until(b' ', &mut word_buf).map_err(io_err)?;
        if n == 0 || word_buf.last() != Some(&b' ') {
            return Err(LoadError::Truncated { expected: wanted, read });
        }
        word_buf.pop();
        let start = word_buf
            .iter()
            .position(|b| *b != b'\n' && *b != b'\r')
            .unwrap_or(word_buf.len());
        let word = String::from_utf8_lossy(&word_buf[start..]).into_owned();

        reader.read_exact(&mut vec_buf).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => LoadError::Truncated { expected: wanted, read },
            _ => io_err(e),
        })?;
        let embedding = vec_buf
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();

        if !builder.insert(word, embedding)? {
            debug!(entry = read, "Skipping duplicate word");
        }
    }

    builder.build()
}

/// Read word2vec text or GloVe, deciding by the first line when `format` is `Auto`
pub fn read_text<R: BufRead>(
    reader: R,
    format: EmbeddingFormat,
    limit: Option<usize>,
) -> Result<EmbeddingStore, LoadError> {
    let mut lines = reader.lines();
    let first = match lines.next() {
        Some(line) => line.map_err(io_err)?,
        None => return Err(LoadError::Empty),
    };

    let header = parse_header(&first);
    let (expected, pending_first) = match (format, header) {
        (EmbeddingFormat::Word2VecText | EmbeddingFormat::Word2VecBinary, None) => {
            return Err(LoadError::Header(first.trim().to_string()));
        }
        (EmbeddingFormat::Glove, _) | (EmbeddingFormat::Auto, None) => (None, Some(first)),
        (_, Some(header)) => (Some(header), None),
    };

    let cap = limit.unwrap_or(usize::MAX);
    let mut builder: Option<EmbeddingStoreBuilder> = expected.map(|(count, dim)| {
        let mut b = EmbeddingStoreBuilder::new(dim);
        b.reserve(count.min(cap).min(MAX_RESERVE));
        b
    });

    // Line numbers are 1-based and count the header when present.
    let offset = if pending_first.is_some() { 1 } else { 2 };
    let rest = lines.map(|l| l.map_err(io_err));
    let all = pending_first.map(Ok).into_iter().chain(rest);

    let mut read = 0usize;
    for (i, line) in all.enumerate() {
        if read >= cap || expected.is_some_and(|(count, _)| read >= count) {
            break;
        }
        let line = line?;
        let line_no = i + offset;

        let mut tokens = line.split_whitespace();
        let word = match tokens.next() {
            Some(w) => w,
            None => continue,
        };
        let embedding = tokens
            .map(|t| {
                t.parse::<f32>().map_err(|e| LoadError::Parse {
                    line: line_no,
                    reason: format!("'{}': {}", t, e),
                })
            })
            .collect::<Result<Vec<f32>, _>>()?;

        let b = builder.get_or_insert_with(|| EmbeddingStoreBuilder::new(embedding.len()));
        if b.dimension() == 0 {
            return Err(LoadError::Parse {
                line: line_no,
                reason: "entry has no vector components".to_string(),
            });
        }
        b.insert(word, embedding)?;
        read += 1;
    }

    if let Some((count, _)) = expected {
        let wanted = count.min(cap);
        if read < wanted {
            return Err(LoadError::Truncated { expected: wanted, read });
        }
    }

    builder.ok_or(LoadError::Empty)?.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::TempDir;

    fn binary_table(entries: &[(&str, [f32; 3])]) -> Vec<u8> {
        let mut buf = format!("{} 3\n", entries.len()).into_bytes();
        for (word, v) in entries {
            buf.extend_from_slice(word.as_bytes());
            buf.push(b' ');
            for x in v {
                buf.extend_from_slice(&x.to_le_bytes());
            }
            buf.push(b'\n');
        }
        buf
    }

    #[test]
    fn test_read_binary() {
        let data = binary_table(&[("king", [1.0, 0.5, 0.0]), ("queen", [0.9, 0.6, 0.1])]);
        let store = read_word2vec_binary(Cursor::new(data), None).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.dimension(), 3);
        assert_eq!(store.get("queen").unwrap(), &[0.9, 0.6, 0.1]);
    }

    #[test]
    fn test_read_binary_limit() {
        let data = binary_table(&[("a", [1.0, 0.0, 0.0]), ("b", [0.0, 1.0, 0.0]), ("c", [0.0, 0.0, 1.0])]);
        let store = read_word2vec_binary(Cursor::new(data), Some(2)).unwrap();
        assert_eq!(store.len(), 2);
        assert!(!store.contains("c"));
    }

    #[test]
    fn test_read_binary_truncated() {
        let mut data = binary_table(&[("a", [1.0, 0.0, 0.0]), ("b", [0.0, 1.0, 0.0])]);
        data.truncate(data.len() - 6);
        let result = read_word2vec_binary(Cursor::new(data), None);
        assert!(matches!(result, Err(LoadError::Truncated { expected: 2, read: 1 })));
    }

    #[test]
    fn test_read_word2vec_text() {
        let data = "2 3\nking 1 0.5 0\nqueen 0.9 0.6 0.1\n";
        let store = read_text(Cursor::new(data), EmbeddingFormat::Auto, None).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("king").unwrap(), &[1.0, 0.5, 0.0]);
    }

    #[test]
    fn test_read_glove() {
        let data = "the 0.1 0.2\nof 0.3 0.4\n\nand 0.5 0.6\n";
        let store = read_text(Cursor::new(data), EmbeddingFormat::Glove, None).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.dimension(), 2);
        assert_eq!(store.words().collect::<Vec<_>>(), vec!["the", "of", "and"]);
    }

    #[test]
    fn test_text_parse_error_reports_line() {
        let data = "2 2\nok 1 2\nbad 1 x\n";
        let result = read_text(Cursor::new(data), EmbeddingFormat::Word2VecText, None);
        assert!(matches!(result, Err(LoadError::Parse { line: 3, .. })));
    }

    #[test]
    fn test_text_dimension_mismatch() {
        let data = "a 1 2 3\nb 1 2\n";
        let result = read_text(Cursor::new(data), EmbeddingFormat::Glove, None);
        assert!(matches!(
            result,
            Err(LoadError::DimensionMismatch { expected: 3, got: 2, .. })
        ));
    }

    #[test]
    fn test_text_missing_header() {
        let data = "a 1 2 3\n";
        let result = read_text(Cursor::new(data), EmbeddingFormat::Word2VecText, None);
        assert!(matches!(result, Err(LoadError::Header(_))));
    }

    #[test]
    fn test_text_truncated() {
        let data = "3 2\na 1 2\nb 3 4\n";
        let result = read_text(Cursor::new(data), EmbeddingFormat::Auto, None);
        assert!(matches!(result, Err(LoadError::Truncated { expected: 3, read: 2 })));
    }

    #[test]
    fn test_huge_header_count() {
        let data = format!("{} 2\na 1 2\n", usize::MAX);
        let result = read_text(Cursor::new(data), EmbeddingFormat::Auto, None);
        assert!(matches!(result, Err(LoadError::Truncated { read: 1, .. })));

        let mut data = format!("{} 3\n", usize::MAX).into_bytes();
        data.extend_from_slice(&binary_table(&[("a", [1.0, 0.0, 0.0])])[4..]);
        let result = read_word2vec_binary(Cursor::new(data), None);
        assert!(matches!(result, Err(LoadError::Truncated { read: 1, .. })));
    }

    #[test]
    fn test_oversized_binary_dimension() {
        for header in ["1 4611686018427387904\n", "1 1099511627776\n"] {
            let result = read_word2vec_binary(Cursor::new(header.as_bytes().to_vec()), None);
            assert!(matches!(result, Err(LoadError::Header(_))));
        }
    }

    #[test]
    fn test_resolve_by_identifier() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("toy-3");
        std::fs::create_dir_all(&nested).unwrap();
        let path = nested.join("toy-3.txt");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "1 3").unwrap();
        writeln!(file, "king 1 0 0").unwrap();

        let source = EmbeddingSource::default()
            .with_data_dir(dir.path())
            .with_model("toy-3");
        assert_eq!(source.resolve().unwrap(), path);

        let store = load(&source).unwrap();
        assert!(store.contains("king"));
    }

    #[test]
    fn test_load_binary_by_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("toy.bin");
        std::fs::write(&path, binary_table(&[("king", [1.0, 0.0, 0.0])])).unwrap();

        let store = load(&EmbeddingSource::default().with_path(&path)).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_missing_model() {
        let dir = TempDir::new().unwrap();
        let source = EmbeddingSource::default()
            .with_data_dir(dir.path())
            .with_model("nope");
        let err = load(&source).unwrap_err();
        assert!(matches!(err, LoadError::ModelNotFound { .. }));
        assert!(err.to_string().contains("nope.bin"));
    }

    #[test]
    fn test_missing_explicit_path_is_io_error() {
        let source = EmbeddingSource::default().with_path("/definitely/not/here.txt");
        assert!(matches!(load(&source), Err(LoadError::Io { .. })));
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("glove".parse::<EmbeddingFormat>().unwrap(), EmbeddingFormat::Glove);
        assert_eq!("BIN".parse::<EmbeddingFormat>().unwrap(), EmbeddingFormat::Word2VecBinary);
        assert!("csv".parse::<EmbeddingFormat>().is_err());
    }
}
