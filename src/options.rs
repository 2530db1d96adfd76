//! Command-line options shared by the binaries

use clap::Args;
use std::path::PathBuf;

use crate::explorer::ExplorerConfig;
use crate::projection::TsneParams;
use crate::vector::{EmbeddingFormat, EmbeddingSource, DEFAULT_MODEL};

/// Which embedding table to load
#[derive(Args, Debug, Clone)]
pub struct ModelOptions {
    /// Model identifier, resolved inside the data directory
    #[arg(short, long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Local model directory
    #[arg(long, env = "WORDLENS_DATA_DIR", default_value = "./models")]
    pub data_dir: PathBuf,

    /// Explicit embedding file (skips identifier lookup)
    #[arg(long)]
    pub embeddings: Option<PathBuf>,

    /// File format: auto, word2vec-bin, word2vec-text, glove
    #[arg(long, default_value_t = EmbeddingFormat::Auto)]
    pub format: EmbeddingFormat,

    /// Load only the first N words
    #[arg(long)]
    pub limit: Option<usize>,
}

impl ModelOptions {
    pub fn source(&self) -> EmbeddingSource {
        let mut source = EmbeddingSource::default()
            .with_model(&self.model)
            .with_data_dir(&self.data_dir)
            .with_format(self.format);
        if let Some(path) = &self.embeddings {
            source = source.with_path(path);
        }
        if let Some(limit) = self.limit {
            source = source.with_limit(limit);
        }
        source
    }
}

/// Neighbor and projection settings
#[derive(Args, Debug, Clone)]
pub struct ExplorerOptions {
    /// Default neighbor count
    #[arg(long, default_value_t = 10)]
    pub top_n: usize,

    /// Largest neighbor count a user may request
    #[arg(long, default_value_t = 20)]
    pub max_top_n: usize,

    /// t-SNE perplexity
    #[arg(long, default_value_t = 15.0)]
    pub perplexity: f64,

    /// t-SNE iteration cap
    #[arg(long, default_value_t = 3000)]
    pub iterations: usize,

    /// t-SNE random seed
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Fail t-SNE instead of lowering the perplexity for small neighbor sets
    #[arg(long)]
    pub strict_perplexity: bool,
}

impl ExplorerOptions {
    pub fn config(&self) -> ExplorerConfig {
        let tsne = TsneParams::default()
            .with_perplexity(self.perplexity)
            .with_max_iterations(self.iterations)
            .with_seed(self.seed);
        ExplorerConfig::default()
            .with_top_n_bounds(1, self.max_top_n)
            .with_default_top_n(self.top_n)
            .with_tsne(tsne)
            .with_clamp_perplexity(!self.strict_perplexity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        model: ModelOptions,
        #[command(flatten)]
        explorer: ExplorerOptions,
    }

    #[test]
    fn test_defaults() {
        let cli = TestCli::parse_from(["test"]);
        let config = cli.explorer.config();
        assert_eq!(config.default_top_n, 10);
        assert_eq!(config.max_top_n, 20);
        assert_eq!(config.tsne.perplexity, 15.0);
        assert_eq!(config.tsne.max_iterations, 3000);
        assert!(config.clamp_perplexity);
        assert_eq!(cli.model.source().model, DEFAULT_MODEL);
    }

    #[test]
    fn test_overrides() {
        let cli = TestCli::parse_from([
            "test",
            "--embeddings",
            "/tmp/vectors.txt",
            "--format",
            "glove",
            "--limit",
            "5000",
            "--perplexity",
            "5",
            "--strict-perplexity",
        ]);
        let source = cli.model.source();
        assert_eq!(source.path, Some(PathBuf::from("/tmp/vectors.txt")));
        assert_eq!(source.format, EmbeddingFormat::Glove);
        assert_eq!(source.limit, Some(5000));

        let config = cli.explorer.config();
        assert_eq!(config.tsne.perplexity, 5.0);
        assert!(!config.clamp_perplexity);
    }
}
