//! wordlens - Word Embedding Explorer
//!
//! Loads a pretrained word-vector table once, finds the nearest neighbors of
//! a query word by cosine similarity and projects them to 2D with PCA and
//! t-SNE for inspection in a browser or a terminal.

pub mod explorer;
pub mod metrics;
pub mod options;
pub mod projection;
pub mod protocol;
pub mod render;
pub mod server;
pub mod vector;

pub use explorer::{Exploration, Explorer, ExplorerConfig, ProjectedPoint, Projection, ProjectionKind};
pub use metrics::Metrics;
pub use projection::{project_linear, project_nonlinear, ProjectionError, TsneParams};
pub use protocol::{HttpCodec, HttpRequest, HttpResponse};
pub use server::{Config, Server};
pub use vector::{load, nearest, EmbeddingSource, EmbeddingStore, LoadError, Neighbor};
