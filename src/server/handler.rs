//! Connection Handler
//!
//! Decodes HTTP requests, routes them and writes responses.

use crate::explorer::{Exploration, Explorer};
use crate::metrics::Metrics;
use crate::protocol::{json_escape, HttpCodec, HttpRequest, HttpResponse};
use crate::render::{render_page, PageInput};
use futures::{SinkExt, StreamExt};
use std::fmt::Write;
use std::io;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;
use tracing::{debug, error, warn};

/// Connection handler
pub struct Handler {
    explorer: Explorer,
    metrics: Arc<Metrics>,
}

impl Handler {
    /// Create a new handler
    pub fn new(explorer: Explorer, metrics: Arc<Metrics>) -> Self {
        Self { explorer, metrics }
    }

    /// Run the handler for a connection
    pub async fn run<S>(self, mut framed: Framed<S, HttpCodec>) -> io::Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        while let Some(result) = framed.next().await {
            let request = match result {
                Ok(request) => request,
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    warn!(error = %e, "Rejecting malformed request");
                    framed.send(HttpResponse::bad_request(&e.to_string())).await?;
                    break;
                }
                Err(e) => return Err(e),
            };

            let start = Instant::now();
            let keep_alive = request.keep_alive();
            let route = route_label(&request.path);

            let mut response = self.execute(request).await;
            if !keep_alive {
                response.close = true;
            }
            let close = response.close;
            let status = response.status;
            framed.send(response).await?;

            let elapsed = start.elapsed();
            self.metrics.record_request(route, elapsed);
            debug!(route, status, latency = ?elapsed, "Request served");

            if close {
                break;
            }
        }

        Ok(())
    }

    /// Route a request and build its response
    pub async fn execute(&self, request: HttpRequest) -> HttpResponse {
        if request.method != "GET" {
            return HttpResponse::method_not_allowed();
        }

        match request.path.as_str() {
            "/" => self.page(&request).await,
            "/api/neighbors" => self.neighbors(&request).await,
            "/health" => self.health(),
            "/metrics" => HttpResponse::text(self.metrics.render()),
            _ => HttpResponse::not_found(),
        }
    }

    async fn page(&self, request: &HttpRequest) -> HttpResponse {
        let config = self.explorer.config();
        let word = request
            .query_param("word")
            .map(str::trim)
            .unwrap_or(config.default_word.as_str())
            .to_string();
        let top_n = parse_top_n(request.query_param("top_n"), config.default_top_n);
        let top_n = config.bound_top_n(top_n);

        let explorer = self.explorer.clone();
        let query = word.clone();
        let exploration =
            match tokio::task::spawn_blocking(move || explorer.explore(&query, top_n)).await {
                Ok(exploration) => exploration,
                Err(e) => {
                    error!(error = %e, "Exploration task failed");
                    return HttpResponse::error(500, "exploration failed");
                }
            };
        self.metrics.record_exploration(&exploration);
        debug!(summary = %describe(&exploration), "Exploration finished");

        HttpResponse::html(render_page(&PageInput {
            word: &word,
            top_n,
            min_top_n: config.min_top_n,
            max_top_n: config.max_top_n,
            exploration: Some(&exploration),
        }))
    }

    async fn neighbors(&self, request: &HttpRequest) -> HttpResponse {
        let word = match request.query_param("word").map(str::trim) {
            Some(w) if !w.is_empty() => w.to_string(),
            _ => return HttpResponse::error(400, "missing 'word' parameter"),
        };
        let config = self.explorer.config();
        let top_n = config.bound_top_n(parse_top_n(
            request.query_param("top_n"),
            config.default_top_n,
        ));

        let explorer = self.explorer.clone();
        let query = word.clone();
        let neighbors =
            match tokio::task::spawn_blocking(move || explorer.neighbors(&query, top_n)).await {
                Ok(neighbors) => neighbors,
                Err(e) => {
                    error!(error = %e, "Neighbor lookup task failed");
                    return HttpResponse::error(500, "neighbor lookup failed");
                }
            };

        let mut body = format!(
            r#"{{"word":"{}","top_n":{},"found":{},"neighbors":["#,
            json_escape(&word),
            top_n,
            !neighbors.is_empty()
        );
        for (i, n) in neighbors.iter().enumerate() {
            if i > 0 {
                body.push(',');
            }
            let _ = write!(
                body,
                r#"{{"word":"{}","score":{:.6}}}"#,
                json_escape(&n.word),
                n.score
            );
        }
        body.push_str("]}");
        HttpResponse::json(body)
    }

    fn health(&self) -> HttpResponse {
        let store = self.explorer.store();
        HttpResponse::json(format!(
            r#"{{"status":"ok","vocabulary":{},"dimension":{}}}"#,
            store.len(),
            store.dimension()
        ))
    }
}

/// Parse a neighbor count, falling back to `default` when absent or invalid
pub fn parse_top_n(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

/// Route name for metrics; unknown paths share one bucket
fn route_label(path: &str) -> &'static str {
    match path {
        "/" => "/",
        "/api/neighbors" => "/api/neighbors",
        "/health" => "/health",
        "/metrics" => "/metrics",
        _ => "other",
    }
}

/// Summary line for logs
pub fn describe(exploration: &Exploration) -> String {
    match exploration {
        Exploration::NotFound { word } => format!("'{}' not in vocabulary", word),
        Exploration::Found {
            word,
            neighbors,
            pca,
            tsne,
            ..
        } => format!(
            "'{}': {} neighbors, pca={}, tsne={}",
            word,
            neighbors.len(),
            if pca.is_ok() { "ok" } else { "failed" },
            if tsne.is_ok() { "ok" } else { "failed" }
        ),
    }
}
