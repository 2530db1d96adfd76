//! HTML page for the web front end

use std::fmt::Write;

use super::chart::render_svg_chart;
use super::escape_html;
use super::table::render_html_table;
use crate::explorer::{Exploration, Projection, ProjectionKind};
use crate::projection::ProjectionError;

const PAGE_TITLE: &str = "Word Embeddings Exploration with Word2Vec";
const DESCRIPTION: &str = "This app allows you to explore word embeddings using Word2Vec, \
visualize their relationships, and understand concepts like PCA and t-SNE.";

const STYLE: &str = "body{font-family:sans-serif;max-width:760px;margin:2em auto;color:#262730}\
form{display:flex;flex-direction:column;gap:.8em;margin-bottom:1.5em}\
table.neighbors{border-collapse:collapse}\
table.neighbors td,table.neighbors th{border:1px solid #ddd;padding:.3em .8em;text-align:left}\
.warning{background:#fffbe6;border:1px solid #f0c36d;padding:.6em}\
.note{color:#666;font-size:.9em}";

/// Values shown in the form plus the result of the last interaction
#[derive(Debug, Clone)]
pub struct PageInput<'a> {
    pub word: &'a str,
    pub top_n: usize,
    pub min_top_n: usize,
    pub max_top_n: usize,
    pub exploration: Option<&'a Exploration>,
}

/// Render the full page
pub fn render_page(input: &PageInput<'_>) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n<h1>{title}</h1>\n<p>{DESCRIPTION}</p>\n",
        title = PAGE_TITLE,
    );

    let _ = write!(
        html,
        concat!(
            "<form method=\"get\" action=\"/\">\n",
            "<label>Enter a word to find similar words: ",
            "<input type=\"text\" name=\"word\" value=\"{word}\"></label>\n",
            "<label>Number of similar words to display: ",
            "<input type=\"range\" name=\"top_n\" min=\"{min}\" max=\"{max}\" value=\"{top_n}\" ",
            "oninput=\"this.nextElementSibling.value=this.value\">",
            "<output>{top_n}</output></label>\n",
            "<button type=\"submit\">Explore</button>\n",
            "</form>\n"
        ),
        word = escape_html(input.word),
        min = input.min_top_n,
        max = input.max_top_n,
        top_n = input.top_n,
    );

    match input.exploration {
        None => {}
        Some(Exploration::NotFound { word }) => {
            let _ = writeln!(
                html,
                "<p class=\"not-found\">Sorry, the word '{}' is not in the vocabulary.</p>",
                escape_html(word)
            );
        }
        Some(Exploration::Found {
            word,
            top_n,
            neighbors,
            pca,
            tsne,
        }) => {
            let _ = writeln!(
                html,
                "<p>Top {} similar words to '{}':</p>",
                top_n,
                escape_html(word)
            );
            html.push_str(&render_html_table(neighbors));
            render_section(&mut html, ProjectionKind::Pca, pca);
            render_section(&mut html, ProjectionKind::Tsne, tsne);
        }
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_section(
    html: &mut String,
    kind: ProjectionKind,
    result: &Result<Projection, ProjectionError>,
) {
    let _ = writeln!(html, "<h2>{}</h2>", kind.subheading());
    match result {
        Ok(projection) => {
            if let Some(note) = &projection.note {
                let _ = writeln!(html, "<p class=\"note\">{}</p>", escape_html(note));
            }
            let _ = writeln!(html, "<div class=\"chart\">\n{}</div>", render_svg_chart(projection));
        }
        Err(e) => {
            let _ = writeln!(
                html,
                "<p class=\"warning\">{} unavailable: {}</p>",
                kind.subheading(),
                escape_html(&e.to_string())
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::ProjectedPoint;
    use crate::vector::Neighbor;

    fn input<'a>(exploration: Option<&'a Exploration>) -> PageInput<'a> {
        PageInput {
            word: "king",
            top_n: 10,
            min_top_n: 1,
            max_top_n: 20,
            exploration,
        }
    }

    fn found(tsne: Result<Projection, ProjectionError>) -> Exploration {
        Exploration::Found {
            word: "king".to_string(),
            top_n: 2,
            neighbors: vec![
                Neighbor {
                    word: "queen".to_string(),
                    score: 0.71,
                },
                Neighbor {
                    word: "prince".to_string(),
                    score: 0.62,
                },
            ],
            pca: Ok(Projection {
                kind: ProjectionKind::Pca,
                points: vec![
                    ProjectedPoint {
                        word: "queen".to_string(),
                        x: 1.0,
                        y: 0.0,
                    },
                    ProjectedPoint {
                        word: "prince".to_string(),
                        x: -1.0,
                        y: 0.0,
                    },
                ],
                note: None,
            }),
            tsne,
        }
    }

    #[test]
    fn test_initial_page_has_form_defaults() {
        let html = render_page(&input(None));
        assert!(html.contains("<h1>Word Embeddings Exploration with Word2Vec</h1>"));
        assert!(html.contains("name=\"word\" value=\"king\""));
        assert!(html.contains("min=\"1\" max=\"20\" value=\"10\""));
        assert!(!html.contains("<svg"));
    }

    #[test]
    fn test_not_found_message() {
        let exploration = Exploration::NotFound {
            word: "xyzzy<".to_string(),
        };
        let html = render_page(&input(Some(&exploration)));
        assert!(html.contains("Sorry, the word 'xyzzy&lt;' is not in the vocabulary."));
        assert!(!html.contains("<table"));
    }

    #[test]
    fn test_found_with_failed_tsne_still_draws_pca() {
        let exploration = found(Err(ProjectionError::InsufficientData {
            required: 17,
            actual: 2,
            reason: "perplexity 15 must be below samples - 1".to_string(),
        }));
        let html = render_page(&input(Some(&exploration)));

        assert!(html.contains("Top 2 similar words to 'king':"));
        assert!(html.contains("<table class=\"neighbors\">"));
        assert!(html.contains("PCA Visualization of Word Embeddings"));
        assert_eq!(html.matches("<svg").count(), 1);
        assert!(html.contains("class=\"warning\""));
        assert!(html.contains("<h2>t-SNE Visualization of Embeddings</h2>"));
    }
}
