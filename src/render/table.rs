//! Neighbor tables

use std::fmt::Write;

use super::escape_html;
use crate::vector::Neighbor;

/// Fixed-width text table: rank, word, similarity
pub fn render_text_table(neighbors: &[Neighbor]) -> String {
    let width = neighbors
        .iter()
        .map(|n| n.word.chars().count())
        .max()
        .unwrap_or(0)
        .max("word".len());

    let mut out = String::new();
    let _ = writeln!(out, "{:>4}  {:<width$}  {:>10}", "#", "word", "similarity");
    let _ = writeln!(out, "{:->4}  {:-<width$}  {:->10}", "", "", "");
    for (i, n) in neighbors.iter().enumerate() {
        let _ = writeln!(out, "{:>4}  {:<width$}  {:>10.4}", i + 1, n.word, n.score);
    }
    out
}

/// HTML table with the same columns as [`render_text_table`]
pub fn render_html_table(neighbors: &[Neighbor]) -> String {
    let mut out = String::from(
        "<table class=\"neighbors\">\n<thead><tr><th>#</th><th>word</th><th>similarity</th></tr></thead>\n<tbody>\n",
    );
    for (i, n) in neighbors.iter().enumerate() {
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{:.4}</td></tr>",
            i + 1,
            escape_html(&n.word),
            n.score
        );
    }
    out.push_str("</tbody>\n</table>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neighbors() -> Vec<Neighbor> {
        vec![
            Neighbor {
                word: "queen".to_string(),
                score: 0.7118,
            },
            Neighbor {
                word: "monarch".to_string(),
                score: 0.6189,
            },
        ]
    }

    #[test]
    fn test_text_table() {
        let table = render_text_table(&neighbors());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("similarity"));
        assert!(lines[2].contains("queen"));
        assert!(lines[2].ends_with("0.7118"));
        assert!(lines[3].trim_start().starts_with('2'));
    }

    #[test]
    fn test_html_table_escapes() {
        let rows = vec![Neighbor {
            word: "<b>".to_string(),
            score: 0.5,
        }];
        let html = render_html_table(&rows);
        assert!(html.contains("&lt;b&gt;"));
        assert!(html.contains("<td>0.5000</td>"));
    }
}
