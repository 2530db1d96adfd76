//! Rendering
//!
//! Text and HTML output for neighbor tables and projection scatter plots.

pub mod ascii;
pub mod chart;
pub mod page;
pub mod table;

pub use ascii::render_ascii_chart;
pub use chart::render_svg_chart;
pub use page::{render_page, PageInput};
pub use table::{render_html_table, render_text_table};

/// Escape text for HTML element content and attribute values
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_html("king"), "king");
    }
}
