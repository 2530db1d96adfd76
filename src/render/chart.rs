//! SVG scatter plots
//!
//! One labeled point per word, the label centered above its marker.

use std::fmt::Write;

use super::escape_html;
use crate::explorer::{ProjectedPoint, Projection};

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 480.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 60.0;
const TICKS: usize = 5;
const POINT_COLOR: &str = "#636efa";

/// Data range of one axis, padded so points never sit on the frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn of(values: impl Iterator<Item = f64>) -> Self {
        let (min, max) = values
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if !min.is_finite() || !max.is_finite() {
            return Self { min: -1.0, max: 1.0 };
        }

        let span = max - min;
        if span <= f64::EPSILON * min.abs().max(1.0) {
            return Self {
                min: min - 1.0,
                max: max + 1.0,
            };
        }
        let pad = span * 0.1;
        Self {
            min: min - pad,
            max: max + pad,
        }
    }

    /// Map `v` into `[0, 1]`
    pub fn fraction(&self, v: f64) -> f64 {
        (v - self.min) / (self.max - self.min)
    }

    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let step = (self.max - self.min) / (count.max(2) - 1) as f64;
        (0..count.max(2)).map(|i| self.min + step * i as f64).collect()
    }
}

/// Both axis ranges of a point set
pub(crate) fn bounds(points: &[ProjectedPoint]) -> (Range, Range) {
    (
        Range::of(points.iter().map(|p| p.x)),
        Range::of(points.iter().map(|p| p.y)),
    )
}

/// Render a projection as a standalone SVG document
pub fn render_svg_chart(projection: &Projection) -> String {
    let (x_label, y_label) = projection.kind.axis_labels();
    let (xr, yr) = bounds(&projection.points);

    let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let sx = |v: f64| MARGIN_LEFT + xr.fraction(v) * plot_w;
    let sy = |v: f64| MARGIN_TOP + (1.0 - yr.fraction(v)) * plot_h;

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif" font-size="12">"#,
        w = WIDTH,
        h = HEIGHT
    );
    let _ = writeln!(
        svg,
        r##"<rect x="{}" y="{}" width="{}" height="{}" fill="#e5ecf6"/>"##,
        MARGIN_LEFT, MARGIN_TOP, plot_w, plot_h
    );
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="{}" text-anchor="middle" font-size="16">{}</text>"#,
        WIDTH / 2.0,
        MARGIN_TOP / 2.0 + 5.0,
        escape_html(projection.kind.title())
    );

    for t in xr.ticks(TICKS) {
        let x = sx(t);
        let _ = writeln!(
            svg,
            r#"<line x1="{x:.1}" y1="{top}" x2="{x:.1}" y2="{bottom}" stroke="white"/><text x="{x:.1}" y="{label}" text-anchor="middle">{t:.2}</text>"#,
            top = MARGIN_TOP,
            bottom = MARGIN_TOP + plot_h,
            label = MARGIN_TOP + plot_h + 16.0,
        );
    }
    for t in yr.ticks(TICKS) {
        let y = sy(t);
        let _ = writeln!(
            svg,
            r#"<line x1="{left}" y1="{y:.1}" x2="{right}" y2="{y:.1}" stroke="white"/><text x="{label}" y="{ty:.1}" text-anchor="end">{t:.2}</text>"#,
            left = MARGIN_LEFT,
            right = MARGIN_LEFT + plot_w,
            label = MARGIN_LEFT - 6.0,
            ty = y + 4.0,
        );
    }

    let _ = writeln!(
        svg,
        r#"<text x="{}" y="{}" text-anchor="middle" font-size="14">{}</text>"#,
        MARGIN_LEFT + plot_w / 2.0,
        HEIGHT - 15.0,
        escape_html(x_label)
    );
    let _ = writeln!(
        svg,
        r#"<text x="20" y="{y}" text-anchor="middle" font-size="14" transform="rotate(-90 20 {y})">{}</text>"#,
        escape_html(y_label),
        y = MARGIN_TOP + plot_h / 2.0
    );

    for p in &projection.points {
        let (x, y) = (sx(p.x), sy(p.y));
        let _ = writeln!(
            svg,
            r#"<circle cx="{x:.1}" cy="{y:.1}" r="5" fill="{POINT_COLOR}"/><text class="label" x="{x:.1}" y="{ly:.1}" text-anchor="middle">{}</text>"#,
            escape_html(&p.word),
            ly = y - 9.0,
        );
    }

    svg.push_str("</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::ProjectionKind;

    fn projection(kind: ProjectionKind, points: &[(&str, f64, f64)]) -> Projection {
        Projection {
            kind,
            points: points
                .iter()
                .map(|(w, x, y)| ProjectedPoint {
                    word: w.to_string(),
                    x: *x,
                    y: *y,
                })
                .collect(),
            note: None,
        }
    }

    #[test]
    fn test_svg_has_title_axes_and_labels() {
        let svg = render_svg_chart(&projection(
            ProjectionKind::Pca,
            &[("queen", 0.5, 1.0), ("prince", -0.5, -1.0)],
        ));
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("PCA Visualization of Word Embeddings"));
        assert!(svg.contains(">PC1</text>"));
        assert!(svg.contains(">PC2</text>"));
        assert_eq!(svg.matches("<circle").count(), 2);
        assert!(svg.contains(">queen</text>"));
    }

    #[test]
    fn test_label_sits_above_point() {
        let svg = render_svg_chart(&projection(ProjectionKind::Tsne, &[("solo", 0.0, 0.0)]));
        let circle = svg.lines().find(|l| l.contains("<circle")).unwrap();
        let cy: f64 = attr(circle, "cy");
        let ly: f64 = attr(&circle[circle.find("<text").unwrap()..], "y");
        assert!(ly < cy);
    }

    #[test]
    fn test_degenerate_range_is_padded() {
        let r = Range::of([3.0, 3.0].into_iter());
        assert_eq!(r, Range { min: 2.0, max: 4.0 });
        assert!((r.fraction(3.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_range_padding() {
        let r = Range::of([0.0, 10.0].into_iter());
        assert!((r.min + 1.0).abs() < 1e-12);
        assert!((r.max - 11.0).abs() < 1e-12);
        assert_eq!(r.ticks(5).len(), 5);
    }

    #[test]
    fn test_words_are_escaped() {
        let svg = render_svg_chart(&projection(ProjectionKind::Tsne, &[("a<b", 0.0, 0.0)]));
        assert!(svg.contains("a&lt;b"));
    }

    fn attr(fragment: &str, name: &str) -> f64 {
        let key = format!(" {}=\"", name);
        let start = fragment.find(&key).unwrap() + key.len();
        let end = fragment[start..].find('"').unwrap() + start;
        fragment[start..end].parse().unwrap()
    }
}
