//! Terminal scatter plots

use std::fmt::Write;

use super::chart::bounds;
use crate::explorer::Projection;

const GRID_WIDTH: usize = 64;
const GRID_HEIGHT: usize = 20;
const MARKER: char = '*';

/// Render a projection as a character grid.
///
/// Each point is drawn as `*` with its word on the row above. Labels never
/// overwrite markers or earlier labels.
pub fn render_ascii_chart(projection: &Projection) -> String {
    let (x_label, y_label) = projection.kind.axis_labels();
    let (xr, yr) = bounds(&projection.points);

    let mut grid = vec![vec![' '; GRID_WIDTH]; GRID_HEIGHT];
    let cells: Vec<(usize, usize)> = projection
        .points
        .iter()
        .map(|p| {
            let col = (xr.fraction(p.x) * (GRID_WIDTH - 1) as f64).round() as usize;
            // Leave the top row free for labels of the highest points
            let row = ((1.0 - yr.fraction(p.y)) * (GRID_HEIGHT - 2) as f64).round() as usize + 1;
            (row.min(GRID_HEIGHT - 1), col.min(GRID_WIDTH - 1))
        })
        .collect();

    for &(row, col) in &cells {
        grid[row][col] = MARKER;
    }

    for (p, &(row, col)) in projection.points.iter().zip(&cells) {
        let label: Vec<char> = p.word.chars().collect();
        let start = col
            .saturating_sub(label.len() / 2)
            .min(GRID_WIDTH.saturating_sub(label.len()));
        let line = &mut grid[row - 1];
        let span = start..(start + label.len()).min(GRID_WIDTH);
        if line[span.clone()].iter().all(|c| *c == ' ') {
            for (slot, ch) in line[span].iter_mut().zip(label) {
                *slot = ch;
            }
        }
    }

    let mut out = String::new();
    let _ = writeln!(out, "{}", projection.kind.title());
    let _ = writeln!(out, "{} {:.2}", y_label, yr.max);
    let _ = writeln!(out, "   +{}+", "-".repeat(GRID_WIDTH));
    for line in &grid {
        let _ = writeln!(out, "   |{}|", line.iter().collect::<String>());
    }
    let _ = writeln!(out, "   +{}+", "-".repeat(GRID_WIDTH));
    let _ = writeln!(
        out,
        "{} {:.2}{:>pad$.2}",
        y_label,
        yr.min,
        xr.max,
        pad = GRID_WIDTH - 4
    );
    let _ = writeln!(out, "   {:.2}{:^width$}", xr.min, x_label, width = GRID_WIDTH - 8);
    out
}
