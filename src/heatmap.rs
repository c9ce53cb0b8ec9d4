//! Correlation-matrix heatmap rendering.

use log::debug;

use crate::canvas::{Canvas, Figure, BLACK};
use crate::color::{Colormap, Limits};
use crate::matrix::{Labeled, Matrix};

// 12x10 units at 100 px per unit, the fixed export canvas.
const CANVAS_WIDTH: u32 = 1200;
const CANVAS_HEIGHT: u32 = 1000;

// Reserved for the color bar and its tick labels.
const COLORBAR_RESERVE: u32 = 150;
const COLORBAR_WIDTH: u32 = 40;

const LABEL_PAD: u32 = 8;
const BOTTOM_PAD: u32 = 20;

#[derive(Debug, Clone)]
pub struct HeatmapOptions {
    /// Color-scale bounds; cell values are interpolated between them.
    pub limits: Limits,
    pub colormap: Colormap,
}

impl Default for HeatmapOptions {
    fn default() -> Self {
        HeatmapOptions {
            limits: Limits::default(),
            colormap: Colormap::YlGnRev,
        }
    }
}

/// Grid placement for an n-by-n heatmap on the fixed canvas: the cell
/// raster, per-cell label anchors, and the color-bar strip.
pub(crate) struct GridLayout {
    pub n: usize,
    pub x0: f64,
    pub y0: f64,
    pub cell_w: f64,
    pub cell_h: f64,
    pub grid_h: f64,
    pub label_scale: u32,
}

impl GridLayout {
    pub fn new(n: usize, labels: &[String]) -> Self {
        let longest = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u32;

        // Rough margin sizing: enough room for the longest label at scale 2,
        // shrunk to scale 1 when the grid would get too cramped.
        let mut label_scale = 2u32;
        let mut margin = Canvas::text_width(&"M".repeat(longest as usize), label_scale) + LABEL_PAD;
        if margin > CANVAS_WIDTH / 3 {
            label_scale = 1;
            margin = Canvas::text_width(&"M".repeat(longest as usize), label_scale) + LABEL_PAD;
        }

        let x0 = margin as f64;
        let y0 = margin as f64;
        let grid_w = (CANVAS_WIDTH - COLORBAR_RESERVE) as f64 - x0;
        let grid_h = (CANVAS_HEIGHT - BOTTOM_PAD) as f64 - y0;
        let n_f = n.max(1) as f64;

        GridLayout {
            n,
            x0,
            y0,
            cell_w: grid_w / n_f,
            cell_h: grid_h / n_f,
            grid_h,
            label_scale,
        }
    }

    /// Top-left pixel corner of cell (row, col). Row 0 is the top row and
    /// column 0 the leftmost, giving the table-like reading order.
    pub fn cell_origin(&self, row: usize, col: usize) -> (f64, f64) {
        (
            self.x0 + col as f64 * self.cell_w,
            self.y0 + row as f64 * self.cell_h,
        )
    }

    /// Vertical center of a row, where its label is anchored. Ticks sit at
    /// cell centers, not cell boundaries.
    pub fn row_center(&self, row: usize) -> f64 {
        self.y0 + (row as f64 + 0.5) * self.cell_h
    }

    /// Horizontal center of a column.
    pub fn col_center(&self, col: usize) -> f64 {
        self.x0 + (col as f64 + 0.5) * self.cell_w
    }
}

/// Render a heatmap from a matrix whose labels come from its own `Labeled`
/// capability.
pub fn heatmap<T: Labeled>(table: &T, opts: &HeatmapOptions) -> Figure {
    heatmap_with_labels(table.matrix(), table.labels(), opts)
}

/// Render a square heatmap with explicit row/column labels (row and column
/// labels are the same sequence). Surplus labels are ignored; the color of
/// each cell is the matrix value interpolated between the limits under the
/// chosen colormap. No grid lines, no tick marks, x labels on top rotated
/// 90 degrees, y axis inverted, color bar on the right.
pub fn heatmap_with_labels(matrix: &Matrix, labels: &[String], opts: &HeatmapOptions) -> Figure {
    let n = matrix.dim();
    let layout = GridLayout::new(n, labels);
    let mut canvas = Canvas::new(CANVAS_WIDTH, CANVAS_HEIGHT);

    debug!(
        "heatmap: {}x{} cells of {:.1}x{:.1} px",
        n, n, layout.cell_w, layout.cell_h
    );

    // Cells. Fill to the next cell's origin so rounding leaves no seams.
    for row in 0..n {
        for col in 0..n {
            let t = opts.limits.normalize(matrix[(row, col)]);
            let color = opts.colormap.map(t);
            let (x, y) = layout.cell_origin(row, col);
            let (x1, y1) = layout.cell_origin(row + 1, col + 1);
            canvas.fill_rect(
                x.round() as i64,
                y.round() as i64,
                (x1.round() - x.round()) as u32,
                (y1.round() - y.round()) as u32,
                color,
            );
        }
    }

    let scale = layout.label_scale;
    let text_h = Canvas::text_height(scale) as i64;

    // Row labels on the left, centered on each cell.
    for (row, label) in labels.iter().enumerate().take(layout.n) {
        let w = Canvas::text_width(label, scale) as i64;
        let x = (layout.x0 as i64 - LABEL_PAD as i64 - w).max(0);
        let y = layout.row_center(row).round() as i64 - text_h / 2;
        canvas.draw_text(x, y, label, scale, BLACK);
    }

    // Column labels on top, rotated 90 degrees.
    for (col, label) in labels.iter().enumerate().take(n) {
        let x = layout.col_center(col).round() as i64 - text_h / 2;
        let y = layout.y0 as i64 - LABEL_PAD as i64;
        canvas.draw_text_up(x, y, label, scale, BLACK);
    }

    draw_colorbar(&mut canvas, &layout, opts);

    Figure::new(canvas)
}

fn draw_colorbar(canvas: &mut Canvas, layout: &GridLayout, opts: &HeatmapOptions) {
    let bar_x = (CANVAS_WIDTH - COLORBAR_RESERVE + 20) as i64;
    let bar_y = layout.y0 as i64;
    let bar_h = layout.grid_h.round() as i64;

    for dy in 0..bar_h {
        // Scale maximum at the top of the bar.
        let t = 1.0 - dy as f64 / (bar_h - 1).max(1) as f64;
        let color = opts.colormap.map(t);
        canvas.fill_rect(bar_x, bar_y + dy, COLORBAR_WIDTH, 1, color);
    }

    let label_x = bar_x + COLORBAR_WIDTH as i64 + LABEL_PAD as i64;
    let text_h = Canvas::text_height(1) as i64;
    canvas.draw_text(label_x, bar_y, &format!("{}", opts.limits.max), 1, BLACK);
    canvas.draw_text(
        label_x,
        bar_y + bar_h - text_h,
        &format!("{}", opts.limits.min),
        1,
        BLACK,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Matrix;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn row_zero_sits_above_row_one() {
        let layout = GridLayout::new(4, &labels(&["a", "b", "c", "d"]));
        assert!(layout.row_center(0) < layout.row_center(1));
        assert!(layout.col_center(0) < layout.col_center(1));
    }

    #[test]
    fn ticks_are_cell_centered() {
        let layout = GridLayout::new(2, &labels(&["a", "b"]));
        let (x, y) = layout.cell_origin(0, 0);
        assert!((layout.col_center(0) - (x + layout.cell_w / 2.0)).abs() < 1e-9);
        assert!((layout.row_center(0) - (y + layout.cell_h / 2.0)).abs() < 1e-9);
    }

    #[test]
    fn one_tick_per_label_in_order() {
        let names = labels(&["PCC", "mPFC", "LatPar"]);
        let layout = GridLayout::new(names.len(), &names);
        let centers: Vec<f64> = (0..layout.n).map(|i| layout.row_center(i)).collect();
        assert_eq!(centers.len(), names.len());
        assert!(centers.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn cell_color_follows_value() {
        let m = Matrix::from_rows(vec![vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap();
        let opts = HeatmapOptions::default();
        let fig = heatmap_with_labels(&m, &labels(&["a", "b"]), &opts);

        let layout = GridLayout::new(2, &labels(&["a", "b"]));
        let probe = |row: usize, col: usize| {
            fig.canvas().pixel(
                layout.col_center(col).round() as u32,
                layout.row_center(row).round() as u32,
            )
        };
        assert_eq!(probe(0, 0), Colormap::YlGnRev.map(0.0));
        assert_eq!(probe(0, 1), Colormap::YlGnRev.map(1.0));
        // Diagonal reading order: (1,0) holds the same value as (0,1).
        assert_eq!(probe(1, 0), probe(0, 1));
    }

    #[test]
    fn canvas_is_fixed_export_size() {
        let m = Matrix::zeros(3);
        let fig = heatmap_with_labels(&m, &labels(&["a", "b", "c"]), &HeatmapOptions::default());
        assert_eq!(fig.width(), 1200);
        assert_eq!(fig.height(), 1000);
    }
}
