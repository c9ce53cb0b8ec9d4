//! Rendering thresholded connectivity graphs.

use log::debug;

use crate::canvas::{Canvas, Figure, BLACK, WHITE};
use crate::color::{Colormap, Limits};
use crate::layout::{spring_layout, Layout};
use crate::netgraph::Graph;

// 18x12 units at 100 px per unit.
const CANVAS_WIDTH: u32 = 1800;
const CANVAS_HEIGHT: u32 = 1200;
const MARGIN: f64 = 80.0;

const NODE_RADIUS: f64 = 28.0;
const EDGE_WIDTH: f64 = 3.0;
const LABEL_SCALE: u32 = 2;

#[derive(Debug, Clone)]
pub struct NetworkPlotOptions {
    /// Edge attribute whose value drives edge coloring; unknown names fall
    /// back to the edge weight.
    pub edge_color_attr: String,
    pub edge_colormap: Colormap,
    /// vmin/vmax for edge-color interpolation.
    pub limits: Limits,
    /// Fixed node placement, honored verbatim. When absent a spring layout
    /// is computed on demand.
    pub layout: Option<Layout>,
    /// Spring-layout iterations when no fixed layout is given.
    pub iterations: usize,
}

impl Default for NetworkPlotOptions {
    fn default() -> Self {
        NetworkPlotOptions {
            edge_color_attr: "weight".to_string(),
            edge_colormap: Colormap::Reds,
            limits: Limits::new(0.1, 0.4),
            layout: None,
            iterations: 50,
        }
    }
}

/// The layout actually used: the caller's, if supplied, otherwise a fresh
/// spring layout.
pub(crate) fn resolve_layout(graph: &Graph, opts: &NetworkPlotOptions) -> Layout {
    match &opts.layout {
        Some(layout) => layout.clone(),
        None => spring_layout(graph, opts.iterations),
    }
}

/// Map a unit-square layout position onto the canvas.
pub(crate) fn to_pixel((x, y): (f64, f64)) -> (f64, f64) {
    (
        MARGIN + x * (CANVAS_WIDTH as f64 - 2.0 * MARGIN),
        MARGIN + y * (CANVAS_HEIGHT as f64 - 2.0 * MARGIN),
    )
}

/// Draw a graph: edges of width 3 colored by the selected attribute
/// interpolated between vmin and vmax, then uniform white circular nodes
/// with their name labels. Nodes absent from a supplied layout land at the
/// frame origin.
pub fn plot_network_graph(graph: &Graph, opts: &NetworkPlotOptions) -> Figure {
    let layout = resolve_layout(graph, opts);
    let mut canvas = Canvas::new(CANVAS_WIDTH, CANVAS_HEIGHT);

    let position = |name: &str| -> (f64, f64) {
        to_pixel(layout.get(name).copied().unwrap_or((0.0, 0.0)))
    };

    debug!(
        "network plot: {} nodes, {} edges, colored by {:?}",
        graph.nodes().len(),
        graph.edges().len(),
        opts.edge_color_attr
    );

    // Edges first so nodes paint over their ends.
    for edge in graph.edges() {
        let (x0, y0) = position(&graph.nodes()[edge.a]);
        let (x1, y1) = position(&graph.nodes()[edge.b]);
        let t = opts.limits.normalize(edge.value(&opts.edge_color_attr));
        let color = opts.edge_colormap.map(t);
        canvas.draw_line(x0, y0, x1, y1, EDGE_WIDTH, color);
    }

    for name in graph.nodes() {
        let (x, y) = position(name);
        let (cx, cy) = (x.round() as i64, y.round() as i64);
        canvas.fill_disc(cx, cy, NODE_RADIUS, WHITE);
        canvas.stroke_circle(cx, cy, NODE_RADIUS, BLACK);

        let w = Canvas::text_width(name, LABEL_SCALE) as i64;
        let h = Canvas::text_height(LABEL_SCALE) as i64;
        canvas.draw_text(cx - w / 2, cy - h / 2, name, LABEL_SCALE, BLACK);
    }

    Figure::new(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Matrix;
    use crate::netgraph::generate_network_graph;
    use rustc_hash::FxHashMap;

    fn two_node_graph(weight: f64) -> Graph {
        let mut m = Matrix::zeros(2);
        m.set(0, 1, weight);
        m.set(1, 0, weight);
        let nodes = vec!["L".to_string(), "R".to_string()];
        generate_network_graph(&m, 0.0, &nodes, &FxHashMap::default())
    }

    fn fixed_layout() -> Layout {
        let mut layout = Layout::default();
        layout.insert("L".to_string(), (0.0, 0.5));
        layout.insert("R".to_string(), (1.0, 0.5));
        layout
    }

    #[test]
    fn supplied_layout_is_used_verbatim() {
        let g = two_node_graph(0.3);
        let opts = NetworkPlotOptions {
            layout: Some(fixed_layout()),
            ..Default::default()
        };
        let resolved = resolve_layout(&g, &opts);
        assert_eq!(resolved, fixed_layout());
    }

    #[test]
    fn missing_layout_places_every_node() {
        let g = two_node_graph(0.3);
        let resolved = resolve_layout(&g, &NetworkPlotOptions::default());
        assert_eq!(resolved.len(), 2);
    }

    #[test]
    fn unit_square_maps_inside_the_margins() {
        let (x0, y0) = to_pixel((0.0, 0.0));
        let (x1, y1) = to_pixel((1.0, 1.0));
        assert_eq!((x0, y0), (80.0, 80.0));
        assert_eq!((x1, y1), (1720.0, 1120.0));
    }

    #[test]
    fn edge_midpoint_has_the_interpolated_color() {
        let g = two_node_graph(0.3);
        let opts = NetworkPlotOptions {
            layout: Some(fixed_layout()),
            ..Default::default()
        };
        let fig = plot_network_graph(&g, &opts);

        let (x0, y0) = to_pixel((0.0, 0.5));
        let (x1, _) = to_pixel((1.0, 0.5));
        let mid_x = ((x0 + x1) / 2.0).round() as u32;
        let mid_y = y0.round() as u32;

        let expected = Colormap::Reds.map(Limits::new(0.1, 0.4).normalize(0.3));
        assert_eq!(fig.canvas().pixel(mid_x, mid_y), expected);
    }

    #[test]
    fn node_outline_lands_at_the_fixed_position() {
        let g = two_node_graph(0.3);
        let opts = NetworkPlotOptions {
            layout: Some(fixed_layout()),
            ..Default::default()
        };
        let fig = plot_network_graph(&g, &opts);

        let (x, y) = to_pixel((0.0, 0.5));
        let top = (y - NODE_RADIUS).round() as u32;
        assert_eq!(fig.canvas().pixel(x.round() as u32, top), BLACK);
    }

    #[test]
    fn canvas_is_fixed_export_size() {
        let fig = plot_network_graph(&two_node_graph(0.3), &NetworkPlotOptions::default());
        assert_eq!(fig.width(), 1800);
        assert_eq!(fig.height(), 1200);
    }
}
