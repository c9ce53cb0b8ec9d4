//! Force-directed node placement for network figures.
//!
//! Fruchterman-Reingold in the unit square. Initial positions are derived
//! from a hash of each node's name, so the layout for a given graph is
//! repeatable across runs; callers needing an exact arrangement pass a fixed
//! layout to the renderer instead.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::debug;
use rustc_hash::FxHashMap;
use sha2::{Digest, Sha256};

use crate::netgraph::Graph;
use crate::{Error, Result};

/// Node name to position in the unit square.
pub type Layout = FxHashMap<String, (f64, f64)>;

/// A stable pseudo-random position in the unit square for a node name.
fn seed_position(name: &str) -> (f64, f64) {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    let digest = hasher.finalize();

    let x = u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]);
    let y = u32::from_le_bytes([digest[4], digest[5], digest[6], digest[7]]);
    (x as f64 / u32::MAX as f64, y as f64 / u32::MAX as f64)
}

/// Compute a spring layout for the graph. More iterations settle dense
/// graphs further; 50 is plenty for typical ROI counts.
pub fn spring_layout(graph: &Graph, iterations: usize) -> Layout {
    let nodes = graph.nodes();
    let n = nodes.len();
    if n == 0 {
        return Layout::default();
    }

    let mut pos: Vec<(f64, f64)> = nodes.iter().map(|name| seed_position(name)).collect();
    let k = (1.0 / n as f64).sqrt();

    for iter in 0..iterations {
        // Linear cooling from an initial temperature of a tenth of the frame.
        let temp = 0.1 * (1.0 - iter as f64 / iterations.max(1) as f64);
        let mut disp = vec![(0.0f64, 0.0f64); n];

        // Repulsion between every node pair.
        for i in 0..n {
            for j in (i + 1)..n {
                let dx = pos[i].0 - pos[j].0;
                let dy = pos[i].1 - pos[j].1;
                let dist = (dx * dx + dy * dy).sqrt().max(1e-9);
                let force = k * k / dist;
                let (ux, uy) = (dx / dist, dy / dist);
                disp[i].0 += ux * force;
                disp[i].1 += uy * force;
                disp[j].0 -= ux * force;
                disp[j].1 -= uy * force;
            }
        }

        // Attraction along edges.
        for edge in graph.edges() {
            let dx = pos[edge.a].0 - pos[edge.b].0;
            let dy = pos[edge.a].1 - pos[edge.b].1;
            let dist = (dx * dx + dy * dy).sqrt().max(1e-9);
            let force = dist * dist / k;
            let (ux, uy) = (dx / dist, dy / dist);
            disp[edge.a].0 -= ux * force;
            disp[edge.a].1 -= uy * force;
            disp[edge.b].0 += ux * force;
            disp[edge.b].1 += uy * force;
        }

        // Move, capped by temperature, and keep everything in frame.
        for i in 0..n {
            let (dx, dy) = disp[i];
            let len = (dx * dx + dy * dy).sqrt().max(1e-9);
            let step = len.min(temp);
            pos[i].0 = (pos[i].0 + dx / len * step).clamp(0.0, 1.0);
            pos[i].1 = (pos[i].1 + dy / len * step).clamp(0.0, 1.0);
        }
    }

    debug!("spring layout: {} nodes, {} iterations", n, iterations);

    nodes
        .iter()
        .cloned()
        .zip(pos)
        .collect()
}

/// Load a fixed layout from a TSV file of `name<TAB>x<TAB>y` lines.
pub fn load_layout(path: &Path) -> Result<Layout> {
    let file = File::open(path).map_err(|e| Error::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let reader = BufReader::new(file);
    let mut layout = Layout::default();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| Error::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = line.split('\t').collect();
        let parsed = if parts.len() == 3 {
            match (parts[1].parse::<f64>(), parts[2].parse::<f64>()) {
                (Ok(x), Ok(y)) => Some((parts[0].to_string(), (x, y))),
                _ => None,
            }
        } else {
            None
        };
        let (name, xy) = parsed.ok_or_else(|| Error::MatrixParse {
            path: path.to_path_buf(),
            line: lineno + 1,
            reason: "expected `name<TAB>x<TAB>y`".to_string(),
        })?;
        layout.insert(name, xy);
    }

    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Matrix;
    use crate::netgraph::generate_network_graph;
    use rustc_hash::FxHashMap;

    fn small_graph() -> Graph {
        let mut m = Matrix::zeros(4);
        for &(i, j) in &[(0, 1), (1, 2), (2, 3)] {
            m.set(i, j, 0.8);
            m.set(j, i, 0.8);
        }
        let nodes: Vec<String> = ["PCC", "mPFC", "LatPar", "Prec"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        generate_network_graph(&m, 0.5, &nodes, &FxHashMap::default())
    }

    #[test]
    fn seeds_differ_per_name_and_stay_in_frame() {
        let a = seed_position("PCC");
        let b = seed_position("mPFC");
        assert_ne!(a, b);
        for (x, y) in [a, b] {
            assert!((0.0..=1.0).contains(&x));
            assert!((0.0..=1.0).contains(&y));
        }
    }

    #[test]
    fn layout_is_repeatable() {
        let g = small_graph();
        assert_eq!(spring_layout(&g, 50), spring_layout(&g, 50));
    }

    #[test]
    fn every_node_is_placed_in_frame() {
        let g = small_graph();
        let layout = spring_layout(&g, 30);
        assert_eq!(layout.len(), g.nodes().len());
        for name in g.nodes() {
            let &(x, y) = layout.get(name).unwrap();
            assert!((0.0..=1.0).contains(&x));
            assert!((0.0..=1.0).contains(&y));
        }
    }

    #[test]
    fn empty_graph_gets_empty_layout() {
        let g = generate_network_graph(&Matrix::zeros(0), 0.0, &[], &FxHashMap::default());
        assert!(spring_layout(&g, 10).is_empty());
    }
}
