//! Thresholding a connectivity matrix into an attributed undirected graph.

use log::debug;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::matrix::Matrix;

/// An undirected edge between two node indices, `a < b`. Carries the matrix
/// weight plus any caller-supplied scalar attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
    pub weight: f64,
    pub attrs: FxHashMap<String, f64>,
}

impl Edge {
    /// The scalar driving a rendering channel. `"weight"` (and any unknown
    /// attribute name) resolves to the edge weight.
    pub fn value(&self, attr: &str) -> f64 {
        if attr == "weight" {
            return self.weight;
        }
        self.attrs.get(attr).copied().unwrap_or(self.weight)
    }
}

/// Nodes plus attributed edges; an unordered collection, kept in ascending
/// (i,j) order for reproducible rendering.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<String>,
    edges: Vec<Edge>,
}

impl Graph {
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn has_edge(&self, a: &str, b: &str) -> bool {
        self.edges.iter().any(|e| {
            (self.nodes[e.a] == a && self.nodes[e.b] == b)
                || (self.nodes[e.a] == b && self.nodes[e.b] == a)
        })
    }

    pub fn edge_weight(&self, a: &str, b: &str) -> Option<f64> {
        self.edges
            .iter()
            .find(|e| {
                (self.nodes[e.a] == a && self.nodes[e.b] == b)
                    || (self.nodes[e.a] == b && self.nodes[e.b] == a)
            })
            .map(|e| e.weight)
    }
}

/// Build a graph from a square matrix: every entry of `nodes` becomes a node
/// (isolated nodes are preserved), and every unordered pair (i,j), i<j, with
/// `matrix[i][j]` STRICTLY greater than `threshold` becomes an edge. Values
/// exactly equal to the threshold are excluded. Each attribute matrix
/// contributes one named scalar per edge, read at the same (i,j).
pub fn generate_network_graph(
    matrix: &Matrix,
    threshold: f64,
    nodes: &[String],
    attributes: &FxHashMap<String, Matrix>,
) -> Graph {
    let n = matrix.dim();

    let edges: Vec<Edge> = (0..n)
        .into_par_iter()
        .flat_map(|i| {
            ((i + 1)..n)
                .filter_map(|j| {
                    let weight = matrix[(i, j)];
                    if weight <= threshold {
                        return None;
                    }
                    let attrs = attributes
                        .iter()
                        .map(|(name, data)| (name.clone(), data[(i, j)]))
                        .collect();
                    Some(Edge {
                        a: i,
                        b: j,
                        weight,
                        attrs,
                    })
                })
                .collect::<Vec<_>>()
        })
        .collect();

    debug!(
        "network graph: {} nodes, {} edges above threshold {}",
        nodes.len(),
        edges.len(),
        threshold
    );

    Graph {
        nodes: nodes.to_vec(),
        edges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("n{}", i)).collect()
    }

    fn uniform_off_diagonal(n: usize, value: f64) -> Matrix {
        let mut m = Matrix::zeros(n);
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    m.set(i, j, value);
                }
            }
        }
        m
    }

    #[test]
    fn threshold_is_strict() {
        // All off-diagonal values exactly at the threshold: zero edges.
        let m = uniform_off_diagonal(3, 0.3);
        let g = generate_network_graph(&m, 0.3, &names(3), &FxHashMap::default());
        assert!(g.edges().is_empty());

        let g = generate_network_graph(&m, 0.29, &names(3), &FxHashMap::default());
        assert_eq!(g.edges().len(), 3);
    }

    #[test]
    fn isolated_nodes_are_preserved() {
        let m = Matrix::zeros(4);
        let g = generate_network_graph(&m, 0.5, &names(4), &FxHashMap::default());
        assert_eq!(g.nodes().len(), 4);
        assert!(g.edges().is_empty());
    }

    #[test]
    fn no_self_loops_even_with_hot_diagonal() {
        let mut m = Matrix::zeros(3);
        for i in 0..3 {
            m.set(i, i, 1.0);
        }
        let g = generate_network_graph(&m, 0.1, &names(3), &FxHashMap::default());
        assert!(g.edges().is_empty());
    }

    #[test]
    fn edge_weight_matches_matrix_exactly() {
        let mut m = Matrix::zeros(3);
        m.set(0, 2, 0.712345);
        m.set(2, 0, 0.712345);
        let g = generate_network_graph(&m, 0.5, &names(3), &FxHashMap::default());
        assert_eq!(g.edge_weight("n0", "n2"), Some(0.712345));
        assert!(g.has_edge("n2", "n0"));
        assert!(!g.has_edge("n0", "n1"));
    }

    #[test]
    fn raising_threshold_never_adds_edges() {
        let mut m = Matrix::zeros(4);
        let values = [(0, 1, 0.2), (0, 2, 0.4), (1, 3, 0.6), (2, 3, 0.8)];
        for &(i, j, v) in &values {
            m.set(i, j, v);
            m.set(j, i, v);
        }
        let mut prev = usize::MAX;
        for t in [0.0, 0.3, 0.5, 0.7, 0.9] {
            let g = generate_network_graph(&m, t, &names(4), &FxHashMap::default());
            assert!(g.edges().len() <= prev);
            prev = g.edges().len();
        }
    }

    #[test]
    fn attributes_read_from_same_position() {
        let mut m = Matrix::zeros(2);
        m.set(0, 1, 0.9);
        let mut t_stats = Matrix::zeros(2);
        t_stats.set(0, 1, 4.2);
        let mut attributes = FxHashMap::default();
        attributes.insert("tstat".to_string(), t_stats);

        let g = generate_network_graph(&m, 0.1, &names(2), &attributes);
        assert_eq!(g.edges().len(), 1);
        let e = &g.edges()[0];
        assert_eq!(e.attrs.get("tstat"), Some(&4.2));
        assert_eq!(e.value("tstat"), 4.2);
        assert_eq!(e.value("weight"), 0.9);
        // Unknown attribute names fall back to the weight.
        assert_eq!(e.value("missing"), 0.9);
    }

    #[test]
    fn edges_come_out_in_ascending_pair_order() {
        let m = uniform_off_diagonal(4, 1.0);
        let g = generate_network_graph(&m, 0.0, &names(4), &FxHashMap::default());
        let pairs: Vec<(usize, usize)> = g.edges().iter().map(|e| (e.a, e.b)).collect();
        let mut sorted = pairs.clone();
        sorted.sort();
        assert_eq!(pairs, sorted);
        assert_eq!(pairs.len(), 6);
    }
}
