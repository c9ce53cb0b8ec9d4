//! Visualization for resting-state fMRI connectivity analysis.
//!
//! Three independent, stateless operations:
//! - [`heatmap()`] / [`heatmap_with_labels()`]: correlation-matrix heatmaps,
//! - [`generate_network_graph()`] + [`plot_network_graph()`]: thresholded
//!   connectivity graphs rendered with a force-directed or caller-supplied
//!   layout,
//! - [`snapshot_overlay()`]: composite brain-overlay snapshots produced by
//!   driving external neuroimaging tools (FSL `overlay`/`slicer`, ImageMagick
//!   `convert`).

pub mod canvas;
pub mod color;
pub mod font;
pub mod heatmap;
pub mod layout;
pub mod matrix;
pub mod netgraph;
pub mod netplot;
pub mod overlay;

pub use canvas::Figure;
pub use color::{Colormap, Limits};
pub use heatmap::{heatmap, heatmap_with_labels, HeatmapOptions};
pub use layout::{spring_layout, Layout};
pub use matrix::{Labeled, Matrix, Table};
pub use netgraph::{generate_network_graph, Graph};
pub use netplot::{plot_network_graph, NetworkPlotOptions};
pub use overlay::{snapshot_overlay, snapshot_overlay_with, CommandRunner, SystemRunner};

use std::path::PathBuf;

/// Crate-wide error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("i/o error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed matrix file {path:?}: {reason} (line {line})")]
    MatrixParse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("failed to save image: {0}")]
    Image(#[from] image::ImageError),

    #[error("could not create temporary file: {0}")]
    TempFile(std::io::Error),

    #[error("failed to launch `{tool}`: {source}")]
    ToolLaunch {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("`{tool}` exited with {status}")]
    ToolFailed {
        tool: &'static str,
        status: std::process::ExitStatus,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
