use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::info;
use rustc_hash::FxHashMap;

use connviz::matrix::{load_labels, load_matrix, load_table, Labeled};
use connviz::{
    generate_network_graph, heatmap_with_labels, layout, plot_network_graph, snapshot_overlay,
    Colormap, HeatmapOptions, Limits, NetworkPlotOptions,
};

#[derive(Parser)]
#[command(name = "connviz")]
#[command(about = "Visualize resting-state fMRI connectivity results.", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: CommandArgs,

    /// Verbosity level (0 = error, 1 = info, 2 = debug).
    #[arg(short = 'v', long = "verbose", value_name = "N", default_value_t = 1, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum CommandArgs {
    /// Render a correlation matrix as a heatmap with a color bar.
    Heatmap {
        /// Connectivity matrix in TSV format; a header row of labels is
        /// expected unless --labels is given.
        #[arg(short = 'i', long = "matrix", value_name = "FILE")]
        matrix: PathBuf,

        /// Write the figure to this FILE (format from the extension).
        #[arg(short = 'o', long = "out", value_name = "FILE")]
        out: PathBuf,

        /// Row/column labels, one per line, for header-less matrices.
        #[arg(short = 'l', long = "labels", value_name = "FILE")]
        labels: Option<PathBuf>,

        /// Lower bound of the color scale.
        #[arg(long = "min", value_name = "F", default_value_t = 0.0)]
        min: f64,

        /// Upper bound of the color scale.
        #[arg(long = "max", value_name = "F", default_value_t = 1.0)]
        max: f64,

        #[arg(short = 'c', long = "colormap", value_enum, default_value_t = Colormap::YlGnRev)]
        colormap: Colormap,
    },

    /// Threshold a connectivity matrix into a graph and draw it.
    Network {
        /// Connectivity matrix in TSV format; a header row of node names is
        /// expected unless --labels is given.
        #[arg(short = 'i', long = "matrix", value_name = "FILE")]
        matrix: PathBuf,

        /// Write the figure to this FILE (format from the extension).
        #[arg(short = 'o', long = "out", value_name = "FILE")]
        out: PathBuf,

        /// Keep only edges with a value strictly greater than this.
        #[arg(short = 't', long = "threshold", value_name = "F")]
        threshold: f64,

        /// Node names, one per line, for header-less matrices.
        #[arg(short = 'l', long = "labels", value_name = "FILE")]
        labels: Option<PathBuf>,

        /// Extra edge attribute as NAME=FILE, where FILE is a matrix shaped
        /// like the connectivity matrix. May be repeated.
        #[arg(short = 'a', long = "attr", value_name = "NAME=FILE")]
        attrs: Vec<String>,

        /// Edge attribute that drives edge coloring.
        #[arg(long = "edge-color-attr", value_name = "NAME", default_value = "weight")]
        edge_color_attr: String,

        #[arg(long = "edge-colormap", value_enum, default_value_t = Colormap::Reds)]
        edge_colormap: Colormap,

        /// Lower bound for edge-color interpolation.
        #[arg(long = "vmin", value_name = "F", default_value_t = 0.1)]
        vmin: f64,

        /// Upper bound for edge-color interpolation.
        #[arg(long = "vmax", value_name = "F", default_value_t = 0.4)]
        vmax: f64,

        /// Fixed layout as `name<TAB>x<TAB>y` lines, x and y in [0,1].
        /// Without it a spring layout is computed.
        #[arg(short = 'L', long = "layout", value_name = "FILE")]
        layout: Option<PathBuf>,

        /// Spring-layout iterations.
        #[arg(long = "iterations", value_name = "N", default_value_t = 50)]
        iterations: usize,
    },

    /// Snapshot an activation overlay on a structural underlay using FSL's
    /// overlay/slicer and ImageMagick's convert.
    Overlay {
        /// Structural underlay volume.
        #[arg(short = 'u', long = "underlay", value_name = "FILE")]
        underlay: PathBuf,

        /// Activation overlay volume.
        #[arg(short = 'f', long = "overlay", value_name = "FILE")]
        overlay: PathBuf,

        /// Write the combined snapshot to this FILE.
        #[arg(short = 'o', long = "out", value_name = "FILE")]
        out: PathBuf,

        /// Show overlay values only above this.
        #[arg(long = "min", value_name = "F", default_value_t = 0.1)]
        min: f64,

        /// Show overlay values only below this.
        #[arg(long = "max", value_name = "F", default_value_t = 0.5)]
        max: f64,
    },
}

/// Load a matrix and its labels, either from a labeled table or from a
/// plain matrix plus a labels file.
fn load_inputs(
    matrix: &PathBuf,
    labels: &Option<PathBuf>,
) -> connviz::Result<(connviz::Matrix, Vec<String>)> {
    match labels {
        Some(labels_path) => Ok((load_matrix(matrix)?, load_labels(labels_path)?)),
        None => {
            let table = load_table(matrix)?;
            Ok((table.matrix().clone(), table.labels().to_vec()))
        }
    }
}

fn parse_attr_specs(specs: &[String]) -> connviz::Result<FxHashMap<String, connviz::Matrix>> {
    let mut attributes = FxHashMap::default();
    for spec in specs {
        let (name, path) = spec
            .split_once('=')
            .ok_or_else(|| connviz::Error::MatrixParse {
                path: PathBuf::from(spec),
                line: 0,
                reason: "attribute must be NAME=FILE".to_string(),
            })?;
        attributes.insert(name.to_string(), load_matrix(&PathBuf::from(path))?);
    }
    Ok(attributes)
}

fn run(command: CommandArgs) -> connviz::Result<()> {
    match command {
        CommandArgs::Heatmap {
            matrix,
            out,
            labels,
            min,
            max,
            colormap,
        } => {
            let (matrix, labels) = load_inputs(&matrix, &labels)?;
            let opts = HeatmapOptions {
                limits: Limits::new(min, max),
                colormap,
            };
            info!("Rendering {}x{} heatmap...", matrix.dim(), matrix.dim());
            let fig = heatmap_with_labels(&matrix, &labels, &opts);
            info!("Saving to {:?}...", out);
            fig.save(&out)
        }

        CommandArgs::Network {
            matrix,
            out,
            threshold,
            labels,
            attrs,
            edge_color_attr,
            edge_colormap,
            vmin,
            vmax,
            layout: layout_path,
            iterations,
        } => {
            let (matrix, nodes) = load_inputs(&matrix, &labels)?;
            let attributes = parse_attr_specs(&attrs)?;
            let graph = generate_network_graph(&matrix, threshold, &nodes, &attributes);
            info!(
                "Graph has {} nodes and {} edges",
                graph.nodes().len(),
                graph.edges().len()
            );

            let fixed_layout = match layout_path {
                Some(p) => Some(layout::load_layout(&p)?),
                None => None,
            };
            let opts = NetworkPlotOptions {
                edge_color_attr,
                edge_colormap,
                limits: Limits::new(vmin, vmax),
                layout: fixed_layout,
                iterations,
            };
            let fig = plot_network_graph(&graph, &opts);
            info!("Saving to {:?}...", out);
            fig.save(&out)
        }

        CommandArgs::Overlay {
            underlay,
            overlay,
            out,
            min,
            max,
        } => {
            info!("Compositing {:?} over {:?}...", overlay, underlay);
            snapshot_overlay(&underlay, &overlay, &out, min, max)
        }
    }
}

fn main() {
    let args = Args::parse();

    // Initialize logger based on verbosity
    env_logger::Builder::new()
        .filter_level(match args.verbose {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .init();

    if let Err(e) = run(args.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    info!("Done.");
}
