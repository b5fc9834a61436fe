mod app;
mod atlas;
mod data;
mod util;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::{EnvFilter, fmt};

use crate::atlas::{DistanceFilter, Graph, GraphInputs, Metric, Selection, SelectionController};
use crate::data::{DataSource, collect_dataset};

/// Explore cross-lingual syntactic distances on a world map.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Directory holding the distance matrices and head-direction rates
    #[arg(long, default_value = "results")]
    data_dir: PathBuf,

    /// Node registry JSON overriding `<data-dir>/nodes.json`
    #[arg(long)]
    nodes: Option<PathBuf>,

    /// Distance metric shown first (upos, deprel, phrase, head-raw, head-merged)
    #[arg(long, default_value_t = Metric::Upos)]
    metric: Metric,

    /// Print the graph as JSON instead of opening the viewer
    #[arg(long)]
    dump: bool,

    /// Language code to select before dumping
    #[arg(long, requires = "dump")]
    select: Option<String>,

    /// Comma-separated distance categories to keep when dumping, or "all"
    #[arg(long, default_value_t = DistanceFilter::all(), requires = "dump")]
    categories: DistanceFilter,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Serialize)]
struct GraphDump<'a> {
    metric: Metric,
    selected: Option<&'a str>,
    #[serde(flatten)]
    graph: &'a Graph,
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

fn dump(args: &Args, source: &DataSource) -> Result<()> {
    let dataset = collect_dataset(source, args.metric)?;

    let selection = match &args.select {
        Some(code) => {
            if dataset.nodes.get(code).is_none() {
                anyhow::bail!("unknown language code {code:?}");
            }
            Selection::Selected(code.clone())
        }
        None => Selection::Unselected,
    };

    let inputs = GraphInputs {
        nodes: &dataset.nodes,
        matrix: &dataset.matrix,
    };
    let controller = SelectionController::with_state(inputs, selection, args.categories);

    let output = GraphDump {
        metric: dataset.metric,
        selected: controller.selection().code(),
        graph: controller.graph(),
    };
    let json = serde_json::to_string_pretty(&output).context("failed to serialize graph")?;
    println!("{json}");
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let source = DataSource {
        data_dir: args.data_dir.clone(),
        nodes_path: args.nodes.clone(),
    };

    if args.dump {
        return dump(&args, &source);
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };
    let metric = args.metric;

    eframe::run_native(
        "Syntax Atlas",
        options,
        Box::new(move |cc| Ok(Box::new(app::AtlasApp::new(cc, source, metric)))),
    )
    .map_err(|error| anyhow!("failed to start the viewer: {error}"))
}
