use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use constellation::{Engine, EngineConfig, GraphInput, LayoutStrategy, layout};

/// Lay out and simulate 3D node-link graphs.
#[derive(Parser)]
#[command(name = "constellation")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Engine configuration file (.yaml, .yml or .json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a one-shot layout and print positions and bounds
    Layout {
        /// Graph file (.json, .yaml or .yml)
        #[arg(short, long)]
        input: PathBuf,

        /// Placement strategy
        #[arg(short, long, value_enum, default_value_t = LayoutStrategy::Ring)]
        strategy: LayoutStrategy,

        /// Write JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Drive the engine for a number of ticks and print the final frame
    Run {
        /// Graph file (.json, .yaml or .yml)
        #[arg(short, long)]
        input: PathBuf,

        /// Initial placement strategy
        #[arg(short, long, value_enum, default_value_t = LayoutStrategy::Ring)]
        strategy: LayoutStrategy,

        /// Number of ticks to run (at least one is always run)
        #[arg(short, long, default_value = "300")]
        ticks: usize,

        /// Node id to focus the camera on
        #[arg(short, long)]
        focus: Option<String>,

        /// Cluster id to expand (repeatable)
        #[arg(short, long)]
        expand: Vec<String>,

        /// Write JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("constellation=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_path(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn load_graph(path: &Path) -> anyhow::Result<GraphInput> {
    GraphInput::from_path(path)
        .with_context(|| format!("failed to read graph from {}", path.display()))
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => fs::write(path, json + "\n")
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}

fn run_layout(
    config: &EngineConfig,
    input: &Path,
    strategy: LayoutStrategy,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let graph = load_graph(input)?;
    let result = layout::layout(
        &graph.nodes,
        &graph.edges,
        strategy,
        &config.layout,
        &config.simulation,
    );
    write_json(&result, output)
}

struct RunArgs<'a> {
    input: &'a Path,
    strategy: LayoutStrategy,
    focus: Option<&'a str>,
    expand: &'a [String],
    output: Option<&'a Path>,
    ticks: usize,
}

fn run_engine(config: EngineConfig, args: RunArgs<'_>) -> anyhow::Result<()> {
    let graph = load_graph(args.input)?;
    let mut engine = Engine::new(config);
    engine.load(&graph.nodes, &graph.edges, args.strategy);

    if let Some(id) = args.focus {
        engine.focus(id);
    }
    for id in args.expand {
        engine.expand_cluster(id.clone());
    }

    let mut frame = engine.tick();
    let mut faults = frame.faults.len();
    for _ in 1..args.ticks {
        frame = engine.tick();
        faults += frame.faults.len();
    }

    tracing::info!(
        iteration = frame.iteration,
        alpha = frame.alpha,
        active = frame.active,
        faults,
        "finished run"
    );
    write_json(&frame, args.output)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    match &cli.command {
        Commands::Layout {
            input,
            strategy,
            output,
        } => run_layout(&config, input, *strategy, output.as_deref())?,
        Commands::Run {
            input,
            strategy,
            ticks,
            focus,
            expand,
            output,
        } => run_engine(
            config,
            RunArgs {
                input,
                strategy: *strategy,
                focus: focus.as_deref(),
                expand,
                output: output.as_deref(),
                ticks: *ticks,
            },
        )?,
    }

    Ok(())
}
