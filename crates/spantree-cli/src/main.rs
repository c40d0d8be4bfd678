//! spantree - run spanning-tree elections over edge-list topologies
//!
//! Usage:
//!   spantree run topology.txt --engine concurrent --json
//!   spantree generate grid 4 --width 6 > grid.txt

mod render;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use spantree_bridge::FloodPolicy;
use spantree_engine::{
    ConcurrentEngine, Engine, EngineConfig, EngineError, RunOutcome, RunReport, SequentialEngine, Topology,
    TreeEntry,
};
use spantree_topology::{edgelist, generate, Graph, TopologyError, MAX_VERTICES};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "spantree", author, version, about = "Distributed spanning-tree election", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Elect a spanning tree over a topology file
    Run(RunArgs),
    /// Print a generated topology as an edge list
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Edge-list file: vertex count, edge count, then one pair per line
    file: PathBuf,

    #[arg(long, value_enum, default_value_t = EngineKind::Sequential)]
    engine: EngineKind,

    /// When bridges advertise (full or root-only)
    #[arg(long, default_value_t = FloodPolicy::Full)]
    flood: FloodPolicy,

    /// JSON engine configuration
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    max_rounds: Option<u64>,

    #[arg(long)]
    max_duration_ms: Option<u64>,

    /// Runtime threads for the concurrent engine
    #[arg(long)]
    threads: Option<usize>,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// Record and print every route change (sequential engine)
    #[arg(long)]
    trace: bool,

    /// Refuse topology files declaring more bridges than this
    #[arg(long, default_value_t = edgelist::DEFAULT_VERTEX_LIMIT)]
    max_vertices: usize,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum EngineKind {
    Sequential,
    Concurrent,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[arg(value_enum)]
    shape: Shape,

    /// Number of bridges (rows for a grid)
    n: usize,

    /// Grid columns (defaults to n)
    #[arg(long)]
    width: Option<usize>,

    /// Extra random links on top of the spanning tree (random shape)
    #[arg(long, default_value_t = 0)]
    extra: usize,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Refuse shapes with more bridges than this
    #[arg(long, default_value_t = edgelist::DEFAULT_VERTEX_LIMIT)]
    max_vertices: usize,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Shape {
    Path,
    Ring,
    Star,
    Complete,
    Grid,
    Random,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spantree=info,spantree_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run(args),
        Command::Generate(args) => {
            generate_topology(args)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run(args: RunArgs) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = engine_config(&args)?;
    let graph = edgelist::read_with_limit(&args.file, args.max_vertices)?;
    let mut topology = Topology::new(graph, args.flood)?;
    info!(
        file = %args.file.display(),
        bridges = topology.len(),
        links = topology.graph().edge_count(),
        policy = %topology.policy(),
        "topology loaded"
    );

    let report = match args.engine {
        EngineKind::Sequential => SequentialEngine::new(config).run(&mut topology)?,
        EngineKind::Concurrent => ConcurrentEngine::new(config).run(&mut topology)?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, &topology);
    }

    Ok(if report.is_converged() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

fn engine_config(args: &RunArgs) -> spantree_engine::Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(rounds) = args.max_rounds {
        config = config.with_max_rounds(rounds);
    }
    if let Some(ms) = args.max_duration_ms {
        config = config.with_max_duration(Duration::from_millis(ms));
    }
    if let Some(threads) = args.threads {
        config = config.with_worker_threads(threads);
    }
    if args.trace {
        config = config.with_trace(true);
    }
    config.validate()?;
    if config.record_trace && args.engine == EngineKind::Concurrent {
        return Err(EngineError::InvalidConfig(
            "route-change traces are only recorded by the sequential engine".into(),
        ));
    }
    debug!(?config, "engine configuration");
    Ok(config)
}

fn print_report(report: &RunReport, topology: &Topology) {
    match &report.outcome {
        RunOutcome::Converged(tree) => print!("{}", render::table(tree)),
        RunOutcome::NotConverged { .. } => {
            // Show where every bridge got stuck.
            let current: Vec<TreeEntry> = topology
                .nodes()
                .iter()
                .map(|node| TreeEntry {
                    node: node.id(),
                    root: node.root(),
                    distance: node.distance(),
                    designated: node.designated(),
                })
                .collect();
            print!("{}", render::table(&current));
        }
    }
    if !report.trace.is_empty() {
        println!();
        print!("{}", render::trace(&report.trace));
    }
    for failure in &report.failures {
        println!("failure: {failure}");
    }
    println!("{}", render::summary(report));
}

fn generate_topology(args: GenerateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let graph = build_shape(&args)?;
    match &args.output {
        Some(path) => {
            edgelist::write(path, &graph)?;
            info!(path = %path.display(), bridges = graph.vertex_count(), "topology written");
        }
        None => print!("{}", edgelist::render(&graph)),
    }
    Ok(())
}

/// Bridge count of the requested shape, refused above the vertex limit.
fn shape_size(args: &GenerateArgs) -> Result<usize, TopologyError> {
    let size = match args.shape {
        Shape::Grid => args.width.unwrap_or(args.n).saturating_mul(args.n),
        _ => args.n,
    };
    if size > args.max_vertices.min(MAX_VERTICES) {
        return Err(TopologyError::TooManyVertices(size));
    }
    Ok(size)
}

fn build_shape(args: &GenerateArgs) -> Result<Graph, TopologyError> {
    shape_size(args)?;
    Ok(match args.shape {
        Shape::Path => generate::path(args.n),
        Shape::Ring => generate::ring(args.n),
        Shape::Star => generate::star(args.n),
        Shape::Complete => generate::complete(args.n),
        Shape::Grid => generate::grid(args.width.unwrap_or(args.n), args.n),
        Shape::Random => generate::random_connected(args.n, args.extra, args.seed),
    })
}
