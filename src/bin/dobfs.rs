//! `dobfs` - run a direction-optimizing BFS over an edge-list file.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dobfs::bfs::{serial_push_bfs, BfsConfig, BfsEngine, SwitchPolicy, TraversalReport, DEFAULT_LINE};
use dobfs::graph::{load_edge_list, DirectedGraph, NodeId};
use dobfs::{Depth, UNREACHED};

#[derive(Parser, Debug)]
#[command(name = "dobfs")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Edge list: one `src dst` pair per line; `#` and `%` lines are comments
    edge_list: PathBuf,

    /// Start node (an original id when --renumber is set)
    #[arg(short, long, default_value_t = 0)]
    start: u64,

    /// Direction switching policy
    #[arg(short, long, value_enum)]
    policy: Option<Policy>,

    /// Read pull-phase in-lists directly instead of through the neighbor cache
    #[arg(long)]
    no_cache: bool,

    /// Neighbor cache capacity in lines
    #[arg(long)]
    cache_lines: Option<usize>,

    /// Report neighbor cache hit/miss counters
    #[arg(long)]
    cache_stats: bool,

    /// Scan whole in-lists during pull epochs
    #[arg(long)]
    no_early_exit: bool,

    /// JSON engine configuration; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Renumber node ids densely in order of first appearance
    #[arg(long)]
    renumber: bool,

    /// Compare depths against a serial BFS and fail on mismatch
    #[arg(long)]
    validate: bool,

    /// Print the traversal report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Policy {
    Adaptive,
    Beamer,
    Push,
    Pull,
}

impl From<Policy> for SwitchPolicy {
    fn from(p: Policy) -> Self {
        match p {
            Policy::Adaptive => Self::Adaptive,
            Policy::Beamer => Self::Beamer,
            Policy::Push => Self::AlwaysPush,
            Policy::Pull => Self::AlwaysPull,
        }
    }
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    nodes: usize,
    edges: usize,
    start: usize,
    reached: usize,
    max_depth: Depth,
    config: &'a BfsConfig,
    report: &'a TraversalReport,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;

    let edges = load_edge_list(&args.edge_list)
        .with_context(|| format!("failed to load {}", args.edge_list.display()))?;
    let (graph, start) = build_graph(&edges, args.renumber, args.start)?;
    tracing::info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "graph loaded"
    );

    let engine = BfsEngine::<DEFAULT_LINE>::new(graph.forward(), graph.reverse(), config)
        .context("invalid engine setup")?;
    let out = engine.run(start).context("traversal failed")?;

    let reached = out.depths.iter().filter(|&&d| d != UNREACHED).count();
    let max_depth = out.depths.iter().copied().max().unwrap_or(UNREACHED);
    if args.json {
        let summary = JsonSummary {
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            start,
            reached,
            max_depth,
            config: engine.config(),
            report: &out.report,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_report(&out.report);
        println!("reached {reached} of {} nodes, max depth {max_depth}", graph.node_count());
    }

    if args.validate {
        let expected = serial_push_bfs(graph.forward(), start);
        let mismatches: Vec<_> = expected
            .iter()
            .zip(&out.depths)
            .enumerate()
            .filter(|(_, (e, d))| e != d)
            .collect();
        if let Some((node, (e, d))) = mismatches.first() {
            bail!(
                "{} depth mismatches; first at node {node}: expected {e}, got {d}",
                mismatches.len()
            );
        }
        eprintln!("validation passed");
    }
    Ok(())
}

fn build_config(args: &Args) -> Result<BfsConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            BfsConfig::from_json_str(&text)
                .with_context(|| format!("failed to parse {}", path.display()))?
        }
        None => BfsConfig::default(),
    };
    if let Some(policy) = args.policy {
        config = config.with_policy(policy.into());
    }
    if let Some(lines) = args.cache_lines {
        config = config.with_cache_lines(lines);
    }
    if args.no_cache {
        config = config.with_cache(false);
    }
    if args.cache_stats {
        config = config.with_cache_stats(true);
    }
    if args.no_early_exit {
        config = config.with_early_exit(false);
    }
    config.validate()?;
    Ok(config)
}

/// Builds the graph and resolves the start node to a dense id.
fn build_graph(edges: &[(u64, u64)], renumber: bool, start: u64) -> Result<(DirectedGraph, usize)> {
    if renumber {
        let (graph, ids) = DirectedGraph::from_edge_list_renumbered(edges)?;
        let dense = ids
            .dense(start)
            .with_context(|| format!("start node {start} does not appear in the edge list"))?;
        return Ok((graph, dense as usize));
    }

    let dense: Vec<(NodeId, NodeId)> = edges
        .iter()
        .map(|&(u, v)| -> Result<(NodeId, NodeId)> { Ok((NodeId::try_from(u)?, NodeId::try_from(v)?)) })
        .collect::<Result<_>>()
        .context("node id exceeds 32 bits; try --renumber")?;
    let nodes = dense
        .iter()
        .map(|&(u, v)| u.max(v) as usize + 1)
        .max()
        .unwrap_or(0)
        .max(usize::try_from(start)? + 1);
    let graph = DirectedGraph::from_edges(nodes, &dense)?;
    Ok((graph, usize::try_from(start)?))
}

fn print_report(report: &TraversalReport) {
    println!(
        "{:>5}  {:<4}  {:>10}  {:>10}  {:>14}  {:>14}",
        "epoch", "dir", "frontier", "updated", "edges_explored", "edges_scanned"
    );
    for e in &report.epochs {
        println!(
            "{:>5}  {:<4}  {:>10}  {:>10}  {:>14}  {:>14}",
            e.epoch,
            e.direction,
            e.frontier,
            e.stats.nodes_updated,
            e.stats.edges_explored,
            e.stats.edges_scanned
        );
    }
    if let Some(cache) = &report.cache {
        println!(
            "cache: {} lookups, {} hits, {} misses, {} aborted ({:.1}% hit rate)",
            cache.lookups,
            cache.hits,
            cache.misses,
            cache.aborted,
            cache.hit_rate() * 100.0
        );
    }
}
