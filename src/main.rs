use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use concept_scene::loader::read_payload_file;
use concept_scene::{EngineConfig, LayoutStrategy, SceneEvent, SceneSession};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Strategy {
    Force,
    Orbital,
}

impl From<Strategy> for LayoutStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Force => Self::Force,
            Strategy::Orbital => Self::Orbital,
        }
    }
}

/// Lays out a concept graph payload headlessly and prints the render
/// snapshot as JSON.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Graph payload: `{"concepts": [...], "relationships": [...]}`.
    #[arg(long)]
    graph: PathBuf,

    /// Engine configuration JSON. Missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    strategy: Option<Strategy>,

    /// Camera distance from the origin.
    #[arg(long, default_value_t = 30.0)]
    distance: f32,

    /// Concept to expand; repeatable, applied in order.
    #[arg(long = "expand", value_name = "ID")]
    expand: Vec<String>,

    #[arg(long, value_name = "ID", conflicts_with = "select_edge")]
    select: Option<String>,

    #[arg(long, value_name = "ID")]
    select_edge: Option<String>,

    #[arg(long, value_name = "ID")]
    hover: Option<String>,

    #[arg(long)]
    search: Option<String>,

    /// Frames to tick at 60 Hz before the snapshot is taken.
    #[arg(long, default_value_t = 120)]
    frames: u32,

    #[arg(long)]
    pretty: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(strategy) = args.strategy {
        config.layout.strategy = strategy.into();
    }

    let payload = read_payload_file(&args.graph)?;
    let mut session = SceneSession::with_payload(config, payload);

    for id in &args.expand {
        if session.graph().index_of(id).is_none() {
            bail!("cannot expand unknown concept `{id}`");
        }
        session.expand(id);
    }
    if let Some(id) = &args.select
        && !session.select_node(id)
    {
        bail!("cannot select unknown concept `{id}`");
    }
    if let Some(id) = &args.select_edge
        && !session.select_edge(id)
    {
        bail!("cannot select unknown relationship `{id}`");
    }
    if let Some(id) = &args.hover {
        session.hover(Some(id.as_str()));
    }
    if let Some(query) = &args.search {
        session.set_search(query);
    }

    for _ in 0..args.frames {
        session.tick(1.0 / 60.0, args.distance);
    }

    for event in session.drain_events() {
        if let SceneEvent::GraphLoaded { dropped, .. } = event
            && dropped > 0
        {
            tracing::warn!(dropped, "payload contained entries that were dropped");
        }
    }

    let snapshot = session.render_graph();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.pretty {
        serde_json::to_writer_pretty(&mut out, &snapshot)?;
    } else {
        serde_json::to_writer(&mut out, &snapshot)?;
    }
    writeln!(out)?;
    Ok(())
}
