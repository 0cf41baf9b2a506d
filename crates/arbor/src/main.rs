//! arbor - run behavior-tree task pipelines from JSON definitions.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use arbor_parser::{Registry, TaskDef};
use arbor_tree::{Blackboard, Node, Status};

/// Run process pipeline tasks
#[derive(Parser)]
#[command(name = "arbor")]
#[command(about = "Run behavior-tree task pipelines from JSON definitions")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Task definition file (JSON)
    task: PathBuf,

    /// Dump the task definition and the final blackboard
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt().with_env_filter("debug").init();
    } else {
        tracing_subscriber::fmt::init();
    }

    match run(cli).await {
        Ok(status) => std::process::exit(if status.is_success() { 0 } else { 1 }),
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(2);
        }
    }
}

async fn run(cli: Cli) -> Result<Status> {
    let raw = tokio::fs::read_to_string(&cli.task)
        .await
        .with_context(|| format!("reading {}", cli.task.display()))?;
    let def: TaskDef = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", cli.task.display()))?;

    if cli.verbose {
        println!("{}", serde_json::to_string_pretty(&def)?);
    }

    let registry = Registry::default();
    let job = registry.build_job(&def).context("building task tree")?;
    debug!(root = %job.meta().label(), "job built");

    let blackboard = Blackboard::new();
    let status = job.tick(blackboard.clone()).await;

    if cli.verbose {
        println!("{}", serde_json::to_string_pretty(&blackboard.snapshot())?);
    }

    Ok(status)
}
