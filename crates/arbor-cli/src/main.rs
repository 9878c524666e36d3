//! Arbor CLI
//!
//! Operator tooling for a nested-set forest stored as a JSON snapshot:
//! repair coordinates, check invariants and move nodes under the tree mutex.

use anyhow::Result;
use arbor_core::effects::{LeaseCacheEffects, ReportEffects};
use arbor_core::{ArborConfig, NodeId};
use arbor_effects::{FileLeaseCache, JsonFileNodeStore, TerminalReporter, TracingReporter};
use arbor_maintenance::{RepairRequest, TreeMaintenance};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

mod handlers;

#[derive(Parser)]
#[command(name = "arbor")]
#[command(about = "Arbor - nested-set forest repair and tree maintenance", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, default_value = "arbor.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Recompute lft/rgt/depth/tree_id from parent links
    Repair {
        /// Only report and commit the tree containing this node (0 = all trees)
        #[arg(long, default_value_t = 0)]
        node: u64,

        /// Persist corrected nodes instead of a dry run
        #[arg(long)]
        commit: bool,

        /// Disable colors and bold text
        #[arg(long)]
        plain: bool,

        /// Send the report to the log instead of the terminal
        #[arg(long, conflicts_with = "plain")]
        log: bool,
    },

    /// Verify forest invariants without changing anything
    Check,

    /// Move a node under a new parent while holding the tree mutex
    Move {
        /// Node to move
        #[arg(long)]
        node: u64,

        /// New parent; omit to make the node a root
        #[arg(long)]
        target: Option<u64>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    let config = ArborConfig::load(&cli.config)?;
    config.validate()?;
    tracing::debug!(config = %cli.config.display(), store = %config.store.path.display(), "configuration loaded");

    let store = Arc::new(JsonFileNodeStore::new(&config.store.path));
    let cache: Arc<dyn LeaseCacheEffects> = Arc::new(FileLeaseCache::new(&config.lock.lease_dir));
    let maintenance = TreeMaintenance::from_config(store, cache, &config);

    match cli.command {
        Commands::Repair {
            node,
            commit,
            plain,
            log,
        } => {
            let reporter: Box<dyn ReportEffects> = if log {
                Box::new(TracingReporter::new())
            } else if plain {
                Box::new(TerminalReporter::plain())
            } else {
                Box::new(TerminalReporter::new())
            };
            handlers::repair::run(
                &maintenance,
                RepairRequest::from_raw(node, commit),
                reporter.as_ref(),
            )
            .await?;
        }

        Commands::Check => {
            handlers::check::run(&maintenance, &TerminalReporter::new()).await?;
        }

        Commands::Move { node, target } => {
            handlers::moves::run(&maintenance, NodeId(node), target.map(NodeId)).await?;
        }
    }

    Ok(())
}
