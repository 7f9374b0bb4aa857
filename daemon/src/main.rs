//! Counterstake daemon — entry point for running the resolution engine.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde_json::json;

use counterstake_node::{parse_journal, CounterstakeNode, LogSettlement, NodeConfig, NodeError};
use counterstake_types::SystemClock;
use counterstake_utils::{init_tracing_with, LogFormat};

#[derive(Parser)]
#[command(name = "counterstake-daemon", about = "Counterstake claim/challenge resolution engine")]
struct Cli {
    /// Path to a TOML configuration file. CLI flags and env vars override it.
    #[arg(long, env = "COUNTERSTAKE_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory for the LMDB store.
    #[arg(long, env = "COUNTERSTAKE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "COUNTERSTAKE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "COUNTERSTAKE_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Replay a JSON-lines operation journal and print each result as JSON.
    Replay {
        /// Journal file, one `{"ts": .., "op": {..}}` entry per line.
        journal: PathBuf,

        /// Stop at the first rejected operation.
        #[arg(long)]
        fail_fast: bool,
    },
    /// Print the effective configuration as TOML.
    Config,
}

fn load_config(cli: &Cli) -> anyhow::Result<NodeConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let path = path.to_string_lossy();
            NodeConfig::from_toml_file(&path)
                .with_context(|| format!("failed to load config from {path}"))?
        }
        None => NodeConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.clone();
    }
    Ok(config)
}

async fn replay(config: &NodeConfig, journal: &Path, fail_fast: bool) -> anyhow::Result<()> {
    let input = std::fs::read_to_string(journal)
        .with_context(|| format!("failed to read journal {}", journal.display()))?;
    let entries = parse_journal(&input)?;
    tracing::info!(entries = entries.len(), journal = %journal.display(), "replaying journal");

    let node = CounterstakeNode::start(config, Arc::new(SystemClock), Arc::new(LogSettlement))?;
    let handle = node.handle();

    let mut rejected = 0usize;
    for (index, entry) in entries.into_iter().enumerate() {
        let op = entry.op.name();
        let record = match handle.execute(entry.op, entry.ts).await {
            Ok(result) => json!({ "index": index, "op": op, "ok": result }),
            Err(NodeError::Engine(e)) => {
                rejected += 1;
                json!({
                    "index": index,
                    "op": op,
                    "error": { "kind": format!("{:?}", e.kind()), "message": e.to_string() },
                })
            }
            Err(e) => return Err(e.into()),
        };
        println!("{record}");
        if fail_fast && rejected > 0 {
            break;
        }
    }

    drop(handle);
    node.shutdown().await?;
    tracing::info!(rejected, "replay finished");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let format = config
        .log_format
        .parse::<LogFormat>()
        .map_err(anyhow::Error::msg)?;
    init_tracing_with(format, &config.log_level);

    match &cli.command {
        Command::Replay { journal, fail_fast } => replay(&config, journal, *fail_fast).await?,
        Command::Config => print!("{}", config.to_toml_string()?),
    }

    Ok(())
}
