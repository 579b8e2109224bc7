use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use polychat::config::Config;
use polychat::server;

/// Streaming chat relay for OpenAI, Anthropic and Google models.
#[derive(Parser)]
#[command(name = "polychat", version, about)]
struct Args {
    /// Path to the YAML config file. A missing file means defaults.
    #[arg(short, long, env = "POLYCHAT_CONFIG", default_value = "polychat.yaml")]
    config: PathBuf,

    /// Override the listen host.
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let mut config = Config::load(&args.config)
        .await
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    server::run(config).await
}
