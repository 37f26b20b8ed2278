//! `dsc-pull-server` entry point.

use anyhow::Context;
use clap::Parser;
use dsc_pull::config::ConfigLoader;
use dsc_pull::telemetry::init_logging;
use std::path::PathBuf;

/// DSC pull server for agents speaking protocol version 2.0.
#[derive(Debug, Parser)]
#[command(name = "dsc-pull-server", version = dsc_pull::VERSION)]
struct Args {
    /// Configuration file (TOML or JSON).
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Listen address, overriding the configuration.
    #[arg(long, value_name = "HOST:PORT")]
    addr: Option<String>,

    /// Log filter, overriding the configuration (e.g. `debug`).
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,

    /// Skip loading a `.env` file.
    #[arg(long)]
    no_dotenv: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader
            .with_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?;
    }
    if !args.no_dotenv {
        loader = loader.with_dotenv().context("loading .env")?;
    }
    let mut config = loader
        .with_env_prefix("DSC")
        .load_unvalidated()
        .context("applying environment overrides")?;

    if let Some(addr) = args.addr {
        config.server.http_addr = addr;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    config.validate().context("invalid configuration")?;

    init_logging(&config.logging.to_log_config()).context("initializing logging")?;

    tracing::info!(
        version = dsc_pull::VERSION,
        address = %config.server.http_addr,
        "starting DSC pull server"
    );

    let server = dsc_pull::build_server(&config)
        .await
        .context("building server")?;
    server.run().await.context("server error")?;
    Ok(())
}
