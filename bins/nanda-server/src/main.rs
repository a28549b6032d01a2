//! NANDA reputation server binary.
//!
//! Loads configuration (defaults, optional file, `NANDA_*` environment, then
//! command-line flags), registers the reputation plugin and serves HTTP until
//! Ctrl+C.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use nanda_server::{NandaServer, ReputationPlugin, ServerConfig, StoreBackend};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "nanda-server",
    version,
    about = "NANDA server with reputation scoring, history and badges"
)]
struct Args {
    /// Config file (TOML, YAML or JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// HTTP bind address
    #[arg(long)]
    bind: Option<String>,

    /// HTTP port
    #[arg(long)]
    port: Option<u16>,

    /// Data directory for persistent storage
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Score store backend ("memory" or "rocksdb")
    #[arg(long)]
    store: Option<StoreBackend>,

    /// Base URL of the metrics service
    #[arg(long)]
    metrics_endpoint: Option<String>,

    /// Disable permissive CORS headers
    #[arg(long)]
    no_cors: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Log output format ("text" or "json")
    #[arg(long, default_value = "text")]
    log_format: String,
}

impl Args {
    /// Apply command-line overrides on top of the loaded configuration.
    fn into_config(self) -> Result<(ServerConfig, String)> {
        let mut config =
            ServerConfig::load(self.config.as_deref()).context("failed to load configuration")?;

        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(data_dir) = self.data_dir {
            config.data_dir = data_dir;
        }
        if let Some(store) = self.store {
            config.store = store;
        }
        if self.metrics_endpoint.is_some() {
            config.metrics_endpoint = self.metrics_endpoint;
        }
        if self.no_cors {
            config.enable_cors = false;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }

        Ok((config, self.log_format))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let (config, log_format) = Args::parse().into_config()?;
    init_logging(&config.log_level, &log_format)?;

    info!("NANDA server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        http_addr = %config.http_addr(),
        data_dir = ?config.data_dir,
        store = %config.store,
        metrics_endpoint = ?config.metrics_endpoint,
        "configuration loaded"
    );

    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("failed to create data_dir {:?}", config.data_dir))?;

    let server = NandaServer::new(config)
        .context("failed to build server")?
        .with_plugin(ReputationPlugin)
        .context("failed to register reputation plugin")?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        info!("received Ctrl+C, shutting down...");
    };

    server.serve(shutdown_signal).await.context("server error")?;
    info!("NANDA server shutdown complete");
    Ok(())
}

/// Crates whose events follow the configured log level.
const LOG_TARGETS: [&str; 3] = ["nanda_server", "nanda_reputation", "nanda_core"];

/// Filter directives for `level`: the NANDA crates log at `level`, everything
/// else (hyper, reqwest, rocksdb) at `warn`. A value that already carries
/// directives (`,` or `=`) is used as given.
fn log_directives(level: &str) -> String {
    if level.contains([',', '=']) {
        return level.to_string();
    }
    let scoped: Vec<String> = LOG_TARGETS.iter().map(|t| format!("{t}={level}")).collect();
    format!("warn,{}", scoped.join(","))
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
///
/// `format = "json"` gives one JSON object per event; anything else is text.
fn init_logging(level: &str, format: &str) -> Result<()> {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(log_directives(level))
            .with_context(|| format!("invalid log level {level:?}"))?,
    };

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }
    Ok(())
}
