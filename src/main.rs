//! Edge adapter binary.
//!
//! ```text
//!     Browser                ┌──────────────────────────────────────────┐
//!     ───────────────────────┼─▶ /api/{*path}                           │
//!                            │      │                                   │
//!                            │      ├─ OPTIONS ─▶ 204 + CORS            │
//!                            │      │                                   │
//!                            │      └─ other ─▶ forwarder ──────────────┼──▶ <origin>/api/<path>?<query>
//!                            │                     │                    │
//!     ◀──────────────────────┼── CORS ◀─ transform (products) ◀─────────┼─── upstream response
//!                            └──────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use edge_adapter::config::{load_config, AdapterConfig};
use edge_adapter::observability::{logging, metrics};
use edge_adapter::{AdapterServer, Shutdown};

#[derive(Parser)]
#[command(name = "edge-adapter")]
#[command(about = "CORS-aware API adapter in front of a single upstream", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Upstream origin, overriding the config file.
    #[arg(short, long, env = "EDGE_ADAPTER_UPSTREAM")]
    upstream: Option<String>,

    /// Bind address, overriding the config file.
    #[arg(short, long)]
    bind: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<AdapterConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => AdapterConfig::default(),
        };
        if let Some(upstream) = self.upstream {
            config.upstream.origin = upstream;
        }
        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    logging::init_tracing(&config.observability);

    tracing::info!("edge-adapter v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let bind_address = config.listener.bind_address.clone();
    let server = AdapterServer::new(config)?;

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let _signals = shutdown.trigger_on_signal();
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
