//! CORS relay server.
//!
//! ```text
//!     Browser                 ┌──────────────────────────────────────┐
//!     POST /proxy             │              cors-relay              │
//!     { url, options } ──────▶│  validate → prepare → forward ───────┼──▶ Target API
//!                             │                                      │
//!     JSON + CORS     ◀───────│  normalize ◀─────────────────────────┼─── response
//!                             └──────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use cors_relay::config::{self, Environment, RelayConfig};
use cors_relay::http::HttpServer;
use cors_relay::lifecycle::{signals, Shutdown};
use cors_relay::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "cors-relay")]
#[command(about = "Relay browser requests to third-party APIs with permissive CORS", long_about = None)]
struct Args {
    /// TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override `relay.environment`.
    #[arg(short, long, env = "RELAY_ENV")]
    environment: Option<Environment>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => RelayConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }
    if let Some(environment) = args.environment {
        config.relay.environment = environment;
    }
    config::validate_config(&config).map_err(config::ConfigError::Validation)?;

    logging::init(&config.observability)?;

    tracing::info!("cors-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        environment = %config.relay.environment,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Address was checked by validation.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown);

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
