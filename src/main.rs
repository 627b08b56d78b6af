//! callgate server.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────────┐
//!                    │                      CALLGATE                        │
//!                    │                                                      │
//!   Client call      │  ┌────────────┐   ┌────────────┐   ┌─────────────┐  │
//!   ─────────────────┼─▶│ interceptor│──▶│ authorizer │──▶│ biz / admin │  │
//!   (consumer hdr)   │  └─────┬──────┘   │   (ACL)    │   │  handlers   │  │
//!                    │        │ allowed  └────────────┘   └──────┬──────┘  │
//!                    │        ▼                                  │         │
//!                    │  ┌─────────────────────────────┐          │ streams │
//!                    │  │        telemetry hub        │◀─────────┘         │
//!                    │  │  log channels │ stat windows│                    │
//!                    │  └───────┬───────────────┬─────┘                    │
//!                    │          ▼               ▼                          │
//!   Admin clients ◀──┼──── admin/Logging   admin/Statistics                │
//!                    └──────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use callgate::config::{load_acl, load_config};
use callgate::observability::{logging, metrics};
use callgate::{RpcServer, Shutdown};

#[derive(Parser)]
#[command(name = "callgate")]
#[command(about = "ACL-checked RPC server with live call telemetry", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "callgate.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(&args.config)?;

    logging::init_tracing(&config.observability.log_level);
    tracing::info!("callgate v{} starting", env!("CARGO_PKG_VERSION"));

    let acl = load_acl(&config.acl)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        consumers = acl.len(),
        log_buffer = config.telemetry.log_buffer,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = RpcServer::new(config, acl);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
