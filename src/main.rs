//! Transaction relay (tx-express)
//!
//! Accepts signed value transfers over JSON-RPC, relays them to a chain node
//! and publishes lifecycle notifications while they move from received to
//! broadcast to confirmed.
//!
//! # Architecture Overview
//!
//! ```text
//!   JSON-RPC request
//!   ─────────────────▶ http server ──▶ SubmissionGate ──┬──▶ chain node (wait >= 1)
//!                                          │            │
//!                                          ▼            │
//!                                    EventRouter (bounded queue)
//!                                          │
//!                        ┌─────────────────┼──────────────────┐
//!                        ▼                 ▼                  ▼
//!                   Broadcaster      pending set         Notifier ──▶ sink
//!                   (NoWait)             ▲            (mqtt / ws hub / webhook)
//!                                        │
//!                              ConfirmationTracker
//!                              (one tick per block)
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use tx_express::blockchain::{ChainConnector, RpcConnector};
use tx_express::config::load_or_default;
use tx_express::http::{AppState, HttpServer};
use tx_express::notify::Notifier;
use tx_express::observability::{logging, metrics};
use tx_express::relay::{NetworkInfo, Relay};

#[derive(Parser)]
#[command(name = "tx-express", version, about = "Transaction relay with lifecycle notifications")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_or_default(&args.config)?;

    logging::init_logging(&config.observability.log_level)?;
    tracing::info!("tx-express v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        rpc_url = %config.blockchain.rpc_url,
        sink = ?config.notify.sink,
        prefix_topic = %config.notify.prefix_topic,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let connector: Arc<dyn ChainConnector> = Arc::new(RpcConnector::new(config.blockchain.clone()));
    let network = NetworkInfo::discover(connector.as_ref(), config.blockchain.chain_id).await?;
    tracing::info!(
        network_id = network.chain_id,
        gas_price = network.gas_price,
        "Connected to chain node"
    );

    let (notifier, hub) = Notifier::from_config(&config.notify)?;

    let relay = Relay::spawn(connector, notifier, network, &config.relay);

    let state = AppState {
        gate: relay.gate.clone(),
        pending: relay.pending.clone(),
        hub,
        namespace: config.relay.rpc_namespace.as_str().into(),
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(&config.listener, state);
    server.run(listener).await?;

    relay.abort();
    tracing::info!("Shutdown complete");
    Ok(())
}
