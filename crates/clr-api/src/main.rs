// SPDX-License-Identifier: BUSL-1.1
//! ClaimRoot API server binary.
//!
//! Storage is in-memory (DashMap) with no persistence — ledger and
//! vault contents are lost on restart. Shutdown waits for in-flight
//! mesh sync tasks before exiting.

use std::net::SocketAddr;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use clr_api::state::AppState;
use clr_ledger::DEFAULT_START_POSITION;

#[derive(Debug, Parser)]
#[command(name = "clr-api", about = "ClaimRoot license issuance and vault API server")]
struct Args {
    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    host: std::net::IpAddr,

    /// Port to listen on.
    #[arg(long, default_value_t = 4100)]
    port: u16,

    /// Treaty ledger start position; the first license lands one past it.
    #[arg(long, default_value_t = DEFAULT_START_POSITION)]
    ledger_start: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let state = AppState::with_ledger_start(args.ledger_start);
    let app = clr_api::app(state.clone());

    let addr = SocketAddr::from((args.host, args.port));
    tracing::info!("clr-api listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Let in-flight ledger and backup syncs finish before exiting.
    state.quiesce().await;
    tracing::info!("clr-api shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install ctrl-c handler");
        return;
    }
    tracing::info!("shutdown signal received");
}
