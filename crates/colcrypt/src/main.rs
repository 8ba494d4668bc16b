//! `colcrypt`: column encryption service entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise structured JSON logging.
//! 3. Probe the platform for AES-GCM support.
//! 4. Register the function overloads.
//! 5. Build the Axum router and start the HTTP server.

mod config;
mod crypto;
mod function;
mod server;
mod telemetry;

use anyhow::Result;
use tracing::{info, warn};

use config::Config;
use server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_port = cfg.listen_port,
        "colcrypt starting"
    );

    // -----------------------------------------------------------------------
    // 3. Platform
    // -----------------------------------------------------------------------
    let backend = crypto::platform::check_support(cfg.require_hardware_aes)?;
    if backend == crypto::platform::Backend::Software {
        warn!("hardware AES unavailable; using constant-time software implementation");
    }

    // -----------------------------------------------------------------------
    // 4. Function registry
    // -----------------------------------------------------------------------
    let state = AppState::new(cfg.require_hardware_aes, cfg.max_rows_per_block);
    info!(
        functions = state.registry.len(),
        hardware_aes = state.hardware_aes,
        "functions registered"
    );

    // -----------------------------------------------------------------------
    // 5. HTTP server
    // -----------------------------------------------------------------------
    let router = server::router::build(state, cfg.request_timeout());

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
