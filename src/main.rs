//! Volley Game Server
//!
//! Process bootstrap: logging, configuration, transport bind, tick loop.
//! The simulation itself lives in the `volley` library.

use std::time::Duration;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use volley::network::server::{ServerConfig, WsServer};
use volley::{SimContext, StopSignal, TickEngine, VERSION};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = ServerConfig::default();
    if let Some(addr) = std::env::args().nth(1) {
        config.bind_addr = addr.parse().context("invalid bind address")?;
    }

    info!("Volley Server v{}", VERSION);
    info!("Tick Rate: {} Hz", config.tick_rate);

    // Bind failure is fatal: the tick loop never starts.
    let transport = WsServer::bind(&config)
        .await
        .context("failed to start transport")?;

    let stop = StopSignal::new();
    let ctrl_c_stop = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, stopping after current tick");
            ctrl_c_stop.trigger();
        }
    });

    let period = Duration::from_micros(1_000_000 / config.tick_rate as u64);
    let engine = TickEngine::new(SimContext::new(), transport, period, stop);
    let (ctx, _transport) = engine.run().await;

    info!("Server stopped at state {}", ctx.world.state_id);
    Ok(())
}
