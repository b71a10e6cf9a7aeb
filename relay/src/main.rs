use std::net::Ipv4Addr;
use std::sync::Arc;

use anyhow::Context as _;
use tracing_subscriber::EnvFilter;

use anketo_relay::{api_router, AppState, EnvConfig, RelayConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Arc::new(
        RelayConfig::from_env().context("could not load relay config from environment")?,
    );
    let port = config.port;

    let state = AppState::new(config);
    let routes = api_router(state);
    anketo_relay::serve((Ipv4Addr::UNSPECIFIED, port), routes)
        .await
        .context("error running HTTP server")?;
    Ok(())
}
