use anyhow::Context;
use dotenvy::dotenv;
use tracing::{info, warn};

use coursebook::logging::init_tracing;
use coursebook::metrics::init_metrics;
use coursebook::router::init_router;
use coursebook::state::init_app_state;
use coursebook_config::{LoggingConfig, ServerConfig, StorageConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let logging = LoggingConfig::from_env();
    init_tracing(&logging)?;

    let storage = StorageConfig::from_env().map_err(anyhow::Error::msg)?;
    let metrics_handle =
        init_metrics(logging.observability_enabled).context("Failed to install metrics recorder")?;

    let state = init_app_state(&storage).await?.with_metrics(metrics_handle);
    if state.jwt_config.uses_development_secret() {
        warn!("JWT_SECRET is not set; using the development secret");
    }

    let server = ServerConfig::from_env();
    let address = server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    info!(%address, backend = ?storage.backend, "Server listening");
    info!("API reference available at http://{}/scalar", address);

    axum::serve(listener, init_router(state))
        .await
        .context("Server error")?;

    Ok(())
}
