use std::sync::Arc;

use anyhow::{Context, bail};
use metrics_exporter_prometheus::PrometheusHandle;

use coursebook_config::{CorsConfig, JwtConfig, StorageBackend, StorageConfig};
use coursebook_db::{MemoryStore, PgStore, Store, init_db_pool};

/// Shared state handed to every handler.
///
/// Built once at startup; handlers never read configuration from the
/// environment themselves.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub metrics_handle: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, jwt_config: JwtConfig, cors_config: CorsConfig) -> Self {
        Self {
            store,
            jwt_config,
            cors_config,
            metrics_handle: None,
        }
    }

    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics_handle = handle;
        self
    }
}

/// Connects the configured store, running migrations for PostgreSQL.
pub async fn init_store(config: &StorageConfig) -> anyhow::Result<Arc<dyn Store>> {
    match config.backend {
        StorageBackend::Postgres => {
            let Some(database_url) = config.database_url.as_deref() else {
                bail!("DATABASE_URL must be set when STORAGE_BACKEND=postgres");
            };
            let pool = init_db_pool(database_url, config.max_connections)
                .await
                .context("Failed to connect to database")?;
            let store = PgStore::new(pool);
            store.migrate().await.context("Failed to run migrations")?;
            Ok(Arc::new(store))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on shutdown");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

pub async fn init_app_state(storage: &StorageConfig) -> anyhow::Result<AppState> {
    let cors_config = CorsConfig::from_env().map_err(anyhow::Error::msg)?;
    let store = init_store(storage).await?;
    Ok(AppState::new(store, JwtConfig::from_env(), cors_config))
}
