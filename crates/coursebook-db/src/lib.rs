//! # Coursebook DB
//!
//! Persistence for accounts and courses behind the [`Store`] trait.
//!
//! - [`PgStore`]: PostgreSQL via SQLx, with embedded migrations
//! - [`MemoryStore`]: in-process store for local runs and tests
//!
//! # Example
//!
//! ```ignore
//! use coursebook_db::{PgStore, init_db_pool};
//!
//! let pool = init_db_pool(&database_url, 5).await?;
//! let store = PgStore::new(pool);
//! store.migrate().await?;
//! ```

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use sqlx::PgPool;
pub use store::Store;

use sqlx::postgres::PgPoolOptions;

/// Opens a PostgreSQL connection pool.
pub async fn init_db_pool(database_url: &str, max_connections: u32) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}
