//! # Coursebook Config
//!
//! Configuration structures loaded from environment variables once at
//! startup:
//!
//! - [`jwt`]: session token signing secret and lifetime
//! - [`cors`]: allowed CORS origins
//! - [`server`]: listen address
//! - [`storage`]: persistence backend and database pool settings
//! - [`logging`]: log directory and metrics toggle

pub mod cors;
pub mod jwt;
pub mod logging;
pub mod server;
pub mod storage;

pub use cors::CorsConfig;
pub use jwt::{JwtConfig, SESSION_TOKEN_TTL_SECS};
pub use logging::LoggingConfig;
pub use server::ServerConfig;
pub use storage::{StorageBackend, StorageConfig};
