use std::env;

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub log_dir: String,
    pub observability_enabled: bool,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self {
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "storage/logs".to_string()),
            observability_enabled: env::var("OBSERVABILITY_ENABLED")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),
        }
    }
}
