use std::env;

/// Session tokens are valid for 24 hours after issuance.
pub const SESSION_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

const DEV_SECRET: &str = "coursebook-development-secret-change-me";

/// Signing configuration for session tokens.
///
/// Built once at startup and shared through the application state; the
/// secret is never read from the environment at request time.
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub token_ttl_secs: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self {
            secret: env::var("JWT_SECRET").unwrap_or_else(|_| DEV_SECRET.to_string()),
            token_ttl_secs: SESSION_TOKEN_TTL_SECS,
        }
    }

    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            token_ttl_secs: SESSION_TOKEN_TTL_SECS,
        }
    }

    /// True when no `JWT_SECRET` was provided and the built-in one is in use.
    pub fn uses_development_secret(&self) -> bool {
        self.secret == DEV_SECRET
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[redacted]")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_fixed_ttl() {
        let config = JwtConfig::new("secret");
        assert_eq!(config.token_ttl_secs, 86_400);
        assert!(!config.uses_development_secret());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = JwtConfig::new("super-secret-value");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret-value"));
        assert!(debug.contains("[redacted]"));
    }
}
