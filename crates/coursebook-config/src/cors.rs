use std::env;

#[derive(Clone, Debug)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn from_env() -> Result<Self, String> {
        let raw = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string());
        Self::from_list(&raw)
    }

    /// Parses a comma separated origin list.
    ///
    /// Credentials are allowed on every response, which cannot be combined
    /// with a `*` origin, so a wildcard is rejected.
    pub fn from_list(raw: &str) -> Result<Self, String> {
        let allowed_origins: Vec<String> = raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if allowed_origins.iter().any(|origin| origin == "*") {
            return Err(
                "ALLOWED_ORIGINS cannot contain '*' because credentials are allowed; list explicit origins"
                    .to_string(),
            );
        }

        Ok(Self { allowed_origins })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_list_trims_and_skips_empty() {
        let config = CorsConfig::from_list(" http://a.test , ,http://b.test,").unwrap();
        assert_eq!(config.allowed_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_from_list_rejects_wildcard() {
        assert!(CorsConfig::from_list("*").is_err());
        assert!(CorsConfig::from_list("http://a.test, *").is_err());
    }
}
