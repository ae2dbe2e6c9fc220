use anyhow::{Context, Result};

#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub database_url: Option<String>,
    pub http_addr: String,
    pub admin_api_key: Option<String>,
}

impl ServiceConfig {
    pub fn from_env(default_http_addr: &str) -> Result<Self> {
        Self::from_lookup(default_http_addr, |key| std::env::var(key).ok())
    }

    pub fn from_lookup(
        default_http_addr: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let http_addr = non_empty("HTTP_ADDR").unwrap_or_else(|| default_http_addr.to_string());

        Ok(Self {
            database_url: non_empty("DATABASE_URL"),
            http_addr,
            admin_api_key: non_empty("ADMIN_API_KEY"),
        })
    }

    pub fn require_database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .context("DATABASE_URL is required")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> ServiceConfig {
        let env: HashMap<&str, &str> = pairs.iter().copied().collect();
        ServiceConfig::from_lookup("0.0.0.0:3000", |key| env.get(key).map(|v| v.to_string()))
            .unwrap()
    }

    #[test]
    fn falls_back_to_default_addr() {
        let config = config(&[]);
        assert_eq!(config.http_addr, "0.0.0.0:3000");
        assert!(config.database_url.is_none());
        assert!(config.admin_api_key.is_none());
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config(&[("ADMIN_API_KEY", "   "), ("HTTP_ADDR", "")]);
        assert!(config.admin_api_key.is_none());
        assert_eq!(config.http_addr, "0.0.0.0:3000");
    }

    #[test]
    fn database_url_required_on_demand() {
        assert!(config(&[]).require_database_url().is_err());

        let config = config(&[("DATABASE_URL", "postgres://localhost/credit")]);
        assert_eq!(
            config.require_database_url().unwrap(),
            "postgres://localhost/credit"
        );
    }
}
