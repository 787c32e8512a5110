/// Configuration for the seeding tool
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 2)
/// - `DATABASE_ACQUIRE_TIMEOUT_SECONDS`: wait for a connection (default: 30)
/// - `RUST_LOG`: log filter (default: plannex_seed=info)
///
/// A `.env` file in the working directory is loaded first if present.

use plannex_shared::db::pool::DatabaseConfig;
use std::env;

#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
}

impl SeedConfig {
    /// Loads configuration from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing or a number is invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "2".to_string())
            .parse::<u32>()?;

        let acquire_timeout_seconds = lookup("DATABASE_ACQUIRE_TIMEOUT_SECONDS")
            .unwrap_or_else(|| "30".to_string())
            .parse::<u64>()?;

        if max_connections == 0 {
            anyhow::bail!("DATABASE_MAX_CONNECTIONS must be at least 1");
        }

        Ok(Self {
            database_url,
            max_connections,
            acquire_timeout_seconds,
        })
    }

    /// Pool settings for this run
    pub fn database(&self) -> DatabaseConfig {
        DatabaseConfig {
            max_connections: self.max_connections,
            min_connections: 0,
            acquire_timeout_seconds: self.acquire_timeout_seconds,
            ..DatabaseConfig::from_url(self.database_url.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            SeedConfig::from_lookup(lookup(&[("DATABASE_URL", "postgresql://localhost/plannex")]))
                .unwrap();

        assert_eq!(config.max_connections, 2);
        assert_eq!(config.acquire_timeout_seconds, 30);

        let database = config.database();
        assert_eq!(database.url, "postgresql://localhost/plannex");
        assert_eq!(database.max_connections, 2);
        assert_eq!(database.min_connections, 0);
    }

    #[test]
    fn test_database_url_is_required() {
        assert!(SeedConfig::from_lookup(lookup(&[])).is_err());
        assert!(SeedConfig::from_lookup(lookup(&[("DATABASE_URL", "  ")])).is_err());
    }

    #[test]
    fn test_invalid_numbers() {
        let url = ("DATABASE_URL", "postgresql://localhost/plannex");

        assert!(
            SeedConfig::from_lookup(lookup(&[url, ("DATABASE_MAX_CONNECTIONS", "many")])).is_err()
        );
        assert!(SeedConfig::from_lookup(lookup(&[url, ("DATABASE_MAX_CONNECTIONS", "0")])).is_err());
    }
}
