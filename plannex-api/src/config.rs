/// Server settings, read once at startup
///
/// | variable                   | default                          |
/// |----------------------------|----------------------------------|
/// | `API_HOST`                 | `0.0.0.0`                        |
/// | `API_PORT`                 | `8080`                           |
/// | `API_CORS_ORIGINS`         | `*` (comma-separated list)       |
/// | `DATABASE_URL`             | required                         |
/// | `DATABASE_MAX_CONNECTIONS` | `10`                             |
/// | `JWT_SECRET`               | required, 32 characters or more  |
///
/// `RUST_LOG` is read by the tracing subscriber in `main`, not here. A `.env`
/// file in the working directory is loaded first when present.
///
/// ```no_run
/// use plannex_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("listening on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use anyhow::{bail, Context};
use plannex_shared::db::pool::DatabaseConfig as PoolConfig;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// `*` allows every origin
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// HS256 key shared with the service that issues tokens
    #[serde(skip_serializing)]
    pub secret: String,
}

/// Reads `key`, falling back to `default` when unset
fn parsed<T, F>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        None => Ok(default),
    }
}

fn required<F>(lookup: &F, key: &str) -> anyhow::Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).with_context(|| format!("{} must be set", key))
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same rules as [`Config::from_env`] over an arbitrary source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = required(&lookup, "JWT_SECRET")?;
        if secret.len() < MIN_JWT_SECRET_LEN {
            bail!(
                "JWT_SECRET is {} characters; at least {} are required",
                secret.len(),
                MIN_JWT_SECRET_LEN
            );
        }

        let cors_origins = lookup("API_CORS_ORIGINS")
            .as_deref()
            .unwrap_or("*")
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            api: ApiConfig {
                host: lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parsed(&lookup, "API_PORT", 8080)?,
                cors_origins,
            },
            database: DatabaseConfig {
                url: required(&lookup, "DATABASE_URL")?,
                max_connections: parsed(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            },
            jwt: JwtConfig { secret },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Shared pool defaults with this server's URL and size
    pub fn pool(&self) -> PoolConfig {
        PoolConfig {
            max_connections: self.database.max_connections,
            ..PoolConfig::from_url(self.database.url.clone())
        }
    }

    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }
}
