/// PostgreSQL connection pool
///
/// The API server and the seeding tool each open one `sqlx` pool through
/// [`create_pool`]. The pool answers a `SELECT 1` before it is handed out, so
/// a wrong `DATABASE_URL` surfaces at startup.
///
/// ```no_run
/// use plannex_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::from_url(std::env::var("DATABASE_URL")?)).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Pool sizing and timeouts
///
/// Timeouts are whole seconds so they map directly onto environment variables.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,

    pub max_connections: u32,

    /// Connections kept open while idle
    pub min_connections: u32,

    /// Wait for a free connection before failing the caller
    pub acquire_timeout_seconds: u64,

    /// Close idle connections after this long; `None` keeps them
    pub idle_timeout_seconds: Option<u64>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_seconds: 30,
            idle_timeout_seconds: Some(600),
        }
    }
}

impl DatabaseConfig {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    fn pool_options(&self) -> PgPoolOptions {
        let options = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_seconds));

        match self.idle_timeout_seconds {
            Some(seconds) => options.idle_timeout(Duration::from_secs(seconds)),
            None => options.idle_timeout(None),
        }
    }
}

/// Connects and checks that the database answers
///
/// # Errors
///
/// Fails on a malformed URL, an unreachable server, or a failed health check.
pub async fn create_pool(config: DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        acquire_timeout_seconds = config.acquire_timeout_seconds,
        idle_timeout_seconds = ?config.idle_timeout_seconds,
        "Connecting to PostgreSQL"
    );

    let pool = config.pool_options().connect(&config.url).await?;
    health_check(&pool).await?;

    info!(size = pool.size(), "PostgreSQL pool ready");
    Ok(pool)
}

/// Round-trips `SELECT 1`
///
/// # Errors
///
/// Fails if the query fails or the server answers anything but 1.
pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    let answer: i32 = sqlx::query_scalar("SELECT 1").fetch_one(pool).await?;

    if answer != 1 {
        warn!(answer, "PostgreSQL answered SELECT 1 with something else");
        return Err(sqlx::Error::Protocol(format!(
            "SELECT 1 returned {}",
            answer
        )));
    }

    debug!("PostgreSQL is healthy");
    Ok(())
}

/// Waits for checked-out connections to come back, then closes the pool
pub async fn close_pool(pool: PgPool) {
    debug!(size = pool.size(), idle = pool.num_idle(), "Closing PostgreSQL pool");
    pool.close().await;
    info!("PostgreSQL pool closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_url_keeps_defaults() {
        let config = DatabaseConfig::from_url("postgresql://localhost/plannex");

        assert_eq!(config.url, "postgresql://localhost/plannex");
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.acquire_timeout_seconds, 30);
        assert_eq!(config.idle_timeout_seconds, Some(600));
    }

    #[test]
    fn test_pool_options_follow_config() {
        let config = DatabaseConfig {
            max_connections: 3,
            min_connections: 0,
            acquire_timeout_seconds: 5,
            idle_timeout_seconds: None,
            ..DatabaseConfig::from_url("postgresql://localhost/plannex")
        };

        let options = config.pool_options();
        assert_eq!(options.get_max_connections(), 3);
        assert_eq!(options.get_min_connections(), 0);
        assert_eq!(options.get_acquire_timeout(), Duration::from_secs(5));
        assert_eq!(options.get_idle_timeout(), None);
    }
}
