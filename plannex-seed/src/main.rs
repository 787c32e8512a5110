//! # Plannex Seed
//!
//! Bootstraps the Plannex database with the demo dataset.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p plannex-seed              # wipe, then seed
//! cargo run -p plannex-seed -- --down    # wipe only
//! cargo run -p plannex-seed -- -s        # seed only
//! ```
//!
//! Exits with status 1 if anything fails; the database is left as it was
//! before the run.

use clap::Parser;
use plannex_seed::config::SeedConfig;
use plannex_seed::fixtures::Fixtures;
use plannex_seed::gateway::PgSeedGateway;
use plannex_seed::orchestrator::{SeedMode, Seeder};
use plannex_shared::db::migrations::{ensure_database_exists, run_migrations};
use plannex_shared::db::pool::{close_pool, create_pool};
use sqlx::PgPool;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "plannex-seed", version)]
#[command(about = "Reset, wipe, or seed the Plannex demo database")]
struct Cli {
    /// Only wipe every table
    #[arg(short, long, conflicts_with = "seed_only")]
    down: bool,

    /// Only seed, without wiping first
    #[arg(short, long)]
    seed_only: bool,

    /// Do not apply pending migrations before seeding
    #[arg(long)]
    skip_migrations: bool,
}

impl Cli {
    fn mode(&self) -> SeedMode {
        if self.down {
            SeedMode::Down
        } else if self.seed_only {
            SeedMode::SeedOnly
        } else {
            SeedMode::Reset
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "plannex_seed=info,plannex_shared=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    tracing::info!(
        mode = ?cli.mode(),
        "Plannex seed v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Seed failed");
            eprintln!("Seed failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = SeedConfig::from_env()?;

    ensure_database_exists(&config.database_url).await?;
    let pool = create_pool(config.database()).await?;

    let result = seed(&pool, cli).await;

    // Closed on every path, success or not
    close_pool(pool).await;
    result
}

async fn seed(pool: &PgPool, cli: &Cli) -> anyhow::Result<()> {
    if cli.skip_migrations {
        tracing::info!("Skipping migrations");
    } else {
        run_migrations(pool).await?;
    }

    let mut seeder = Seeder::new(PgSeedGateway::new(pool.clone()), Fixtures::demo()?);

    let cancel_token = seeder.cancel_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current step");
            cancel_token.cancel();
        }
    });

    let result = seeder.run(cli.mode()).await;
    interrupt.abort();

    if let Some(report) = result? {
        for (table, count) in report.iter() {
            tracing::info!(table = %table, count, "Rows created");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_flags() {
        let mode = |args: &[&str]| Cli::try_parse_from(args).map(|cli| cli.mode());

        assert_eq!(mode(&["plannex-seed"]).unwrap(), SeedMode::Reset);
        assert_eq!(mode(&["plannex-seed", "--down"]).unwrap(), SeedMode::Down);
        assert_eq!(mode(&["plannex-seed", "-d"]).unwrap(), SeedMode::Down);
        assert_eq!(
            mode(&["plannex-seed", "--seed-only"]).unwrap(),
            SeedMode::SeedOnly
        );
        assert_eq!(mode(&["plannex-seed", "-s"]).unwrap(), SeedMode::SeedOnly);
    }

    #[test]
    fn test_down_and_seed_only_conflict() {
        assert!(Cli::try_parse_from(["plannex-seed", "--down", "--seed-only"]).is_err());
    }
}
