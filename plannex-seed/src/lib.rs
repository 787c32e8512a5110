//! # Plannex Seed Library
//!
//! Populates a fresh database with the Plannex demo dataset, and wipes it.
//!
//! ## Modules
//!
//! - `config`: environment configuration
//! - `fixtures`: the demo dataset and its consistency check
//! - `identity`: run-scoped map from logical keys to generated ids
//! - `gateway`: transactional persistence (PostgreSQL, in-memory)
//! - `orchestrator`: the ordered seeding steps, `up`/`down`/`reset`
//!
//! ## Example
//!
//! ```
//! use plannex_seed::fixtures::Fixtures;
//! use plannex_seed::gateway::MemorySeedGateway;
//! use plannex_seed::orchestrator::Seeder;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut seeder = Seeder::new(MemorySeedGateway::new(), Fixtures::demo()?);
//! let report = seeder.up().await?;
//! println!("{}", report);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod fixtures;
pub mod gateway;
pub mod identity;
pub mod orchestrator;
