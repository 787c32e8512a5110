/// Persistence gateways for the seeder
///
/// # Gateway Types
///
/// - **Postgres**: one transaction per run, guarded by an advisory lock
/// - **Memory**: snapshot-based fake with foreign-key checks, for tests

pub mod gateway_trait;
pub mod memory;
pub mod postgres;

pub use gateway_trait::{GatewayError, GatewayResult, SeedGateway};
pub use memory::{MemoryRow, MemorySeedGateway};
pub use postgres::PgSeedGateway;
