/// Database layer for Plannex
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool with a startup health check
/// - `migrations`: embedded schema migrations
/// - `schema`: table registry, foreign-key graph, and truncation order
///
/// Models are in the `models` module at crate root level.

pub mod migrations;
pub mod pool;
pub mod schema;
