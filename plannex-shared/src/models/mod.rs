/// Database models for Plannex
///
/// Each model owns its row type, its `Create*` input, and the queries that
/// touch its table. Query functions take any `PgExecutor`, so they run equally
/// against the pool or inside a transaction.
///
/// # Models
///
/// - `user`: user accounts and platform roles
/// - `organization`: event agencies and their owner
/// - `venue`: event locations
/// - `event`: events with status and schedule
/// - `ticket_type`: priced ticket tiers per event
/// - `vendor`: vendor profiles and the services they offer
/// - `volunteer`: volunteer profiles
/// - `task`: per-event to-do items

pub mod event;
pub mod organization;
pub mod task;
pub mod ticket_type;
pub mod user;
pub mod vendor;
pub mod venue;
pub mod volunteer;
