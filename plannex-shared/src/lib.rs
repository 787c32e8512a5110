//! # Plannex Shared Library
//!
//! Types and business logic shared by the Plannex API server and the seeding
//! tool.
//!
//! ## Module Organization
//!
//! - `db`: connection pool, migrations, and the table registry
//! - `models`: database models and their queries
//! - `auth`: password hashing, JWT, the caller principal, role checks
//! - `directory`: the user directory service and its stores

pub mod auth;
pub mod db;
pub mod directory;
pub mod models;

/// Current version of the Plannex shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
