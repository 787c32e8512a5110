/// Core SeedGateway trait and types
///
/// The seeder never talks to the database directly. It drives a
/// [`SeedGateway`], which owns the transaction and turns `Create*` inputs into
/// rows.
///
/// # Gateway Contract
///
/// All gateways must:
/// 1. Open at most one transaction at a time (`begin`), and refuse a second
///    `begin` while one is open
/// 2. Fail `begin` with [`GatewayError::Locked`] if another run holds the
///    seeding lock
/// 3. Reject writes outside a transaction with [`GatewayError::NoTransaction`]
/// 4. Undo every write since `begin` on `rollback`
/// 5. Return the generated id of each created row
///
/// # Transaction Flow
///
/// ```text
/// begin()
///   ├─> truncate(tables)          (down / reset)
///   ├─> create_*(...) -> id       (up / reset)
///   ├─> commit()                  on success
///   └─> rollback()                on any failure or cancellation
/// ```

use async_trait::async_trait;
use plannex_shared::db::schema::Table;
use plannex_shared::models::{
    event::CreateEvent,
    organization::CreateOrganization,
    task::CreateTask,
    ticket_type::CreateTicketType,
    user::CreateUser,
    vendor::{CreateVendorProfile, CreateVendorService},
    venue::CreateVenue,
    volunteer::CreateVolunteerProfile,
};
use uuid::Uuid;

/// Gateway error types
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Another seeding run holds the lock
    #[error("Another seeding run is in progress")]
    Locked,

    /// A write was attempted with no open transaction
    #[error("No transaction in progress")]
    NoTransaction,

    /// `begin` was called while a transaction was already open
    #[error("A transaction is already in progress")]
    TransactionActive,

    /// A constraint rejected the write
    #[error("Constraint violated on {table}: {message}")]
    Constraint { table: Table, message: String },

    /// The store could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Gateway result type alias
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Transactional, entity-typed persistence for the seeder
#[async_trait]
pub trait SeedGateway: Send {
    /// Gateway name for logging
    fn name(&self) -> &str;

    async fn begin(&mut self) -> GatewayResult<()>;

    async fn commit(&mut self) -> GatewayResult<()>;

    async fn rollback(&mut self) -> GatewayResult<()>;

    /// Empties `tables` in one statement, restarting identities and cascading
    async fn truncate(&mut self, tables: &[Table]) -> GatewayResult<()>;

    /// Number of rows currently visible in `table`
    async fn count(&mut self, table: Table) -> GatewayResult<i64>;

    async fn create_user(&mut self, data: CreateUser) -> GatewayResult<Uuid>;

    async fn create_organization(&mut self, data: CreateOrganization) -> GatewayResult<Uuid>;

    async fn create_venue(&mut self, data: CreateVenue) -> GatewayResult<Uuid>;

    async fn create_event(&mut self, data: CreateEvent) -> GatewayResult<Uuid>;

    async fn create_ticket_type(&mut self, data: CreateTicketType) -> GatewayResult<Uuid>;

    async fn create_vendor_profile(&mut self, data: CreateVendorProfile) -> GatewayResult<Uuid>;

    async fn create_vendor_service(&mut self, data: CreateVendorService) -> GatewayResult<Uuid>;

    async fn create_volunteer_profile(
        &mut self,
        data: CreateVolunteerProfile,
    ) -> GatewayResult<Uuid>;

    async fn create_task(&mut self, data: CreateTask) -> GatewayResult<Uuid>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_display() {
        let err = GatewayError::Constraint {
            table: Table::Organization,
            message: "slug taken".to_string(),
        };
        assert_eq!(err.to_string(), "Constraint violated on Organization: slug taken");

        assert_eq!(
            GatewayError::Locked.to_string(),
            "Another seeding run is in progress"
        );
    }
}
