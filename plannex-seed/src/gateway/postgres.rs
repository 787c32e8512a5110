/// PostgreSQL seed gateway
///
/// Runs every write of a seeding run inside one database transaction. When
/// the transaction opens it takes a transaction-scoped advisory lock, so two
/// concurrent runs cannot interleave: the second one fails fast with
/// [`GatewayError::Locked`]. The lock is released automatically on commit or
/// rollback.
///
/// Dropping the gateway with an open transaction rolls it back.

use async_trait::async_trait;
use plannex_shared::db::schema::{truncate_statement, Table};
use plannex_shared::models::{
    event::{CreateEvent, Event},
    organization::{CreateOrganization, Organization},
    task::{CreateTask, Task},
    ticket_type::{CreateTicketType, TicketType},
    user::{CreateUser, User},
    vendor::{CreateVendorProfile, CreateVendorService, VendorProfile, VendorService},
    venue::{CreateVenue, Venue},
    volunteer::{CreateVolunteerProfile, VolunteerProfile},
};
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use tracing::{debug, warn};
use uuid::Uuid;

use super::gateway_trait::{GatewayError, GatewayResult, SeedGateway};

/// Advisory lock key shared by all seeding runs ("plannex" in ASCII)
pub const SEED_LOCK_KEY: i64 = 0x0070_6c61_6e6e_6578;

pub struct PgSeedGateway {
    pool: PgPool,
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgSeedGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool, tx: None }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn in_transaction(&self) -> bool {
        self.tx.is_some()
    }

    fn conn(&mut self) -> GatewayResult<&mut PgConnection> {
        self.tx.as_deref_mut().ok_or(GatewayError::NoTransaction)
    }
}

/// Maps constraint failures onto [`GatewayError::Constraint`]
fn write_error(table: Table, err: sqlx::Error) -> GatewayError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.constraint().is_some() {
            return GatewayError::Constraint {
                table,
                message: db_err.message().to_string(),
            };
        }
    }
    GatewayError::Database(err)
}

#[async_trait]
impl SeedGateway for PgSeedGateway {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn begin(&mut self) -> GatewayResult<()> {
        if self.tx.is_some() {
            return Err(GatewayError::TransactionActive);
        }

        let mut tx = self.pool.begin().await?;

        let (acquired,): (bool,) = sqlx::query_as("SELECT pg_try_advisory_xact_lock($1)")
            .bind(SEED_LOCK_KEY)
            .fetch_one(&mut *tx)
            .await?;

        if !acquired {
            warn!(lock_key = SEED_LOCK_KEY, "Seeding lock is held by another session");
            tx.rollback().await?;
            return Err(GatewayError::Locked);
        }

        debug!("Seeding transaction started");
        self.tx = Some(tx);
        Ok(())
    }

    async fn commit(&mut self) -> GatewayResult<()> {
        let tx = self.tx.take().ok_or(GatewayError::NoTransaction)?;
        tx.commit().await?;
        debug!("Seeding transaction committed");
        Ok(())
    }

    /// Rolling back with no open transaction is a no-op
    async fn rollback(&mut self) -> GatewayResult<()> {
        if let Some(tx) = self.tx.take() {
            tx.rollback().await?;
            debug!("Seeding transaction rolled back");
        }
        Ok(())
    }

    async fn truncate(&mut self, tables: &[Table]) -> GatewayResult<()> {
        if tables.is_empty() {
            return Ok(());
        }

        let statement = truncate_statement(tables);
        debug!(statement = %statement, "Truncating tables");

        sqlx::query(&statement).execute(self.conn()?).await?;
        Ok(())
    }

    async fn count(&mut self, table: Table) -> GatewayResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.quoted());
        let query = sqlx::query_as::<_, (i64,)>(&sql);

        let (count,) = match self.tx.as_deref_mut() {
            Some(conn) => query.fetch_one(conn).await?,
            None => query.fetch_one(&self.pool).await?,
        };

        Ok(count)
    }

    async fn create_user(&mut self, data: CreateUser) -> GatewayResult<Uuid> {
        let user = User::create(self.conn()?, data)
            .await
            .map_err(|e| write_error(Table::User, e))?;
        Ok(user.id)
    }

    async fn create_organization(&mut self, data: CreateOrganization) -> GatewayResult<Uuid> {
        let organization = Organization::create(self.conn()?, data)
            .await
            .map_err(|e| write_error(Table::Organization, e))?;
        Ok(organization.id)
    }

    async fn create_venue(&mut self, data: CreateVenue) -> GatewayResult<Uuid> {
        let venue = Venue::create(self.conn()?, data)
            .await
            .map_err(|e| write_error(Table::Venue, e))?;
        Ok(venue.id)
    }

    async fn create_event(&mut self, data: CreateEvent) -> GatewayResult<Uuid> {
        let event = Event::create(self.conn()?, data)
            .await
            .map_err(|e| write_error(Table::Event, e))?;
        Ok(event.id)
    }

    async fn create_ticket_type(&mut self, data: CreateTicketType) -> GatewayResult<Uuid> {
        let ticket_type = TicketType::create(self.conn()?, data)
            .await
            .map_err(|e| write_error(Table::TicketType, e))?;
        Ok(ticket_type.id)
    }

    async fn create_vendor_profile(&mut self, data: CreateVendorProfile) -> GatewayResult<Uuid> {
        let profile = VendorProfile::create(self.conn()?, data)
            .await
            .map_err(|e| write_error(Table::VendorProfile, e))?;
        Ok(profile.id)
    }

    async fn create_vendor_service(&mut self, data: CreateVendorService) -> GatewayResult<Uuid> {
        let service = VendorService::create(self.conn()?, data)
            .await
            .map_err(|e| write_error(Table::VendorService, e))?;
        Ok(service.id)
    }

    async fn create_volunteer_profile(
        &mut self,
        data: CreateVolunteerProfile,
    ) -> GatewayResult<Uuid> {
        let profile = VolunteerProfile::create(self.conn()?, data)
            .await
            .map_err(|e| write_error(Table::VolunteerProfile, e))?;
        Ok(profile.id)
    }

    async fn create_task(&mut self, data: CreateTask) -> GatewayResult<Uuid> {
        let task = Task::create(self.conn()?, data)
            .await
            .map_err(|e| write_error(Table::Task, e))?;
        Ok(task.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_key_spells_plannex() {
        let bytes = SEED_LOCK_KEY.to_be_bytes();
        assert_eq!(&bytes[1..], b"plannex");
    }

    #[test]
    fn test_non_database_errors_pass_through() {
        assert!(matches!(
            write_error(Table::User, sqlx::Error::RowNotFound),
            GatewayError::Database(sqlx::Error::RowNotFound)
        ));
    }
}
