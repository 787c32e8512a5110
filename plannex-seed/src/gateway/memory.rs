/// In-memory seed gateway for testing
///
/// Keeps one row list per [`Table`] and enforces what the database would:
/// foreign keys must point at existing rows, unique columns must be unique,
/// and truncation cascades to every table that references a truncated one.
/// Transactions are snapshots; `rollback` restores the snapshot taken by
/// `begin`.
///
/// Two knobs simulate failures:
/// - [`MemorySeedGateway::fail_on`] makes every write to one table fail
/// - [`MemorySeedGateway::set_locked`] makes `begin` report a concurrent run
///
/// # Example
///
/// ```
/// use plannex_seed::gateway::{MemorySeedGateway, SeedGateway};
/// use plannex_shared::db::schema::Table;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut gateway = MemorySeedGateway::new().fail_on(Table::Task);
/// gateway.begin().await?;
/// assert_eq!(gateway.count(Table::Task).await?, 0);
/// gateway.rollback().await?;
/// # Ok(())
/// # }
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
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

use super::gateway_trait::{GatewayError, GatewayResult, SeedGateway};

/// A stored row: its id, a human-readable key, and its foreign keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRow {
    pub id: Uuid,

    /// Email, slug, name, or title, depending on the table
    pub key: String,

    pub references: Vec<(Table, Uuid)>,
}

impl MemoryRow {
    /// The id this row references in `table`, if any
    pub fn reference(&self, table: Table) -> Option<Uuid> {
        self.references
            .iter()
            .find(|(t, _)| *t == table)
            .map(|(_, id)| *id)
    }
}

type Rows = BTreeMap<Table, Vec<MemoryRow>>;

#[derive(Debug, Default)]
pub struct MemorySeedGateway {
    tables: Rows,
    snapshot: Option<Rows>,
    unique: BTreeMap<Table, BTreeSet<String>>,
    unique_snapshot: Option<BTreeMap<Table, BTreeSet<String>>>,
    fail_on: Option<Table>,
    locked: bool,
    commits: usize,
    rollbacks: usize,
}

impl MemorySeedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every write to `table` fail with [`GatewayError::Unavailable`]
    pub fn fail_on(mut self, table: Table) -> Self {
        self.fail_on = Some(table);
        self
    }

    /// Simulates another run holding the seeding lock
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn rows(&self, table: Table) -> &[MemoryRow] {
        self.tables.get(&table).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn row_count(&self, table: Table) -> usize {
        self.rows(table).len()
    }

    /// Total rows across all tables
    pub fn total_rows(&self) -> usize {
        self.tables.values().map(Vec::len).sum()
    }

    pub fn in_transaction(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn commits(&self) -> usize {
        self.commits
    }

    pub fn rollbacks(&self) -> usize {
        self.rollbacks
    }

    /// Foreign keys that point at rows which no longer exist
    pub fn dangling_references(&self) -> Vec<(Table, Uuid, Table, Uuid)> {
        let mut dangling = Vec::new();

        for (table, rows) in &self.tables {
            for row in rows {
                for (parent, parent_id) in &row.references {
                    if !self.rows(*parent).iter().any(|p| p.id == *parent_id) {
                        dangling.push((*table, row.id, *parent, *parent_id));
                    }
                }
            }
        }

        dangling
    }

    fn insert(
        &mut self,
        table: Table,
        key: String,
        unique_on: Option<String>,
        references: Vec<(Table, Uuid)>,
    ) -> GatewayResult<Uuid> {
        if !self.in_transaction() {
            return Err(GatewayError::NoTransaction);
        }

        if self.fail_on == Some(table) {
            return Err(GatewayError::Unavailable(format!(
                "injected failure on {}",
                table
            )));
        }

        for (parent, parent_id) in &references {
            if !self.rows(*parent).iter().any(|p| p.id == *parent_id) {
                return Err(GatewayError::Constraint {
                    table,
                    message: format!("{} {} does not exist", parent, parent_id),
                });
            }
        }

        if let Some(value) = unique_on {
            if !self.unique.entry(table).or_default().insert(value.clone()) {
                return Err(GatewayError::Constraint {
                    table,
                    message: format!("duplicate key {}", value),
                });
            }
        }

        let id = Uuid::new_v4();
        self.tables.entry(table).or_default().push(MemoryRow {
            id,
            key,
            references,
        });

        Ok(id)
    }
}

/// Expands `tables` with every table that references one of them
fn with_cascade(tables: &[Table]) -> BTreeSet<Table> {
    let mut set: BTreeSet<Table> = tables.iter().copied().collect();

    loop {
        let referencing: Vec<Table> = Table::ALL
            .iter()
            .copied()
            .filter(|t| !set.contains(t) && t.parents().iter().any(|p| set.contains(p)))
            .collect();

        if referencing.is_empty() {
            return set;
        }
        set.extend(referencing);
    }
}

#[async_trait]
impl SeedGateway for MemorySeedGateway {
    fn name(&self) -> &str {
        "memory"
    }

    async fn begin(&mut self) -> GatewayResult<()> {
        if self.locked {
            return Err(GatewayError::Locked);
        }
        if self.in_transaction() {
            return Err(GatewayError::TransactionActive);
        }

        self.snapshot = Some(self.tables.clone());
        self.unique_snapshot = Some(self.unique.clone());
        Ok(())
    }

    async fn commit(&mut self) -> GatewayResult<()> {
        if self.snapshot.take().is_none() {
            return Err(GatewayError::NoTransaction);
        }
        self.unique_snapshot = None;
        self.commits += 1;
        Ok(())
    }

    async fn rollback(&mut self) -> GatewayResult<()> {
        if let Some(snapshot) = self.snapshot.take() {
            self.tables = snapshot;
            self.unique = self.unique_snapshot.take().unwrap_or_default();
            self.rollbacks += 1;
        }
        Ok(())
    }

    async fn truncate(&mut self, tables: &[Table]) -> GatewayResult<()> {
        if !self.in_transaction() {
            return Err(GatewayError::NoTransaction);
        }

        for table in with_cascade(tables) {
            self.tables.remove(&table);
            self.unique.remove(&table);
        }

        Ok(())
    }

    async fn count(&mut self, table: Table) -> GatewayResult<i64> {
        Ok(self.row_count(table) as i64)
    }

    async fn create_user(&mut self, data: CreateUser) -> GatewayResult<Uuid> {
        let email = data.email.to_lowercase();
        self.insert(Table::User, data.email, Some(email), vec![])
    }

    async fn create_organization(&mut self, data: CreateOrganization) -> GatewayResult<Uuid> {
        self.insert(
            Table::Organization,
            data.slug.clone(),
            Some(data.slug),
            vec![(Table::User, data.owner_id)],
        )
    }

    async fn create_venue(&mut self, data: CreateVenue) -> GatewayResult<Uuid> {
        if data.capacity <= 0 || data.price_from < 0 {
            return Err(GatewayError::Constraint {
                table: Table::Venue,
                message: "capacity must be positive and price non-negative".to_string(),
            });
        }
        self.insert(Table::Venue, data.name, None, vec![])
    }

    async fn create_event(&mut self, data: CreateEvent) -> GatewayResult<Uuid> {
        if data.starts_at >= data.ends_at || data.capacity <= 0 {
            return Err(GatewayError::Constraint {
                table: Table::Event,
                message: "invalid schedule or capacity".to_string(),
            });
        }
        self.insert(
            Table::Event,
            data.title,
            None,
            vec![
                (Table::Organization, data.organization_id),
                (Table::Venue, data.venue_id),
                (Table::User, data.created_by_id),
            ],
        )
    }

    async fn create_ticket_type(&mut self, data: CreateTicketType) -> GatewayResult<Uuid> {
        self.insert(
            Table::TicketType,
            data.name,
            None,
            vec![(Table::Event, data.event_id)],
        )
    }

    async fn create_vendor_profile(&mut self, data: CreateVendorProfile) -> GatewayResult<Uuid> {
        self.insert(
            Table::VendorProfile,
            data.display_name,
            Some(data.user_id.to_string()),
            vec![(Table::User, data.user_id)],
        )
    }

    async fn create_vendor_service(&mut self, data: CreateVendorService) -> GatewayResult<Uuid> {
        self.insert(
            Table::VendorService,
            data.title,
            None,
            vec![(Table::VendorProfile, data.vendor_id)],
        )
    }

    async fn create_volunteer_profile(
        &mut self,
        data: CreateVolunteerProfile,
    ) -> GatewayResult<Uuid> {
        self.insert(
            Table::VolunteerProfile,
            data.city,
            Some(data.user_id.to_string()),
            vec![(Table::User, data.user_id)],
        )
    }

    async fn create_task(&mut self, data: CreateTask) -> GatewayResult<Uuid> {
        self.insert(
            Table::Task,
            data.title,
            None,
            vec![(Table::Event, data.event_id)],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plannex_shared::models::user::UserRole;

    fn new_user(email: &str) -> CreateUser {
        CreateUser {
            email: email.to_string(),
            full_name: "Test".to_string(),
            role: UserRole::Volunteer,
            password_hash: "hash".to_string(),
            avatar_url: None,
        }
    }

    #[tokio::test]
    async fn test_writes_require_transaction() {
        let mut gateway = MemorySeedGateway::new();

        assert!(matches!(
            gateway.create_user(new_user("a@planner.ai")).await,
            Err(GatewayError::NoTransaction)
        ));
        assert!(matches!(
            gateway.truncate(&[Table::User]).await,
            Err(GatewayError::NoTransaction)
        ));
    }

    #[tokio::test]
    async fn test_rollback_restores_snapshot() {
        let mut gateway = MemorySeedGateway::new();

        gateway.begin().await.unwrap();
        gateway.create_user(new_user("kept@planner.ai")).await.unwrap();
        gateway.commit().await.unwrap();

        gateway.begin().await.unwrap();
        gateway.create_user(new_user("dropped@planner.ai")).await.unwrap();
        assert_eq!(gateway.row_count(Table::User), 2);
        gateway.rollback().await.unwrap();

        assert_eq!(gateway.row_count(Table::User), 1);
        assert_eq!(gateway.rows(Table::User)[0].key, "kept@planner.ai");
        assert_eq!(gateway.rollbacks(), 1);

        // The rolled-back email is free again
        gateway.begin().await.unwrap();
        assert!(gateway.create_user(new_user("dropped@planner.ai")).await.is_ok());
    }

    #[tokio::test]
    async fn test_foreign_keys_and_uniqueness() {
        let mut gateway = MemorySeedGateway::new();
        gateway.begin().await.unwrap();

        let err = gateway
            .create_organization(CreateOrganization {
                name: "Orphan".to_string(),
                slug: "orphan".to_string(),
                description: None,
                owner_id: Uuid::new_v4(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Constraint {
                table: Table::Organization,
                ..
            }
        ));

        gateway.create_user(new_user("dup@planner.ai")).await.unwrap();
        assert!(matches!(
            gateway.create_user(new_user("DUP@planner.ai")).await,
            Err(GatewayError::Constraint {
                table: Table::User,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_truncate_cascades_to_referencing_tables() {
        let mut gateway = MemorySeedGateway::new();
        gateway.begin().await.unwrap();

        let user_id = gateway.create_user(new_user("owner@planner.ai")).await.unwrap();
        gateway
            .create_organization(CreateOrganization {
                name: "Agency".to_string(),
                slug: "agency".to_string(),
                description: None,
                owner_id: user_id,
            })
            .await
            .unwrap();

        gateway.truncate(&[Table::User]).await.unwrap();

        assert_eq!(gateway.total_rows(), 0);
        assert!(gateway.dangling_references().is_empty());
    }

    #[tokio::test]
    async fn test_lock_and_nested_begin() {
        let mut gateway = MemorySeedGateway::new();

        gateway.set_locked(true);
        assert!(matches!(gateway.begin().await, Err(GatewayError::Locked)));

        gateway.set_locked(false);
        gateway.begin().await.unwrap();
        assert!(matches!(
            gateway.begin().await,
            Err(GatewayError::TransactionActive)
        ));
    }

    #[test]
    fn test_cascade_expansion() {
        let set = with_cascade(&[Table::Event]);

        for table in [
            Table::Event,
            Table::Order,
            Table::OrderItem,
            Table::TicketType,
            Table::Ticket,
            Table::Task,
            Table::Review,
        ] {
            assert!(set.contains(&table), "{} missing", table);
        }
        assert!(!set.contains(&Table::User));
        assert!(!set.contains(&Table::Venue));
    }
}
