/// Seeding orchestrator
///
/// Runs the demo dataset into a [`SeedGateway`] as a fixed sequence of
/// dependent steps, and wipes it again.
///
/// # Architecture
///
/// ```text
/// Seeder
///   ├─> Fixtures: validate before anything is written
///   ├─> SeedGateway::begin: one transaction (and lock) per run
///   ├─> truncate in foreign-key order          (down, reset)
///   ├─> Users → Organization → Venue → Event
///   │     → TicketTypes → Vendor → Volunteer → Tasks   (up, reset)
///   │     each step reads parent ids from, and records its own ids in,
///   │     the run's IdentityMap
///   └─> commit, or rollback on the first failure
/// ```
///
/// # Cancellation
///
/// The cancel token is checked before every step. A step that has started
/// always finishes; the run then stops, rolls back, and reports
/// [`SeedError::Cancelled`].
///
/// # Example
///
/// ```no_run
/// use plannex_seed::fixtures::Fixtures;
/// use plannex_seed::gateway::PgSeedGateway;
/// use plannex_seed::orchestrator::{SeedMode, Seeder};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let mut seeder = Seeder::new(PgSeedGateway::new(pool), Fixtures::demo()?);
///
/// if let Some(report) = seeder.run(SeedMode::Reset).await? {
///     println!("Created {} rows", report.total());
/// }
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use plannex_shared::auth::password::hash_password;
use plannex_shared::db::schema::{truncation_order, SchemaError, Table};
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
use std::collections::BTreeMap;
use std::fmt;
use tokio_util::sync::CancellationToken;

use crate::fixtures::{FixtureError, Fixtures};
use crate::gateway::{GatewayError, SeedGateway};
use crate::identity::{IdentityKey, IdentityMap, MissingIdentity};

/// What a run does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedMode {
    /// Wipe, then seed
    #[default]
    Reset,

    /// Wipe only
    Down,

    /// Seed only, on top of whatever is there
    SeedOnly,
}

/// One creation step, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeedStep {
    Users,
    Organization,
    Venue,
    Event,
    TicketTypes,
    Vendor,
    Volunteer,
    Tasks,
}

impl SeedStep {
    /// All steps in dependency order
    pub const ALL: [SeedStep; 8] = [
        SeedStep::Users,
        SeedStep::Organization,
        SeedStep::Venue,
        SeedStep::Event,
        SeedStep::TicketTypes,
        SeedStep::Vendor,
        SeedStep::Volunteer,
        SeedStep::Tasks,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SeedStep::Users => "users",
            SeedStep::Organization => "organization",
            SeedStep::Venue => "venue",
            SeedStep::Event => "event",
            SeedStep::TicketTypes => "ticket_types",
            SeedStep::Vendor => "vendor",
            SeedStep::Volunteer => "volunteer",
            SeedStep::Tasks => "tasks",
        }
    }
}

impl fmt::Display for SeedStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a single step failed
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    MissingIdentity(#[from] MissingIdentity),

    #[error("Failed to hash demo password: {0}")]
    PasswordHash(String),
}

/// Seeding error types
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Invalid fixtures: {0}")]
    Fixtures(#[from] FixtureError),

    #[error("Invalid schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("Step '{step}' failed: {source}")]
    Step {
        step: SeedStep,
        #[source]
        source: StepError,
    },

    #[error("Truncation failed: {0}")]
    Truncate(#[source] GatewayError),

    #[error("Transaction failed: {0}")]
    Transaction(#[source] GatewayError),

    #[error("Another seeding run is in progress")]
    AlreadyRunning,

    #[error("Seeding cancelled before step '{before}'")]
    Cancelled { before: SeedStep },
}

/// Rows created by a run, per table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    created: BTreeMap<Table, u64>,
}

impl SeedReport {
    pub fn record(&mut self, table: Table) {
        *self.created.entry(table).or_insert(0) += 1;
    }

    pub fn created(&self, table: Table) -> u64 {
        self.created.get(&table).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.created.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Table, u64)> + '_ {
        self.created.iter().map(|(table, count)| (*table, *count))
    }
}

impl fmt::Display for SeedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(table, count)| format!("{}={}", table, count))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

/// State of one `up` run, threaded through every step
#[derive(Debug)]
pub struct SeedRun {
    pub identities: IdentityMap,
    pub report: SeedReport,

    /// Relative due dates are measured from here
    pub started_at: DateTime<Utc>,
}

impl SeedRun {
    pub fn new() -> Self {
        Self {
            identities: IdentityMap::new(),
            report: SeedReport::default(),
            started_at: Utc::now(),
        }
    }
}

impl Default for SeedRun {
    fn default() -> Self {
        Self::new()
    }
}

/// Seeding orchestrator
pub struct Seeder<G> {
    gateway: G,
    fixtures: Fixtures,

    /// Precomputed hash of `fixtures.password`
    password_hash: Option<String>,

    cancel_token: CancellationToken,
}

impl<G: SeedGateway> Seeder<G> {
    pub fn new(gateway: G, fixtures: Fixtures) -> Self {
        Self {
            gateway,
            fixtures,
            password_hash: None,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Uses `hash` for every user instead of hashing the fixture password
    pub fn with_password_hash(mut self, hash: impl Into<String>) -> Self {
        self.password_hash = Some(hash.into());
        self
    }

    pub fn with_cancel_token(mut self, cancel_token: CancellationToken) -> Self {
        self.cancel_token = cancel_token;
        self
    }

    /// Token that stops the run at the next step boundary
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    pub fn into_gateway(self) -> G {
        self.gateway
    }

    /// Runs `mode`; returns the report for modes that create rows
    pub async fn run(&mut self, mode: SeedMode) -> Result<Option<SeedReport>, SeedError> {
        match mode {
            SeedMode::Reset => self.reset().await.map(Some),
            SeedMode::Down => self.down().await.map(|()| None),
            SeedMode::SeedOnly => self.up().await.map(Some),
        }
    }

    /// Creates the whole dataset in one transaction
    ///
    /// # Errors
    ///
    /// On any failure nothing is written: the transaction is rolled back and
    /// the error names the failing step.
    pub async fn up(&mut self) -> Result<SeedReport, SeedError> {
        self.fixtures.validate()?;

        tracing::info!(gateway = self.gateway.name(), "Starting seed");

        self.begin().await?;
        let result = self.seed_all().await;
        let report = self.finish(result).await?;

        tracing::info!(created = %report, total = report.total(), "Seed completed");
        Ok(report)
    }

    /// Empties every table in one `TRUNCATE`; safe to repeat
    pub async fn down(&mut self) -> Result<(), SeedError> {
        let tables = truncation_order()?;

        tracing::info!(gateway = self.gateway.name(), "Cleaning database");

        self.begin().await?;
        let result = self.truncate(&tables).await;
        self.finish(result).await?;

        tracing::info!(tables = tables.len(), "Database cleaned");
        Ok(())
    }

    /// `down` then `up`, in a single transaction
    pub async fn reset(&mut self) -> Result<SeedReport, SeedError> {
        self.fixtures.validate()?;
        let tables = truncation_order()?;

        tracing::info!(gateway = self.gateway.name(), "Resetting database");

        self.begin().await?;
        let result = match self.truncate(&tables).await {
            Ok(()) => self.seed_all().await,
            Err(e) => Err(e),
        };
        let report = self.finish(result).await?;

        tracing::info!(created = %report, total = report.total(), "Reset completed");
        Ok(report)
    }

    async fn begin(&mut self) -> Result<(), SeedError> {
        self.gateway.begin().await.map_err(|e| match e {
            GatewayError::Locked => SeedError::AlreadyRunning,
            other => SeedError::Transaction(other),
        })
    }

    async fn truncate(&mut self, tables: &[Table]) -> Result<(), SeedError> {
        self.gateway
            .truncate(tables)
            .await
            .map_err(SeedError::Truncate)
    }

    /// Commits on success, rolls back on failure
    async fn finish<T>(&mut self, result: Result<T, SeedError>) -> Result<T, SeedError> {
        match result {
            Ok(value) => {
                self.gateway
                    .commit()
                    .await
                    .map_err(SeedError::Transaction)?;
                Ok(value)
            }
            Err(err) => {
                tracing::error!(error = %err, "Seeding failed, rolling back");
                if let Err(rollback_err) = self.gateway.rollback().await {
                    tracing::error!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }

    async fn seed_all(&mut self) -> Result<SeedReport, SeedError> {
        let mut run = SeedRun::new();

        for step in SeedStep::ALL {
            if self.cancel_token.is_cancelled() {
                tracing::warn!(step = %step, "Cancellation requested");
                return Err(SeedError::Cancelled { before: step });
            }

            tracing::info!(step = %step, "Running seed step");

            self.run_step(step, &mut run)
                .await
                .map_err(|source| SeedError::Step { step, source })?;
        }

        Ok(run.report)
    }

    /// Runs a single step against the open transaction
    pub async fn run_step(&mut self, step: SeedStep, run: &mut SeedRun) -> Result<(), StepError> {
        match step {
            SeedStep::Users => self.seed_users(run).await,
            SeedStep::Organization => self.seed_organization(run).await,
            SeedStep::Venue => self.seed_venue(run).await,
            SeedStep::Event => self.seed_event(run).await,
            SeedStep::TicketTypes => self.seed_ticket_types(run).await,
            SeedStep::Vendor => self.seed_vendor(run).await,
            SeedStep::Volunteer => self.seed_volunteer(run).await,
            SeedStep::Tasks => self.seed_tasks(run).await,
        }
    }

    async fn demo_password_hash(&self) -> Result<String, StepError> {
        if let Some(hash) = &self.password_hash {
            return Ok(hash.clone());
        }

        let password = self.fixtures.password.clone();

        tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| StepError::PasswordHash(e.to_string()))?
            .map_err(|e| StepError::PasswordHash(e.to_string()))
    }

    async fn seed_users(&mut self, run: &mut SeedRun) -> Result<(), StepError> {
        // Hashed once; every demo user shares it
        let password_hash = self.demo_password_hash().await?;

        for user in &self.fixtures.users {
            let id = self
                .gateway
                .create_user(CreateUser {
                    email: user.email.clone(),
                    full_name: user.full_name.clone(),
                    role: user.role,
                    password_hash: password_hash.clone(),
                    avatar_url: None,
                })
                .await?;

            tracing::debug!(email = %user.email, role = %user.role, user_id = %id, "Created user");
            run.identities.record(IdentityKey::user(&user.email), id);
            run.report.record(Table::User);
        }

        Ok(())
    }

    async fn seed_organization(&mut self, run: &mut SeedRun) -> Result<(), StepError> {
        let organization = &self.fixtures.organization;
        let owner_id = run
            .identities
            .require(IdentityKey::user(&organization.owner_email))?;

        let id = self
            .gateway
            .create_organization(CreateOrganization {
                name: organization.name.clone(),
                slug: organization.slug.clone(),
                description: organization.description.clone(),
                owner_id,
            })
            .await?;

        tracing::debug!(slug = %organization.slug, organization_id = %id, "Created organization");
        run.identities.record(IdentityKey::Organization, id);
        run.report.record(Table::Organization);
        Ok(())
    }

    async fn seed_venue(&mut self, run: &mut SeedRun) -> Result<(), StepError> {
        let venue = &self.fixtures.venue;

        let id = self
            .gateway
            .create_venue(CreateVenue {
                name: venue.name.clone(),
                city: venue.city.clone(),
                address: venue.address.clone(),
                capacity: venue.capacity,
                price_from: venue.price_from,
            })
            .await?;

        tracing::debug!(name = %venue.name, venue_id = %id, "Created venue");
        run.identities.record(IdentityKey::Venue, id);
        run.report.record(Table::Venue);
        Ok(())
    }

    async fn seed_event(&mut self, run: &mut SeedRun) -> Result<(), StepError> {
        let event = &self.fixtures.event;
        let organization_id = run.identities.require(IdentityKey::Organization)?;
        let venue_id = run.identities.require(IdentityKey::Venue)?;
        let created_by_id = run
            .identities
            .require(IdentityKey::user(&event.created_by_email))?;

        let id = self
            .gateway
            .create_event(CreateEvent {
                title: event.title.clone(),
                description: event.description.clone(),
                starts_at: event.starts_at,
                ends_at: event.ends_at,
                status: event.status,
                capacity: event.capacity,
                organization_id,
                venue_id,
                created_by_id,
            })
            .await?;

        tracing::debug!(title = %event.title, event_id = %id, "Created event");
        run.identities.record(IdentityKey::Event, id);
        run.report.record(Table::Event);
        Ok(())
    }

    async fn seed_ticket_types(&mut self, run: &mut SeedRun) -> Result<(), StepError> {
        let event_id = run.identities.require(IdentityKey::Event)?;

        for ticket in &self.fixtures.ticket_types {
            self.gateway
                .create_ticket_type(CreateTicketType {
                    name: ticket.name.clone(),
                    price: ticket.price,
                    quantity_total: ticket.quantity_total,
                    event_id,
                })
                .await?;

            run.report.record(Table::TicketType);
        }

        Ok(())
    }

    async fn seed_vendor(&mut self, run: &mut SeedRun) -> Result<(), StepError> {
        let vendor = &self.fixtures.vendor;
        let user_id = run.identities.require(IdentityKey::user(&vendor.user_email))?;

        let vendor_id = self
            .gateway
            .create_vendor_profile(CreateVendorProfile {
                user_id,
                display_name: vendor.display_name.clone(),
                city: vendor.city.clone(),
            })
            .await?;

        run.identities.record(IdentityKey::VendorProfile, vendor_id);
        run.report.record(Table::VendorProfile);

        for service in &vendor.services {
            self.gateway
                .create_vendor_service(CreateVendorService {
                    service_type: service.service_type,
                    title: service.title.clone(),
                    price_from: service.price_from,
                    vendor_id,
                })
                .await?;

            run.report.record(Table::VendorService);
        }

        tracing::debug!(vendor_id = %vendor_id, services = vendor.services.len(), "Created vendor");
        Ok(())
    }

    async fn seed_volunteer(&mut self, run: &mut SeedRun) -> Result<(), StepError> {
        let volunteer = &self.fixtures.volunteer;
        let user_id = run
            .identities
            .require(IdentityKey::user(&volunteer.user_email))?;

        let id = self
            .gateway
            .create_volunteer_profile(CreateVolunteerProfile {
                user_id,
                city: volunteer.city.clone(),
                skills: volunteer.skills.clone(),
            })
            .await?;

        run.identities.record(IdentityKey::VolunteerProfile, id);
        run.report.record(Table::VolunteerProfile);
        Ok(())
    }

    async fn seed_tasks(&mut self, run: &mut SeedRun) -> Result<(), StepError> {
        let event_id = run.identities.require(IdentityKey::Event)?;

        for task in &self.fixtures.tasks {
            self.gateway
                .create_task(CreateTask {
                    title: task.title.clone(),
                    event_id,
                    due_at: run.started_at + task.due_in,
                })
                .await?;

            run.report.record(Table::Task);
        }

        Ok(())
    }
}
