/// Event model and database operations
///
/// An event belongs to an organization, takes place at a venue, and records
/// the user who created it. The database enforces `starts_at < ends_at` and a
/// positive capacity.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE event_status AS ENUM ('DRAFT', 'PUBLISHED', 'CANCELLED', 'COMPLETED');
///
/// CREATE TABLE "Event" (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     starts_at TIMESTAMPTZ NOT NULL,
///     ends_at TIMESTAMPTZ NOT NULL,
///     status event_status NOT NULL DEFAULT 'DRAFT',
///     capacity INTEGER NOT NULL,
///     organization_id UUID NOT NULL REFERENCES "Organization"(id),
///     venue_id UUID NOT NULL REFERENCES "Venue"(id),
///     created_by_id UUID NOT NULL REFERENCES "User"(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Publication state of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    /// Being prepared, not visible to guests
    Draft,

    /// Open for ticket sales
    Published,

    Cancelled,

    /// Took place
    Completed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Draft => "DRAFT",
            EventStatus::Published => "PUBLISHED",
            EventStatus::Cancelled => "CANCELLED",
            EventStatus::Completed => "COMPLETED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: EventStatus,
    pub capacity: i32,
    pub organization_id: Uuid,
    pub venue_id: Uuid,
    pub created_by_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEvent {
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: EventStatus,
    pub capacity: i32,
    pub organization_id: Uuid,
    pub venue_id: Uuid,
    pub created_by_id: Uuid,
}

impl Event {
    /// Inserts an event
    ///
    /// # Errors
    ///
    /// Fails on a dangling organization, venue or creator reference, or when
    /// the time window or capacity violates its CHECK constraint.
    pub async fn create<'e, E>(executor: E, data: CreateEvent) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO "Event" (
                title, description, starts_at, ends_at, status, capacity,
                organization_id, venue_id, created_by_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, title, description, starts_at, ends_at, status, capacity,
                      organization_id, venue_id, created_by_id, created_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.starts_at)
        .bind(data.ends_at)
        .bind(data.status)
        .bind(data.capacity)
        .bind(data.organization_id)
        .bind(data.venue_id)
        .bind(data.created_by_id)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Event>(
            r#"
            SELECT id, title, description, starts_at, ends_at, status, capacity,
                   organization_id, venue_id, created_by_id, created_at
            FROM "Event"
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }
}
