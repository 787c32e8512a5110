/// Venue model
///
/// Venues are standalone: they reference nothing and are referenced by events.
/// `price_from` is an integer amount in the smallest currency unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub id: Uuid,
    pub name: String,
    pub city: String,
    pub address: String,

    /// Maximum number of guests (always positive)
    pub capacity: i32,

    /// Starting rental price (never negative)
    pub price_from: i64,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVenue {
    pub name: String,
    pub city: String,
    pub address: String,
    pub capacity: i32,
    pub price_from: i64,
}

impl Venue {
    pub async fn create<'e, E>(executor: E, data: CreateVenue) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Venue>(
            r#"
            INSERT INTO "Venue" (name, city, address, capacity, price_from)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, city, address, capacity, price_from, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.city)
        .bind(data.address)
        .bind(data.capacity)
        .bind(data.price_from)
        .fetch_one(executor)
        .await
    }
}
