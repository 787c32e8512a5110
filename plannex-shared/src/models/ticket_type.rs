/// Ticket type model
///
/// A priced ticket tier (Standard, VIP, ...) offered for one event.

use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TicketType {
    pub id: Uuid,
    pub name: String,

    /// Price per ticket in the smallest currency unit
    pub price: i64,

    /// Tickets available for sale
    pub quantity_total: i32,

    pub event_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTicketType {
    pub name: String,
    pub price: i64,
    pub quantity_total: i32,
    pub event_id: Uuid,
}

impl TicketType {
    pub async fn create<'e, E>(executor: E, data: CreateTicketType) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, TicketType>(
            r#"
            INSERT INTO "TicketType" (name, price, quantity_total, event_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, price, quantity_total, event_id
            "#,
        )
        .bind(data.name)
        .bind(data.price)
        .bind(data.quantity_total)
        .bind(data.event_id)
        .fetch_one(executor)
        .await
    }

    /// Lists the ticket types of an event, cheapest first
    pub async fn list_by_event<'e, E>(executor: E, event_id: Uuid) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, TicketType>(
            r#"
            SELECT id, name, price, quantity_total, event_id
            FROM "TicketType"
            WHERE event_id = $1
            ORDER BY price ASC, name ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(executor)
        .await
    }
}
