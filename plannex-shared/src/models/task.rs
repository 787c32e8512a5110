/// Event task model
///
/// A to-do item attached to an event ("Sign catering contract", ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub event_id: Uuid,
    pub due_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub event_id: Uuid,
    pub due_at: DateTime<Utc>,
}

impl Task {
    pub async fn create<'e, E>(executor: E, data: CreateTask) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO "Task" (title, event_id, due_at)
            VALUES ($1, $2, $3)
            RETURNING id, title, event_id, due_at
            "#,
        )
        .bind(data.title)
        .bind(data.event_id)
        .bind(data.due_at)
        .fetch_one(executor)
        .await
    }

    /// Tasks of an event, earliest due first
    pub async fn list_by_event<'e, E>(executor: E, event_id: Uuid) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, event_id, due_at
            FROM "Task"
            WHERE event_id = $1
            ORDER BY due_at ASC, title ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(executor)
        .await
    }
}
