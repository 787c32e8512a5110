/// Organization model
///
/// An organization is the agency that runs events. It has exactly one owner,
/// who must hold a role that can own organizations (`ORG_OWNER` or `ADMIN`);
/// that rule is enforced by callers before `create`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE "Organization" (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     slug VARCHAR(255) NOT NULL UNIQUE,
///     description TEXT,
///     owner_id UUID NOT NULL REFERENCES "User"(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: Uuid,
    pub name: String,

    /// URL-safe unique handle
    pub slug: String,

    pub description: Option<String>,

    /// Owning user
    pub owner_id: Uuid,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrganization {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
}

impl Organization {
    /// Inserts an organization
    ///
    /// # Errors
    ///
    /// Fails if the slug is taken or `owner_id` does not reference a user.
    pub async fn create<'e, E>(executor: E, data: CreateOrganization) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Organization>(
            r#"
            INSERT INTO "Organization" (name, slug, description, owner_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, slug, description, owner_id, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.slug)
        .bind(data.description)
        .bind(data.owner_id)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_slug<'e, E>(executor: E, slug: &str) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Organization>(
            r#"
            SELECT id, name, slug, description, owner_id, created_at
            FROM "Organization"
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(executor)
        .await
    }
}
