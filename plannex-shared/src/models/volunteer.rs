/// Volunteer profile model
///
/// Extends a `VOLUNTEER` user (one profile per user) with a home city and an
/// ordered list of skills.

use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub city: String,

    /// Skills in the order they were entered
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVolunteerProfile {
    pub user_id: Uuid,
    pub city: String,
    pub skills: Vec<String>,
}

impl VolunteerProfile {
    pub async fn create<'e, E>(
        executor: E,
        data: CreateVolunteerProfile,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, VolunteerProfile>(
            r#"
            INSERT INTO "VolunteerProfile" (user_id, city, skills)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, city, skills
            "#,
        )
        .bind(data.user_id)
        .bind(data.city)
        .bind(data.skills)
        .fetch_one(executor)
        .await
    }
}
