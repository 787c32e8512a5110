/// User model and database operations
///
/// Users carry a single platform-wide role. The role decides what the user may
/// do in the directory (only `ADMIN` may edit or delete other users) and
/// whether they may own an organization.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('ADMIN', 'ORG_OWNER', 'VENDOR', 'VOLUNTEER');
///
/// CREATE TABLE "User" (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email VARCHAR(255) NOT NULL UNIQUE,
///     full_name VARCHAR(255) NOT NULL,
///     role user_role NOT NULL DEFAULT 'VOLUNTEER',
///     password_hash VARCHAR(255) NOT NULL,
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     avatar_url VARCHAR(512),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use plannex_shared::models::user::{CreateUser, User, UserRole};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(&pool, CreateUser {
///     email: "organizer@planner.ai".to_string(),
///     full_name: "Event Organizer".to_string(),
///     role: UserRole::OrgOwner,
///     password_hash: "$argon2id$...".to_string(),
///     avatar_url: None,
/// }).await?;
///
/// let found = User::find_by_email(&pool, "organizer@planner.ai").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use std::fmt;
use uuid::Uuid;

const USER_COLUMNS: &str =
    "id, email, full_name, role, password_hash, is_active, avatar_url, created_at, updated_at";

const SEARCH_CONDITION: &str = "($1::text IS NULL OR email ILIKE $1 OR full_name ILIKE $1)";

/// Platform role of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Platform administrator; may edit and delete any user
    Admin,

    /// Runs an organization and its events
    OrgOwner,

    /// Offers services (catering, decor, ...) to events
    Vendor,

    /// Helps out at events
    Volunteer,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::OrgOwner => "ORG_OWNER",
            UserRole::Vendor => "VENDOR",
            UserRole::Volunteer => "VOLUNTEER",
        }
    }

    /// Whether this role may edit or delete other users
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    /// Whether a user with this role may be an organization's owner
    pub fn can_own_organization(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::OrgOwner)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User account
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Email address, unique across all users
    pub email: String,

    /// Display name
    pub full_name: String,

    /// Platform role
    pub role: UserRole,

    /// Argon2id password hash; never serialized
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Inactive users keep their record but should not be able to sign in
    pub is_active: bool,

    /// Optional avatar URL
    pub avatar_url: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub full_name: String,
    pub role: UserRole,

    /// Password hash (NOT the plaintext password)
    pub password_hash: String,

    pub avatar_url: Option<String>,
}

/// Partial update of a user
///
/// Only `Some` fields are written. `avatar_url: Some(None)` clears the avatar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateUser {
    pub full_name: Option<String>,
    pub avatar_url: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub role: Option<UserRole>,
}

impl UpdateUser {
    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.avatar_url.is_none()
            && self.is_active.is_none()
            && self.role.is_none()
    }

    /// Returns the patch with `role` removed
    pub fn without_role(self) -> Self {
        Self { role: None, ..self }
    }

    /// Applies the patch to an in-memory user
    pub fn apply_to(&self, user: &mut User) {
        if let Some(ref full_name) = self.full_name {
            user.full_name = full_name.clone();
        }
        if let Some(ref avatar_url) = self.avatar_url {
            user.avatar_url = avatar_url.clone();
        }
        if let Some(is_active) = self.is_active {
            user.is_active = is_active;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
    }
}

/// Builds a case-insensitive substring pattern for `ILIKE`
///
/// `%`, `_` and `\` in the term are escaped so they match literally.
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Returns an error if the email is already taken (`user_email_key`) or
    /// the database is unreachable.
    pub async fn create<'e, E>(executor: E, data: CreateUser) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            r#"
            INSERT INTO "User" (email, full_name, role, password_hash, avatar_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .bind(data.email)
            .bind(data.full_name)
            .bind(data.role)
            .bind(data.password_hash)
            .bind(data.avatar_url)
            .fetch_one(executor)
            .await
    }

    /// Finds a user by ID
    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(r#"SELECT {} FROM "User" WHERE id = $1"#, USER_COLUMNS);

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Finds a user by exact email address
    pub async fn find_by_email<'e, E>(executor: E, email: &str) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(r#"SELECT {} FROM "User" WHERE email = $1"#, USER_COLUMNS);

        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(executor)
            .await
    }

    /// Applies a partial update
    ///
    /// `updated_at` is always bumped. Returns `None` if no user has `id`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use plannex_shared::models::user::{User, UpdateUser};
    /// # use sqlx::PgPool;
    /// # use uuid::Uuid;
    /// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
    /// let update = UpdateUser {
    ///     full_name: Some("Jane Doe".to_string()),
    ///     avatar_url: Some(None),
    ///     ..Default::default()
    /// };
    ///
    /// if let Some(user) = User::update(&pool, user_id, update).await? {
    ///     println!("Updated {}", user.email);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn update<'e, E>(
        executor: E,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        // Build the SET list from the fields that are present
        let mut query = String::from(r#"UPDATE "User" SET updated_at = NOW()"#);
        let mut bind_count = 1;

        if data.full_name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", full_name = ${}", bind_count));
        }
        if data.avatar_url.is_some() {
            bind_count += 1;
            query.push_str(&format!(", avatar_url = ${}", bind_count));
        }
        if data.is_active.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_active = ${}", bind_count));
        }
        if data.role.is_some() {
            bind_count += 1;
            query.push_str(&format!(", role = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {}", USER_COLUMNS));

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(full_name) = data.full_name {
            q = q.bind(full_name);
        }
        if let Some(avatar_url) = data.avatar_url {
            q = q.bind(avatar_url);
        }
        if let Some(is_active) = data.is_active {
            q = q.bind(is_active);
        }
        if let Some(role) = data.role {
            q = q.bind(role);
        }

        q.fetch_optional(executor).await
    }

    /// Deletes a user; returns false if no row matched
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(r#"DELETE FROM "User" WHERE id = $1"#)
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Fetches one page of users and the total match count
    ///
    /// Both queries run inside one `REPEATABLE READ` read-only transaction, so
    /// the total always describes the same snapshot as the page. `search`
    /// matches email or full name, case-insensitively, as a substring.
    /// Results are ordered newest first.
    pub async fn search(
        pool: &PgPool,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Self>, i64), sqlx::Error> {
        let pattern = search.map(contains_pattern);

        let mut tx = pool.begin().await?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let page_query = format!(
            r#"
            SELECT {}
            FROM "User"
            WHERE {}
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
            USER_COLUMNS, SEARCH_CONDITION
        );

        let users = sqlx::query_as::<_, User>(&page_query)
            .bind(pattern.as_deref())
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *tx)
            .await?;

        let count_query = format!(r#"SELECT COUNT(*) FROM "User" WHERE {}"#, SEARCH_CONDITION);

        let (total,): (i64,) = sqlx::query_as(&count_query)
            .bind(pattern.as_deref())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok((users, total))
    }
}
