/// User directory service
///
/// Lists, reads, updates, and deletes users on behalf of an authenticated
/// [`Principal`]. Role rules live here, not in the HTTP layer:
///
/// - self-service updates can never change the caller's role
/// - administrative updates and deletes require `ADMIN`, checked before the
///   store is touched at all
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use plannex_shared::auth::middleware::AuthContext;
/// use plannex_shared::directory::{store::PgUserStore, UserDirectory};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, auth: AuthContext) -> Result<(), Box<dyn std::error::Error>> {
/// let directory = UserDirectory::new(Arc::new(PgUserStore::new(pool)));
///
/// let page = directory.find_many(Some("1"), Some("20"), Some("planner")).await?;
/// println!("{} of {} users", page.data.len(), page.meta.total);
///
/// let me = directory.get_profile(&auth).await?;
/// println!("Signed in as {}", me.email);
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod store;

use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::authorization::{require_admin, AuthzError};
use crate::auth::middleware::Principal;
use crate::models::user::{UpdateUser, User};
use store::{StoreError, UserStore};

/// Page number used when none (or an invalid one) is given
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when none (or an invalid one) is given
pub const DEFAULT_LIMIT: i64 = 10;

/// Error type for directory operations
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("User {0} not found")]
    NotFound(Uuid),

    #[error("Forbidden: {0}")]
    Forbidden(#[from] AuthzError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Coerced pagination parameters
///
/// Always valid: `page >= 1` and `limit >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

fn positive_or(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

impl PageRequest {
    /// Parses raw query values
    ///
    /// Missing, unparsable, zero, or negative values fall back to the
    /// defaults; this never fails.
    pub fn coerce(page: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            page: positive_or(page, DEFAULT_PAGE),
            limit: positive_or(limit, DEFAULT_LIMIT),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Pagination metadata returned with every list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl PageMeta {
    pub fn new(request: PageRequest, total: i64) -> Self {
        let total_pages = total / request.limit + i64::from(total % request.limit > 0);

        Self {
            total,
            page: request.page,
            limit: request.limit,
            total_pages,
        }
    }
}

/// One page of results
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

/// Treats a blank search term as absent; any other term is matched as given
fn normalize_search(search: Option<&str>) -> Option<&str> {
    search.filter(|s| !s.trim().is_empty())
}

/// User directory service
#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn UserStore>,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    /// Lists users, newest first, optionally filtered by `search`
    pub async fn find_many(
        &self,
        page: Option<&str>,
        limit: Option<&str>,
        search: Option<&str>,
    ) -> Result<Page<User>, DirectoryError> {
        let request = PageRequest::coerce(page, limit);
        let search = normalize_search(search);

        let (data, total) = self
            .store
            .search(search, request.limit, request.offset())
            .await?;

        tracing::debug!(
            page = request.page,
            limit = request.limit,
            total,
            returned = data.len(),
            "Listed users"
        );

        Ok(Page {
            data,
            meta: PageMeta::new(request, total),
        })
    }

    pub async fn find_one(&self, id: Uuid) -> Result<User, DirectoryError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(DirectoryError::NotFound(id))
    }

    /// The caller's own record
    pub async fn get_profile(&self, principal: &dyn Principal) -> Result<User, DirectoryError> {
        self.find_one(principal.current_user_id()).await
    }

    /// Updates the caller's own record
    ///
    /// `role` is dropped from the patch whatever its value, so no caller can
    /// change their own role here, admins included.
    pub async fn update_self(
        &self,
        principal: &dyn Principal,
        patch: UpdateUser,
    ) -> Result<User, DirectoryError> {
        let user_id = principal.current_user_id();

        if patch.role.is_some() {
            tracing::debug!(user_id = %user_id, "Ignoring role in self-service update");
        }

        self.store
            .update(user_id, patch.without_role())
            .await?
            .ok_or(DirectoryError::NotFound(user_id))
    }

    /// Updates any user, including their role; `ADMIN` only
    pub async fn update_by_admin(
        &self,
        principal: &dyn Principal,
        target_id: Uuid,
        patch: UpdateUser,
    ) -> Result<User, DirectoryError> {
        require_admin(principal)?;

        let user = self
            .store
            .update(target_id, patch)
            .await?
            .ok_or(DirectoryError::NotFound(target_id))?;

        tracing::info!(
            admin_id = %principal.current_user_id(),
            user_id = %target_id,
            role = %user.role,
            "User updated by admin"
        );

        Ok(user)
    }

    /// Deletes a user; `ADMIN` only
    pub async fn remove(&self, principal: &dyn Principal, id: Uuid) -> Result<(), DirectoryError> {
        require_admin(principal)?;

        if !self.store.delete(id).await? {
            return Err(DirectoryError::NotFound(id));
        }

        tracing::info!(
            admin_id = %principal.current_user_id(),
            user_id = %id,
            "User deleted"
        );

        Ok(())
    }
}
