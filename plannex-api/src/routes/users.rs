/// User directory endpoints
///
/// Every endpoint requires a valid bearer JWT; the auth layer injects the
/// caller's `AuthContext`, which the directory service reads through the
/// `Principal` trait.
///
/// # Endpoints
///
/// - `GET    /v1/users?page&limit&search` - List users
/// - `GET    /v1/users/me` - Own profile
/// - `PATCH  /v1/users/me` - Update own profile (role is ignored)
/// - `GET    /v1/users/:id` - One user
/// - `PATCH  /v1/users/:id` - Update any user (admin)
/// - `DELETE /v1/users/:id` - Delete any user (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use plannex_shared::auth::middleware::AuthContext;
use plannex_shared::directory::Page;
use plannex_shared::models::user::{UpdateUser, User, UserRole};
use serde::{Deserialize, Deserializer};
use uuid::Uuid;
use validator::{Validate, ValidateUrl};

/// List query parameters
///
/// Kept as raw strings: bad paging values fall back to defaults instead of
/// rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
}

/// Partial user update
///
/// Absent fields are left alone. `"avatarUrl": null` clears the avatar.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub full_name: Option<String>,

    #[serde(default, deserialize_with = "present")]
    pub avatar_url: Option<Option<String>>,

    pub is_active: Option<bool>,

    pub role: Option<UserRole>,
}

/// Maps a present field (even `null`) to `Some`
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

const MAX_AVATAR_URL_LEN: usize = 2048;

impl UpdateUserRequest {
    /// Runs field validation, including the avatar URL
    pub fn check(&self) -> ApiResult<()> {
        let mut details = match self.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => match ApiError::from(errors) {
                ApiError::ValidationError(details) => details,
                other => return Err(other),
            },
        };

        if let Some(Some(url)) = &self.avatar_url {
            if url.len() > MAX_AVATAR_URL_LEN || !url.validate_url() {
                details.push(ValidationErrorDetail {
                    field: "avatar_url".to_string(),
                    message: "Invalid avatar URL".to_string(),
                });
            }
        }

        if details.is_empty() {
            Ok(())
        } else {
            Err(ApiError::ValidationError(details))
        }
    }
}

impl From<UpdateUserRequest> for UpdateUser {
    fn from(req: UpdateUserRequest) -> Self {
        UpdateUser {
            full_name: req.full_name.map(|name| name.trim().to_string()),
            avatar_url: req.avatar_url,
            is_active: req.is_active,
            role: req.role,
        }
    }
}

/// List users (newest first)
///
/// ```text
/// GET /v1/users?page=2&limit=20&search=planner
/// Authorization: Bearer <jwt>
/// ```
///
/// Response:
/// ```json
/// {
///   "data": [{ "id": "...", "email": "admin@planner.ai", "fullName": "System Admin", ... }],
///   "meta": { "total": 4, "page": 1, "limit": 10, "totalPages": 1 }
/// }
/// ```
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Page<User>>> {
    let page = state
        .directory
        .find_many(
            query.page.as_deref(),
            query.limit.as_deref(),
            query.search.as_deref(),
        )
        .await?;

    Ok(Json(page))
}

/// The caller's own profile
pub async fn get_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.directory.get_profile(&auth).await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.directory.find_one(id).await?))
}

/// Update the caller's own profile
///
/// A `role` in the body is accepted and ignored.
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    req.check()?;

    let user = state.directory.update_self(&auth, req.into()).await?;
    Ok(Json(user))
}

/// Update any user, role included (admin)
pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    req.check()?;

    let user = state.directory.update_by_admin(&auth, id, req.into()).await?;
    Ok(Json(user))
}

/// Delete any user (admin)
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.directory.remove(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
