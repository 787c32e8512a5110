/// HTTP error mapping
///
/// Handlers return [`ApiResult`]. Every failure leaves the server as a JSON
/// body of the form `{ "error": code, "message": text, "details": [...] }`,
/// where `details` is present only for validation failures.
///
/// ```
/// use plannex_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::json;
///
/// async fn handler(found: bool) -> ApiResult<Json<serde_json::Value>> {
///     if !found {
///         return Err(ApiError::NotFound("User not found".to_string()));
///     }
///     Ok(Json(json!({ "ok": true })))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use plannex_shared::auth::authorization::AuthzError;
use plannex_shared::auth::middleware::AuthError;
use plannex_shared::directory::store::StoreError;
use plannex_shared::directory::DirectoryError;
use serde::{Deserialize, Serialize};

pub type ApiResult<T> = Result<T, ApiError>;

/// Everything a handler can fail with
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A unique constraint rejected the write
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Request body failed field validation
    #[error("Validation failed on {} field(s)", .0.len())]
    ValidationError(Vec<ValidationErrorDetail>),

    /// Logged server-side; the client only sees a generic message
    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// One rejected field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    pub field: String,
    pub message: String,
}

/// JSON body of every error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable code, e.g. `not_found`
    pub error: String,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::ValidationError(_) => "validation_error",
            ApiError::InternalError(_) => "internal_error",
            ApiError::ServiceUnavailable(_) => "service_unavailable",
        }
    }

    fn into_body(self) -> ErrorResponse {
        let error = self.code().to_string();

        let (message, details) = match self {
            ApiError::ValidationError(details) => {
                ("One or more fields are invalid".to_string(), Some(details))
            }
            ApiError::InternalError(cause) => {
                tracing::error!(cause = %cause, "Request failed with an internal error");
                ("Something went wrong on our side".to_string(), None)
            }
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::ServiceUnavailable(msg) => (msg, None),
        };

        ErrorResponse {
            error,
            message,
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(self.into_body())).into_response()
    }
}

impl From<DirectoryError> for ApiError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::NotFound(_) => ApiError::NotFound("User not found".to_string()),
            DirectoryError::Forbidden(authz) => authz.into(),
            DirectoryError::Store(store) => store.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(constraint) if constraint.contains("email") => {
                ApiError::Conflict("A user with this email already exists".to_string())
            }
            StoreError::UniqueViolation(constraint) => {
                ApiError::Conflict(format!("Duplicate value violates {}", constraint))
            }
            StoreError::ForeignKeyViolation(constraint) => {
                tracing::debug!(constraint = %constraint, "Write blocked by a reference");
                ApiError::Conflict(
                    "User is still referenced by other records".to_string(),
                )
            }
            StoreError::Database(err) => ApiError::InternalError(err.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => {
                ApiError::Unauthorized("Missing authorization header".to_string())
            }
            AuthError::InvalidFormat(msg) => ApiError::BadRequest(msg),
            AuthError::InvalidToken(msg) => ApiError::Unauthorized(msg),
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        let AuthzError::InsufficientRole { required, .. } = err;
        ApiError::Forbidden(format!("Requires the {} role", required))
    }
}

/// Flattens validator output into one detail per failed rule, sorted by field
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, failures)| {
                failures.iter().map(move |failure| ValidationErrorDetail {
                    field: field.to_string(),
                    message: failure
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| failure.code.to_string()),
                })
            })
            .collect();

        details.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::ValidationError(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plannex_shared::models::user::UserRole;
    use uuid::Uuid;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ApiError::NotFound("User not found".to_string()).to_string(),
            "Not found: User not found"
        );

        let details = vec![
            ValidationErrorDetail {
                field: "full_name".to_string(),
                message: "Name must be 1 to 100 characters".to_string(),
            },
            ValidationErrorDetail {
                field: "avatar_url".to_string(),
                message: "Invalid avatar URL".to_string(),
            },
        ];
        assert_eq!(
            ApiError::ValidationError(details).to_string(),
            "Validation failed on 2 field(s)"
        );
    }

    #[test]
    fn test_directory_error_statuses() {
        let not_found: ApiError = DirectoryError::NotFound(Uuid::new_v4()).into();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let forbidden: ApiError = DirectoryError::Forbidden(AuthzError::InsufficientRole {
            required: UserRole::Admin,
            actual: UserRole::Vendor,
        })
        .into();
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(forbidden.to_string(), "Forbidden: Requires the ADMIN role");

        let conflict: ApiError =
            DirectoryError::Store(StoreError::UniqueViolation("User_email_key".to_string())).into();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let referenced: ApiError = DirectoryError::Store(StoreError::ForeignKeyViolation(
            "Organization_owner_id_fkey".to_string(),
        ))
        .into();
        assert_eq!(referenced.status(), StatusCode::CONFLICT);
        assert_eq!(
            referenced.to_string(),
            "Conflict: User is still referenced by other records"
        );

        let internal: ApiError =
            DirectoryError::Store(StoreError::Database(sqlx::Error::PoolTimedOut)).into();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_auth_error_statuses() {
        assert_eq!(
            ApiError::from(AuthError::MissingCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::InvalidFormat("Expected Bearer token".to_string())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(AuthError::InvalidToken("Token expired".to_string())).status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_internal_error_hides_cause() {
        let (status, body) = render(ApiError::InternalError("connection refused".to_string())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal_error");
        assert!(!body["message"].as_str().unwrap().contains("connection refused"));
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_validation_body_lists_fields() {
        let (status, body) = render(ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "full_name".to_string(),
            message: "Name must be 1 to 100 characters".to_string(),
        }]))
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["details"][0]["field"], "full_name");
    }
}
