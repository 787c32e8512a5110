/// `GET /health`
///
/// Public. Answers 200 with `"status": "healthy"` while the user store
/// responds, and 503 with `"status": "degraded"` when it does not, so load
/// balancers can act on the status code alone.

use crate::app::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreStatus {
    Connected,
    Disconnected,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub version: String,
    pub database: StoreStatus,
}

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let database = match state.directory.store().health_check().await {
        Ok(()) => StoreStatus::Connected,
        Err(e) => {
            tracing::warn!(error = %e, "User store failed its health check");
            StoreStatus::Disconnected
        }
    };

    let (code, status) = match database {
        StoreStatus::Connected => (StatusCode::OK, HealthStatus::Healthy),
        StoreStatus::Disconnected => (StatusCode::SERVICE_UNAVAILABLE, HealthStatus::Degraded),
    };

    let report = HealthReport {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
    };

    (code, Json(report))
}
