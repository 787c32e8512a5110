/// Common test utilities for the API tests
///
/// Builds the real router over an in-memory user store, so the full HTTP
/// path (JWT layer, extractors, error mapping) runs without a database.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use plannex_api::app::{build_router, AppState};
use plannex_api::config::Config;
use plannex_shared::auth::jwt::{create_token, Claims};
use plannex_shared::directory::memory::MemoryUserStore;
use plannex_shared::directory::UserDirectory;
use plannex_shared::models::user::{User, UserRole};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

/// Test context containing the router and the seeded users
pub struct TestContext {
    pub app: Router,
    pub store: Arc<MemoryUserStore>,
    pub admin: User,
    pub organizer: User,
    pub vendor: User,
    pub volunteer: User,
}

pub fn user(email: &str, full_name: &str, role: UserRole, age_minutes: i64) -> User {
    let created_at = Utc::now() - Duration::minutes(age_minutes);
    User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        full_name: full_name.to_string(),
        role,
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        is_active: true,
        avatar_url: None,
        created_at,
        updated_at: created_at,
    }
}

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgresql://localhost/plannex_test".to_string()),
        "JWT_SECRET" => Some(SECRET.to_string()),
        _ => None,
    })
    .expect("test config")
}

impl TestContext {
    /// Router over the four demo users, newest first: volunteer, vendor,
    /// organizer, admin
    pub fn new() -> Self {
        let admin = user("admin@planner.ai", "System Admin", UserRole::Admin, 4);
        let organizer = user("organizer@planner.ai", "Event Organizer", UserRole::OrgOwner, 3);
        let vendor = user("Vendor@Planner.ai", "Catering Vendor", UserRole::Vendor, 2);
        let volunteer = user("volunteer@planner.ai", "Volunteer User", UserRole::Volunteer, 1);

        let store = Arc::new(MemoryUserStore::with_users([
            admin.clone(),
            organizer.clone(),
            vendor.clone(),
            volunteer.clone(),
        ]));

        let directory = UserDirectory::new(store.clone());
        let app = build_router(AppState::new(directory, test_config()));

        Self {
            app,
            store,
            admin,
            organizer,
            vendor,
            volunteer,
        }
    }

    /// Sends a request, optionally authenticated as `as_user`
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        as_user: Option<&User>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(user) = as_user {
            builder = builder.header("authorization", format!("Bearer {}", token_for(user)));
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send_request(request).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body)
                .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(&body).into()))
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str, as_user: &User) -> (StatusCode, serde_json::Value) {
        self.send(Method::GET, uri, Some(as_user), None).await
    }
}

pub fn token_for(user: &User) -> String {
    create_token(&Claims::new(user.id, user.role), SECRET).unwrap()
}
