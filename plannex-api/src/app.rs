/// Router and shared state
///
/// ```text
/// GET    /health              public
/// GET    /v1/users            ?page&limit&search       JWT
/// GET    /v1/users/me                                  JWT
/// PATCH  /v1/users/me         role in body is ignored  JWT
/// GET    /v1/users/:id                                 JWT
/// PATCH  /v1/users/:id        ADMIN                    JWT
/// DELETE /v1/users/:id        ADMIN                    JWT
/// ```
///
/// Requests pass CORS, then the trace span, then (under `/v1/users`) the JWT
/// layer, which puts an [`AuthContext`] into the request extensions.
///
/// ```no_run
/// use plannex_api::{app::{build_router, AppState}, config::Config};
/// use plannex_shared::directory::{store::PgUserStore, UserDirectory};
/// use sqlx::PgPool;
/// use std::sync::Arc;
///
/// # async fn example(pool: PgPool) -> anyhow::Result<()> {
/// let directory = UserDirectory::new(Arc::new(PgUserStore::new(pool)));
/// let router = build_router(AppState::new(directory, Config::from_env()?));
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, routes};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{from_fn_with_state, Next},
    response::Response,
    routing::get,
    Router,
};
use plannex_shared::auth::middleware::{authenticate, AuthContext};
use plannex_shared::directory::UserDirectory;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Handed to every handler through `State`; clones share the directory and
/// config
#[derive(Clone)]
pub struct AppState {
    pub directory: UserDirectory,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(directory: UserDirectory, config: Config) -> Self {
        Self {
            directory,
            config: Arc::new(config),
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

pub fn build_router(state: AppState) -> Router {
    let users = Router::new()
        .route("/", get(routes::users::list_users))
        .route(
            "/me",
            get(routes::users::get_me).patch(routes::users::update_me),
        )
        .route(
            "/:id",
            get(routes::users::get_user)
                .patch(routes::users::update_user)
                .delete(routes::users::delete_user),
        )
        .route_layer(from_fn_with_state(state.clone(), require_jwt));

    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/v1/users", users)
        .layer(trace)
        .layer(cors(&state.config))
        .with_state(state)
}

/// `*` allows any origin; otherwise only the configured ones, with credentials
fn cors(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparsable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60))
}

/// Rejects the request unless it carries a valid bearer token
async fn require_jwt(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let caller: AuthContext = authenticate(request.headers(), state.jwt_secret())?;

    tracing::debug!(user_id = %caller.user_id, role = %caller.role, "Authenticated request");
    request.extensions_mut().insert(caller);

    Ok(next.run(request).await)
}
