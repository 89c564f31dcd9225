/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use biddge_api::{app::AppState, config::Config};
/// use biddge_shared::db::pool::create_pool;
/// use biddge_shared::store::PgStore;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(&config.pool_config()).await?;
/// let state = AppState::new(Arc::new(PgStore::new(pool)), config);
/// let app = biddge_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use biddge_shared::{
    auth::middleware::{authenticate, CurrentUser},
    store::Store,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Users and communities
    pub store: Arc<dyn Store>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// └── /api/
///     ├── /auth/
///     │   ├── POST /register
///     │   └── POST /login
///     ├── GET  /users/me               # (authenticated)
///     ├── /communities/
///     │   ├── GET  /                   # List all
///     │   ├── POST /                   # Create (authenticated, creators only)
///     │   ├── GET  /featured           # Six newest, never fails
///     │   ├── GET  /:id
///     │   ├── POST /:id/join           # (authenticated)
///     │   └── POST /:id/leave          # (authenticated)
///     ├── GET  /debug/db
///     ├── POST /debug/seed
///     └── GET  /test
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
/// 4. Authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    let user_routes = Router::new()
        .route("/me", get(routes::users::me))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let public_community_routes = Router::new()
        .route("/", get(routes::communities::list_communities))
        .route("/featured", get(routes::communities::featured_communities))
        .route("/:id", get(routes::communities::get_community));

    let member_community_routes = Router::new()
        .route("/", post(routes::communities::create_community))
        .route("/:id/join", post(routes::communities::join_community))
        .route("/:id/leave", post(routes::communities::leave_community))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let debug_routes = Router::new()
        .route("/db", get(routes::debug::database_status))
        .route("/seed", post(routes::debug::seed));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest(
            "/communities",
            public_community_routes.merge(member_community_routes),
        )
        .nest("/debug", debug_routes)
        .route("/test", get(routes::debug::test_endpoint));

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config.api.cors_origins))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// CORS for the configured origins; `*` anywhere in the list means any origin
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Bearer-token authentication layer
///
/// Resolves the token to a stored user and injects [`CurrentUser`] into
/// request extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(state.store.as_ref(), req.headers(), state.jwt_secret()).await?;

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}
