/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskboard_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = taskboard_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config, error::ApiError, middleware::security::SecurityHeadersLayer,
    sessions::SessionRegistry,
};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskboard_shared::auth::jwt::{TokenKeys, TokenKind};
use taskboard_shared::sync::{Gateway, PgGateway};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use uuid::Uuid;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (users and health checks)
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Token signing and verification keys
    pub tokens: Arc<TokenKeys>,

    /// Live board controllers
    pub sessions: SessionRegistry,
}

impl AppState {
    /// Creates application state backed by PostgreSQL for board storage
    pub fn new(db: PgPool, config: Config) -> Self {
        let gateway = Arc::new(PgGateway::new(db.clone()));
        Self::with_gateway(db, config, gateway)
    }

    /// Creates application state with a specific board gateway
    pub fn with_gateway(db: PgPool, config: Config, gateway: Arc<dyn Gateway>) -> Self {
        let sessions = SessionRegistry::new(gateway, config.board.controller_config());
        let tokens = Arc::new(TokenKeys::new(&config.jwt.secret));

        Self {
            db,
            config: Arc::new(config),
            tokens,
            sessions,
        }
    }
}

/// Authenticated caller, inserted into request extensions by
/// [`jwt_auth_layer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                               # Health check (public)
/// └── /v1/
///     ├── /auth/
///     │   ├── POST /register                # public
///     │   ├── POST /login                   # public
///     │   ├── POST /refresh                 # public
///     │   └── POST /logout                  # authenticated
///     ├── /board                            # authenticated
///     │   ├── GET  /
///     │   └── POST /reload
///     └── /categories                       # authenticated
///         ├── POST   /
///         ├── DELETE /:id
///         ├── POST   /:id/tasks
///         ├── PATCH  /:id/tasks/:task_id
///         ├── DELETE /:id/tasks/:task_id
///         ├── POST   /:id/tasks/:task_id/toggle
///         └── POST   /:id/tasks/:task_id/move
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Security headers
/// 2. CORS (tower-http CorsLayer)
/// 3. Logging (tower-http TraceLayer)
/// 4. Authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh))
        .route(
            "/logout",
            post(routes::auth::logout).layer(axum::middleware::from_fn_with_state(
                state.clone(),
                jwt_auth_layer,
            )),
        );

    let board_routes = Router::new()
        .route("/board", get(routes::board::get_board))
        .route("/board/reload", post(routes::board::reload_board))
        .route("/categories", post(routes::board::create_category))
        .route("/categories/:id", delete(routes::board::delete_category))
        .route("/categories/:id/tasks", post(routes::board::create_task))
        .route(
            "/categories/:id/tasks/:task_id",
            patch(routes::board::edit_task).delete(routes::board::delete_task),
        )
        .route(
            "/categories/:id/tasks/:task_id/toggle",
            post(routes::board::toggle_task),
        )
        .route(
            "/categories/:id/tasks/:task_id/move",
            post(routes::board::move_task),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(board_routes);

    let cors = if state.config.allows_any_origin() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    let production = state.config.api.production;

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(production))
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates the access token from the Authorization header,
/// then injects [`AuthUser`] into request extensions.
pub async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::BadRequest("Expected Bearer token".to_string()))?;

    let claims = state.tokens.verify(token, TokenKind::Access)?;

    req.extensions_mut().insert(AuthUser {
        user_id: claims.sub,
    });

    Ok(next.run(req).await)
}
