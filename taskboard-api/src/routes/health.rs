/// Health check endpoint
///
/// Reports whether the server is running, whether the database answers and
/// whether every migration is applied.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected",
///   "migrations_up_to_date": true,
///   "pool": { "size": 3, "idle": 2 },
///   "active_sessions": 1
/// }
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use taskboard_shared::db::{
    migrations,
    pool::{self, PoolUsage},
};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status: "healthy" or "degraded"
    pub status: String,

    /// Application version
    pub version: String,

    /// Database status
    pub database: String,

    /// Whether the schema is current; absent when the database is down
    pub migrations_up_to_date: Option<bool>,

    pub pool: PoolUsage,

    /// Signed-in users with a live board
    pub active_sessions: usize,
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let connected = pool::ping(&state.db).await.is_ok();

    let migrations_up_to_date = if connected {
        match migrations::get_migration_status(&state.db).await {
            Ok(status) => Some(status.is_up_to_date),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read migration status");
                None
            }
        }
    } else {
        None
    };

    let healthy = connected && migrations_up_to_date.unwrap_or(false);

    Ok(Json(HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if connected { "connected" } else { "disconnected" }.to_string(),
        migrations_up_to_date,
        pool: pool::usage(&state.db),
        active_sessions: state.sessions.len().await,
    }))
}
