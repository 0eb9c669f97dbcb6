/// Authentication endpoints
///
/// Registration and login both sign the user in: a board controller is
/// created for them and their board is loaded (or bootstrapped on first
/// sign-in) before the response is sent.
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Register new user
/// - `POST /v1/auth/login` - Login and get tokens
/// - `POST /v1/auth/refresh` - Refresh access token
/// - `POST /v1/auth/logout` - Drop the signed-in board

use crate::{
    app::{AppState, AuthUser},
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::password,
    models::user::{CreateUser, User},
    sync::{LoadSource, Session},
};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (strength checked separately)
    pub password: String,

    /// Optional display name
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Response to a successful register or login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Signed-in identity
    pub user: Session,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,

    /// Where the board came from
    pub board: LoadSource,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

async fn sign_in(state: &AppState, user: &User) -> ApiResult<AuthResponse> {
    let tokens = state.tokens.issue_pair(user.id)?;

    let session = Session::from(user);
    let (_, board) = state.sessions.sign_in(session.clone()).await;

    tracing::info!(user_id = %user.id, board = ?board, "User signed in");

    Ok(AuthResponse {
        user: session,
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        board,
    })
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/register
/// Content-Type: application/json
///
/// {
///   "email": "user@example.com",
///   "password": "secret1",
///   "name": "Jane Doe"
/// }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: Email already exists
/// - `422 Unprocessable Entity`: Validation failed
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    req.validate()?;

    password::validate_password_strength(&req.password)
        .map_err(|e| ApiError::invalid_field("password", e))?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            password_hash,
            name: req.name.filter(|n| !n.trim().is_empty()),
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "User registered");

    let response = sign_in(&state, &user).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Login endpoint
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid credentials
/// - `422 Unprocessable Entity`: Validation failed
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    User::update_last_login(&state.db, user.id).await?;

    Ok(Json(sign_in(&state, &user).await?))
}

/// Token refresh endpoint
///
/// Exchanges a refresh token for a new access token. The board stays as it
/// is.
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = state.tokens.refresh(&req.refresh_token)?;

    Ok(Json(RefreshResponse { access_token }))
}

/// Logout endpoint
///
/// Drops the user's live board. Tokens stay valid until they expire; the
/// next authenticated request signs the user in again.
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> StatusCode {
    if state.sessions.sign_out(auth.user_id).await {
        tracing::info!(user_id = %auth.user_id, "User signed out");
    }

    StatusCode::NO_CONTENT
}
