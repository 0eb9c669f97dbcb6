/// Board endpoints
///
/// Every handler works on the caller's live controller, locked for the
/// duration of the request. A valid token with no live controller (for
/// example after a server restart) signs the user in on the spot.
///
/// # Endpoints
///
/// - `GET    /v1/board`
/// - `POST   /v1/board/reload`
/// - `POST   /v1/categories`
/// - `DELETE /v1/categories/:id`
/// - `POST   /v1/categories/:id/tasks`
/// - `PATCH  /v1/categories/:id/tasks/:task_id`
/// - `DELETE /v1/categories/:id/tasks/:task_id`
/// - `POST   /v1/categories/:id/tasks/:task_id/toggle`
/// - `POST   /v1/categories/:id/tasks/:task_id/move`

use crate::{
    app::{AppState, AuthUser},
    error::{ApiError, ApiResult},
    sessions::SharedController,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    models::user::User,
    sync::{
        Category, CategoryColor, Controller, Direction, LoadSource, MoveOutcome, Session, Task,
    },
};
use uuid::Uuid;
use validator::Validate;

/// A category as shown on the board
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryView {
    pub id: Uuid,
    pub name: String,
    pub color: CategoryColor,

    /// Completed tasks
    pub completed: usize,

    /// All tasks
    pub total: usize,

    /// Stored order may differ from what is shown; reload to resync
    pub stale: bool,

    pub tasks: Vec<Task>,
}

impl CategoryView {
    fn new(category: &Category, stale: bool) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            color: category.color,
            completed: category.completed_count(),
            total: category.total_count(),
            stale,
            tasks: category.tasks.clone(),
        }
    }

    fn from_controller(controller: &Controller, category_id: Uuid) -> ApiResult<Self> {
        controller
            .category(category_id)
            .map(|c| Self::new(c, controller.is_stale(category_id)))
            .ok_or_else(|| ApiError::NotFound(format!("Category not found: {}", category_id)))
    }
}

/// The whole board
#[derive(Debug, Serialize, Deserialize)]
pub struct BoardResponse {
    pub user: Option<Session>,

    /// Completed tasks across all categories
    pub completed: usize,

    /// All tasks across all categories
    pub total: usize,

    pub categories: Vec<CategoryView>,
}

impl BoardResponse {
    fn new(controller: &Controller) -> Self {
        let categories: Vec<CategoryView> = controller
            .categories()
            .iter()
            .map(|c| CategoryView::new(c, controller.is_stale(c.id)))
            .collect();

        Self {
            user: controller.session().cloned(),
            completed: categories.iter().map(|c| c.completed).sum(),
            total: categories.iter().map(|c| c.total).sum(),
            categories,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReloadResponse {
    pub source: LoadSource,

    #[serde(flatten)]
    pub board: BoardResponse,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TaskTextRequest {
    #[validate(length(max = 1000, message = "Text must be at most 1000 characters"))]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub direction: Direction,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub completed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MoveResponse {
    pub outcome: MoveOutcome,
    pub category: CategoryView,
}

/// Live controller for the caller, signing them in if needed
async fn controller_for(state: &AppState, auth: AuthUser) -> ApiResult<SharedController> {
    if let Some(controller) = state.sessions.get(auth.user_id).await {
        return Ok(controller);
    }

    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User no longer exists".to_string()))?;

    tracing::info!(user_id = %user.id, "Restoring board for authenticated user");

    Ok(state.sessions.get_or_sign_in(Session::from(&user)).await)
}

/// Current board
pub async fn get_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<BoardResponse>> {
    let controller = controller_for(&state, auth).await?;
    let controller = controller.lock().await;

    Ok(Json(BoardResponse::new(&controller)))
}

/// Reload the board from the store; clears stale flags
pub async fn reload_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<ReloadResponse>> {
    let controller = controller_for(&state, auth).await?;
    let mut controller = controller.lock().await;

    let source = controller.reload().await;

    Ok(Json(ReloadResponse {
        source,
        board: BoardResponse::new(&controller),
    }))
}

pub async fn create_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<CategoryView>)> {
    req.validate()?;

    let controller = controller_for(&state, auth).await?;
    let mut controller = controller.lock().await;

    let category = controller.add_category(&req.name).await?;

    Ok((StatusCode::CREATED, Json(CategoryView::new(&category, false))))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(category_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let controller = controller_for(&state, auth).await?;
    let mut controller = controller.lock().await;

    controller.delete_category(category_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(category_id): Path<Uuid>,
    Json(req): Json<TaskTextRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    req.validate()?;

    let controller = controller_for(&state, auth).await?;
    let mut controller = controller.lock().await;

    let task = controller.add_task(category_id, &req.text).await?;

    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn edit_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((category_id, task_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<TaskTextRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()?;

    let controller = controller_for(&state, auth).await?;
    let mut controller = controller.lock().await;

    controller.edit_task(category_id, task_id, &req.text).await?;

    let task = controller
        .category(category_id)
        .and_then(|c| c.task(task_id))
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("Task not found: {}", task_id)))?;

    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((category_id, task_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    let controller = controller_for(&state, auth).await?;
    let mut controller = controller.lock().await;

    controller.delete_task(category_id, task_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((category_id, task_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<ToggleResponse>> {
    let controller = controller_for(&state, auth).await?;
    let mut controller = controller.lock().await;

    let completed = controller.toggle_task(category_id, task_id).await?;

    Ok(Json(ToggleResponse { completed }))
}

/// Move a task one slot up or down
///
/// Moving past either end succeeds with `"outcome": "at_boundary"` and
/// changes nothing.
pub async fn move_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((category_id, task_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<MoveRequest>,
) -> ApiResult<Json<MoveResponse>> {
    let controller = controller_for(&state, auth).await?;
    let mut controller = controller.lock().await;

    let outcome = controller
        .move_task(category_id, task_id, req.direction)
        .await?;

    Ok(Json(MoveResponse {
        outcome,
        category: CategoryView::from_controller(&controller, category_id)?,
    }))
}
