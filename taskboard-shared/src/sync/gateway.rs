/// Persistence gateway contract
///
/// The gateway is the only path from the board to the remote store. It
/// translates between domain values ([`Category`], [`Task`]) and stored
/// rows, and turns every store failure into a [`GatewayError`] value.
///
/// # Implementations
///
/// - [`PgGateway`](super::postgres::PgGateway): PostgreSQL via sqlx
/// - [`InMemoryGateway`](super::memory::InMemoryGateway): in-process store
///   with failure and latency injection
///
/// # Atomicity
///
/// Only single-row operations are atomic. `set_positions` is a sequence of
/// single-row updates; if one fails, the rows before it stay written.
///
/// [`Task`]: super::types::Task

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::colors::CategoryColor;
use super::types::Category;
use crate::models::task::UpdateTask;

/// Gateway error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The store rejected the request or could not be reached
    #[error("Store request failed: {0}")]
    Store(String),

    /// The row to update does not exist
    #[error("Record not found: {0}")]
    NotFound(String),
}

impl From<sqlx::Error> for GatewayError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => GatewayError::NotFound("row not found".to_string()),
            other => GatewayError::Store(other.to_string()),
        }
    }
}

/// Gateway result type alias
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Fields to change on a task; `None` leaves a field alone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    /// New completion flag
    pub completed: Option<bool>,

    /// New label
    pub text: Option<String>,
}

impl TaskPatch {
    /// Patch that only sets the completion flag
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            text: None,
        }
    }

    /// Patch that only sets the label
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            completed: None,
            text: Some(text.into()),
        }
    }
}

impl From<TaskPatch> for UpdateTask {
    fn from(patch: TaskPatch) -> Self {
        UpdateTask {
            completed: patch.completed,
            text: patch.text,
        }
    }
}

/// Remote store operations used by the board controller
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Fetches every category of a user with its tasks
    ///
    /// Categories come back oldest first, tasks in position order.
    async fn load_all(&self, user_id: Uuid) -> GatewayResult<Vec<Category>>;

    /// Inserts a category and returns its store-assigned ID
    async fn create_category(
        &self,
        user_id: Uuid,
        name: &str,
        color: CategoryColor,
    ) -> GatewayResult<Uuid>;

    /// Deletes a category; its tasks go with it
    async fn delete_category(&self, category_id: Uuid) -> GatewayResult<()>;

    /// Inserts an uncompleted task and returns its store-assigned ID
    async fn create_task(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        text: &str,
        position: usize,
    ) -> GatewayResult<Uuid>;

    /// Applies a partial update to a task
    async fn update_task(&self, task_id: Uuid, patch: TaskPatch) -> GatewayResult<()>;

    /// Deletes a task
    async fn delete_task(&self, task_id: Uuid) -> GatewayResult<()>;

    /// Writes `position = index` for each task in `ordered_task_ids`, one
    /// row at a time, stopping at the first failure
    async fn set_positions(&self, category_id: Uuid, ordered_task_ids: &[Uuid])
        -> GatewayResult<()>;
}
