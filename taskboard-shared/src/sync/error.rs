/// Errors returned by board operations
///
/// Every variant means the in-memory board was left exactly as it was.

use uuid::Uuid;

use super::gateway::GatewayError;

/// Board operation error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    /// No user is signed in
    #[error("You must be signed in to do that")]
    Unauthenticated,

    /// Input was rejected before reaching the store
    #[error("{0}")]
    Validation(String),

    /// No category with this ID on the board
    #[error("Category not found: {0}")]
    CategoryNotFound(Uuid),

    /// No task with this ID in the category
    #[error("Task not found: {0}")]
    TaskNotFound(Uuid),

    /// The store did not confirm the change
    #[error("Failed to save changes: {0}")]
    Persistence(#[from] GatewayError),
}

/// Board result type alias
pub type SyncResult<T> = Result<T, SyncError>;
