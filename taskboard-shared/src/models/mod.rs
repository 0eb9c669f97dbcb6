/// Database models for Taskboard
///
/// These are the remote store's record shapes and their single-statement
/// CRUD operations. The board's in-memory tree never touches them directly;
/// it goes through `sync::Gateway`.
///
/// # Models
///
/// - `user`: User accounts
/// - `category`: Named, colored groupings owned by a user
/// - `task`: Ordered to-do items within a category
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::category::{CategoryRecord, CreateCategory};
/// use taskboard_shared::db::pool::{self, PoolSettings};
/// use uuid::Uuid;
///
/// # async fn example(user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = pool::connect(&PoolSettings::new("postgresql://localhost/taskboard", 5)).await?;
///
/// let category = CategoryRecord::create(&pool, CreateCategory {
///     user_id,
///     name: "Work".to_string(),
///     color: "bg-blue-200".to_string(),
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod category;
pub mod task;
pub mod user;
