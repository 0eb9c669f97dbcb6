/// Task rows and database operations
///
/// Tasks belong to one category and one user. `position` is the task's rank
/// inside its category; the board keeps it a contiguous `0..n-1` sequence,
/// but the table itself does not enforce uniqueness because reorders are
/// written one row at a time.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     category_id UUID NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     text TEXT NOT NULL,
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     position INTEGER NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::task::{TaskRecord, CreateTask, UpdateTask};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid, category_id: Uuid) -> Result<(), sqlx::Error> {
/// let task = TaskRecord::create(&pool, CreateTask {
///     user_id,
///     category_id,
///     text: "Send invoice".to_string(),
///     position: 0,
/// }).await?;
///
/// TaskRecord::update(&pool, task.id, UpdateTask {
///     completed: Some(true),
///     ..Default::default()
/// }).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Stored task row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskRecord {
    /// Store-assigned ID
    pub id: Uuid,

    /// Owning category
    pub category_id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Task label
    pub text: String,

    /// Completion flag
    pub completed: bool,

    /// Rank within the category
    pub position: i32,

    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Input for inserting a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Owning user
    pub user_id: Uuid,

    /// Owning category
    pub category_id: Uuid,

    /// Task label
    pub text: String,

    /// Rank within the category
    pub position: i32,
}

/// Partial update for a task
///
/// Only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New completion flag
    pub completed: Option<bool>,

    /// New label
    pub text: Option<String>,
}

impl UpdateTask {
    /// Whether the update would write nothing
    pub fn is_empty(&self) -> bool {
        self.completed.is_none() && self.text.is_none()
    }
}

impl TaskRecord {
    /// Inserts a task (not completed) and returns the stored row
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let record = sqlx::query_as::<_, TaskRecord>(
            r#"
            INSERT INTO tasks (user_id, category_id, text, completed, position)
            VALUES ($1, $2, $3, FALSE, $4)
            RETURNING id, category_id, user_id, text, completed, position, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.category_id)
        .bind(data.text)
        .bind(data.position)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let record = sqlx::query_as::<_, TaskRecord>(
            r#"
            SELECT id, category_id, user_id, text, completed, position, created_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Lists every task a user owns, ordered by position
    ///
    /// Callers group rows by `category_id`; the relative order within each
    /// group is the position order.
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let records = sqlx::query_as::<_, TaskRecord>(
            r#"
            SELECT id, category_id, user_id, text, completed, position, created_at
            FROM tasks
            WHERE user_id = $1
            ORDER BY position ASC, created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Applies a partial update
    ///
    /// Returns `None` if no row has this ID.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        if data.is_empty() {
            return Self::find_by_id(pool, id).await;
        }

        let mut sets = Vec::new();
        let mut bind_count = 1;

        if data.completed.is_some() {
            bind_count += 1;
            sets.push(format!("completed = ${}", bind_count));
        }
        if data.text.is_some() {
            bind_count += 1;
            sets.push(format!("text = ${}", bind_count));
        }

        let query = format!(
            "UPDATE tasks SET {} WHERE id = $1 \
             RETURNING id, category_id, user_id, text, completed, position, created_at",
            sets.join(", ")
        );

        let mut q = sqlx::query_as::<_, TaskRecord>(&query).bind(id);

        if let Some(completed) = data.completed {
            q = q.bind(completed);
        }
        if let Some(text) = data.text {
            q = q.bind(text);
        }

        let record = q.fetch_optional(pool).await?;

        Ok(record)
    }

    /// Sets one task's position, scoped to its category
    ///
    /// Returns false if no task with this ID lives in the category.
    pub async fn set_position(
        pool: &PgPool,
        id: Uuid,
        category_id: Uuid,
        position: i32,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE tasks SET position = $3 WHERE id = $1 AND category_id = $2")
                .bind(id)
                .bind(category_id)
                .bind(position)
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a task
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
