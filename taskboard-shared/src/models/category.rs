/// Category rows and database operations
///
/// One row per category a user owns. Deleting a category cascades to its
/// tasks through the foreign key on `tasks.category_id`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE categories (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     color VARCHAR(32) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Stored category row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CategoryRecord {
    /// Store-assigned ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Display name
    pub name: String,

    /// Palette color as stored (e.g. "bg-blue-200")
    pub color: String,

    /// Creation time; categories load in this order
    pub created_at: DateTime<Utc>,
}

/// Input for inserting a category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategory {
    /// Owning user
    pub user_id: Uuid,

    /// Display name
    pub name: String,

    /// Palette color storage value
    pub color: String,
}

impl CategoryRecord {
    /// Inserts a category and returns the stored row
    pub async fn create(pool: &PgPool, data: CreateCategory) -> Result<Self, sqlx::Error> {
        let record = sqlx::query_as::<_, CategoryRecord>(
            r#"
            INSERT INTO categories (user_id, name, color)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, name, color, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.name)
        .bind(data.color)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Lists a user's categories, oldest first
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let records = sqlx::query_as::<_, CategoryRecord>(
            r#"
            SELECT id, user_id, name, color, created_at
            FROM categories
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Deletes a category
    ///
    /// ⚠️  This also deletes all of its tasks due to CASCADE.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
