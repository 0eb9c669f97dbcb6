/// PostgreSQL gateway
///
/// Maps [`Gateway`] calls onto the `categories` and `tasks` models. Store
/// errors are logged here with full detail and handed up as
/// [`GatewayError`] values.

use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use super::colors::{CategoryColor, PALETTE};
use super::gateway::{Gateway, GatewayError, GatewayResult, TaskPatch};
use super::types::{Category, Task};
use crate::models::category::{CategoryRecord, CreateCategory};
use crate::models::task::{CreateTask, TaskRecord};

/// Gateway backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgGateway {
    pool: PgPool,
}

impl PgGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn store_error(operation: &'static str) -> impl FnOnce(sqlx::Error) -> GatewayError {
    move |err| {
        tracing::error!(operation, error = %err, "Store request failed");
        GatewayError::from(err)
    }
}

fn to_position(index: usize) -> GatewayResult<i32> {
    i32::try_from(index).map_err(|_| GatewayError::Store(format!("position {} out of range", index)))
}

fn category_from_record(record: CategoryRecord) -> Category {
    let color = CategoryColor::from_storage(&record.color).unwrap_or_else(|| {
        tracing::warn!(
            category_id = %record.id,
            color = %record.color,
            "Unknown stored color, using default"
        );
        PALETTE[0]
    });

    Category::new(record.id, record.name, color)
}

fn task_from_record(record: TaskRecord) -> Task {
    Task {
        id: record.id,
        text: record.text,
        completed: record.completed,
        position: usize::try_from(record.position).unwrap_or(0),
        created_at: record.created_at.timestamp_millis(),
    }
}

#[async_trait]
impl Gateway for PgGateway {
    async fn load_all(&self, user_id: Uuid) -> GatewayResult<Vec<Category>> {
        let records = CategoryRecord::list_by_user(&self.pool, user_id)
            .await
            .map_err(store_error("load_categories"))?;

        let mut categories: Vec<Category> =
            records.into_iter().map(category_from_record).collect();

        match TaskRecord::list_by_user(&self.pool, user_id).await {
            Ok(tasks) => {
                let mut by_category: HashMap<Uuid, Vec<Task>> = HashMap::new();
                for record in tasks {
                    by_category
                        .entry(record.category_id)
                        .or_default()
                        .push(task_from_record(record));
                }

                for category in &mut categories {
                    if let Some(tasks) = by_category.remove(&category.id) {
                        category.tasks = tasks;
                    }
                }
            }
            Err(err) => {
                tracing::warn!(
                    user_id = %user_id,
                    error = %err,
                    "Task query failed; returning categories without tasks"
                );
            }
        }

        tracing::debug!(user_id = %user_id, categories = categories.len(), "Board loaded");

        Ok(categories)
    }

    async fn create_category(
        &self,
        user_id: Uuid,
        name: &str,
        color: CategoryColor,
    ) -> GatewayResult<Uuid> {
        let record = CategoryRecord::create(
            &self.pool,
            CreateCategory {
                user_id,
                name: name.to_string(),
                color: color.as_str().to_string(),
            },
        )
        .await
        .map_err(store_error("create_category"))?;

        Ok(record.id)
    }

    async fn delete_category(&self, category_id: Uuid) -> GatewayResult<()> {
        CategoryRecord::delete(&self.pool, category_id)
            .await
            .map_err(store_error("delete_category"))?;

        Ok(())
    }

    async fn create_task(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        text: &str,
        position: usize,
    ) -> GatewayResult<Uuid> {
        let record = TaskRecord::create(
            &self.pool,
            CreateTask {
                user_id,
                category_id,
                text: text.to_string(),
                position: to_position(position)?,
            },
        )
        .await
        .map_err(store_error("create_task"))?;

        Ok(record.id)
    }

    async fn update_task(&self, task_id: Uuid, patch: TaskPatch) -> GatewayResult<()> {
        TaskRecord::update(&self.pool, task_id, patch.into())
            .await
            .map_err(store_error("update_task"))?
            .ok_or_else(|| GatewayError::NotFound(format!("task {}", task_id)))?;

        Ok(())
    }

    async fn delete_task(&self, task_id: Uuid) -> GatewayResult<()> {
        TaskRecord::delete(&self.pool, task_id)
            .await
            .map_err(store_error("delete_task"))?;

        Ok(())
    }

    async fn set_positions(
        &self,
        category_id: Uuid,
        ordered_task_ids: &[Uuid],
    ) -> GatewayResult<()> {
        for (index, task_id) in ordered_task_ids.iter().enumerate() {
            let updated =
                TaskRecord::set_position(&self.pool, *task_id, category_id, to_position(index)?)
                    .await
                    .map_err(store_error("set_position"))?;

            if !updated {
                tracing::warn!(
                    category_id = %category_id,
                    task_id = %task_id,
                    written = index,
                    "Position update matched no row"
                );
                return Err(GatewayError::NotFound(format!("task {}", task_id)));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_unknown_color_maps_to_default() {
        let record = CategoryRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Legacy".to_string(),
            color: "bg-black-900".to_string(),
            created_at: Utc::now(),
        };

        assert_eq!(category_from_record(record).color, PALETTE[0]);
    }

    #[test]
    fn test_task_from_record() {
        let created_at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let record = TaskRecord {
            id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            text: "Ship it".to_string(),
            completed: true,
            position: 3,
            created_at,
        };

        let task = task_from_record(record);
        assert_eq!(task.position, 3);
        assert!(task.completed);
        assert_eq!(task.created_at, 1_700_000_000_000);
    }

    #[test]
    fn test_position_range() {
        assert_eq!(to_position(7).unwrap(), 7);
        assert!(to_position(usize::MAX).is_err());
    }
}
