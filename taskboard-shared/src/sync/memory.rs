/// In-memory gateway for tests and demos
///
/// Behaves like [`PgGateway`](super::postgres::PgGateway) against an empty
/// database: IDs are issued by the store, categories come back in creation
/// order and tasks in position order, deleting a category deletes its
/// tasks, and updates to missing rows fail with `NotFound`.
///
/// Failures and latency can be injected per operation so callers can check
/// how they react to an unreliable store.
///
/// # Example
///
/// ```
/// use taskboard_shared::sync::memory::{InMemoryGateway, Operation};
/// use taskboard_shared::sync::{CategoryColor, Gateway};
/// use uuid::Uuid;
///
/// # async fn example() {
/// let gateway = InMemoryGateway::new();
/// let user_id = Uuid::new_v4();
///
/// gateway.fail(Operation::CreateCategory).await;
/// assert!(gateway
///     .create_category(user_id, "Work", CategoryColor::Blue)
///     .await
///     .is_err());
///
/// gateway.recover(Operation::CreateCategory).await;
/// assert!(gateway
///     .create_category(user_id, "Work", CategoryColor::Blue)
///     .await
///     .is_ok());
/// # }
/// ```

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::colors::CategoryColor;
use super::gateway::{Gateway, GatewayError, GatewayResult, TaskPatch};
use super::types::{Category, Task};

/// Gateway operations that can fail on demand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// The category query of `load_all`
    LoadAll,
    /// The task query of `load_all`
    LoadTasks,
    CreateCategory,
    DeleteCategory,
    CreateTask,
    UpdateTask,
    DeleteTask,
    /// Failure budget consumed per row written; `call_count` still counts calls
    SetPositions,
}

#[derive(Debug, Clone)]
struct StoredCategory {
    id: Uuid,
    user_id: Uuid,
    name: String,
    color: CategoryColor,
}

#[derive(Debug, Clone)]
struct StoredTask {
    id: Uuid,
    category_id: Uuid,
    user_id: Uuid,
    text: String,
    completed: bool,
    position: usize,
    created_at: i64,
    seq: u64,
}

impl StoredTask {
    fn to_task(&self) -> Task {
        Task {
            id: self.id,
            text: self.text.clone(),
            completed: self.completed,
            position: self.position,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    /// Creation order
    categories: Vec<StoredCategory>,
    tasks: Vec<StoredTask>,
    next_seq: u64,
    /// Successes left before an operation starts failing
    failures: HashMap<Operation, usize>,
    calls: HashMap<Operation, usize>,
    load_delay: Option<Duration>,
}

impl State {
    fn record_call(&mut self, op: Operation) {
        *self.calls.entry(op).or_insert(0) += 1;
    }

    fn check(&mut self, op: Operation) -> GatewayResult<()> {
        match self.failures.get_mut(&op) {
            Some(0) => Err(GatewayError::Store(format!("injected failure: {:?}", op))),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn insert_category(&mut self, user_id: Uuid, name: &str, color: CategoryColor) -> Uuid {
        let id = Uuid::new_v4();
        self.categories.push(StoredCategory {
            id,
            user_id,
            name: name.to_string(),
            color,
        });
        id
    }

    fn insert_task(
        &mut self,
        user_id: Uuid,
        category_id: Uuid,
        text: &str,
        position: usize,
    ) -> GatewayResult<Uuid> {
        if !self.categories.iter().any(|c| c.id == category_id) {
            return Err(GatewayError::Store(format!(
                "category {} does not exist",
                category_id
            )));
        }

        let id = Uuid::new_v4();
        let seq = self.next_seq;
        self.next_seq += 1;

        self.tasks.push(StoredTask {
            id,
            category_id,
            user_id,
            text: text.to_string(),
            completed: false,
            position,
            created_at: Utc::now().timestamp_millis(),
            seq,
        });

        Ok(id)
    }

    fn tasks_of(&self, category_id: Uuid) -> Vec<&StoredTask> {
        let mut tasks: Vec<&StoredTask> = self
            .tasks
            .iter()
            .filter(|t| t.category_id == category_id)
            .collect();
        tasks.sort_by_key(|t| (t.position, t.seq));
        tasks
    }
}

/// Gateway backed by process memory
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    state: Mutex<State>,
}

impl InMemoryGateway {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following call of `op` fail
    pub async fn fail(&self, op: Operation) {
        self.fail_after(op, 0).await;
    }

    /// Lets `successes` calls of `op` through, then fails the rest
    pub async fn fail_after(&self, op: Operation, successes: usize) {
        self.state.lock().await.failures.insert(op, successes);
    }

    /// Clears any injected failure for `op`
    pub async fn recover(&self, op: Operation) {
        self.state.lock().await.failures.remove(&op);
    }

    /// Delays every `load_all` call
    pub async fn set_load_delay(&self, delay: Duration) {
        self.state.lock().await.load_delay = Some(delay);
    }

    /// Number of calls made to `op`, failed ones included
    pub async fn call_count(&self, op: Operation) -> usize {
        self.state.lock().await.calls.get(&op).copied().unwrap_or(0)
    }

    /// Inserts a category without counting a call
    pub async fn seed_category(&self, user_id: Uuid, name: &str, color: CategoryColor) -> Uuid {
        self.state.lock().await.insert_category(user_id, name, color)
    }

    /// Inserts a task without counting a call
    pub async fn seed_task(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        text: &str,
        position: usize,
    ) -> GatewayResult<Uuid> {
        self.state
            .lock()
            .await
            .insert_task(user_id, category_id, text, position)
    }

    /// Stored `(task_id, position)` pairs of a category, in position order
    pub async fn stored_positions(&self, category_id: Uuid) -> Vec<(Uuid, usize)> {
        let state = self.state.lock().await;
        state
            .tasks_of(category_id)
            .into_iter()
            .map(|t| (t.id, t.position))
            .collect()
    }

    /// Stored copy of a task
    pub async fn stored_task(&self, task_id: Uuid) -> Option<Task> {
        let state = self.state.lock().await;
        state
            .tasks
            .iter()
            .find(|t| t.id == task_id)
            .map(StoredTask::to_task)
    }

    /// Number of categories stored for a user
    pub async fn category_count(&self, user_id: Uuid) -> usize {
        let state = self.state.lock().await;
        state
            .categories
            .iter()
            .filter(|c| c.user_id == user_id)
            .count()
    }

    /// Number of tasks stored in a category
    pub async fn task_count(&self, category_id: Uuid) -> usize {
        let state = self.state.lock().await;
        state
            .tasks
            .iter()
            .filter(|t| t.category_id == category_id)
            .count()
    }
}

#[async_trait]
impl Gateway for InMemoryGateway {
    async fn load_all(&self, user_id: Uuid) -> GatewayResult<Vec<Category>> {
        let delay = {
            let mut state = self.state.lock().await;
            state.record_call(Operation::LoadAll);
            state.load_delay
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().await;
        state.check(Operation::LoadAll)?;

        let mut categories: Vec<Category> = state
            .categories
            .iter()
            .filter(|c| c.user_id == user_id)
            .map(|c| Category::new(c.id, c.name.clone(), c.color))
            .collect();

        state.record_call(Operation::LoadTasks);
        if state.check(Operation::LoadTasks).is_err() {
            tracing::warn!(user_id = %user_id, "Task query failed; returning categories without tasks");
            return Ok(categories);
        }

        for category in &mut categories {
            category.tasks = state
                .tasks_of(category.id)
                .into_iter()
                .filter(|t| t.user_id == user_id)
                .map(StoredTask::to_task)
                .collect();
        }

        Ok(categories)
    }

    async fn create_category(
        &self,
        user_id: Uuid,
        name: &str,
        color: CategoryColor,
    ) -> GatewayResult<Uuid> {
        let mut state = self.state.lock().await;
        state.record_call(Operation::CreateCategory);
        state.check(Operation::CreateCategory)?;

        Ok(state.insert_category(user_id, name, color))
    }

    async fn delete_category(&self, category_id: Uuid) -> GatewayResult<()> {
        let mut state = self.state.lock().await;
        state.record_call(Operation::DeleteCategory);
        state.check(Operation::DeleteCategory)?;

        state.categories.retain(|c| c.id != category_id);
        state.tasks.retain(|t| t.category_id != category_id);

        Ok(())
    }

    async fn create_task(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        text: &str,
        position: usize,
    ) -> GatewayResult<Uuid> {
        let mut state = self.state.lock().await;
        state.record_call(Operation::CreateTask);
        state.check(Operation::CreateTask)?;

        state.insert_task(user_id, category_id, text, position)
    }

    async fn update_task(&self, task_id: Uuid, patch: TaskPatch) -> GatewayResult<()> {
        let mut state = self.state.lock().await;
        state.record_call(Operation::UpdateTask);
        state.check(Operation::UpdateTask)?;

        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| GatewayError::NotFound(format!("task {}", task_id)))?;

        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        if let Some(text) = patch.text {
            task.text = text;
        }

        Ok(())
    }

    async fn delete_task(&self, task_id: Uuid) -> GatewayResult<()> {
        let mut state = self.state.lock().await;
        state.record_call(Operation::DeleteTask);
        state.check(Operation::DeleteTask)?;

        state.tasks.retain(|t| t.id != task_id);

        Ok(())
    }

    async fn set_positions(
        &self,
        category_id: Uuid,
        ordered_task_ids: &[Uuid],
    ) -> GatewayResult<()> {
        let mut state = self.state.lock().await;
        state.record_call(Operation::SetPositions);

        for (position, task_id) in ordered_task_ids.iter().enumerate() {
            state.check(Operation::SetPositions)?;

            let task = state
                .tasks
                .iter_mut()
                .find(|t| t.id == *task_id && t.category_id == category_id)
                .ok_or_else(|| GatewayError::NotFound(format!("task {}", task_id)))?;

            task.position = position;
        }

        Ok(())
    }
}
