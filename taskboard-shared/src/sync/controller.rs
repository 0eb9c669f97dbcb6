/// Board state controller
///
/// The controller owns the signed-in user's in-memory board and is the only
/// thing allowed to change it. Every mutation follows the same order:
///
/// 1. Validate input and look up the target locally
/// 2. Ask the [`Gateway`] to make the change remotely
/// 3. Apply the change locally only if the gateway confirmed it
///
/// A failed call therefore leaves the board exactly as it was, and every
/// local change has a confirmed remote counterpart.
///
/// # Reordering
///
/// Moving a task rewrites the positions of the whole category, one row at a
/// time. If a write fails halfway, the stored positions may no longer match
/// the board. The category is then marked stale and stays stale until the
/// next successful move in it or a [`Controller::reload`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskboard_shared::sync::{Controller, ControllerConfig, Direction, LoadSource, Session};
/// use taskboard_shared::sync::memory::InMemoryGateway;
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut controller = Controller::new(Arc::new(InMemoryGateway::new()), ControllerConfig::default());
///
/// let session = Session::new(Uuid::new_v4(), "sam@example.com", None);
/// assert_eq!(controller.sign_in(session).await, LoadSource::Bootstrapped);
///
/// let inbox = controller.add_category("Inbox").await?;
/// let first = controller.add_task(inbox.id, "Reply to Alex").await?;
/// controller.add_task(inbox.id, "Book flights").await?;
/// controller.move_task(inbox.id, first.id, Direction::Down).await?;
/// # Ok(())
/// # }
/// ```

use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use super::bootstrap;
use super::colors::{self, CategoryColor};
use super::error::{SyncError, SyncResult};
use super::gateway::{Gateway, TaskPatch};
use super::session::Session;
use super::types::{self, Category, Direction, LoadSource, MoveOutcome, Task};

/// Default time allowed for the initial board fetch
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(5);

/// Shortest load timeout accepted
pub const MIN_LOAD_TIMEOUT: Duration = Duration::from_secs(1);

/// Controller settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Time allowed for `Gateway::load_all`; bootstrapping is not included
    pub load_timeout: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            load_timeout: DEFAULT_LOAD_TIMEOUT,
        }
    }
}

impl ControllerConfig {
    /// Config with a load timeout in whole seconds, clamped to
    /// [`MIN_LOAD_TIMEOUT`]
    pub fn from_secs(secs: u64) -> Self {
        Self {
            load_timeout: Duration::from_secs(secs).max(MIN_LOAD_TIMEOUT),
        }
    }
}

/// Owner of one user's board
pub struct Controller {
    gateway: Arc<dyn Gateway>,
    config: ControllerConfig,
    session: Option<Session>,
    tree: Vec<Category>,
    stale: HashSet<Uuid>,
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("config", &self.config)
            .field("session", &self.session)
            .field("categories", &self.tree.len())
            .field("stale", &self.stale)
            .finish()
    }
}

impl Controller {
    /// Creates a signed-out controller with an empty board
    pub fn new(gateway: Arc<dyn Gateway>, config: ControllerConfig) -> Self {
        Self {
            gateway,
            config,
            session: None,
            tree: Vec::new(),
            stale: HashSet::new(),
        }
    }

    /// Board categories in load order
    pub fn categories(&self) -> &[Category] {
        &self.tree
    }

    pub fn category(&self, category_id: Uuid) -> Option<&Category> {
        self.tree.iter().find(|c| c.id == category_id)
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Whether a category's stored positions may disagree with the board
    pub fn is_stale(&self, category_id: Uuid) -> bool {
        self.stale.contains(&category_id)
    }

    pub fn stale_categories(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.stale.iter().copied()
    }

    /// Adopts a session and loads its board
    pub async fn sign_in(&mut self, session: Session) -> LoadSource {
        tracing::info!(user_id = %session.user_id, "Signing in");

        let user_id = session.user_id;
        self.session = Some(session);
        self.load(user_id).await
    }

    /// Forgets the session and empties the board
    pub fn clear(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::info!(user_id = %session.user_id, "Signed out");
        }
        self.tree.clear();
        self.stale.clear();
    }

    /// Alias for [`Controller::clear`]
    pub fn sign_out(&mut self) {
        self.clear();
    }

    /// Replaces the board with the stored one
    ///
    /// A user with no categories at all gets the defaults. If the fetch fails
    /// or takes longer than the configured timeout, the board is left empty
    /// and `LoadSource::Unavailable` is returned.
    pub async fn load(&mut self, user_id: Uuid) -> LoadSource {
        self.stale.clear();

        let fetched =
            tokio::time::timeout(self.config.load_timeout, self.gateway.load_all(user_id)).await;

        let (tree, source) = match fetched {
            Ok(Ok(categories)) if categories.is_empty() => {
                tracing::info!(user_id = %user_id, "No categories found, creating defaults");
                let defaults = bootstrap::create_defaults(self.gateway.as_ref(), user_id).await;
                (defaults, LoadSource::Bootstrapped)
            }
            Ok(Ok(categories)) => (categories, LoadSource::Existing),
            Ok(Err(e)) => {
                tracing::error!(user_id = %user_id, error = %e, "Failed to load board");
                (Vec::new(), LoadSource::Unavailable)
            }
            Err(_) => {
                tracing::error!(
                    user_id = %user_id,
                    timeout_ms = self.config.load_timeout.as_millis() as u64,
                    "Board load timed out"
                );
                (Vec::new(), LoadSource::Unavailable)
            }
        };

        tracing::debug!(
            user_id = %user_id,
            categories = tree.len(),
            source = ?source,
            "Board adopted"
        );

        self.tree = tree;
        source
    }

    /// Loads the board again for the signed-in user
    pub async fn reload(&mut self) -> LoadSource {
        match self.session.as_ref().map(|s| s.user_id) {
            Some(user_id) => self.load(user_id).await,
            None => {
                self.tree.clear();
                self.stale.clear();
                LoadSource::Unavailable
            }
        }
    }

    /// Creates a category with an unused palette color and appends it
    pub async fn add_category(&mut self, name: &str) -> SyncResult<Category> {
        let user_id = self.user_id()?;
        let name = non_empty(name, "Category name")?;

        let used: HashSet<CategoryColor> = self.tree.iter().map(|c| c.color).collect();
        let color = colors::pick(&used);

        let id = self.gateway.create_category(user_id, name, color).await?;
        let category = Category::new(id, name, color);

        tracing::info!(user_id = %user_id, category_id = %id, color = %color, "Category created");

        self.tree.push(category.clone());
        Ok(category)
    }

    /// Deletes a category and all of its tasks
    pub async fn delete_category(&mut self, category_id: Uuid) -> SyncResult<()> {
        self.user_id()?;
        let index = self.category_index(category_id)?;

        self.gateway.delete_category(category_id).await?;

        let removed = self.tree.remove(index);
        self.stale.remove(&category_id);

        tracing::info!(
            category_id = %category_id,
            tasks = removed.tasks.len(),
            "Category deleted"
        );

        Ok(())
    }

    /// Appends an uncompleted task to a category
    ///
    /// A category with a gap in its positions or marked stale is compacted
    /// first, so the new task always lands at `len`. If that compaction
    /// fails, no task is created.
    pub async fn add_task(&mut self, category_id: Uuid, text: &str) -> SyncResult<Task> {
        let user_id = self.user_id()?;
        let text = non_empty(text, "Task text")?;
        let index = self.category_index(category_id)?;

        if self.is_stale(category_id) || !self.tree[index].has_contiguous_positions() {
            self.compact(index).await?;
        }
        let position = self.tree[index].tasks.len();

        let id = self
            .gateway
            .create_task(user_id, category_id, text, position)
            .await?;

        let task = Task {
            id,
            text: text.to_string(),
            completed: false,
            position,
            created_at: Utc::now().timestamp_millis(),
        };

        tracing::debug!(category_id = %category_id, task_id = %id, position, "Task created");

        self.tree[index].tasks.push(task.clone());
        Ok(task)
    }

    /// Flips a task's completion flag and returns the new value
    pub async fn toggle_task(&mut self, category_id: Uuid, task_id: Uuid) -> SyncResult<bool> {
        self.user_id()?;
        let (ci, ti) = self.task_location(category_id, task_id)?;
        let completed = !self.tree[ci].tasks[ti].completed;

        self.gateway
            .update_task(task_id, TaskPatch::completed(completed))
            .await?;

        self.tree[ci].tasks[ti].completed = completed;
        Ok(completed)
    }

    /// Replaces a task's label
    pub async fn edit_task(
        &mut self,
        category_id: Uuid,
        task_id: Uuid,
        text: &str,
    ) -> SyncResult<()> {
        self.user_id()?;
        let text = non_empty(text, "Task text")?;
        let (ci, ti) = self.task_location(category_id, task_id)?;

        self.gateway
            .update_task(task_id, TaskPatch::text(text))
            .await?;

        self.tree[ci].tasks[ti].text = text.to_string();
        Ok(())
    }

    /// Deletes a task, then closes the gap it left in the stored positions
    ///
    /// The delete itself decides the result. If closing the gap fails, the
    /// category is marked stale and local positions keep their stored values.
    pub async fn delete_task(&mut self, category_id: Uuid, task_id: Uuid) -> SyncResult<()> {
        self.user_id()?;
        let (ci, ti) = self.task_location(category_id, task_id)?;

        self.gateway.delete_task(task_id).await?;

        self.tree[ci].tasks.remove(ti);

        if self.tree[ci].has_contiguous_positions() {
            return Ok(());
        }

        if let Err(e) = self.compact(ci).await {
            tracing::warn!(
                category_id = %category_id,
                error = %e,
                "Failed to compact positions after delete; category marked stale"
            );
        }

        Ok(())
    }

    /// Swaps a task with its neighbour
    ///
    /// At either end of the list nothing is sent and
    /// `MoveOutcome::AtBoundary` is returned.
    pub async fn move_task(
        &mut self,
        category_id: Uuid,
        task_id: Uuid,
        direction: Direction,
    ) -> SyncResult<MoveOutcome> {
        self.user_id()?;
        let (ci, ti) = self.task_location(category_id, task_id)?;

        let Some(target) = direction.target(ti, self.tree[ci].tasks.len()) else {
            return Ok(MoveOutcome::AtBoundary);
        };

        let mut reordered = self.tree[ci].tasks.clone();
        reordered.swap(ti, target);
        let order: Vec<Uuid> = reordered.iter().map(|t| t.id).collect();

        if let Err(e) = self.gateway.set_positions(category_id, &order).await {
            tracing::warn!(
                category_id = %category_id,
                task_id = %task_id,
                error = %e,
                "Reorder failed; category marked stale"
            );
            self.stale.insert(category_id);
            return Err(e.into());
        }

        types::renumber(&mut reordered);
        self.tree[ci].tasks = reordered;
        self.stale.remove(&category_id);

        Ok(MoveOutcome::Moved)
    }

    /// Rewrites a category's stored positions to `0..len` in board order
    ///
    /// Success renumbers the board and clears the stale flag. Failure marks
    /// the category stale and leaves local positions untouched.
    async fn compact(&mut self, index: usize) -> SyncResult<()> {
        let category_id = self.tree[index].id;
        let order = self.tree[index].task_ids();

        if let Err(e) = self.gateway.set_positions(category_id, &order).await {
            self.stale.insert(category_id);
            return Err(e.into());
        }

        self.tree[index].renumber();
        self.stale.remove(&category_id);
        Ok(())
    }

    fn user_id(&self) -> SyncResult<Uuid> {
        self.session
            .as_ref()
            .map(|s| s.user_id)
            .ok_or(SyncError::Unauthenticated)
    }

    fn category_index(&self, category_id: Uuid) -> SyncResult<usize> {
        self.tree
            .iter()
            .position(|c| c.id == category_id)
            .ok_or(SyncError::CategoryNotFound(category_id))
    }

    fn task_location(&self, category_id: Uuid, task_id: Uuid) -> SyncResult<(usize, usize)> {
        let ci = self.category_index(category_id)?;
        let ti = self.tree[ci]
            .task_index(task_id)
            .ok_or(SyncError::TaskNotFound(task_id))?;
        Ok((ci, ti))
    }
}

fn non_empty<'a>(value: &'a str, field: &str) -> SyncResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SyncError::Validation(format!("{} cannot be empty", field)));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::memory::InMemoryGateway;

    fn signed_out() -> Controller {
        Controller::new(Arc::new(InMemoryGateway::new()), ControllerConfig::default())
    }

    #[test]
    fn test_config_clamps_timeout() {
        assert_eq!(ControllerConfig::from_secs(0).load_timeout, MIN_LOAD_TIMEOUT);
        assert_eq!(ControllerConfig::from_secs(9).load_timeout, Duration::from_secs(9));
        assert_eq!(ControllerConfig::default().load_timeout, DEFAULT_LOAD_TIMEOUT);
    }

    #[test]
    fn test_non_empty_trims() {
        assert_eq!(non_empty("  Work ", "Name").unwrap(), "Work");
        assert!(matches!(non_empty("   ", "Name"), Err(SyncError::Validation(_))));
    }

    #[tokio::test]
    async fn test_mutations_require_session() {
        let mut controller = signed_out();

        assert_eq!(
            controller.add_category("Work").await.unwrap_err(),
            SyncError::Unauthenticated
        );
        assert_eq!(
            controller.add_task(Uuid::new_v4(), "x").await.unwrap_err(),
            SyncError::Unauthenticated
        );
        assert!(!controller.is_authenticated());
    }

    #[tokio::test]
    async fn test_reload_without_session_is_unavailable() {
        let mut controller = signed_out();
        assert_eq!(controller.reload().await, LoadSource::Unavailable);
        assert!(controller.categories().is_empty());
    }
}
