/// Domain types for the in-memory board
///
/// A board is an ordered list of [`Category`] values, each owning an ordered
/// list of [`Task`] values. Task order is the `position` order; after every
/// committed operation the positions in a category are exactly `0..n-1`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::colors::CategoryColor;

/// A single to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned ID
    pub id: Uuid,

    /// Label
    pub text: String,

    /// Completion flag
    pub completed: bool,

    /// Zero-based rank within the owning category
    pub position: usize,

    /// Creation time, epoch milliseconds
    pub created_at: i64,
}

/// A named, colored grouping of tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Store-assigned ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Palette color
    pub color: CategoryColor,

    /// Tasks in position order
    pub tasks: Vec<Task>,
}

impl Category {
    /// Creates a category with no tasks
    pub fn new(id: Uuid, name: impl Into<String>, color: CategoryColor) -> Self {
        Self {
            id,
            name: name.into(),
            color,
            tasks: Vec::new(),
        }
    }

    /// Index of a task in `tasks`
    pub fn task_index(&self, task_id: Uuid) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == task_id)
    }

    /// Looks up a task by ID
    pub fn task(&self, task_id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    /// Number of completed tasks
    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    /// Number of tasks
    pub fn total_count(&self) -> usize {
        self.tasks.len()
    }

    /// Whether every task's position equals its index
    pub fn has_contiguous_positions(&self) -> bool {
        self.tasks.iter().enumerate().all(|(i, t)| t.position == i)
    }

    /// Task IDs in their current order
    pub fn task_ids(&self) -> Vec<Uuid> {
        self.tasks.iter().map(|t| t.id).collect()
    }

    /// Rewrites positions to `0..n-1` following the current order
    pub fn renumber(&mut self) {
        renumber(&mut self.tasks);
    }
}

/// Rewrites positions to match slice order
pub(crate) fn renumber(tasks: &mut [Task]) {
    for (index, task) in tasks.iter_mut().enumerate() {
        task.position = index;
    }
}

/// Direction for moving a task one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Towards position 0
    Up,

    /// Towards the end of the list
    Down,
}

impl Direction {
    /// Index a task at `index` would move to, `None` past either end
    pub fn target(self, index: usize, len: usize) -> Option<usize> {
        let target = match self {
            Direction::Up => index.checked_sub(1)?,
            Direction::Down => index + 1,
        };

        (target < len).then_some(target)
    }
}

/// Result of a move request that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveOutcome {
    /// The task swapped places with its neighbour
    Moved,

    /// The task was already first (up) or last (down); nothing was sent
    AtBoundary,
}

/// Where the board came from on load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadSource {
    /// The user's stored categories
    Existing,

    /// The user had none, so the defaults were created
    Bootstrapped,

    /// The store failed or timed out; the board is empty
    Unavailable,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(position: usize) -> Task {
        Task {
            id: Uuid::new_v4(),
            text: format!("task {}", position),
            completed: false,
            position,
            created_at: 0,
        }
    }

    #[test]
    fn test_direction_target_bounds() {
        assert_eq!(Direction::Up.target(0, 3), None);
        assert_eq!(Direction::Up.target(2, 3), Some(1));
        assert_eq!(Direction::Down.target(2, 3), None);
        assert_eq!(Direction::Down.target(0, 3), Some(1));
        assert_eq!(Direction::Down.target(0, 1), None);
        assert_eq!(Direction::Up.target(0, 0), None);
    }

    #[test]
    fn test_progress_counts() {
        let mut category = Category::new(Uuid::new_v4(), "Work", CategoryColor::Blue);
        category.tasks = vec![task(0), task(1), task(2)];
        category.tasks[1].completed = true;

        assert_eq!(category.completed_count(), 1);
        assert_eq!(category.total_count(), 3);
    }

    #[test]
    fn test_contiguity_and_renumber() {
        let mut category = Category::new(Uuid::new_v4(), "Work", CategoryColor::Blue);
        category.tasks = vec![task(0), task(2), task(3)];
        assert!(!category.has_contiguous_positions());

        category.renumber();
        assert!(category.has_contiguous_positions());
        assert_eq!(
            category.tasks.iter().map(|t| t.position).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_direction_serde() {
        let up: Direction = serde_json::from_str("\"up\"").unwrap();
        assert_eq!(up, Direction::Up);
        assert_eq!(serde_json::to_string(&Direction::Down).unwrap(), "\"down\"");
    }
}
