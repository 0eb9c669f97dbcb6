/// First-run board defaults
///
/// A user whose board loads with zero categories gets a starter set. The
/// controller decides when; this module only knows what to create.

use uuid::Uuid;

use super::colors::CategoryColor;
use super::gateway::Gateway;
use super::types::Category;

/// Starter categories, in creation order
pub const DEFAULT_CATEGORIES: [(&str, CategoryColor); 6] = [
    ("Client", CategoryColor::Blue),
    ("Biz System", CategoryColor::Green),
    ("Web & Funnel", CategoryColor::Purple),
    ("AI & Tech", CategoryColor::Orange),
    ("Learning", CategoryColor::Yellow),
    ("Personal", CategoryColor::Pink),
];

/// Creates the starter categories one at a time
///
/// A failed insert is logged and skipped. Returns the categories that were
/// created, with no tasks, in [`DEFAULT_CATEGORIES`] order.
pub async fn create_defaults(gateway: &dyn Gateway, user_id: Uuid) -> Vec<Category> {
    let mut created = Vec::with_capacity(DEFAULT_CATEGORIES.len());

    for (name, color) in DEFAULT_CATEGORIES {
        match gateway.create_category(user_id, name, color).await {
            Ok(id) => created.push(Category::new(id, name, color)),
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    category = name,
                    error = %e,
                    "Failed to create default category"
                );
            }
        }
    }

    tracing::info!(
        user_id = %user_id,
        created = created.len(),
        "Default categories created"
    );

    created
}
