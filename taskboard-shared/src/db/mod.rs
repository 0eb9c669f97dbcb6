/// Database layer for Taskboard
///
/// This module provides database connection pooling and migrations.
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool with a liveness ping
/// - `migrations`: Database migration runner
/// - Storage records live in the `models` module at crate root level
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::db::pool::{self, PoolSettings};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let settings = PoolSettings::new(std::env::var("DATABASE_URL")?, 10);
///     let pool = pool::connect(&settings).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
