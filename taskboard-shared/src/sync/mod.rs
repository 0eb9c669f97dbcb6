/// Client-side board state and its synchronization with the store
///
/// # Components
///
/// - `controller`: owns the in-memory board and applies changes only after
///   the store confirms them
/// - `gateway`: the store contract, with `postgres` and `memory` backends
/// - `bootstrap`: starter categories for a user's first load
/// - `colors`: palette and color allocation for new categories
/// - `session`: the signed-in user's identity

pub mod bootstrap;
pub mod colors;
pub mod controller;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod postgres;
pub mod session;
pub mod types;

pub use colors::{CategoryColor, PALETTE};
pub use controller::{Controller, ControllerConfig, DEFAULT_LOAD_TIMEOUT};
pub use error::{SyncError, SyncResult};
pub use gateway::{Gateway, GatewayError, GatewayResult, TaskPatch};
pub use memory::InMemoryGateway;
pub use postgres::PgGateway;
pub use session::Session;
pub use types::{Category, Direction, LoadSource, MoveOutcome, Task};
