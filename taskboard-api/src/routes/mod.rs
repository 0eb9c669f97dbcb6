/// API route handlers
///
/// - `health`: Health check endpoint
/// - `auth`: Register, login, refresh, logout
/// - `board`: Categories and tasks of the signed-in user

pub mod auth;
pub mod board;
pub mod health;
