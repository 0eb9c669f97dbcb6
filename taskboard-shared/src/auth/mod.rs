/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and validation
/// - [`jwt`]: JWT access/refresh token generation and validation
///
/// A successful sign-in produces a `sync::Session`, which is what the board
/// controller consumes; nothing in `sync` depends on this module.

pub mod jwt;
pub mod password;
