//! # Taskboard Shared Library
//!
//! Board state, persistence and authentication used by the Taskboard API
//! server.
//!
//! ## Module Organization
//!
//! - `sync`: In-memory board controller and the store gateway behind it
//! - `models`: Stored records and their queries
//! - `db`: Connection pool and migrations
//! - `auth`: Password hashing and JWT tokens

pub mod auth;
pub mod db;
pub mod models;
pub mod sync;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
