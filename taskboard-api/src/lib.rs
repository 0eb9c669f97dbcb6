//! # Taskboard API Server Library
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Response middleware
//! - `routes`: API route handlers
//! - `sessions`: Live board controllers per signed-in user

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod sessions;
