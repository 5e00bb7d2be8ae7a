//! Reflection server - REST backend for personal journaling
//!
//! Users record reflections tagged by category, attach follow-up action items,
//! track daily re-engagement with past reflections, befriend other users, and
//! react to friends' public reflections.
//!
//! ## Layers
//!
//! ```text
//! routes (HTTP decode/encode)
//!     ↓
//! services (validation, orchestration, events)
//!     ↓
//! db (rusqlite repositories)
//!     ↓
//! SQLite
//! ```

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod server;
pub mod services;

pub use config::Args;
pub use db::Database;
pub use error::AppError;
pub use server::{run, AppState};
pub use services::Services;
