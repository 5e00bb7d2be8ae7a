//! SQLite storage for users, reflections and the social graph
//!
//! ## Tables
//!
//! - `users` - Accounts (username/email unique, argon2 password hash)
//! - `categories` / `sub_categories` - Per-user taxonomy
//! - `reflections` - Journal entries with visibility and JSON tags
//! - `actions` - Follow-up items attached to a reflection
//! - `reflection_tracking` - One row per (reflection, user, day) re-engagement
//! - `friendships` - Directed request rows, symmetric once accepted
//! - `reflection_reactions` / `reaction_prompts` - Typed reactions and their prompts
//!
//! Repositories are free functions over a borrowed `Connection`; services
//! reach them through [`Database::with_conn`] and [`Database::with_conn_mut`].

pub mod actions;
pub mod categories;
pub mod friendships;
pub mod reactions;
pub mod reflections;
pub mod schema;
pub mod tracking;
pub mod users;

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{ffi, Connection, ErrorCode};
use tracing::{debug, info};

use crate::error::AppError;

/// SQLite timestamp expression matching the stored `created_at` format
pub const SQL_NOW: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

/// Format a UTC instant the same way `SQL_NOW` does, so the two compare as text
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// SQLite database shared by all services
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create the database at `path` (":memory:" opens in-memory)
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        if path.as_os_str() == ":memory:" {
            return Self::open_in_memory();
        }

        info!("Opening SQLite database at {:?}", path);

        let conn = Connection::open(path)
            .map_err(|e| AppError::Database(format!("Failed to open SQLite: {}", e)))?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(|e| AppError::Database(format!("Failed to set PRAGMA: {}", e)))?;

        Self::from_connection(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self, AppError> {
        debug!("Opening in-memory SQLite database");

        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Database(format!("Failed to open in-memory SQLite: {}", e)))?;

        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, AppError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| AppError::Database(format!("Failed to enable foreign keys: {}", e)))?;

        schema::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run a read operation against the connection
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&Connection) -> Result<T, AppError>,
    {
        let conn = self.conn.lock()
            .map_err(|e| AppError::Internal(format!("Lock poisoned: {}", e)))?;
        f(&conn)
    }

    /// Execute a write operation with exclusive access
    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut Connection) -> Result<T, AppError>,
    {
        let mut conn = self.conn.lock()
            .map_err(|e| AppError::Internal(format!("Lock poisoned: {}", e)))?;
        f(&mut conn)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats, AppError> {
        self.with_conn(|conn| {
            let count = |table: &str| -> Result<u64, AppError> {
                conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get::<_, i64>(0)
                })
                .map(|n| n as u64)
                .map_err(|e| sql_error("Failed to count rows", e))
            };

            Ok(DbStats {
                user_count: count("users")?,
                reflection_count: count("reflections")?,
                friendship_count: count("friendships")?,
                reaction_count: count("reflection_reactions")?,
            })
        })
    }
}

/// Database statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct DbStats {
    pub user_count: u64,
    pub reflection_count: u64,
    pub friendship_count: u64,
    pub reaction_count: u64,
}

/// Map a rusqlite error into the application taxonomy.
///
/// Unique violations are the authoritative conflict signal for every
/// check-then-insert path, so they surface as `Conflict`.
pub fn sql_error(context: &str, err: rusqlite::Error) -> AppError {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err {
        if failure.code == ErrorCode::ConstraintViolation {
            return match failure.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    AppError::Conflict(format!("{}: record already exists", context))
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                    AppError::InvalidInput(format!("{}: referenced record does not exist", context))
                }
                _ => AppError::InvalidInput(format!("{}: {}", context, err)),
            };
        }
    }

    AppError::Database(format!("{}: {}", context, err))
}

/// Collect mapped rows, converting row errors
pub(crate) fn collect_rows<T>(
    rows: impl Iterator<Item = rusqlite::Result<T>>,
    context: &str,
) -> Result<Vec<T>, AppError> {
    let mut results = Vec::new();
    for row in rows {
        results.push(row.map_err(|e| sql_error(context, e))?);
    }
    Ok(results)
}

// Re-exports
pub use actions::{ActionRow, CreateActionInput, UpdateActionInput};
pub use categories::{CategoryRow, CreateCategoryInput, CreateSubCategoryInput, SubCategoryRow};
pub use friendships::{FriendshipRow, FriendshipStatus, FriendshipView};
pub use reactions::{ReactionCount, ReactionPromptRow, ReactionRow, ReactionType, ReactionView};
pub use reflections::{ReflectionInput, ReflectionRow, Visibility};
pub use tracking::{CategoryTrackingPoint, TrackingPoint};
pub use users::{CreateUserInput, UpdateUserInput, UserRow};
