//! Action item storage

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::{collect_rows, sql_error, SQL_NOW};
use crate::error::AppError;

pub const STATUS_PENDING: &str = "Pending";
pub const STATUS_DONE: &str = "Done";
pub const DEFAULT_PRIORITY: &str = "Medium";

/// Action item row from database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRow {
    pub id: i64,
    pub reflection_id: i64,
    pub action: String,
    pub priority: String,
    pub status: String,
    pub due_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl ActionRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            reflection_id: row.get("reflection_id")?,
            action: row.get("action")?,
            priority: row.get("priority")?,
            status: row.get("status")?,
            due_date: row.get("due_date")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Input for creating an action item
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateActionInput {
    #[serde(default)]
    pub reflection_id: i64,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
}

/// Input for updating an action item
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateActionInput {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
}

const ACTION_COLUMNS: &str =
    "id, reflection_id, action, priority, status, due_date, created_at, updated_at";

/// Get an action by ID
pub fn get_action(conn: &Connection, id: i64) -> Result<Option<ActionRow>, AppError> {
    let sql = format!("SELECT {} FROM actions WHERE id = ?", ACTION_COLUMNS);
    conn.query_row(&sql, params![id], ActionRow::from_row)
        .optional()
        .map_err(|e| sql_error("Failed to get action", e))
}

/// Actions attached to a reflection, oldest first
pub fn list_by_reflection(conn: &Connection, reflection_id: i64) -> Result<Vec<ActionRow>, AppError> {
    let sql = format!(
        "SELECT {} FROM actions WHERE reflection_id = ? ORDER BY created_at ASC, id ASC",
        ACTION_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)
        .map_err(|e| sql_error("Failed to prepare statement", e))?;
    let rows = stmt.query_map(params![reflection_id], ActionRow::from_row)
        .map_err(|e| sql_error("Failed to query actions", e))?;

    collect_rows(rows, "Failed to read action row")
}

/// Create a new action item with already-defaulted priority and status
pub fn create_action(
    conn: &Connection,
    reflection_id: i64,
    action: &str,
    priority: &str,
    status: &str,
    due_date: Option<&str>,
) -> Result<ActionRow, AppError> {
    conn.execute(
        "INSERT INTO actions (reflection_id, action, priority, status, due_date) VALUES (?, ?, ?, ?, ?)",
        params![reflection_id, action, priority, status, due_date],
    ).map_err(|e| sql_error("Failed to create action", e))?;

    get_action(conn, conn.last_insert_rowid())?
        .ok_or_else(|| AppError::Internal("Failed to retrieve created action".to_string()))
}

/// Overwrite an action's editable fields. Returns None if missing.
pub fn update_action(
    conn: &Connection,
    id: i64,
    action: &str,
    priority: &str,
    status: &str,
    due_date: Option<&str>,
) -> Result<Option<ActionRow>, AppError> {
    let sql = format!(
        "UPDATE actions SET action = ?, priority = ?, status = ?, due_date = ?, updated_at = {}
         WHERE id = ?",
        SQL_NOW
    );
    let rows = conn.execute(&sql, params![action, priority, status, due_date, id])
        .map_err(|e| sql_error("Failed to update action", e))?;

    if rows == 0 {
        return Ok(None);
    }
    get_action(conn, id)
}

/// Set only the status. Returns None if missing.
pub fn update_status(conn: &Connection, id: i64, status: &str) -> Result<Option<ActionRow>, AppError> {
    let sql = format!("UPDATE actions SET status = ?, updated_at = {} WHERE id = ?", SQL_NOW);
    let rows = conn.execute(&sql, params![status, id])
        .map_err(|e| sql_error("Failed to update action status", e))?;

    if rows == 0 {
        return Ok(None);
    }
    get_action(conn, id)
}

/// Delete an action by ID
pub fn delete_action(conn: &Connection, id: i64) -> Result<bool, AppError> {
    let rows = conn.execute("DELETE FROM actions WHERE id = ?", params![id])
        .map_err(|e| sql_error("Failed to delete action", e))?;
    Ok(rows > 0)
}
