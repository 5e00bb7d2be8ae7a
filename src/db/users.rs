//! User account storage

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::{collect_rows, sql_error, SQL_NOW};
use crate::error::AppError;

// =============================================================================
// Types
// =============================================================================

/// User row from database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: String,
    pub updated_at: String,
}

impl UserRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            username: row.get("username")?,
            email: row.get("email")?,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            password_hash: row.get("password_hash")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// "First Last", as shown next to feed entries, friends and reactions
pub fn display_name(first_name: &str, last_name: &str) -> String {
    format!("{} {}", first_name, last_name).trim().to_string()
}

/// Input for creating a user
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateUserInput {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Already-hashed credential; services never pass plaintext here
    #[serde(skip)]
    pub password_hash: String,
}

/// Input for updating a user profile
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserInput {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

const USER_COLUMNS: &str =
    "id, username, email, first_name, last_name, password_hash, created_at, updated_at";

// =============================================================================
// CRUD Operations
// =============================================================================

/// Get a user by ID
pub fn get_user(conn: &Connection, id: i64) -> Result<Option<UserRow>, AppError> {
    let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
    conn.query_row(&sql, params![id], UserRow::from_row)
        .optional()
        .map_err(|e| sql_error("Failed to get user", e))
}

/// Get a user by exact username
pub fn get_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>, AppError> {
    let sql = format!("SELECT {} FROM users WHERE username = ?", USER_COLUMNS);
    conn.query_row(&sql, params![username], UserRow::from_row)
        .optional()
        .map_err(|e| sql_error("Failed to get user by username", e))
}

/// Get a user by exact email
pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<UserRow>, AppError> {
    let sql = format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS);
    conn.query_row(&sql, params![email], UserRow::from_row)
        .optional()
        .map_err(|e| sql_error("Failed to get user by email", e))
}

/// Create a new user
pub fn create_user(conn: &Connection, input: &CreateUserInput) -> Result<UserRow, AppError> {
    conn.execute(
        "INSERT INTO users (username, email, first_name, last_name, password_hash)
         VALUES (?, ?, ?, ?, ?)",
        params![
            input.username,
            input.email,
            input.first_name,
            input.last_name,
            input.password_hash,
        ],
    ).map_err(|e| sql_error("Failed to create user", e))?;

    get_user(conn, conn.last_insert_rowid())?
        .ok_or_else(|| AppError::Internal("Failed to retrieve created user".to_string()))
}

/// Update profile fields. Returns None if the user does not exist.
pub fn update_user(conn: &Connection, id: i64, input: &UpdateUserInput) -> Result<Option<UserRow>, AppError> {
    let sql = format!(
        "UPDATE users SET username = ?, email = ?, first_name = ?, last_name = ?, updated_at = {}
         WHERE id = ?",
        SQL_NOW
    );
    let rows = conn.execute(
        &sql,
        params![input.username, input.email, input.first_name, input.last_name, id],
    ).map_err(|e| sql_error("Failed to update user", e))?;

    if rows == 0 {
        return Ok(None);
    }
    get_user(conn, id)
}

/// Delete a user by ID (cascades to everything the user owns)
pub fn delete_user(conn: &Connection, id: i64) -> Result<bool, AppError> {
    let rows = conn.execute("DELETE FROM users WHERE id = ?", params![id])
        .map_err(|e| sql_error("Failed to delete user", e))?;
    Ok(rows > 0)
}

/// Case-insensitive substring search on username
pub fn search_users(conn: &Connection, query: &str, limit: i64) -> Result<Vec<UserRow>, AppError> {
    let pattern = format!("%{}%", escape_like(query));
    let sql = format!(
        "SELECT {} FROM users WHERE username LIKE ? ESCAPE '\\' ORDER BY username LIMIT ?",
        USER_COLUMNS
    );

    let mut stmt = conn.prepare(&sql)
        .map_err(|e| sql_error("Failed to prepare statement", e))?;
    let rows = stmt.query_map(params![pattern, limit], UserRow::from_row)
        .map_err(|e| sql_error("Failed to search users", e))?;

    collect_rows(rows, "Failed to read user row")
}

fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn input(username: &str) -> CreateUserInput {
        CreateUserInput {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            password_hash: String::new(),
        }
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            create_user(conn, &input("AliceW"))?;
            create_user(conn, &input("malice"))?;
            create_user(conn, &input("bob"))?;

            let found = search_users(conn, "alice", 10)?;
            let names: Vec<_> = found.iter().map(|u| u.username.as_str()).collect();
            assert_eq!(names, vec!["AliceW", "malice"]);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_search_escapes_wildcards() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            create_user(conn, &input("bob"))?;
            assert!(search_users(conn, "%", 10)?.is_empty());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = UserRow {
            id: 1,
            username: "a".into(),
            email: "a@example.com".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            password_hash: "$argon2id$secret".into(),
            created_at: String::new(),
            updated_at: String::new(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
    }

    #[test]
    fn test_display_name_trims_missing_parts() {
        assert_eq!(display_name("Ada", "Lovelace"), "Ada Lovelace");
        assert_eq!(display_name("Ada", ""), "Ada");
        assert_eq!(display_name("", "Lovelace"), "Lovelace");
    }
}
