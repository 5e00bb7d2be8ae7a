//! Friendship storage
//!
//! Each request is one directed row `(user_id = requester, friend_id = recipient)`.
//! Once accepted the relation is symmetric in meaning, so every "are friends"
//! lookup checks both orderings.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::users::display_name;
use super::{collect_rows, sql_error, SQL_NOW};
use crate::error::AppError;

// =============================================================================
// Types
// =============================================================================

/// Friendship lifecycle: pending → accepted | rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
    Rejected,
}

impl FriendshipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl ToSql for FriendshipStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for FriendshipStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(FromSqlError::Other(format!("unknown friendship status: {}", other).into())),
        }
    }
}

/// Friendship row from database
#[derive(Debug, Clone, Serialize)]
pub struct FriendshipRow {
    pub id: i64,
    pub user_id: i64,
    pub friend_id: i64,
    pub status: FriendshipStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl FriendshipRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            friend_id: row.get("friend_id")?,
            status: row.get("status")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Friendship joined with the counterpart's identity
#[derive(Debug, Clone, Serialize)]
pub struct FriendshipView {
    #[serde(flatten)]
    pub friendship: FriendshipRow,
    pub friend_username: String,
    pub friend_name: String,
}

impl FriendshipView {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let first_name: String = row.get("first_name")?;
        let last_name: String = row.get("last_name")?;

        Ok(Self {
            friendship: FriendshipRow::from_row(row)?,
            friend_username: row.get("username")?,
            friend_name: display_name(&first_name, &last_name),
        })
    }
}

const FRIENDSHIP_COLUMNS: &str = "id, user_id, friend_id, status, created_at, updated_at";

// =============================================================================
// Read Operations
// =============================================================================

/// Get a friendship by ID
pub fn get_friendship(conn: &Connection, id: i64) -> Result<Option<FriendshipRow>, AppError> {
    let sql = format!("SELECT {} FROM friendships WHERE id = ?", FRIENDSHIP_COLUMNS);
    conn.query_row(&sql, params![id], FriendshipRow::from_row)
        .optional()
        .map_err(|e| sql_error("Failed to get friendship", e))
}

/// Any row between the pair, in either direction and any status
pub fn find_between(conn: &Connection, a: i64, b: i64) -> Result<Option<FriendshipRow>, AppError> {
    let sql = format!(
        "SELECT {} FROM friendships
         WHERE (user_id = ?1 AND friend_id = ?2) OR (user_id = ?2 AND friend_id = ?1)
         LIMIT 1",
        FRIENDSHIP_COLUMNS
    );
    conn.query_row(&sql, params![a, b], FriendshipRow::from_row)
        .optional()
        .map_err(|e| sql_error("Failed to look up friendship", e))
}

/// True iff an accepted row exists in either direction
pub fn are_friends(conn: &Connection, a: i64, b: i64) -> Result<bool, AppError> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM friendships
                       WHERE ((user_id = ?1 AND friend_id = ?2) OR (user_id = ?2 AND friend_id = ?1))
                         AND status = 'accepted')",
        params![a, b],
        |row| row.get(0),
    )
    .map_err(|e| sql_error("Failed to check friendship", e))
}

/// Accepted friendships of a user, whichever side holds the row, newest first
pub fn list_friends(conn: &Connection, user_id: i64) -> Result<Vec<FriendshipView>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT * FROM (
             SELECT f.id AS id, f.user_id AS user_id, f.friend_id AS friend_id,
                    f.status AS status, f.created_at AS created_at, f.updated_at AS updated_at,
                    u.username AS username, u.first_name AS first_name, u.last_name AS last_name
             FROM friendships f
             JOIN users u ON u.id = f.friend_id
             WHERE f.user_id = ?1 AND f.status = 'accepted'
             UNION
             SELECT f.id, f.user_id, f.friend_id, f.status, f.created_at, f.updated_at,
                    u.username, u.first_name, u.last_name
             FROM friendships f
             JOIN users u ON u.id = f.user_id
             WHERE f.friend_id = ?1 AND f.status = 'accepted'
         )
         ORDER BY created_at DESC, id DESC",
    ).map_err(|e| sql_error("Failed to prepare statement", e))?;

    let rows = stmt.query_map(params![user_id], FriendshipView::from_row)
        .map_err(|e| sql_error("Failed to query friends", e))?;

    collect_rows(rows, "Failed to read friendship row")
}

/// Pending requests addressed to `user_id`, joined with the requester
pub fn list_pending_requests(conn: &Connection, user_id: i64) -> Result<Vec<FriendshipView>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT f.id, f.user_id, f.friend_id, f.status, f.created_at, f.updated_at,
                u.username, u.first_name, u.last_name
         FROM friendships f
         JOIN users u ON u.id = f.user_id
         WHERE f.friend_id = ? AND f.status = 'pending'
         ORDER BY f.created_at DESC, f.id DESC",
    ).map_err(|e| sql_error("Failed to prepare statement", e))?;

    let rows = stmt.query_map(params![user_id], FriendshipView::from_row)
        .map_err(|e| sql_error("Failed to query pending requests", e))?;

    collect_rows(rows, "Failed to read friendship row")
}

// =============================================================================
// Write Operations
// =============================================================================

/// Insert a pending request from `requester` to `recipient`
pub fn create_request(conn: &Connection, requester: i64, recipient: i64) -> Result<FriendshipRow, AppError> {
    conn.execute(
        "INSERT INTO friendships (user_id, friend_id, status) VALUES (?, ?, ?)",
        params![requester, recipient, FriendshipStatus::Pending],
    ).map_err(|e| sql_error("Failed to create friend request", e))?;

    get_friendship(conn, conn.last_insert_rowid())?
        .ok_or_else(|| AppError::Internal("Failed to retrieve created friendship".to_string()))
}

/// Move a pending request `requester → recipient` to `status`.
/// Returns None if no such pending row exists.
pub fn resolve_pending(
    conn: &Connection,
    requester: i64,
    recipient: i64,
    status: FriendshipStatus,
) -> Result<Option<FriendshipRow>, AppError> {
    let sql = format!(
        "UPDATE friendships SET status = ?, updated_at = {}
         WHERE user_id = ? AND friend_id = ? AND status = 'pending'",
        SQL_NOW
    );
    let rows = conn.execute(&sql, params![status, requester, recipient])
        .map_err(|e| sql_error("Failed to update friend request", e))?;

    if rows == 0 {
        return Ok(None);
    }

    let sql = format!(
        "SELECT {} FROM friendships WHERE user_id = ? AND friend_id = ?",
        FRIENDSHIP_COLUMNS
    );
    conn.query_row(&sql, params![requester, recipient], FriendshipRow::from_row)
        .optional()
        .map_err(|e| sql_error("Failed to get friendship", e))
}

/// Delete the row between the pair regardless of direction or status
pub fn delete_between(conn: &Connection, a: i64, b: i64) -> Result<bool, AppError> {
    let rows = conn.execute(
        "DELETE FROM friendships
         WHERE (user_id = ?1 AND friend_id = ?2) OR (user_id = ?2 AND friend_id = ?1)",
        params![a, b],
    ).map_err(|e| sql_error("Failed to remove friendship", e))?;
    Ok(rows > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn seed_users(conn: &Connection) -> (i64, i64) {
        conn.execute_batch(
            "INSERT INTO users (username, email, first_name, last_name)
                 VALUES ('ada', 'ada@example.com', 'Ada', 'Lovelace');
             INSERT INTO users (username, email, first_name, last_name)
                 VALUES ('bob', 'bob@example.com', 'Bob', '');",
        )
        .unwrap();
        (1, 2)
    }

    #[test]
    fn test_second_request_between_pair_is_conflict() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            let (ada, bob) = seed_users(conn);
            let row = create_request(conn, ada, bob)?;
            assert_eq!(row.status, FriendshipStatus::Pending);

            let same_direction = create_request(conn, ada, bob).unwrap_err();
            assert!(matches!(same_direction, AppError::Conflict(_)));

            let reverse = create_request(conn, bob, ada).unwrap_err();
            assert!(matches!(reverse, AppError::Conflict(_)));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_list_friends_from_either_side() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            let (ada, bob) = seed_users(conn);
            assert!(list_friends(conn, ada)?.is_empty());

            create_request(conn, ada, bob)?;
            assert!(list_friends(conn, ada)?.is_empty());

            resolve_pending(conn, ada, bob, FriendshipStatus::Accepted)?.unwrap();

            let ada_friends = list_friends(conn, ada)?;
            assert_eq!(ada_friends.len(), 1);
            assert_eq!(ada_friends[0].friend_username, "bob");
            assert_eq!(ada_friends[0].friend_name, "Bob");

            let bob_friends = list_friends(conn, bob)?;
            assert_eq!(bob_friends.len(), 1);
            assert_eq!(bob_friends[0].friend_username, "ada");
            assert_eq!(bob_friends[0].friend_name, "Ada Lovelace");
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_list_friends_newest_first() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            let (ada, bob) = seed_users(conn);
            conn.execute(
                "INSERT INTO users (username, email) VALUES ('cy', 'cy@example.com')",
                [],
            )
            .unwrap();
            let cy = conn.last_insert_rowid();

            create_request(conn, ada, bob)?;
            resolve_pending(conn, ada, bob, FriendshipStatus::Accepted)?;
            create_request(conn, cy, ada)?;
            resolve_pending(conn, cy, ada, FriendshipStatus::Accepted)?;
            conn.execute(
                "UPDATE friendships SET created_at = '2020-01-01T00:00:00.000Z' WHERE user_id = ?",
                params![ada],
            )
            .unwrap();

            let names: Vec<_> = list_friends(conn, ada)?
                .into_iter()
                .map(|f| f.friend_username)
                .collect();
            assert_eq!(names, vec!["cy", "bob"]);
            Ok(())
        })
        .unwrap();
    }
}
