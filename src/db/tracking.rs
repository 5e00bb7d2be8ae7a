//! Reflection tracking: one row per (reflection, user, calendar day)
//!
//! Presence of a row is the whole state. Toggling deletes rather than
//! decrements, and lifetime counts are the number of distinct days.

use rusqlite::{params, Connection, Row};
use serde::Serialize;
use tracing::debug;

use super::{collect_rows, sql_error};
use crate::error::AppError;

/// Tracking totals for a single day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackingPoint {
    pub date: String,
    pub reflection_count: i64,
    pub unique_reflections: i64,
}

impl TrackingPoint {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            date: row.get(0)?,
            reflection_count: row.get(1)?,
            unique_reflections: row.get(2)?,
        })
    }
}

/// Reflections written per day and category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTrackingPoint {
    pub date: String,
    pub category: String,
    pub reflection_count: i64,
}

impl CategoryTrackingPoint {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            date: row.get(0)?,
            category: row.get(1)?,
            reflection_count: row.get(2)?,
        })
    }
}

/// Whether a tracking row exists for the given day
pub fn is_tracked(conn: &Connection, reflection_id: i64, user_id: i64, date: &str) -> Result<bool, AppError> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM reflection_tracking
                       WHERE reflection_id = ? AND user_id = ? AND reflected_date = ?)",
        params![reflection_id, user_id, date],
        |row| row.get(0),
    )
    .map_err(|e| sql_error("Failed to check reflection tracking", e))
}

/// Number of distinct days the user has tracked this reflection
pub fn count_tracked_days(conn: &Connection, reflection_id: i64, user_id: i64) -> Result<i64, AppError> {
    conn.query_row(
        "SELECT COUNT(DISTINCT reflected_date) FROM reflection_tracking
         WHERE reflection_id = ? AND user_id = ?",
        params![reflection_id, user_id],
        |row| row.get(0),
    )
    .map_err(|e| sql_error("Failed to count reflection tracking", e))
}

/// Flip the tracking marker for one day. Returns true if the day is now tracked.
///
/// A concurrent insert for the same day loses on the unique constraint and
/// surfaces as `Conflict`.
pub fn toggle_tracking(
    conn: &mut Connection,
    reflection_id: i64,
    user_id: i64,
    date: &str,
) -> Result<bool, AppError> {
    let tx = conn.transaction()
        .map_err(|e| sql_error("Failed to begin transaction", e))?;

    let removed = tx.execute(
        "DELETE FROM reflection_tracking
         WHERE reflection_id = ? AND user_id = ? AND reflected_date = ?",
        params![reflection_id, user_id, date],
    ).map_err(|e| sql_error("Failed to remove reflection tracking", e))?;

    let tracked = if removed > 0 {
        debug!(reflection_id, user_id, date, "tracking removed");
        false
    } else {
        tx.execute(
            "INSERT INTO reflection_tracking (reflection_id, user_id, reflected_date) VALUES (?, ?, ?)",
            params![reflection_id, user_id, date],
        ).map_err(|e| sql_error("Failed to record reflection tracking", e))?;
        debug!(reflection_id, user_id, date, "tracking recorded");
        true
    };

    tx.commit()
        .map_err(|e| sql_error("Failed to commit transaction", e))?;

    Ok(tracked)
}

/// Per-day tracking totals for a user within [start, end] (inclusive)
pub fn tracking_by_date(
    conn: &Connection,
    user_id: i64,
    start: &str,
    end: &str,
) -> Result<Vec<TrackingPoint>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT reflected_date, COUNT(*), COUNT(DISTINCT reflection_id)
         FROM reflection_tracking
         WHERE user_id = ? AND reflected_date >= ? AND reflected_date <= ?
         GROUP BY reflected_date
         ORDER BY reflected_date ASC",
    ).map_err(|e| sql_error("Failed to prepare statement", e))?;

    let rows = stmt.query_map(params![user_id, start, end], TrackingPoint::from_row)
        .map_err(|e| sql_error("Failed to query tracking analytics", e))?;

    collect_rows(rows, "Failed to read tracking row")
}

/// Reflections authored per (creation day, category) within [start, end] (inclusive)
pub fn reflections_by_category(
    conn: &Connection,
    user_id: i64,
    start: &str,
    end: &str,
) -> Result<Vec<CategoryTrackingPoint>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT substr(r.created_at, 1, 10) AS day, c.name, COUNT(*)
         FROM reflections r
         JOIN categories c ON c.id = r.category_id
         WHERE r.author_id = ? AND substr(r.created_at, 1, 10) >= ? AND substr(r.created_at, 1, 10) <= ?
         GROUP BY day, c.name
         ORDER BY day, c.name",
    ).map_err(|e| sql_error("Failed to prepare statement", e))?;

    let rows = stmt.query_map(params![user_id, start, end], CategoryTrackingPoint::from_row)
        .map_err(|e| sql_error("Failed to query category analytics", e))?;

    collect_rows(rows, "Failed to read category analytics row")
}
