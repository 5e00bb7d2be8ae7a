//! Reflection reactions and reaction prompts

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::users::display_name;
use super::{collect_rows, sql_error};
use crate::error::AppError;

// =============================================================================
// Types
// =============================================================================

/// Closed set of reactions a friend can leave on a reflection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionType {
    AskMeAboutThis,
    SimilarExperience,
    UpdateMe,
    AccountabilityBuddy,
    DifferentAngle,
    Favorite,
}

impl ReactionType {
    pub const ALL: [ReactionType; 6] = [
        Self::AskMeAboutThis,
        Self::SimilarExperience,
        Self::UpdateMe,
        Self::AccountabilityBuddy,
        Self::DifferentAngle,
        Self::Favorite,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AskMeAboutThis => "ask_me_about_this",
            Self::SimilarExperience => "similar_experience",
            Self::UpdateMe => "update_me",
            Self::AccountabilityBuddy => "accountability_buddy",
            Self::DifferentAngle => "different_angle",
            Self::Favorite => "favorite",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

impl ToSql for ReactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ReactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        Self::parse(text).ok_or_else(|| FromSqlError::Other(format!("unknown reaction type: {}", text).into()))
    }
}

/// Reaction row from database
#[derive(Debug, Clone, Serialize)]
pub struct ReactionRow {
    pub id: i64,
    pub reflection_id: i64,
    pub user_id: i64,
    pub reaction_type: ReactionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_text: Option<String>,
    pub created_at: String,
}

impl ReactionRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            reflection_id: row.get("reflection_id")?,
            user_id: row.get("user_id")?,
            reaction_type: row.get("reaction_type")?,
            comment_text: row.get("comment_text")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// Reaction joined with the reacting user's identity
#[derive(Debug, Clone, Serialize)]
pub struct ReactionView {
    #[serde(flatten)]
    pub reaction: ReactionRow,
    pub username: String,
    pub user_name: String,
}

impl ReactionView {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let first_name: String = row.get("first_name")?;
        let last_name: String = row.get("last_name")?;

        Ok(Self {
            reaction: ReactionRow::from_row(row)?,
            username: row.get("username")?,
            user_name: display_name(&first_name, &last_name),
        })
    }
}

/// Number of reactions of one type on a reflection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReactionCount {
    pub reaction_type: ReactionType,
    pub count: i64,
}

/// Suggested follow-up prompt for a reaction type
#[derive(Debug, Clone, Serialize)]
pub struct ReactionPromptRow {
    pub id: i64,
    pub reaction_type: ReactionType,
    pub prompt_text: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

const REACTION_COLUMNS: &str = "id, reflection_id, user_id, reaction_type, comment_text, created_at";

const REACTION_VIEW_SELECT: &str = "
    SELECT rr.id, rr.reflection_id, rr.user_id, rr.reaction_type, rr.comment_text, rr.created_at,
           u.username, u.first_name, u.last_name
    FROM reflection_reactions rr
    JOIN users u ON u.id = rr.user_id";

// =============================================================================
// Reactions
// =============================================================================

/// Get a reaction by ID
pub fn get_reaction(conn: &Connection, id: i64) -> Result<Option<ReactionRow>, AppError> {
    let sql = format!("SELECT {} FROM reflection_reactions WHERE id = ?", REACTION_COLUMNS);
    conn.query_row(&sql, params![id], ReactionRow::from_row)
        .optional()
        .map_err(|e| sql_error("Failed to get reaction", e))
}

/// Whether the user already left this reaction type on the reflection
pub fn reaction_exists(
    conn: &Connection,
    reflection_id: i64,
    user_id: i64,
    reaction_type: ReactionType,
) -> Result<bool, AppError> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM reflection_reactions
                       WHERE reflection_id = ? AND user_id = ? AND reaction_type = ?)",
        params![reflection_id, user_id, reaction_type],
        |row| row.get(0),
    )
    .map_err(|e| sql_error("Failed to check reaction", e))
}

/// Insert a reaction
pub fn add_reaction(
    conn: &Connection,
    reflection_id: i64,
    user_id: i64,
    reaction_type: ReactionType,
    comment_text: Option<&str>,
) -> Result<ReactionRow, AppError> {
    conn.execute(
        "INSERT INTO reflection_reactions (reflection_id, user_id, reaction_type, comment_text)
         VALUES (?, ?, ?, ?)",
        params![reflection_id, user_id, reaction_type, comment_text],
    ).map_err(|e| sql_error("Failed to add reaction", e))?;

    get_reaction(conn, conn.last_insert_rowid())?
        .ok_or_else(|| AppError::Internal("Failed to retrieve created reaction".to_string()))
}

/// Remove one reaction type left by a user
pub fn remove_reaction(
    conn: &Connection,
    reflection_id: i64,
    user_id: i64,
    reaction_type: ReactionType,
) -> Result<bool, AppError> {
    let rows = conn.execute(
        "DELETE FROM reflection_reactions WHERE reflection_id = ? AND user_id = ? AND reaction_type = ?",
        params![reflection_id, user_id, reaction_type],
    ).map_err(|e| sql_error("Failed to remove reaction", e))?;
    Ok(rows > 0)
}

/// All reactions on a reflection with the reacting user's names, oldest first
pub fn list_for_reflection(conn: &Connection, reflection_id: i64) -> Result<Vec<ReactionView>, AppError> {
    let sql = format!(
        "{} WHERE rr.reflection_id = ? ORDER BY rr.created_at ASC, rr.id ASC",
        REACTION_VIEW_SELECT
    );
    let mut stmt = conn.prepare(&sql)
        .map_err(|e| sql_error("Failed to prepare statement", e))?;

    let rows = stmt.query_map(params![reflection_id], ReactionView::from_row)
        .map_err(|e| sql_error("Failed to query reactions", e))?;

    collect_rows(rows, "Failed to read reaction row")
}

/// Reaction totals grouped by type
pub fn count_by_type(conn: &Connection, reflection_id: i64) -> Result<Vec<ReactionCount>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT reaction_type, COUNT(*) FROM reflection_reactions
         WHERE reflection_id = ?
         GROUP BY reaction_type
         ORDER BY reaction_type",
    ).map_err(|e| sql_error("Failed to prepare statement", e))?;

    let rows = stmt.query_map(params![reflection_id], |row| {
        Ok(ReactionCount {
            reaction_type: row.get(0)?,
            count: row.get(1)?,
        })
    }).map_err(|e| sql_error("Failed to count reactions", e))?;

    collect_rows(rows, "Failed to read reaction count")
}

/// The user's earliest reaction on a reflection, if any
pub fn get_user_reaction(
    conn: &Connection,
    reflection_id: i64,
    user_id: i64,
) -> Result<Option<ReactionView>, AppError> {
    let sql = format!(
        "{} WHERE rr.reflection_id = ? AND rr.user_id = ?
         ORDER BY rr.created_at ASC, rr.id ASC LIMIT 1",
        REACTION_VIEW_SELECT
    );
    conn.query_row(&sql, params![reflection_id, user_id], ReactionView::from_row)
        .optional()
        .map_err(|e| sql_error("Failed to get user reaction", e))
}

// =============================================================================
// Prompts
// =============================================================================

/// Active prompts ordered by reaction type
pub fn list_active_prompts(conn: &Connection) -> Result<Vec<ReactionPromptRow>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT id, reaction_type, prompt_text, is_active, created_at, updated_at
         FROM reaction_prompts
         WHERE is_active = 1
         ORDER BY reaction_type",
    ).map_err(|e| sql_error("Failed to prepare statement", e))?;

    let rows = stmt.query_map([], |row| {
        Ok(ReactionPromptRow {
            id: row.get("id")?,
            reaction_type: row.get("reaction_type")?,
            prompt_text: row.get("prompt_text")?,
            is_active: row.get("is_active")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }).map_err(|e| sql_error("Failed to query reaction prompts", e))?;

    collect_rows(rows, "Failed to read reaction prompt")
}
