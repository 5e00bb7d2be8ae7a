//! Reflection storage and the friend-scoped feed queries

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Type, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::actions::ActionRow;
use super::categories::{CategoryRow, SubCategoryRow};
use super::users::display_name;
use super::{collect_rows, sql_error, SQL_NOW};
use crate::error::AppError;

// =============================================================================
// Types
// =============================================================================

/// Who may see a reflection besides its author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Private,
    Public,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Public => "public",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "private" => Some(Self::Private),
            "public" => Some(Self::Public),
            _ => None,
        }
    }
}

impl ToSql for Visibility {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Visibility {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        Self::parse(text).ok_or_else(|| FromSqlError::Other(format!("unknown visibility: {}", text).into()))
    }
}

/// Reflection row, optionally enriched with related data
#[derive(Debug, Clone, Serialize)]
pub struct ReflectionRow {
    pub id: i64,
    pub author_id: i64,
    pub category_id: i64,
    pub sub_category_id: Option<i64>,
    /// Calendar date (YYYY-MM-DD)
    pub date: String,
    pub reflection_text: String,
    pub reflection_detail: String,
    pub tags: Vec<String>,
    pub is_private: bool,
    pub visibility: Visibility,
    pub created_at: String,
    pub updated_at: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<SubCategoryRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionRow>,

    pub reflection_count: i64,
    pub reflected_today: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
}

impl ReflectionRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let raw_tags: serde_json::Value = row.get("tags")?;
        let tags: Vec<String> = serde_json::from_value(raw_tags)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(TAGS_COLUMN, Type::Text, Box::new(e)))?;

        let category = CategoryRow {
            id: row.get("c_id")?,
            user_id: row.get("c_user_id")?,
            name: row.get("c_name")?,
            description: row.get("c_description")?,
            parent_id: row.get("c_parent_id")?,
            created_at: row.get("c_created_at")?,
        };

        let sub_category = match row.get::<_, Option<i64>>("s_id")? {
            Some(id) => Some(SubCategoryRow {
                id,
                category_id: row.get("s_category_id")?,
                name: row.get("s_name")?,
                description: row.get("s_description")?,
                created_at: row.get("s_created_at")?,
            }),
            None => None,
        };

        let first_name: String = row.get("author_first_name")?;
        let last_name: String = row.get("author_last_name")?;

        Ok(Self {
            id: row.get("id")?,
            author_id: row.get("author_id")?,
            category_id: row.get("category_id")?,
            sub_category_id: row.get("sub_category_id")?,
            date: row.get("date")?,
            reflection_text: row.get("reflection_text")?,
            reflection_detail: row.get("reflection_detail")?,
            tags,
            is_private: row.get("is_private")?,
            visibility: row.get("visibility")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
            category: Some(category),
            sub_category,
            actions: Vec::new(),
            reflection_count: 0,
            reflected_today: false,
            author_username: Some(row.get("author_username")?),
            author_name: Some(display_name(&first_name, &last_name)),
        })
    }
}

/// Request body for creating or updating a reflection
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReflectionInput {
    #[serde(default)]
    pub author_id: i64,
    #[serde(default)]
    pub category_id: i64,
    #[serde(default)]
    pub sub_category_id: Option<i64>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub reflection_text: String,
    #[serde(default)]
    pub reflection_detail: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_private: bool,
    /// "private", "public", or empty to derive from `is_private`
    #[serde(default)]
    pub visibility: Option<String>,
}

/// Validated reflection values ready to be written
#[derive(Debug, Clone)]
pub struct ReflectionRecord {
    pub author_id: i64,
    pub category_id: i64,
    pub sub_category_id: Option<i64>,
    pub date: String,
    pub reflection_text: String,
    pub reflection_detail: String,
    pub tags: Vec<String>,
    pub visibility: Visibility,
}

// Position of `r.tags` in REFLECTION_SELECT
const TAGS_COLUMN: usize = 7;

const REFLECTION_SELECT: &str = "
    SELECT r.id, r.author_id, r.category_id, r.sub_category_id, r.date,
           r.reflection_text, r.reflection_detail, r.tags, r.is_private, r.visibility,
           r.created_at, r.updated_at,
           u.username AS author_username, u.first_name AS author_first_name,
           u.last_name AS author_last_name,
           c.id AS c_id, c.user_id AS c_user_id, c.name AS c_name,
           c.description AS c_description, c.parent_id AS c_parent_id,
           c.created_at AS c_created_at,
           s.id AS s_id, s.category_id AS s_category_id, s.name AS s_name,
           s.description AS s_description, s.created_at AS s_created_at
    FROM reflections r
    JOIN users u ON u.id = r.author_id
    JOIN categories c ON c.id = r.category_id
    LEFT JOIN sub_categories s ON s.id = r.sub_category_id";

fn query_reflections(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> Result<Vec<ReflectionRow>, AppError> {
    let mut stmt = conn.prepare(sql)
        .map_err(|e| sql_error("Failed to prepare statement", e))?;
    let rows = stmt.query_map(params, ReflectionRow::from_row)
        .map_err(|e| sql_error("Failed to query reflections", e))?;

    collect_rows(rows, "Failed to read reflection row")
}

// =============================================================================
// CRUD Operations
// =============================================================================

/// Get a reflection by ID (joined with author, category and subcategory)
pub fn get_reflection(conn: &Connection, id: i64) -> Result<Option<ReflectionRow>, AppError> {
    let sql = format!("{} WHERE r.id = ?", REFLECTION_SELECT);
    conn.query_row(&sql, params![id], ReflectionRow::from_row)
        .optional()
        .map_err(|e| sql_error("Failed to get reflection", e))
}

/// Resolve the author of a reflection
pub fn get_reflection_author(conn: &Connection, id: i64) -> Result<Option<i64>, AppError> {
    conn.query_row(
        "SELECT author_id FROM reflections WHERE id = ?",
        params![id],
        |row| row.get(0),
    )
    .optional()
    .map_err(|e| sql_error("Failed to get reflection author", e))
}

/// All reflections of an author, newest date first
pub fn list_by_author(conn: &Connection, author_id: i64) -> Result<Vec<ReflectionRow>, AppError> {
    let sql = format!(
        "{} WHERE r.author_id = ? ORDER BY r.date DESC, r.created_at DESC, r.id DESC",
        REFLECTION_SELECT
    );
    query_reflections(conn, &sql, params![author_id])
}

/// An author's reflections within one category, newest date first
pub fn list_by_category(
    conn: &Connection,
    author_id: i64,
    category_id: i64,
) -> Result<Vec<ReflectionRow>, AppError> {
    let sql = format!(
        "{} WHERE r.author_id = ? AND r.category_id = ?
         ORDER BY r.date DESC, r.created_at DESC, r.id DESC",
        REFLECTION_SELECT
    );
    query_reflections(conn, &sql, params![author_id, category_id])
}

/// Create a new reflection
pub fn create_reflection(conn: &Connection, record: &ReflectionRecord) -> Result<ReflectionRow, AppError> {
    let tags = serde_json::Value::from(record.tags.clone());

    conn.execute(
        "INSERT INTO reflections (author_id, category_id, sub_category_id, date, reflection_text,
                                  reflection_detail, tags, is_private, visibility)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            record.author_id,
            record.category_id,
            record.sub_category_id,
            record.date,
            record.reflection_text,
            record.reflection_detail,
            tags,
            record.visibility == Visibility::Private,
            record.visibility,
        ],
    ).map_err(|e| sql_error("Failed to create reflection", e))?;

    get_reflection(conn, conn.last_insert_rowid())?
        .ok_or_else(|| AppError::Internal("Failed to retrieve created reflection".to_string()))
}

/// Update a reflection's content. The author never changes.
pub fn update_reflection(
    conn: &Connection,
    id: i64,
    record: &ReflectionRecord,
) -> Result<Option<ReflectionRow>, AppError> {
    let tags = serde_json::Value::from(record.tags.clone());
    let sql = format!(
        "UPDATE reflections SET category_id = ?, sub_category_id = ?, date = ?, reflection_text = ?,
                reflection_detail = ?, tags = ?, is_private = ?, visibility = ?, updated_at = {}
         WHERE id = ?",
        SQL_NOW
    );

    let rows = conn.execute(
        &sql,
        params![
            record.category_id,
            record.sub_category_id,
            record.date,
            record.reflection_text,
            record.reflection_detail,
            tags,
            record.visibility == Visibility::Private,
            record.visibility,
            id,
        ],
    ).map_err(|e| sql_error("Failed to update reflection", e))?;

    if rows == 0 {
        return Ok(None);
    }
    get_reflection(conn, id)
}

/// Delete a reflection (cascades to actions, tracking rows and reactions)
pub fn delete_reflection(conn: &Connection, id: i64) -> Result<bool, AppError> {
    let rows = conn.execute("DELETE FROM reflections WHERE id = ?", params![id])
        .map_err(|e| sql_error("Failed to delete reflection", e))?;
    Ok(rows > 0)
}

// =============================================================================
// Feed Queries
// =============================================================================

/// Public reflections by any accepted friend of `viewer_id` created at or after `since`.
///
/// The friend set is resolved in both directions: either party may hold the
/// stored row.
pub fn list_friends_feed(
    conn: &Connection,
    viewer_id: i64,
    since: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<ReflectionRow>, AppError> {
    let sql = format!(
        "{} WHERE r.visibility = 'public'
           AND r.created_at >= ?2
           AND r.author_id IN (
               SELECT CASE WHEN f.user_id = ?1 THEN f.friend_id ELSE f.user_id END
               FROM friendships f
               WHERE (f.user_id = ?1 OR f.friend_id = ?1) AND f.status = 'accepted'
           )
         ORDER BY r.created_at DESC, r.id DESC
         LIMIT ?3 OFFSET ?4",
        REFLECTION_SELECT
    );
    query_reflections(conn, &sql, params![viewer_id, since, limit, offset])
}

/// Public reflections of one author, newest first, optionally bounded by `since`
pub fn list_public_by_author(
    conn: &Connection,
    author_id: i64,
    since: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<ReflectionRow>, AppError> {
    let mut sql = format!("{} WHERE r.author_id = ? AND r.visibility = 'public'", REFLECTION_SELECT);
    let mut params_vec: Vec<Box<dyn ToSql>> = vec![Box::new(author_id)];

    if let Some(since) = since {
        sql.push_str(" AND r.created_at >= ?");
        params_vec.push(Box::new(since.to_string()));
    }

    sql.push_str(" ORDER BY r.created_at DESC, r.id DESC LIMIT ? OFFSET ?");
    params_vec.push(Box::new(limit));
    params_vec.push(Box::new(offset));

    let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    query_reflections(conn, &sql, params_refs.as_slice())
}
