//! Category and subcategory storage

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::{collect_rows, sql_error};
use crate::error::AppError;

// =============================================================================
// Types
// =============================================================================

/// Category row from database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRow {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: String,
    pub parent_id: Option<i64>,
    pub created_at: String,
}

impl CategoryRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            parent_id: row.get("parent_id")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// Subcategory row from database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubCategoryRow {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub description: String,
    pub created_at: String,
}

impl SubCategoryRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            category_id: row.get("category_id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// Input for creating or updating a category
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCategoryInput {
    #[serde(default)]
    pub user_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

/// Input for creating or updating a subcategory
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateSubCategoryInput {
    #[serde(default)]
    pub category_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

// =============================================================================
// Categories
// =============================================================================

/// Get a category by ID
pub fn get_category(conn: &Connection, id: i64) -> Result<Option<CategoryRow>, AppError> {
    conn.query_row(
        "SELECT id, user_id, name, description, parent_id, created_at FROM categories WHERE id = ?",
        params![id],
        CategoryRow::from_row,
    )
    .optional()
    .map_err(|e| sql_error("Failed to get category", e))
}

/// List a user's categories ordered by name
pub fn list_categories_by_user(conn: &Connection, user_id: i64) -> Result<Vec<CategoryRow>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, name, description, parent_id, created_at
         FROM categories WHERE user_id = ? ORDER BY name",
    ).map_err(|e| sql_error("Failed to prepare statement", e))?;

    let rows = stmt.query_map(params![user_id], CategoryRow::from_row)
        .map_err(|e| sql_error("Failed to query categories", e))?;

    collect_rows(rows, "Failed to read category row")
}

/// Create a new category
pub fn create_category(conn: &Connection, input: &CreateCategoryInput) -> Result<CategoryRow, AppError> {
    conn.execute(
        "INSERT INTO categories (user_id, name, description, parent_id) VALUES (?, ?, ?, ?)",
        params![input.user_id, input.name, input.description, input.parent_id],
    ).map_err(|e| sql_error("Failed to create category", e))?;

    get_category(conn, conn.last_insert_rowid())?
        .ok_or_else(|| AppError::Internal("Failed to retrieve created category".to_string()))
}

/// Update name and description. Returns None if the category does not exist.
pub fn update_category(
    conn: &Connection,
    id: i64,
    name: &str,
    description: &str,
) -> Result<Option<CategoryRow>, AppError> {
    let rows = conn.execute(
        "UPDATE categories SET name = ?, description = ? WHERE id = ?",
        params![name, description, id],
    ).map_err(|e| sql_error("Failed to update category", e))?;

    if rows == 0 {
        return Ok(None);
    }
    get_category(conn, id)
}

/// Delete a category (cascades to its subcategories)
pub fn delete_category(conn: &Connection, id: i64) -> Result<bool, AppError> {
    let rows = conn.execute("DELETE FROM categories WHERE id = ?", params![id])
        .map_err(|e| sql_error("Failed to delete category", e))?;
    Ok(rows > 0)
}

/// Number of reflections filed under a category
pub fn count_reflections_in_category(conn: &Connection, id: i64) -> Result<i64, AppError> {
    conn.query_row(
        "SELECT COUNT(*) FROM reflections WHERE category_id = ?",
        params![id],
        |row| row.get(0),
    )
    .map_err(|e| sql_error("Failed to count reflections", e))
}

// =============================================================================
// Subcategories
// =============================================================================

/// Get a subcategory by ID
pub fn get_sub_category(conn: &Connection, id: i64) -> Result<Option<SubCategoryRow>, AppError> {
    conn.query_row(
        "SELECT id, category_id, name, description, created_at FROM sub_categories WHERE id = ?",
        params![id],
        SubCategoryRow::from_row,
    )
    .optional()
    .map_err(|e| sql_error("Failed to get subcategory", e))
}

/// List subcategories of a category ordered by name
pub fn list_sub_categories(conn: &Connection, category_id: i64) -> Result<Vec<SubCategoryRow>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT id, category_id, name, description, created_at
         FROM sub_categories WHERE category_id = ? ORDER BY name",
    ).map_err(|e| sql_error("Failed to prepare statement", e))?;

    let rows = stmt.query_map(params![category_id], SubCategoryRow::from_row)
        .map_err(|e| sql_error("Failed to query subcategories", e))?;

    collect_rows(rows, "Failed to read subcategory row")
}

/// Create a new subcategory
pub fn create_sub_category(conn: &Connection, input: &CreateSubCategoryInput) -> Result<SubCategoryRow, AppError> {
    conn.execute(
        "INSERT INTO sub_categories (category_id, name, description) VALUES (?, ?, ?)",
        params![input.category_id, input.name, input.description],
    ).map_err(|e| sql_error("Failed to create subcategory", e))?;

    get_sub_category(conn, conn.last_insert_rowid())?
        .ok_or_else(|| AppError::Internal("Failed to retrieve created subcategory".to_string()))
}

/// Update name and description. Returns None if the subcategory does not exist.
pub fn update_sub_category(
    conn: &Connection,
    id: i64,
    name: &str,
    description: &str,
) -> Result<Option<SubCategoryRow>, AppError> {
    let rows = conn.execute(
        "UPDATE sub_categories SET name = ?, description = ? WHERE id = ?",
        params![name, description, id],
    ).map_err(|e| sql_error("Failed to update subcategory", e))?;

    if rows == 0 {
        return Ok(None);
    }
    get_sub_category(conn, id)
}

/// Delete a subcategory. Reflections referencing it keep their category.
pub fn delete_sub_category(conn: &Connection, id: i64) -> Result<bool, AppError> {
    let rows = conn.execute("DELETE FROM sub_categories WHERE id = ?", params![id])
        .map_err(|e| sql_error("Failed to delete subcategory", e))?;
    Ok(rows > 0)
}
