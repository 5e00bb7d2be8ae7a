//! Category service - per-user taxonomy

use std::sync::Arc;

use crate::db::{categories, CategoryRow, CreateCategoryInput, CreateSubCategoryInput, Database, SubCategoryRow};
use crate::error::AppError;

use super::require_id;

pub struct CategoryService {
    db: Arc<Database>,
}

impl CategoryService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    // =========================================================================
    // Categories
    // =========================================================================

    pub fn list_for_user(&self, user_id: i64) -> Result<Vec<CategoryRow>, AppError> {
        require_id(user_id, "user")?;
        self.db.with_conn(|conn| categories::list_categories_by_user(conn, user_id))
    }

    pub fn create(&self, mut input: CreateCategoryInput) -> Result<CategoryRow, AppError> {
        input.name = input.name.trim().to_string();
        if input.name.is_empty() {
            return Err(AppError::InvalidInput("category name is required".into()));
        }
        if input.user_id <= 0 {
            return Err(AppError::InvalidInput("user ID is required".into()));
        }

        self.db.with_conn(|conn| {
            if let Some(parent_id) = input.parent_id {
                let parent = categories::get_category(conn, parent_id)?
                    .ok_or_else(|| AppError::InvalidInput("parent category does not exist".into()))?;
                if parent.user_id != input.user_id {
                    return Err(AppError::InvalidInput("parent category belongs to another user".into()));
                }
            }
            categories::create_category(conn, &input)
        })
    }

    pub fn update(&self, id: i64, input: CreateCategoryInput) -> Result<CategoryRow, AppError> {
        require_id(id, "category")?;
        let name = input.name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidInput("category name is required".into()));
        }

        self.db
            .with_conn(|conn| categories::update_category(conn, id, name, &input.description))?
            .ok_or_else(|| AppError::NotFound("category not found".into()))
    }

    /// Delete a category. Refused while reflections are still filed under it.
    pub fn delete(&self, id: i64) -> Result<(), AppError> {
        require_id(id, "category")?;
        self.db.with_conn(|conn| {
            if categories::count_reflections_in_category(conn, id)? > 0 {
                return Err(AppError::Conflict("category still has reflections".into()));
            }
            if !categories::delete_category(conn, id)? {
                return Err(AppError::NotFound("category not found".into()));
            }
            Ok(())
        })
    }

    // =========================================================================
    // Subcategories
    // =========================================================================

    pub fn list_sub_categories(&self, category_id: i64) -> Result<Vec<SubCategoryRow>, AppError> {
        require_id(category_id, "category")?;
        self.db.with_conn(|conn| categories::list_sub_categories(conn, category_id))
    }

    pub fn create_sub_category(&self, mut input: CreateSubCategoryInput) -> Result<SubCategoryRow, AppError> {
        input.name = input.name.trim().to_string();
        if input.name.is_empty() {
            return Err(AppError::InvalidInput("subcategory name is required".into()));
        }
        if input.category_id <= 0 {
            return Err(AppError::InvalidInput("category ID is required".into()));
        }

        self.db.with_conn(|conn| {
            if categories::get_category(conn, input.category_id)?.is_none() {
                return Err(AppError::NotFound("category not found".into()));
            }
            categories::create_sub_category(conn, &input)
        })
    }

    pub fn update_sub_category(&self, id: i64, input: CreateSubCategoryInput) -> Result<SubCategoryRow, AppError> {
        require_id(id, "subcategory")?;
        let name = input.name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidInput("subcategory name is required".into()));
        }

        self.db
            .with_conn(|conn| categories::update_sub_category(conn, id, name, &input.description))?
            .ok_or_else(|| AppError::NotFound("subcategory not found".into()))
    }

    pub fn delete_sub_category(&self, id: i64) -> Result<(), AppError> {
        require_id(id, "subcategory")?;
        if !self.db.with_conn(|conn| categories::delete_sub_category(conn, id))? {
            return Err(AppError::NotFound("subcategory not found".into()));
        }
        Ok(())
    }
}
