//! User service - account CRUD and search

use std::sync::Arc;

use serde::Deserialize;

use crate::auth::hash_password;
use crate::db::{users, CreateUserInput, Database, UpdateUserInput, UserRow};
use crate::error::AppError;

use super::events::{DomainEvent, EventBus};
use super::require_id;

const SEARCH_LIMIT: i64 = 10;

/// Body of `POST /api/users`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub password: Option<String>,
}

/// User service
pub struct UserService {
    db: Arc<Database>,
    events: Arc<EventBus>,
}

impl UserService {
    pub fn new(db: Arc<Database>, events: Arc<EventBus>) -> Self {
        Self { db, events }
    }

    // =========================================================================
    // Read Operations
    // =========================================================================

    pub fn get(&self, id: i64) -> Result<UserRow, AppError> {
        require_id(id, "user")?;
        self.db
            .with_conn(|conn| users::get_user(conn, id))?
            .ok_or_else(|| AppError::NotFound("user not found".into()))
    }

    pub fn get_by_username(&self, username: &str) -> Result<UserRow, AppError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::InvalidInput("username is required".into()));
        }
        self.db
            .with_conn(|conn| users::get_user_by_username(conn, username))?
            .ok_or_else(|| AppError::NotFound("user not found".into()))
    }

    /// Case-insensitive username search, at most ten results
    pub fn search(&self, query: &str) -> Result<Vec<UserRow>, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput("search query is required".into()));
        }
        self.db.with_conn(|conn| users::search_users(conn, query, SEARCH_LIMIT))
    }

    // =========================================================================
    // Write Operations
    // =========================================================================

    pub fn create(&self, request: CreateUserRequest) -> Result<UserRow, AppError> {
        let username = request.username.trim();
        let email = request.email.trim();
        validate_identity(username, email)?;

        let password_hash = match request.password.as_deref() {
            Some(password) if !password.is_empty() => hash_password(password)?,
            _ => String::new(),
        };

        let input = CreateUserInput {
            username: username.to_string(),
            email: email.to_string(),
            first_name: request.first_name,
            last_name: request.last_name,
            password_hash,
        };

        let user = self.db.with_conn(|conn| users::create_user(conn, &input))?;

        self.events.emit(DomainEvent::UserRegistered {
            user_id: user.id,
            username: user.username.clone(),
        });

        Ok(user)
    }

    pub fn update(&self, id: i64, mut input: UpdateUserInput) -> Result<UserRow, AppError> {
        require_id(id, "user")?;
        input.username = input.username.trim().to_string();
        input.email = input.email.trim().to_string();
        validate_identity(&input.username, &input.email)?;

        self.db
            .with_conn(|conn| users::update_user(conn, id, &input))?
            .ok_or_else(|| AppError::NotFound("user not found".into()))
    }

    pub fn delete(&self, id: i64) -> Result<(), AppError> {
        require_id(id, "user")?;
        if !self.db.with_conn(|conn| users::delete_user(conn, id))? {
            return Err(AppError::NotFound("user not found".into()));
        }

        self.events.emit(DomainEvent::UserDeleted { user_id: id });
        Ok(())
    }
}

pub(crate) fn validate_identity(username: &str, email: &str) -> Result<(), AppError> {
    if username.is_empty() {
        return Err(AppError::InvalidInput("username is required".into()));
    }
    if email.is_empty() {
        return Err(AppError::InvalidInput("email is required".into()));
    }
    if !email.contains('@') {
        return Err(AppError::InvalidInput("email is invalid".into()));
    }
    Ok(())
}
