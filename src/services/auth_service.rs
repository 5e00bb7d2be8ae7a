//! Auth service - registration, login and token resolution
//!
//! Sessions are stateless: a token is valid until it expires, and logout is
//! a client-side concern.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{hash_password, verify_password, Claims, JwtValidator};
use crate::db::{users, CreateUserInput, Database, UserRow};
use crate::error::AppError;

use super::events::{DomainEvent, EventBus};
use super::user_service::validate_identity;

const INVALID_CREDENTIALS: &str = "invalid username or password";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserRow,
}

/// Auth service
pub struct AuthService {
    db: Arc<Database>,
    events: Arc<EventBus>,
    jwt: JwtValidator,
}

impl AuthService {
    pub fn new(db: Arc<Database>, events: Arc<EventBus>, jwt: JwtValidator) -> Self {
        Self { db, events, jwt }
    }

    /// Create an account and sign the caller in
    pub fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AppError> {
        let username = request.username.trim();
        let email = request.email.trim();
        validate_identity(username, email)?;
        if request.password.is_empty() {
            return Err(AppError::InvalidInput("password is required".into()));
        }

        let input = CreateUserInput {
            username: username.to_string(),
            email: email.to_string(),
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            password_hash: hash_password(&request.password)?,
        };

        let user = self.db.with_conn(|conn| {
            if users::get_user_by_username(conn, &input.username)?.is_some() {
                return Err(AppError::Conflict("username already exists".into()));
            }
            if users::get_user_by_email(conn, &input.email)?.is_some() {
                return Err(AppError::Conflict("email already exists".into()));
            }
            users::create_user(conn, &input)
        })?;

        info!(user_id = user.id, username = %user.username, "Registered new user");
        self.events.emit(DomainEvent::UserRegistered {
            user_id: user.id,
            username: user.username.clone(),
        });

        let token = self.jwt.generate_token(user.id, &user.username)?;
        Ok(AuthResponse { token, user })
    }

    /// Exchange credentials for a token
    pub fn login(&self, request: LoginRequest) -> Result<AuthResponse, AppError> {
        let username = request.username.trim();
        if username.is_empty() || request.password.is_empty() {
            return Err(AppError::InvalidInput("username and password are required".into()));
        }

        let user = match self.db.with_conn(|conn| users::get_user_by_username(conn, username))? {
            Some(user) => user,
            None => {
                warn!(username = %username, "Login failed - unknown user");
                return Err(AppError::Auth(INVALID_CREDENTIALS.into()));
            }
        };

        // Accounts created through the admin endpoint without a password cannot log in
        if user.password_hash.is_empty() || !verify_password(&request.password, &user.password_hash)? {
            warn!(username = %username, "Login failed - bad password");
            return Err(AppError::Auth(INVALID_CREDENTIALS.into()));
        }

        let token = self.jwt.generate_token(user.id, &user.username)?;
        Ok(AuthResponse { token, user })
    }

    /// Validate a bearer token
    pub fn authenticate(&self, token: &str) -> Result<Claims, AppError> {
        self.jwt.verify_token(token).into_claims()
    }

    /// Resolve the user behind a token
    pub fn me(&self, token: &str) -> Result<UserRow, AppError> {
        let claims = self.authenticate(token)?;
        self.db
            .with_conn(|conn| users::get_user(conn, claims.user_id))?
            .ok_or_else(|| AppError::NotFound("user not found".into()))
    }
}
