//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use reflection_server::auth::JwtValidator;
use reflection_server::db::{CreateCategoryInput, Database, ReflectionInput, ReflectionRow, UserRow};
use reflection_server::services::{CreateUserRequest, Services};
use reflection_server::AppError;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-chars";

/// Fresh in-memory database with all services wired up
pub fn setup() -> (Arc<Database>, Services) {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let jwt = JwtValidator::new(TEST_SECRET.to_string(), 3600).unwrap();
    let services = Services::new(Arc::clone(&db), jwt);
    (db, services)
}

pub fn create_user(services: &Services, username: &str) -> UserRow {
    services
        .users
        .create(CreateUserRequest {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            first_name: username.to_string(),
            last_name: "Tester".to_string(),
            password: None,
        })
        .unwrap()
}

pub fn create_category(services: &Services, user_id: i64, name: &str) -> i64 {
    services
        .categories
        .create(CreateCategoryInput {
            user_id,
            name: name.to_string(),
            ..Default::default()
        })
        .unwrap()
        .id
}

pub fn write_reflection(
    services: &Services,
    author_id: i64,
    category_id: i64,
    text: &str,
    visibility: &str,
) -> ReflectionRow {
    services
        .reflections
        .create(ReflectionInput {
            author_id,
            category_id,
            reflection_text: text.to_string(),
            visibility: Some(visibility.to_string()),
            ..Default::default()
        })
        .unwrap()
}

/// Make `a` and `b` accepted friends, with `a` as the requester
pub fn befriend(services: &Services, a: i64, b: i64) {
    services.friendships.send_request(a, b).unwrap();
    services.friendships.accept_request(b, a).unwrap();
}

/// Backdate a reflection's creation time
pub fn set_created_at(db: &Database, reflection_id: i64, created_at: &str) {
    db.with_conn(|conn| {
        conn.execute(
            "UPDATE reflections SET created_at = ?1 WHERE id = ?2",
            rusqlite::params![created_at, reflection_id],
        )
        .map_err(|e| AppError::Database(e.to_string()))
    })
    .unwrap();
}
