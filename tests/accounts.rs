//! Registration, login and user management integration tests

mod common;

use common::{create_user, setup};
use reflection_server::db::UpdateUserInput;
use reflection_server::services::{LoginRequest, RegisterRequest};
use reflection_server::AppError;

fn register(username: &str, email: &str) -> RegisterRequest {
    RegisterRequest {
        username: username.to_string(),
        email: email.to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        password: "correct horse battery staple".to_string(),
    }
}

#[test]
fn test_register_login_me() {
    let (_db, services) = setup();

    let registered = services.auth.register(register("ada", "ada@example.com")).unwrap();
    assert!(!registered.token.is_empty());
    assert_eq!(registered.user.username, "ada");

    let me = services.auth.me(&registered.token).unwrap();
    assert_eq!(me.id, registered.user.id);

    let login = services
        .auth
        .login(LoginRequest {
            username: "ada".to_string(),
            password: "correct horse battery staple".to_string(),
        })
        .unwrap();
    let claims = services.auth.authenticate(&login.token).unwrap();
    assert_eq!(claims.user_id, registered.user.id);
    assert_eq!(claims.username, "ada");
}

#[test]
fn test_password_hash_is_never_serialized() {
    let (_db, services) = setup();
    let registered = services.auth.register(register("ada", "ada@example.com")).unwrap();

    let json = serde_json::to_value(&registered).unwrap();
    assert!(json["user"].get("password_hash").is_none());
    assert_eq!(json["user"]["username"], "ada");
}

#[test]
fn test_bad_credentials_are_rejected() {
    let (_db, services) = setup();
    services.auth.register(register("ada", "ada@example.com")).unwrap();

    let wrong_password = services.auth.login(LoginRequest {
        username: "ada".to_string(),
        password: "nope".to_string(),
    });
    assert!(matches!(wrong_password, Err(AppError::Auth(_))));

    let unknown = services.auth.login(LoginRequest {
        username: "grace".to_string(),
        password: "whatever".to_string(),
    });
    assert!(matches!(unknown, Err(AppError::Auth(msg)) if msg == "invalid username or password"));

    assert!(matches!(services.auth.me("garbage"), Err(AppError::Auth(_))));
}

#[test]
fn test_duplicate_registration_conflicts() {
    let (_db, services) = setup();
    services.auth.register(register("ada", "ada@example.com")).unwrap();

    let same_name = services.auth.register(register("ada", "other@example.com"));
    assert!(matches!(same_name, Err(AppError::Conflict(msg)) if msg == "username already exists"));

    let same_email = services.auth.register(register("grace", "ada@example.com"));
    assert!(matches!(same_email, Err(AppError::Conflict(msg)) if msg == "email already exists"));
}

#[test]
fn test_register_requires_password() {
    let (_db, services) = setup();
    let mut request = register("ada", "ada@example.com");
    request.password.clear();

    assert!(matches!(services.auth.register(request), Err(AppError::InvalidInput(_))));
}

#[test]
fn test_user_without_password_cannot_log_in() {
    let (_db, services) = setup();
    create_user(&services, "nopass");

    let result = services.auth.login(LoginRequest {
        username: "nopass".to_string(),
        password: "anything".to_string(),
    });
    assert!(matches!(result, Err(AppError::Auth(_))));
}

#[test]
fn test_search_is_case_insensitive_and_capped() {
    let (_db, services) = setup();
    for i in 0..12 {
        create_user(&services, &format!("Reader{:02}", i));
    }
    create_user(&services, "writer");

    let found = services.users.search("reader").unwrap();
    assert_eq!(found.len(), 10);
    assert_eq!(found[0].username, "Reader00");

    assert!(matches!(services.users.search("  "), Err(AppError::InvalidInput(_))));
    assert!(services.users.search("100%").unwrap().is_empty());
}

#[test]
fn test_update_and_delete_user() {
    let (_db, services) = setup();
    let user = create_user(&services, "ada");

    let updated = services
        .users
        .update(
            user.id,
            UpdateUserInput {
                username: "ada_l".to_string(),
                email: "ada_l@example.com".to_string(),
                first_name: "Ada".to_string(),
                last_name: "L".to_string(),
            },
        )
        .unwrap();
    assert_eq!(updated.username, "ada_l");
    assert_eq!(services.users.get_by_username("ada_l").unwrap().id, user.id);

    services.users.delete(user.id).unwrap();
    assert!(matches!(services.users.get(user.id), Err(AppError::NotFound(_))));
    assert!(matches!(services.users.delete(user.id), Err(AppError::NotFound(_))));
}

#[test]
fn test_invalid_ids_are_rejected_before_storage() {
    let (_db, services) = setup();
    assert!(matches!(services.users.get(0), Err(AppError::InvalidInput(_))));
    assert!(matches!(services.users.get(-4), Err(AppError::InvalidInput(_))));
}
