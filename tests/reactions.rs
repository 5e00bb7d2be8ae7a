//! Reaction integration tests

mod common;

use common::{befriend, create_category, create_user, setup, write_reflection};
use reflection_server::db::ReactionType;
use reflection_server::services::{AddReactionRequest, Services};
use reflection_server::AppError;

fn reaction(kind: &str) -> AddReactionRequest {
    AddReactionRequest {
        reaction_type: kind.to_string(),
        comment_text: None,
    }
}

/// Alice writes a public reflection that her friend Bob can react to
fn shared_reflection(services: &Services) -> (i64, i64) {
    let alice = create_user(services, "alice");
    let bob = create_user(services, "bob");
    befriend(services, alice.id, bob.id);
    let category = create_category(services, alice.id, "Life");
    let reflection = write_reflection(services, alice.id, category, "Moved cities", "public");
    (reflection.id, bob.id)
}

#[test]
fn test_same_type_twice_conflicts() {
    let (_db, services) = setup();
    let (reflection_id, bob) = shared_reflection(&services);

    services.reactions.add(reflection_id, bob, reaction("favorite")).unwrap();
    let again = services.reactions.add(reflection_id, bob, reaction("favorite"));
    assert!(matches!(again, Err(AppError::Conflict(_))));
}

#[test]
fn test_distinct_types_stack() {
    let (_db, services) = setup();
    let (reflection_id, bob) = shared_reflection(&services);

    services.reactions.add(reflection_id, bob, reaction("favorite")).unwrap();
    services.reactions.add(reflection_id, bob, reaction("update_me")).unwrap();

    let list = services.reactions.list(reflection_id).unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].reaction.reaction_type, ReactionType::Favorite);
    assert_eq!(list[0].username, "bob");

    let counts = services.reactions.counts(reflection_id).unwrap();
    assert_eq!(counts.get("favorite"), Some(&1));
    assert_eq!(counts.get("update_me"), Some(&1));
    assert_eq!(counts.get("different_angle"), None);
}

#[test]
fn test_counts_aggregate_across_users() {
    let (_db, services) = setup();
    let (reflection_id, bob) = shared_reflection(&services);
    let carol = create_user(&services, "carol");

    services.reactions.add(reflection_id, bob, reaction("similar_experience")).unwrap();
    services.reactions.add(reflection_id, carol.id, reaction("similar_experience")).unwrap();

    let counts = services.reactions.counts(reflection_id).unwrap();
    assert_eq!(counts.get("similar_experience"), Some(&2));
}

#[test]
fn test_invalid_type_and_long_comment_rejected() {
    let (_db, services) = setup();
    let (reflection_id, bob) = shared_reflection(&services);

    let bad_type = services.reactions.add(reflection_id, bob, reaction("like"));
    assert!(matches!(bad_type, Err(AppError::InvalidInput(_))));

    let long = AddReactionRequest {
        reaction_type: "ask_me_about_this".to_string(),
        comment_text: Some("x".repeat(101)),
    };
    assert!(matches!(
        services.reactions.add(reflection_id, bob, long),
        Err(AppError::InvalidInput(_))
    ));

    let fits = AddReactionRequest {
        reaction_type: "ask_me_about_this".to_string(),
        comment_text: Some("y".repeat(100)),
    };
    let row = services.reactions.add(reflection_id, bob, fits).unwrap();
    assert_eq!(row.comment_text.map(|c| c.len()), Some(100));
}

#[test]
fn test_reaction_on_missing_reflection_is_not_found() {
    let (_db, services) = setup();
    let bob = create_user(&services, "bob");

    let result = services.reactions.add(9999, bob.id, reaction("favorite"));
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[test]
fn test_remove_and_user_reaction() {
    let (_db, services) = setup();
    let (reflection_id, bob) = shared_reflection(&services);

    assert!(services.reactions.user_reaction(reflection_id, bob).unwrap().is_none());

    services.reactions.add(reflection_id, bob, reaction("accountability_buddy")).unwrap();
    let mine = services.reactions.user_reaction(reflection_id, bob).unwrap().unwrap();
    assert_eq!(mine.reaction.reaction_type, ReactionType::AccountabilityBuddy);
    assert_eq!(mine.username, "bob");

    services.reactions.remove(reflection_id, bob, "accountability_buddy").unwrap();
    assert!(services.reactions.user_reaction(reflection_id, bob).unwrap().is_none());

    assert!(matches!(
        services.reactions.remove(reflection_id, bob, "accountability_buddy"),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn test_prompts_are_active_and_ordered() {
    let (_db, services) = setup();

    let prompts = services.reactions.prompts().unwrap();
    assert_eq!(prompts.len(), ReactionType::ALL.len());
    assert!(prompts.iter().all(|p| p.is_active));

    let types: Vec<&str> = prompts.iter().map(|p| p.reaction_type.as_str()).collect();
    let mut sorted = types.clone();
    sorted.sort();
    assert_eq!(types, sorted);
}

#[test]
fn test_deleting_reflection_removes_reactions() {
    let (_db, services) = setup();
    let (reflection_id, bob) = shared_reflection(&services);
    services.reactions.add(reflection_id, bob, reaction("favorite")).unwrap();

    services.reflections.delete(reflection_id).unwrap();

    assert!(services.reactions.list(reflection_id).unwrap().is_empty());
}
