//! Friendship state machine integration tests

mod common;

use common::{befriend, create_user, setup};
use reflection_server::db::FriendshipStatus;
use reflection_server::services::DomainEvent;
use reflection_server::AppError;

#[test]
fn test_accept_scenario() {
    let (_db, services) = setup();
    let alice = create_user(&services, "alice");
    let bob = create_user(&services, "bob");

    let request = services.friendships.send_request(alice.id, bob.id).unwrap();
    assert_eq!(request.user_id, alice.id);
    assert_eq!(request.friend_id, bob.id);
    assert_eq!(request.status, FriendshipStatus::Pending);

    let accepted = services.friendships.accept_request(bob.id, alice.id).unwrap();
    assert_eq!(accepted.id, request.id);
    assert_eq!(accepted.status, FriendshipStatus::Accepted);
}

#[test]
fn test_are_friends_is_symmetric() {
    let (_db, services) = setup();
    let alice = create_user(&services, "alice");
    let bob = create_user(&services, "bob");

    assert!(!services.friendships.are_friends(alice.id, bob.id).unwrap());

    befriend(&services, alice.id, bob.id);

    assert!(services.friendships.are_friends(alice.id, bob.id).unwrap());
    assert!(services.friendships.are_friends(bob.id, alice.id).unwrap());
}

#[test]
fn test_pending_request_is_not_friendship() {
    let (_db, services) = setup();
    let alice = create_user(&services, "alice");
    let bob = create_user(&services, "bob");

    services.friendships.send_request(alice.id, bob.id).unwrap();
    assert!(!services.friendships.are_friends(alice.id, bob.id).unwrap());
    assert!(!services.friendships.are_friends(bob.id, alice.id).unwrap());
}

#[test]
fn test_duplicate_request_conflicts_in_both_directions() {
    let (_db, services) = setup();
    let alice = create_user(&services, "alice");
    let bob = create_user(&services, "bob");

    services.friendships.send_request(alice.id, bob.id).unwrap();

    let again = services.friendships.send_request(alice.id, bob.id);
    assert!(matches!(again, Err(AppError::Conflict(_))));

    let reverse = services.friendships.send_request(bob.id, alice.id);
    assert!(matches!(reverse, Err(AppError::Conflict(_))));
}

#[test]
fn test_cannot_friend_yourself() {
    let (_db, services) = setup();
    let alice = create_user(&services, "alice");

    let result = services.friendships.send_request(alice.id, alice.id);
    assert!(matches!(result, Err(AppError::InvalidInput(_))));
}

#[test]
fn test_request_to_unknown_user_is_not_found() {
    let (_db, services) = setup();
    let alice = create_user(&services, "alice");

    let result = services.friendships.send_request(alice.id, 999);
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[test]
fn test_requester_cannot_accept_own_request() {
    let (_db, services) = setup();
    let alice = create_user(&services, "alice");
    let bob = create_user(&services, "bob");

    services.friendships.send_request(alice.id, bob.id).unwrap();

    let result = services.friendships.accept_request(alice.id, bob.id);
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[test]
fn test_resolved_request_cannot_be_resolved_again() {
    let (_db, services) = setup();
    let alice = create_user(&services, "alice");
    let bob = create_user(&services, "bob");

    services.friendships.send_request(alice.id, bob.id).unwrap();
    let rejected = services.friendships.reject_request(bob.id, alice.id).unwrap();
    assert_eq!(rejected.status, FriendshipStatus::Rejected);

    assert!(matches!(
        services.friendships.accept_request(bob.id, alice.id),
        Err(AppError::NotFound(_))
    ));
    assert!(!services.friendships.are_friends(alice.id, bob.id).unwrap());
}

#[test]
fn test_rejection_blocks_new_request_until_removed() {
    let (_db, services) = setup();
    let alice = create_user(&services, "alice");
    let bob = create_user(&services, "bob");

    services.friendships.send_request(alice.id, bob.id).unwrap();
    services.friendships.reject_request(bob.id, alice.id).unwrap();

    assert!(matches!(
        services.friendships.send_request(alice.id, bob.id),
        Err(AppError::Conflict(_))
    ));

    services.friendships.remove_friend(bob.id, alice.id).unwrap();
    services.friendships.send_request(alice.id, bob.id).unwrap();
}

#[test]
fn test_remove_missing_friendship_is_not_found() {
    let (_db, services) = setup();
    let alice = create_user(&services, "alice");
    let bob = create_user(&services, "bob");

    let result = services.friendships.remove_friend(alice.id, bob.id);
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[test]
fn test_friend_list_covers_both_directions() {
    let (_db, services) = setup();
    let alice = create_user(&services, "alice");
    let bob = create_user(&services, "bob");
    let carol = create_user(&services, "carol");

    befriend(&services, alice.id, bob.id);
    befriend(&services, carol.id, alice.id);

    let list = services.friendships.list_friends(alice.id).unwrap();
    assert_eq!(list.count, 2);

    let mut names: Vec<&str> = list.friends.iter().map(|f| f.friend_username.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["bob", "carol"]);

    let bobs = services.friendships.list_friends(bob.id).unwrap();
    assert_eq!(bobs.count, 1);
    assert_eq!(bobs.friends[0].friend_username, "alice");
}

#[test]
fn test_friend_list_empty_and_single_direction() {
    let (_db, services) = setup();
    let alice = create_user(&services, "alice");
    let bob = create_user(&services, "bob");

    let empty = services.friendships.list_friends(alice.id).unwrap();
    assert_eq!(empty.count, 0);
    assert!(empty.friends.is_empty());

    befriend(&services, alice.id, bob.id);
    let list = services.friendships.list_friends(alice.id).unwrap();
    assert_eq!(list.count, 1);
    assert_eq!(list.friends[0].friend_username, "bob");
}

#[test]
fn test_pending_requests_are_recipient_only() {
    let (_db, services) = setup();
    let alice = create_user(&services, "alice");
    let bob = create_user(&services, "bob");

    services.friendships.send_request(alice.id, bob.id).unwrap();

    let for_bob = services.friendships.pending_requests(bob.id).unwrap();
    assert_eq!(for_bob.count, 1);
    assert_eq!(for_bob.requests[0].friend_username, "alice");

    let for_alice = services.friendships.pending_requests(alice.id).unwrap();
    assert_eq!(for_alice.count, 0);
}

#[test]
fn test_deleting_user_cascades_friendships() {
    let (_db, services) = setup();
    let alice = create_user(&services, "alice");
    let bob = create_user(&services, "bob");
    befriend(&services, alice.id, bob.id);

    services.users.delete(bob.id).unwrap();

    assert_eq!(services.friendships.list_friends(alice.id).unwrap().count, 0);
}

#[tokio::test]
async fn test_friend_request_emits_events() {
    let (_db, services) = setup();
    let alice = create_user(&services, "alice");
    let bob = create_user(&services, "bob");
    let mut events = services.events.subscribe();

    befriend(&services, alice.id, bob.id);

    assert_eq!(
        events.recv().await.unwrap(),
        DomainEvent::FriendRequestSent {
            requester_id: alice.id,
            recipient_id: bob.id
        }
    );
    assert_eq!(
        events.recv().await.unwrap(),
        DomainEvent::FriendRequestAccepted {
            requester_id: alice.id,
            recipient_id: bob.id
        }
    );
}
