//! Friends feed visibility integration tests

mod common;

use common::{befriend, create_category, create_user, set_created_at, setup, write_reflection};
use reflection_server::services::Page;
use reflection_server::AppError;

#[test]
fn test_friend_public_reflection_appears_in_feed() {
    let (_db, services) = setup();
    let alice = create_user(&services, "alice");
    let bob = create_user(&services, "bob");
    befriend(&services, alice.id, bob.id);

    let category = create_category(&services, alice.id, "Work");
    let reflection = write_reflection(&services, alice.id, category, "Shipped the release", "public");

    let feed = services.feed.friends_feed(bob.id, Page::default()).unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].id, reflection.id);
    assert_eq!(feed[0].author_username.as_deref(), Some("alice"));
    assert_eq!(feed[0].category.as_ref().map(|c| c.name.as_str()), Some("Work"));
}

#[test]
fn test_private_reflection_never_in_feed() {
    let (_db, services) = setup();
    let alice = create_user(&services, "alice");
    let bob = create_user(&services, "bob");
    befriend(&services, alice.id, bob.id);

    let category = create_category(&services, alice.id, "Journal");
    write_reflection(&services, alice.id, category, "Just for me", "private");

    assert!(services.feed.friends_feed(bob.id, Page::default()).unwrap().is_empty());
    assert!(services
        .feed
        .friend_reflections(bob.id, alice.id, Page::default())
        .unwrap()
        .is_empty());
}

#[test]
fn test_switching_to_private_hides_reflection() {
    let (_db, services) = setup();
    let alice = create_user(&services, "alice");
    let bob = create_user(&services, "bob");
    befriend(&services, alice.id, bob.id);

    let category = create_category(&services, alice.id, "Journal");
    let reflection = write_reflection(&services, alice.id, category, "Visible for now", "public");
    assert_eq!(services.feed.friends_feed(bob.id, Page::default()).unwrap().len(), 1);

    services
        .reflections
        .update(
            reflection.id,
            reflection_server::db::ReflectionInput {
                category_id: category,
                reflection_text: "Visible for now".to_string(),
                visibility: Some("private".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

    assert!(services.feed.friends_feed(bob.id, Page::default()).unwrap().is_empty());
}

#[test]
fn test_non_friend_sees_nothing() {
    let (_db, services) = setup();
    let alice = create_user(&services, "alice");
    let mallory = create_user(&services, "mallory");

    let category = create_category(&services, alice.id, "Work");
    write_reflection(&services, alice.id, category, "Public but unfriended", "public");

    assert!(services.feed.friends_feed(mallory.id, Page::default()).unwrap().is_empty());
    assert!(matches!(
        services.feed.friend_reflections(mallory.id, alice.id, Page::default()),
        Err(AppError::NotFriends)
    ));
}

#[test]
fn test_pending_friend_is_not_in_feed() {
    let (_db, services) = setup();
    let alice = create_user(&services, "alice");
    let bob = create_user(&services, "bob");
    services.friendships.send_request(alice.id, bob.id).unwrap();

    let category = create_category(&services, alice.id, "Work");
    write_reflection(&services, alice.id, category, "Waiting on bob", "public");

    assert!(services.feed.friends_feed(bob.id, Page::default()).unwrap().is_empty());
}

#[test]
fn test_feed_window_excludes_old_reflections() {
    let (db, services) = setup();
    let alice = create_user(&services, "alice");
    let bob = create_user(&services, "bob");
    befriend(&services, alice.id, bob.id);

    let category = create_category(&services, alice.id, "Work");
    let old = write_reflection(&services, alice.id, category, "Long ago", "public");
    let recent = write_reflection(&services, alice.id, category, "This week", "public");
    set_created_at(&db, old.id, "2000-01-01T00:00:00.000Z");

    let feed = services.feed.friends_feed(bob.id, Page::default()).unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].id, recent.id);

    // Friend-specific views return the whole public history
    let by_id = services.feed.friend_reflections(bob.id, alice.id, Page::default()).unwrap();
    assert_eq!(by_id.len(), 2);
    let by_name = services
        .feed
        .friend_reflections_by_username(bob.id, "alice", Page::default())
        .unwrap();
    assert_eq!(by_name.len(), 2);
    assert_eq!(by_name[1].id, old.id);
}

#[test]
fn test_feed_is_newest_first_and_paginated() {
    let (db, services) = setup();
    let alice = create_user(&services, "alice");
    let bob = create_user(&services, "bob");
    befriend(&services, alice.id, bob.id);

    let category = create_category(&services, alice.id, "Work");
    let first = write_reflection(&services, alice.id, category, "first", "public");
    let second = write_reflection(&services, alice.id, category, "second", "public");
    let third = write_reflection(&services, alice.id, category, "third", "public");

    let now = chrono::Utc::now();
    for (reflection, hours_ago) in [(&first, 3), (&second, 2), (&third, 1)] {
        let at = reflection_server::db::timestamp(now - chrono::Duration::hours(hours_ago));
        set_created_at(&db, reflection.id, &at);
    }

    let page = services.feed.friends_feed(bob.id, Page::new(2, 0)).unwrap();
    let ids: Vec<i64> = page.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![third.id, second.id]);

    let next = services.feed.friends_feed(bob.id, Page::new(2, 2)).unwrap();
    assert_eq!(next.len(), 1);
    assert_eq!(next[0].id, first.id);

    // Nonsense paging falls back to defaults
    assert_eq!(services.feed.friends_feed(bob.id, Page::new(-1, -5)).unwrap().len(), 3);
}

#[test]
fn test_feed_by_unknown_username_is_not_found() {
    let (_db, services) = setup();
    let bob = create_user(&services, "bob");

    let result = services.feed.friend_reflections_by_username(bob.id, "nobody", Page::default());
    assert!(matches!(result, Err(AppError::NotFound(_))));
}
