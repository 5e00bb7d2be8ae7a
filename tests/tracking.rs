//! Reflection tracking toggle and analytics integration tests

mod common;

use chrono::NaiveDate;
use common::{create_category, create_user, setup, write_reflection};
use reflection_server::AppError;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_toggle_twice_returns_to_untracked() {
    let (_db, services) = setup();
    let alice = create_user(&services, "alice");
    let category = create_category(&services, alice.id, "Health");
    let reflection = write_reflection(&services, alice.id, category, "Walked 5k", "private");

    let first = services.reflections.track_reflection(reflection.id).unwrap();
    assert!(first.reflected_today);
    assert_eq!(first.reflection_count, 1);
    assert!(services.reflections.get(reflection.id).unwrap().reflected_today);

    let second = services.reflections.track_reflection(reflection.id).unwrap();
    assert!(!second.reflected_today);
    assert_eq!(second.reflection_count, 0);

    let fetched = services.reflections.get(reflection.id).unwrap();
    assert!(!fetched.reflected_today);
    assert_eq!(fetched.reflection_count, 0);
}

#[test]
fn test_odd_toggles_leave_one_row() {
    let (_db, services) = setup();
    let alice = create_user(&services, "alice");
    let category = create_category(&services, alice.id, "Health");
    let reflection = write_reflection(&services, alice.id, category, "Slept early", "private");

    let date = day(2024, 3, 9);
    let mut last = None;
    for _ in 0..5 {
        last = Some(services.reflections.toggle_tracking(reflection.id, date).unwrap());
    }

    let last = last.unwrap();
    assert!(last.reflected_today);
    assert_eq!(last.reflection_count, 1);

    let points = services.reflections.tracking_analytics(alice.id, date, date).unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].reflection_count, 1);
}

#[test]
fn test_tracking_subject_is_the_author() {
    let (_db, services) = setup();
    let alice = create_user(&services, "alice");
    let category = create_category(&services, alice.id, "Health");
    let reflection = write_reflection(&services, alice.id, category, "Stretching", "public");

    let result = services.reflections.track_reflection(reflection.id).unwrap();
    assert_eq!(result.user_id, alice.id);
}

#[test]
fn test_analytics_buckets_by_date() {
    let (_db, services) = setup();
    let alice = create_user(&services, "alice");
    let category = create_category(&services, alice.id, "Health");
    let reflection = write_reflection(&services, alice.id, category, "Meditated", "private");

    for date in [day(2024, 1, 5), day(2024, 1, 12), day(2024, 1, 20)] {
        let result = services.reflections.toggle_tracking(reflection.id, date).unwrap();
        assert!(result.reflected_today);
    }
    // Outside the queried range
    services.reflections.toggle_tracking(reflection.id, day(2024, 2, 1)).unwrap();

    let points = services
        .reflections
        .tracking_analytics(alice.id, day(2024, 1, 1), day(2024, 1, 31))
        .unwrap();

    let dates: Vec<&str> = points.iter().map(|p| p.date.as_str()).collect();
    assert_eq!(dates, vec!["2024-01-05", "2024-01-12", "2024-01-20"]);
    assert!(points.iter().all(|p| p.reflection_count == 1 && p.unique_reflections == 1));
}

#[test]
fn test_analytics_counts_distinct_reflections_per_day() {
    let (_db, services) = setup();
    let alice = create_user(&services, "alice");
    let category = create_category(&services, alice.id, "Health");
    let one = write_reflection(&services, alice.id, category, "one", "private");
    let two = write_reflection(&services, alice.id, category, "two", "private");

    let date = day(2024, 6, 1);
    services.reflections.toggle_tracking(one.id, date).unwrap();
    services.reflections.toggle_tracking(two.id, date).unwrap();

    let points = services.reflections.tracking_analytics(alice.id, date, date).unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].reflection_count, 2);
    assert_eq!(points[0].unique_reflections, 2);
}

#[test]
fn test_inverted_range_is_rejected() {
    let (_db, services) = setup();
    let alice = create_user(&services, "alice");

    let result = services
        .reflections
        .tracking_analytics(alice.id, day(2024, 2, 1), day(2024, 1, 1));
    assert!(matches!(result, Err(AppError::InvalidRange(_))));

    let result = services
        .reflections
        .tracking_by_category(alice.id, day(2024, 2, 1), day(2024, 1, 1));
    assert!(matches!(result, Err(AppError::InvalidRange(_))));
}

#[test]
fn test_tracking_unknown_reflection_is_not_found() {
    let (_db, services) = setup();
    let result = services.reflections.track_reflection(404);
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[test]
fn test_category_analytics_groups_by_name() {
    let (_db, services) = setup();
    let alice = create_user(&services, "alice");
    let health = create_category(&services, alice.id, "Health");
    let work = create_category(&services, alice.id, "Work");
    write_reflection(&services, alice.id, health, "ran", "private");
    write_reflection(&services, alice.id, health, "swam", "private");
    write_reflection(&services, alice.id, work, "planned", "private");

    let today = reflection_server::services::today();
    let utc_today = chrono::Utc::now().date_naive();
    let (start, end) = (today.min(utc_today), today.max(utc_today));

    let points = services.reflections.tracking_by_category(alice.id, start, end).unwrap();
    let health_total: i64 = points.iter().filter(|p| p.category == "Health").map(|p| p.reflection_count).sum();
    let work_total: i64 = points.iter().filter(|p| p.category == "Work").map(|p| p.reflection_count).sum();
    assert_eq!(health_total, 2);
    assert_eq!(work_total, 1);
}
