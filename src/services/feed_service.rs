//! Feed service - friends' public reflections
//!
//! Visibility is decided only by the reflection's `visibility` column. A
//! private reflection never reaches any feed, and a public one is visible to
//! every accepted friend of its author.

use std::sync::Arc;

use chrono::{Duration, Utc};
use crate::db::{self, friendships, reflections, users, Database, ReflectionRow};
use crate::error::AppError;

use super::require_id;

/// Rolling window of the general friends feed
pub const FEED_WINDOW_DAYS: i64 = 14;
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    /// Non-positive limits fall back to the default, negative offsets to zero
    pub fn new(limit: i64, offset: i64) -> Self {
        Self {
            limit: if limit <= 0 { DEFAULT_PAGE_LIMIT } else { limit },
            offset: offset.max(0),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_LIMIT, 0)
    }
}

pub struct FeedService {
    db: Arc<Database>,
}

impl FeedService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Public reflections by the viewer's friends from the last two weeks, newest first
    pub fn friends_feed(&self, viewer_id: i64, page: Page) -> Result<Vec<ReflectionRow>, AppError> {
        require_id(viewer_id, "user")?;
        let since = db::timestamp(Utc::now() - Duration::days(FEED_WINDOW_DAYS));

        self.db.with_conn(|conn| {
            reflections::list_friends_feed(conn, viewer_id, &since, page.limit, page.offset)
        })
    }

    /// Full public history of one friend
    pub fn friend_reflections(
        &self,
        viewer_id: i64,
        friend_id: i64,
        page: Page,
    ) -> Result<Vec<ReflectionRow>, AppError> {
        require_id(viewer_id, "user")?;
        require_id(friend_id, "friend")?;

        self.db.with_conn(|conn| {
            if !friendships::are_friends(conn, viewer_id, friend_id)? {
                return Err(AppError::NotFriends);
            }
            reflections::list_public_by_author(conn, friend_id, None, page.limit, page.offset)
        })
    }

    /// Same as [`FeedService::friend_reflections`], addressed by username
    pub fn friend_reflections_by_username(
        &self,
        viewer_id: i64,
        username: &str,
        page: Page,
    ) -> Result<Vec<ReflectionRow>, AppError> {
        require_id(viewer_id, "user")?;
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::InvalidInput("friend username is required".into()));
        }

        let friend = self
            .db
            .with_conn(|conn| users::get_user_by_username(conn, username))?
            .ok_or_else(|| AppError::NotFound("user not found".into()))?;

        self.friend_reflections(viewer_id, friend.id, page)
    }
}
