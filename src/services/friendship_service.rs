//! Friendship service - request/accept/reject state machine
//!
//! A friendship is one directed row (`user_id` = requester). Status moves
//! `pending → accepted` or `pending → rejected` and never back. Once
//! accepted, either party counts as a friend of the other.

use std::sync::Arc;

use serde::Serialize;

use crate::db::{friendships, users, Database, FriendshipRow, FriendshipStatus, FriendshipView};
use crate::error::AppError;

use super::events::{DomainEvent, EventBus};
use super::require_id;

/// Response of `GET /api/friends`
#[derive(Debug, Clone, Serialize)]
pub struct FriendList {
    pub friends: Vec<FriendshipView>,
    pub count: usize,
}

/// Response of `GET /api/friends/pending`
#[derive(Debug, Clone, Serialize)]
pub struct PendingRequests {
    pub requests: Vec<FriendshipView>,
    pub count: usize,
}

pub struct FriendshipService {
    db: Arc<Database>,
    events: Arc<EventBus>,
}

impl FriendshipService {
    pub fn new(db: Arc<Database>, events: Arc<EventBus>) -> Self {
        Self { db, events }
    }

    /// Create a pending request from `requester_id` to `recipient_id`.
    ///
    /// Any existing row between the pair blocks a new request, including a
    /// rejected one. The unique index settles concurrent duplicates.
    pub fn send_request(&self, requester_id: i64, recipient_id: i64) -> Result<FriendshipRow, AppError> {
        require_id(requester_id, "user")?;
        require_id(recipient_id, "friend")?;
        if requester_id == recipient_id {
            return Err(AppError::InvalidInput("cannot send friend request to yourself".into()));
        }

        let row = self.db.with_conn(|conn| {
            if users::get_user(conn, recipient_id)?.is_none() {
                return Err(AppError::NotFound("user not found".into()));
            }
            if friendships::find_between(conn, requester_id, recipient_id)?.is_some() {
                return Err(AppError::Conflict("friendship already exists".into()));
            }
            friendships::create_request(conn, requester_id, recipient_id)
        })?;

        self.events.emit(DomainEvent::FriendRequestSent {
            requester_id,
            recipient_id,
        });

        Ok(row)
    }

    /// Accept the pending request that `requester_id` sent to `accepter_id`
    pub fn accept_request(&self, accepter_id: i64, requester_id: i64) -> Result<FriendshipRow, AppError> {
        let row = self.resolve(accepter_id, requester_id, FriendshipStatus::Accepted)?;

        self.events.emit(DomainEvent::FriendRequestAccepted {
            requester_id,
            recipient_id: accepter_id,
        });

        Ok(row)
    }

    /// Reject the pending request that `requester_id` sent to `rejecter_id`
    pub fn reject_request(&self, rejecter_id: i64, requester_id: i64) -> Result<FriendshipRow, AppError> {
        let row = self.resolve(rejecter_id, requester_id, FriendshipStatus::Rejected)?;

        self.events.emit(DomainEvent::FriendRequestRejected {
            requester_id,
            recipient_id: rejecter_id,
        });

        Ok(row)
    }

    fn resolve(&self, recipient_id: i64, requester_id: i64, status: FriendshipStatus) -> Result<FriendshipRow, AppError> {
        require_id(recipient_id, "user")?;
        require_id(requester_id, "friend")?;

        self.db
            .with_conn(|conn| friendships::resolve_pending(conn, requester_id, recipient_id, status))?
            .ok_or_else(|| AppError::NotFound("no pending friend request found".into()))
    }

    /// Delete the row between the pair, whatever its direction or status
    pub fn remove_friend(&self, user_id: i64, friend_id: i64) -> Result<(), AppError> {
        require_id(user_id, "user")?;
        require_id(friend_id, "friend")?;

        if !self.db.with_conn(|conn| friendships::delete_between(conn, user_id, friend_id))? {
            return Err(AppError::NotFound("friendship not found".into()));
        }

        self.events.emit(DomainEvent::FriendshipRemoved { user_id, friend_id });
        Ok(())
    }

    pub fn are_friends(&self, a: i64, b: i64) -> Result<bool, AppError> {
        require_id(a, "user")?;
        require_id(b, "friend")?;
        self.db.with_conn(|conn| friendships::are_friends(conn, a, b))
    }

    /// Accepted friends, whichever side sent the request
    pub fn list_friends(&self, user_id: i64) -> Result<FriendList, AppError> {
        require_id(user_id, "user")?;
        let friends = self.db.with_conn(|conn| friendships::list_friends(conn, user_id))?;
        Ok(FriendList {
            count: friends.len(),
            friends,
        })
    }

    /// Requests waiting on `user_id` to answer
    pub fn pending_requests(&self, user_id: i64) -> Result<PendingRequests, AppError> {
        require_id(user_id, "user")?;
        let requests = self.db.with_conn(|conn| friendships::list_pending_requests(conn, user_id))?;
        Ok(PendingRequests {
            count: requests.len(),
            requests,
        })
    }
}
