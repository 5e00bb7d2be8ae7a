//! HTTP routes for friendships
//!
//! - POST   /api/friends/request?user_id=  body `{friend_id}`
//! - POST   /api/friends/accept?user_id=   body `{friend_id}` (the requester)
//! - POST   /api/friends/reject?user_id=   body `{friend_id}` (the requester)
//! - GET    /api/friends?user_id=
//! - DELETE /api/friends?user_id=&friend_id=
//! - GET    /api/friends/pending?user_id=

use hyper::body::Incoming;
use hyper::{Method, Request, StatusCode};
use serde::Deserialize;

use crate::server::AppState;
use crate::services::response::{created, message, method_not_allowed, not_found, ok};

use super::{parse_json_body, HandlerResult, Query};

#[derive(Debug, Deserialize)]
struct FriendBody {
    #[serde(default)]
    friend_id: i64,
}

pub async fn handle(req: Request<Incoming>, state: &AppState, rest: &[&str]) -> HandlerResult {
    let method = req.method().clone();
    let friendships = &state.services.friendships;
    let query = Query::from_request(&req)?;

    match (&method, rest) {
        (&Method::GET, []) => Ok(ok(&friendships.list_friends(query.require_int("user_id")?)?)),
        (&Method::DELETE, []) => {
            let user_id = query.require_int("user_id")?;
            let friend_id = query.require_int("friend_id")?;
            friendships.remove_friend(user_id, friend_id)?;
            Ok(message(StatusCode::OK, "friend removed"))
        }
        (&Method::GET, ["pending"]) => {
            Ok(ok(&friendships.pending_requests(query.require_int("user_id")?)?))
        }
        (&Method::POST, [action @ ("request" | "accept" | "reject")]) => {
            let user_id = query.require_int("user_id")?;
            let body: FriendBody = parse_json_body(req.into_body()).await?;

            match *action {
                "request" => Ok(created(&friendships.send_request(user_id, body.friend_id)?)),
                "accept" => Ok(ok(&friendships.accept_request(user_id, body.friend_id)?)),
                _ => Ok(ok(&friendships.reject_request(user_id, body.friend_id)?)),
            }
        }
        (_, [] | ["pending"] | ["request" | "accept" | "reject"]) => Ok(method_not_allowed()),
        _ => Ok(not_found("Not found")),
    }
}
