//! HTTP routes for the social feed
//!
//! - GET /api/feed/friends?user_id=&limit=&offset=
//! - GET /api/feed/friend/{friend_id}?user_id=&limit=&offset=
//! - GET /api/feed/friend-by-username?user_id=&friend_username=&limit=&offset=

use hyper::body::Incoming;
use hyper::{Method, Request};

use crate::error::AppError;
use crate::server::AppState;
use crate::services::response::{method_not_allowed, not_found, ok};
use crate::services::Page;

use super::{path_id, HandlerResult, Query};

pub async fn handle(req: Request<Incoming>, state: &AppState, rest: &[&str]) -> HandlerResult {
    let feed = &state.services.feed;

    match (req.method(), rest) {
        (&Method::GET, ["friends"]) => {
            let query = Query::from_request(&req)?;
            let viewer_id = query.require_int("user_id")?;
            Ok(ok(&feed.friends_feed(viewer_id, page(&query)?)?))
        }
        (&Method::GET, ["friend", friend_id]) => {
            let friend_id = path_id(friend_id, "friend")?;
            let query = Query::from_request(&req)?;
            let viewer_id = query.require_int("user_id")?;
            Ok(ok(&feed.friend_reflections(viewer_id, friend_id, page(&query)?)?))
        }
        (&Method::GET, ["friend-by-username"]) => {
            let query = Query::from_request(&req)?;
            let viewer_id = query.require_int("user_id")?;
            let username = query.require("friend_username")?;
            Ok(ok(&feed.friend_reflections_by_username(viewer_id, username, page(&query)?)?))
        }
        (_, ["friends"] | ["friend", _] | ["friend-by-username"]) => Ok(method_not_allowed()),
        _ => Ok(not_found("Not found")),
    }
}

fn page(query: &Query) -> Result<Page, AppError> {
    Ok(Page::new(
        query.int("limit")?.unwrap_or(0),
        query.int("offset")?.unwrap_or(0),
    ))
}
