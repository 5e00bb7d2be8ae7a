//! HTTP routes for user accounts
//!
//! - POST   /api/users
//! - GET    /api/users/search?q=
//! - GET    /api/users/username/{username}
//! - GET|PUT|DELETE /api/users/{id}

use hyper::body::Incoming;
use hyper::{Method, Request};

use crate::db::UpdateUserInput;
use crate::server::AppState;
use crate::services::response::{created, method_not_allowed, no_content, not_found, ok};
use crate::services::CreateUserRequest;

use super::{parse_json_body, path_id, HandlerResult, Query};

pub async fn handle(req: Request<Incoming>, state: &AppState, rest: &[&str]) -> HandlerResult {
    let method = req.method().clone();
    let users = &state.services.users;

    match (&method, rest) {
        (&Method::POST, []) => {
            let body: CreateUserRequest = parse_json_body(req.into_body()).await?;
            Ok(created(&users.create(body)?))
        }
        (&Method::GET, ["search"]) => {
            let query = Query::from_request(&req)?;
            Ok(ok(&users.search(query.get("q").unwrap_or_default())?))
        }
        (&Method::GET, ["username", username]) => Ok(ok(&users.get_by_username(username)?)),
        (&Method::GET, [id]) => Ok(ok(&users.get(path_id(id, "user")?)?)),
        (&Method::PUT, [id]) => {
            let id = path_id(id, "user")?;
            let body: UpdateUserInput = parse_json_body(req.into_body()).await?;
            Ok(ok(&users.update(id, body)?))
        }
        (&Method::DELETE, [id]) => {
            users.delete(path_id(id, "user")?)?;
            Ok(no_content())
        }
        (_, [] | ["search"] | ["username", _] | [_]) => Ok(method_not_allowed()),
        _ => Ok(not_found("Not found")),
    }
}
