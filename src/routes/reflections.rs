//! HTTP routes for reflections
//!
//! - POST /api/reflections
//! - GET  /api/reflections?user_id=[&category_id=]
//! - GET  /api/reflections/user/{user_id}
//! - GET|PUT|DELETE /api/reflections/{id}
//! - POST /api/reflections/{id}/reflect - Toggle today's tracking marker
//! - GET  /api/reflections/{id}/actions

use hyper::body::Incoming;
use hyper::{Method, Request};

use crate::db::ReflectionInput;
use crate::server::AppState;
use crate::services::response::{created, method_not_allowed, no_content, not_found, ok};

use super::{parse_json_body, path_id, HandlerResult, Query};

pub async fn handle(req: Request<Incoming>, state: &AppState, rest: &[&str]) -> HandlerResult {
    let method = req.method().clone();
    let reflections = &state.services.reflections;

    match (&method, rest) {
        (&Method::POST, []) => {
            let body: ReflectionInput = parse_json_body(req.into_body()).await?;
            Ok(created(&reflections.create(body)?))
        }
        (&Method::GET, []) => {
            let query = Query::from_request(&req)?;
            let user_id = query.require_int("user_id")?;
            let list = match query.int("category_id")? {
                Some(category_id) => reflections.list_by_category(user_id, category_id)?,
                None => reflections.list_for_user(user_id)?,
            };
            Ok(ok(&list))
        }
        (&Method::GET, ["user", user_id]) => {
            Ok(ok(&reflections.list_for_user(path_id(user_id, "user")?)?))
        }
        (&Method::GET, [id]) => Ok(ok(&reflections.get(path_id(id, "reflection")?)?)),
        (&Method::PUT, [id]) => {
            let id = path_id(id, "reflection")?;
            let body: ReflectionInput = parse_json_body(req.into_body()).await?;
            Ok(ok(&reflections.update(id, body)?))
        }
        (&Method::DELETE, [id]) => {
            reflections.delete(path_id(id, "reflection")?)?;
            Ok(no_content())
        }
        (&Method::POST, [id, "reflect"]) => {
            Ok(ok(&reflections.track_reflection(path_id(id, "reflection")?)?))
        }
        (&Method::GET, [id, "actions"]) => {
            let id = path_id(id, "reflection")?;
            Ok(ok(&state.services.actions.list_for_reflection(id)?))
        }
        (_, [] | ["user", _] | [_] | [_, "reflect"] | [_, "actions"]) => Ok(method_not_allowed()),
        _ => Ok(not_found("Not found")),
    }
}
