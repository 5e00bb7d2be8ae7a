//! HTTP routes for action items
//!
//! - POST  /api/actions
//! - GET|PUT|DELETE /api/actions/{id}
//! - PATCH|PUT /api/actions/{id}/status  body `{status}`
//! - PATCH /api/actions/{id}/complete

use hyper::body::Incoming;
use hyper::{Method, Request};
use serde::Deserialize;

use crate::db::{CreateActionInput, UpdateActionInput};
use crate::server::AppState;
use crate::services::response::{created, method_not_allowed, no_content, not_found, ok};

use super::{parse_json_body, path_id, HandlerResult};

#[derive(Debug, Deserialize)]
struct StatusBody {
    #[serde(default)]
    status: String,
}

pub async fn handle(req: Request<Incoming>, state: &AppState, rest: &[&str]) -> HandlerResult {
    let method = req.method().clone();
    let actions = &state.services.actions;

    match (&method, rest) {
        (&Method::POST, []) => {
            let body: CreateActionInput = parse_json_body(req.into_body()).await?;
            Ok(created(&actions.create(body)?))
        }
        (&Method::GET, [id]) => Ok(ok(&actions.get(path_id(id, "action")?)?)),
        (&Method::PUT, [id]) => {
            let id = path_id(id, "action")?;
            let body: UpdateActionInput = parse_json_body(req.into_body()).await?;
            Ok(ok(&actions.update(id, body)?))
        }
        (&Method::DELETE, [id]) => {
            actions.delete(path_id(id, "action")?)?;
            Ok(no_content())
        }
        (&Method::PATCH | &Method::PUT, [id, "status"]) => {
            let id = path_id(id, "action")?;
            let body: StatusBody = parse_json_body(req.into_body()).await?;
            Ok(ok(&actions.update_status(id, &body.status)?))
        }
        (&Method::PATCH, [id, "complete"]) => Ok(ok(&actions.complete(path_id(id, "action")?)?)),
        (_, [] | [_] | [_, "status"] | [_, "complete"]) => Ok(method_not_allowed()),
        _ => Ok(not_found("Not found")),
    }
}
