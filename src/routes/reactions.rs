//! HTTP routes for reactions
//!
//! - POST   /api/reactions?user_id=&reflection_id=  body `{reaction_type, comment_text}`
//! - DELETE /api/reactions?user_id=&reflection_id=&reaction_type=
//! - GET    /api/reactions?reflection_id=
//! - GET    /api/reactions/counts?reflection_id=
//! - GET    /api/reactions/user?user_id=&reflection_id=
//! - GET    /api/reactions/prompts

use hyper::body::Incoming;
use hyper::{Method, Request};

use crate::server::AppState;
use crate::services::response::{created, method_not_allowed, no_content, not_found, ok};
use crate::services::AddReactionRequest;

use super::{parse_json_body, HandlerResult, Query};

pub async fn handle(req: Request<Incoming>, state: &AppState, rest: &[&str]) -> HandlerResult {
    let method = req.method().clone();
    let reactions = &state.services.reactions;
    let query = Query::from_request(&req)?;

    match (&method, rest) {
        (&Method::POST, []) => {
            let user_id = query.require_int("user_id")?;
            let reflection_id = query.require_int("reflection_id")?;
            let body: AddReactionRequest = parse_json_body(req.into_body()).await?;
            Ok(created(&reactions.add(reflection_id, user_id, body)?))
        }
        (&Method::DELETE, []) => {
            let user_id = query.require_int("user_id")?;
            let reflection_id = query.require_int("reflection_id")?;
            let reaction_type = query.require("reaction_type")?;
            reactions.remove(reflection_id, user_id, reaction_type)?;
            Ok(no_content())
        }
        (&Method::GET, []) => Ok(ok(&reactions.list(query.require_int("reflection_id")?)?)),
        (&Method::GET, ["counts"]) => Ok(ok(&reactions.counts(query.require_int("reflection_id")?)?)),
        (&Method::GET, ["user"]) => {
            let user_id = query.require_int("user_id")?;
            let reflection_id = query.require_int("reflection_id")?;
            Ok(ok(&reactions.user_reaction(reflection_id, user_id)?))
        }
        (&Method::GET, ["prompts"]) => Ok(ok(&reactions.prompts()?)),
        (_, [] | ["counts"] | ["user"] | ["prompts"]) => Ok(method_not_allowed()),
        _ => Ok(not_found("Not found")),
    }
}
