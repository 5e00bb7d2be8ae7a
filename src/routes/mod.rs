//! HTTP routes
//!
//! Each area module exposes one `handle` function that receives the path
//! segments after its prefix. Handlers decode input, call a service and
//! encode the result; they carry no business rules.

pub mod actions;
pub mod analytics;
pub mod auth_routes;
pub mod categories;
pub mod feed;
pub mod friends;
pub mod health;
pub mod reactions;
pub mod reflections;
pub mod users;

use std::collections::HashMap;
use std::error::Error as StdError;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Incoming};
use hyper::{header, Method, Request, Response};
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::server::AppState;
use crate::services::response::{error_response, method_not_allowed, not_found};

/// Largest request body accepted
pub const MAX_BODY_BYTES: usize = 64 * 1024;

pub type HandlerResult = Result<Response<Full<Bytes>>, AppError>;

/// Dispatch an `/api/...` or `/health` request to its area handler
pub async fn route(req: Request<Incoming>, state: &AppState) -> Response<Full<Bytes>> {
    let path = req.uri().path().to_string();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let result = match segments.as_slice() {
        ["health"] if req.method() == Method::GET => Ok(health::health_check()),
        ["health"] => Ok(method_not_allowed()),
        ["api", "auth", rest @ ..] => auth_routes::handle(req, state, rest).await,
        ["api", "users", rest @ ..] => users::handle(req, state, rest).await,
        ["api", "reflections", rest @ ..] => reflections::handle(req, state, rest).await,
        ["api", "analytics", rest @ ..] => analytics::handle(req, state, rest).await,
        ["api", "actions", rest @ ..] => actions::handle(req, state, rest).await,
        ["api", "categories", rest @ ..] => categories::handle_categories(req, state, rest).await,
        ["api", "subcategories", rest @ ..] => categories::handle_sub_categories(req, state, rest).await,
        ["api", "feed", rest @ ..] => feed::handle(req, state, rest).await,
        ["api", "friends", rest @ ..] => friends::handle(req, state, rest).await,
        ["api", "reactions", rest @ ..] => reactions::handle(req, state, rest).await,
        _ => Ok(not_found("Not found")),
    };

    result.unwrap_or_else(error_response)
}

// =============================================================================
// Request Helpers
// =============================================================================

/// Read a JSON body, refusing anything over [`MAX_BODY_BYTES`]
pub async fn parse_json_body<T, B>(body: B) -> Result<T, AppError>
where
    T: DeserializeOwned,
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let bytes = Limited::new(body, MAX_BODY_BYTES)
        .collect()
        .await
        .map_err(|e| {
            if e.is::<LengthLimitError>() {
                AppError::InvalidInput("request body too large".into())
            } else {
                AppError::InvalidInput(format!("failed to read body: {}", e))
            }
        })?
        .to_bytes();

    serde_json::from_slice(&bytes).map_err(|e| AppError::InvalidInput(format!("invalid JSON: {}", e)))
}

/// Decoded query string
#[derive(Debug, Default)]
pub struct Query(HashMap<String, String>);

impl Query {
    pub fn parse(query: Option<&str>) -> Result<Self, AppError> {
        let pairs: Vec<(String, String)> = match query {
            Some(q) => serde_urlencoded::from_str(q)
                .map_err(|e| AppError::InvalidInput(format!("invalid query string: {}", e)))?,
            None => Vec::new(),
        };
        Ok(Self(pairs.into_iter().collect()))
    }

    pub fn from_request<B>(req: &Request<B>) -> Result<Self, AppError> {
        Self::parse(req.uri().query())
    }

    /// Non-empty string value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
    }

    pub fn require(&self, name: &str) -> Result<&str, AppError> {
        self.get(name)
            .ok_or_else(|| AppError::InvalidInput(format!("{} is required", name)))
    }

    /// Optional integer; present but unparseable is an error
    pub fn int(&self, name: &str) -> Result<Option<i64>, AppError> {
        self.get(name)
            .map(|v| v.parse::<i64>().map_err(|_| AppError::InvalidInput(format!("invalid {}", name))))
            .transpose()
    }

    pub fn require_int(&self, name: &str) -> Result<i64, AppError> {
        self.int(name)?
            .ok_or_else(|| AppError::InvalidInput(format!("{} is required", name)))
    }
}

/// Parse a numeric path segment
pub fn path_id(segment: &str, what: &str) -> Result<i64, AppError> {
    segment
        .parse::<i64>()
        .map_err(|_| AppError::InvalidInput(format!("invalid {} ID", what)))
}

/// Bearer token from the Authorization header, if any
pub fn bearer_token<B>(req: &Request<B>) -> Option<&str> {
    crate::auth::extract_token_from_header(
        req.headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok()),
    )
}
