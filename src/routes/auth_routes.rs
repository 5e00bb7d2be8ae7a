//! HTTP routes for authentication
//!
//! - POST /api/auth/register - Create an account and get a JWT
//! - POST /api/auth/login    - Authenticate and get a JWT
//! - POST /api/auth/logout   - Stateless; the client drops its token
//! - GET  /api/auth/me       - Current user from the bearer token

use hyper::body::Incoming;
use hyper::{Method, Request, StatusCode};
use tracing::info;

use crate::error::AppError;
use crate::server::AppState;
use crate::services::response::{created, message, method_not_allowed, not_found, ok};
use crate::services::{LoginRequest, RegisterRequest};

use super::{bearer_token, parse_json_body, HandlerResult};

pub async fn handle(req: Request<Incoming>, state: &AppState, rest: &[&str]) -> HandlerResult {
    let method = req.method().clone();

    match (&method, rest) {
        (&Method::POST, ["register"]) => register(req, state).await,
        (&Method::POST, ["login"]) => login(req, state).await,
        (&Method::POST, ["logout"]) => Ok(message(StatusCode::OK, "logged out")),
        (&Method::GET, ["me"]) => me(&req, state),
        (_, ["register" | "login" | "logout" | "me"]) => Ok(method_not_allowed()),
        _ => Ok(not_found("Not found")),
    }
}

/// POST /api/auth/register
async fn register(req: Request<Incoming>, state: &AppState) -> HandlerResult {
    let body: RegisterRequest = parse_json_body(req.into_body()).await?;
    let response = state.services.auth.register(body)?;
    Ok(created(&response))
}

/// POST /api/auth/login
async fn login(req: Request<Incoming>, state: &AppState) -> HandlerResult {
    let body: LoginRequest = parse_json_body(req.into_body()).await?;
    let response = state.services.auth.login(body)?;
    info!(user_id = response.user.id, "User logged in");
    Ok(ok(&response))
}

/// GET /api/auth/me
fn me(req: &Request<Incoming>, state: &AppState) -> HandlerResult {
    let token = bearer_token(req).ok_or_else(|| AppError::Auth("missing authorization token".into()))?;
    let user = state.services.auth.me(token)?;
    Ok(ok(&user))
}
