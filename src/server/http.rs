//! HTTP server implementation using hyper

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::header::{self, HeaderValue};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::Args;
use crate::error::AppError;
use crate::routes;
use crate::services::Services;

const ALLOW_METHODS: &str = "GET, POST, PUT, PATCH, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Shared server state
pub struct AppState {
    pub args: Args,
    pub services: Services,
}

impl AppState {
    pub fn new(args: Args, services: Services) -> Self {
        Self { args, services }
    }
}

/// Run the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<(), AppError> {
    let addr = state.args.listen_addr();
    let listener = TcpListener::bind(addr).await?;

    info!("Reflection server listening on {}", addr);
    if state.args.dev_mode {
        warn!("Development mode enabled - using built-in JWT secret");
    }

    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, peer, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", peer, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route a single request and attach CORS headers
pub async fn handle_request(
    state: Arc<AppState>,
    peer: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let method = req.method().clone();
    info!("[{}] {} {}", peer, method, req.uri().path());

    let mut response = if method == Method::OPTIONS {
        cors_preflight()
    } else {
        routes::route(req, &state).await
    };

    apply_cors(&mut response, &state.args.cors_origin);
    Ok(response)
}

fn cors_preflight() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::NO_CONTENT;
    response
        .headers_mut()
        .insert(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("86400"));
    response
}

fn apply_cors(response: &mut Response<Full<Bytes>>, origin: &str) {
    let headers = response.headers_mut();

    match HeaderValue::from_str(origin) {
        Ok(value) => {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
        }
        Err(_) => warn!(origin, "CORS origin is not a valid header value"),
    }
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS));
    headers.insert(header::ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
}
