//! Liveness endpoint

use bytes::Bytes;
use http_body_util::Full;
use hyper::Response;
use serde::Serialize;

use crate::services::response::ok;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /health
pub fn health_check() -> Response<Full<Bytes>> {
    ok(&HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}
