//! HTTP routes for tracking analytics
//!
//! - GET /api/analytics/reflection-tracking?user_id=&start_date=&end_date=
//! - GET /api/analytics/reflection-tracking-by-category?user_id=&start_date=&end_date=
//!
//! Missing dates cover the last thirty days up to today.

use chrono::{Duration, NaiveDate};
use hyper::body::Incoming;
use hyper::{Method, Request};

use crate::error::AppError;
use crate::server::AppState;
use crate::services::response::{method_not_allowed, not_found, ok};
use crate::services::{parse_date, today};

use super::{HandlerResult, Query};

const DEFAULT_RANGE_DAYS: i64 = 30;

pub async fn handle(req: Request<Incoming>, state: &AppState, rest: &[&str]) -> HandlerResult {
    let reflections = &state.services.reflections;

    match (req.method(), rest) {
        (&Method::GET, ["reflection-tracking"]) => {
            let (user_id, start, end) = range_query(&Query::from_request(&req)?)?;
            Ok(ok(&reflections.tracking_analytics(user_id, start, end)?))
        }
        (&Method::GET, ["reflection-tracking-by-category"]) => {
            let (user_id, start, end) = range_query(&Query::from_request(&req)?)?;
            Ok(ok(&reflections.tracking_by_category(user_id, start, end)?))
        }
        (_, ["reflection-tracking" | "reflection-tracking-by-category"]) => Ok(method_not_allowed()),
        _ => Ok(not_found("Not found")),
    }
}

fn range_query(query: &Query) -> Result<(i64, NaiveDate, NaiveDate), AppError> {
    let user_id = query.require_int("user_id")?;
    let end = match query.get("end_date") {
        Some(value) => parse_date(value, "end_date")?,
        None => today(),
    };
    let start = match query.get("start_date") {
        Some(value) => parse_date(value, "start_date")?,
        None => end - Duration::days(DEFAULT_RANGE_DAYS),
    };
    Ok((user_id, start, end))
}
