//! HTTP routes for categories and subcategories
//!
//! - GET  /api/categories?user_id=
//! - POST /api/categories
//! - PUT|DELETE /api/categories/{id}
//! - GET|POST /api/categories/{id}/subcategories
//! - PUT|DELETE /api/subcategories/{id}

use hyper::body::Incoming;
use hyper::{Method, Request};

use crate::db::{CreateCategoryInput, CreateSubCategoryInput};
use crate::server::AppState;
use crate::services::response::{created, method_not_allowed, no_content, not_found, ok};

use super::{parse_json_body, path_id, HandlerResult, Query};

pub async fn handle_categories(req: Request<Incoming>, state: &AppState, rest: &[&str]) -> HandlerResult {
    let method = req.method().clone();
    let categories = &state.services.categories;

    match (&method, rest) {
        (&Method::GET, []) => {
            let user_id = Query::from_request(&req)?.require_int("user_id")?;
            Ok(ok(&categories.list_for_user(user_id)?))
        }
        (&Method::POST, []) => {
            let body: CreateCategoryInput = parse_json_body(req.into_body()).await?;
            Ok(created(&categories.create(body)?))
        }
        (&Method::PUT, [id]) => {
            let id = path_id(id, "category")?;
            let body: CreateCategoryInput = parse_json_body(req.into_body()).await?;
            Ok(ok(&categories.update(id, body)?))
        }
        (&Method::DELETE, [id]) => {
            categories.delete(path_id(id, "category")?)?;
            Ok(no_content())
        }
        (&Method::GET, [id, "subcategories"]) => {
            Ok(ok(&categories.list_sub_categories(path_id(id, "category")?)?))
        }
        (&Method::POST, [id, "subcategories"]) => {
            let category_id = path_id(id, "category")?;
            let mut body: CreateSubCategoryInput = parse_json_body(req.into_body()).await?;
            body.category_id = category_id;
            Ok(created(&categories.create_sub_category(body)?))
        }
        (_, [] | [_] | [_, "subcategories"]) => Ok(method_not_allowed()),
        _ => Ok(not_found("Not found")),
    }
}

pub async fn handle_sub_categories(req: Request<Incoming>, state: &AppState, rest: &[&str]) -> HandlerResult {
    let method = req.method().clone();
    let categories = &state.services.categories;

    match (&method, rest) {
        (&Method::PUT, [id]) => {
            let id = path_id(id, "subcategory")?;
            let body: CreateSubCategoryInput = parse_json_body(req.into_body()).await?;
            Ok(ok(&categories.update_sub_category(id, body)?))
        }
        (&Method::DELETE, [id]) => {
            categories.delete_sub_category(path_id(id, "subcategory")?)?;
            Ok(no_content())
        }
        (_, [_]) => Ok(method_not_allowed()),
        _ => Ok(not_found("Not found")),
    }
}
