//! Standard response envelope helpers: `{"success": true, ...payload}`.

use crate::query::{Page, ResolvedSort};
use axum::{http::StatusCode, Json};
use serde::Serialize;
use serde_json::{json, Value};

pub type Envelope = (StatusCode, Json<Value>);

/// One record under its singular key, e.g. `{"success": true, "author": {...}}`.
pub fn success_one<T: Serialize>(key: &str, data: T) -> Envelope {
    (StatusCode::OK, Json(json!({ "success": true, key: data })))
}

pub fn created_one<T: Serialize>(key: &str, data: T) -> Envelope {
    (StatusCode::CREATED, Json(json!({ "success": true, key: data })))
}

/// Records under their plural key with a count and the sort that was applied.
pub fn success_many<T: Serialize>(key: &str, data: Vec<T>, sort: ResolvedSort) -> Envelope {
    let count = data.len() as u64;
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "sort": sort.key,
            "order": sort.order.as_str(),
            "count": count,
            key: data,
        })),
    )
}

pub fn success_page<T: Serialize>(key: &str, page: Page<T>, sort: ResolvedSort) -> Envelope {
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "sort": sort.key,
            "order": sort.order.as_str(),
            "page": page.page,
            "per_page": page.per_page,
            "total": page.total,
            "total_pages": page.total_pages,
            "has_next": page.has_next,
            "has_prev": page.has_prev,
            key: page.items,
        })),
    )
}

pub fn success_message(message: String) -> Envelope {
    (StatusCode::OK, Json(json!({ "success": true, "message": message })))
}
