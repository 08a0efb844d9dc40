//! Query-string parsing into store queries.

use crate::error::AppError;
use crate::model::Entity;
use crate::query::{Filter, ListQuery, PageRequest, Sort, SortOrder, ValueKind};
use crate::sql::BindValue;
use std::collections::HashMap;

/// Filters, sort and limit/offset for entity `E`. Unknown parameters are ignored;
/// a filter value of the wrong type is a bad request. Blank values are skipped.
pub fn list_query<E: Entity>(params: &HashMap<String, String>) -> Result<ListQuery, AppError> {
    let mut filters = Vec::new();
    for fp in E::FILTER_PARAMS {
        let Some(raw) = params.get(fp.param).map(|v| v.trim()).filter(|v| !v.is_empty()) else {
            continue;
        };
        let value = match fp.kind {
            ValueKind::Text => BindValue::Text(raw.to_string()),
            ValueKind::Int => raw
                .parse::<i64>()
                .map(BindValue::Int)
                .map_err(|_| AppError::BadRequest(format!("{} must be an integer", fp.param)))?,
            ValueKind::Real => raw
                .parse::<f64>()
                .map(BindValue::Real)
                .map_err(|_| AppError::BadRequest(format!("{} must be a number", fp.param)))?,
        };
        filters.push(Filter::new(fp.column, fp.op, value));
    }

    let order = params
        .get("order")
        .map(|o| SortOrder::parse(o))
        .unwrap_or_default();
    let sort = params.get("sort").map(|key| Sort::new(key.trim(), order)).or_else(|| {
        // `?order=desc` alone still orders by id
        params.contains_key("order").then(|| Sort::new("id", order))
    });

    Ok(ListQuery {
        filters,
        sort,
        limit: window_param::<u32>(params, "limit")?,
        offset: window_param::<i64>(params, "offset")?.map(|o| o as u64),
    })
}

/// Non-negative integer parameter that fits `T`; blank means absent.
fn window_param<T>(params: &HashMap<String, String>, name: &str) -> Result<Option<T>, AppError>
where
    T: std::str::FromStr + Default + PartialOrd,
{
    let Some(raw) = params.get(name).map(|v| v.trim()).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<T>() {
        Ok(v) if v >= T::default() => Ok(Some(v)),
        _ => Err(AppError::BadRequest(format!("{name} must be a non-negative integer"))),
    }
}

/// `?page=&per_page=`; unparseable values fall back to the defaults.
pub fn page_request(params: &HashMap<String, String>, default_per_page: u32) -> PageRequest {
    let page = params.get("page").and_then(|v| v.parse().ok()).unwrap_or(1);
    let per_page = params
        .get("per_page")
        .and_then(|v| v.parse().ok())
        .unwrap_or(default_per_page);
    PageRequest::new(page, per_page)
}
