//! Builds parameterized INSERT, SELECT, UPDATE, DELETE for an entity table.
//! Identifiers only ever come from `Entity` constants; values are always bound.

use crate::model::Entity;
use crate::query::{Filter, FilterOp, ResolvedSort, MAX_LIMIT};
use crate::sql::BindValue;

/// Largest OFFSET SQLite reads as an integer.
const MAX_OFFSET: u64 = i64::MAX as u64;

/// Quote identifier for SQLite (safe: only from compile-time constants).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Debug, Default)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<BindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf::default()
    }

    fn push_param(&mut self, v: BindValue) {
        self.params.push(v);
    }
}

fn column_list<E: Entity>() -> String {
    E::COLUMNS
        .iter()
        .map(|c| quoted(c))
        .collect::<Vec<_>>()
        .join(", ")
}

fn is_filterable<E: Entity>(column: &str) -> bool {
    E::FILTER_PARAMS.iter().any(|p| p.column == column)
}

/// Escapes `\`, `%` and `_` so a substring filter matches them literally.
fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// WHERE clause from filters on allow-listed columns; other filters are dropped.
fn where_clause<E: Entity>(q: &mut QueryBuf, filters: &[Filter]) -> String {
    let mut parts = Vec::new();
    for f in filters {
        if !is_filterable::<E>(f.column) {
            continue;
        }
        let part = match f.op {
            FilterOp::Like => {
                let value = match &f.value {
                    BindValue::Text(s) => BindValue::Text(escape_like(s)),
                    other => other.clone(),
                };
                q.push_param(value);
                format!("{} LIKE '%' || ? || '%' ESCAPE '\\'", quoted(f.column))
            }
            op => {
                q.push_param(f.value.clone());
                format!("{} {} ?", quoted(f.column), op.as_sql())
            }
        };
        parts.push(part);
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    }
}

fn order_clause(sort: ResolvedSort) -> String {
    if sort.key == "id" {
        format!(" ORDER BY {} {}", quoted("id"), sort.order.as_sql())
    } else {
        format!(
            " ORDER BY {} {}, {} ASC",
            quoted(sort.key),
            sort.order.as_sql(),
            quoted("id")
        )
    }
}

/// SELECT by primary key. Caller binds the id as sole param.
pub fn select_by_id<E: Entity>() -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = ?",
        column_list::<E>(),
        quoted(E::TABLE),
        quoted("id")
    );
    q
}

/// SELECT list with filters, ORDER BY the resolved sort, optional LIMIT/OFFSET.
pub fn select_list<E: Entity>(
    filters: &[Filter],
    sort: ResolvedSort,
    limit: Option<u32>,
    offset: Option<u64>,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = where_clause::<E>(&mut q, filters);
    // SQLite only accepts OFFSET after a LIMIT; -1 means no limit.
    let limit_clause = match (limit, offset) {
        (Some(n), Some(o)) => format!(" LIMIT {} OFFSET {}", n.min(MAX_LIMIT), o.min(MAX_OFFSET)),
        (Some(n), None) => format!(" LIMIT {}", n.min(MAX_LIMIT)),
        (None, Some(o)) => format!(" LIMIT -1 OFFSET {}", o.min(MAX_OFFSET)),
        (None, None) => String::new(),
    };
    q.sql = format!(
        "SELECT {} FROM {}{}{}{}",
        column_list::<E>(),
        quoted(E::TABLE),
        where_clause,
        order_clause(sort),
        limit_clause
    );
    q
}

/// SELECT COUNT(*) with the same filter rules as `select_list`.
pub fn count<E: Entity>(filters: &[Filter]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = where_clause::<E>(&mut q, filters);
    q.sql = format!("SELECT COUNT(*) FROM {}{}", quoted(E::TABLE), where_clause);
    q
}

/// SELECT COUNT(*) FROM table WHERE column = value [AND id <> exclude].
/// Used for reference, uniqueness and dependent checks, so the table is given explicitly.
pub fn count_matching(table: &str, column: &str, value: BindValue, exclude_id: Option<i64>) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.push_param(value);
    let mut sql = format!(
        "SELECT COUNT(*) FROM {} WHERE {} = ?",
        quoted(table),
        quoted(column)
    );
    if let Some(id) = exclude_id {
        q.push_param(BindValue::Int(id));
        sql.push_str(&format!(" AND {} <> ?", quoted("id")));
    }
    q.sql = sql;
    q
}

/// SELECT rows where column IN (...) ORDER BY id. Used for batch-loading parents.
pub fn select_by_column_in<E: Entity>(column: &str, values: &[i64]) -> QueryBuf {
    let mut q = QueryBuf::new();
    if values.is_empty() {
        q.sql = format!("SELECT {} FROM {} WHERE 1 = 0", column_list::<E>(), quoted(E::TABLE));
        return q;
    }
    for v in values {
        q.push_param(BindValue::Int(*v));
    }
    let placeholders = vec!["?"; values.len()].join(", ");
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} IN ({}) ORDER BY {}",
        column_list::<E>(),
        quoted(E::TABLE),
        quoted(column),
        placeholders,
        quoted("id")
    );
    q
}

/// INSERT the given columns and return the stored row. Columns left out take their DB default.
pub fn insert<E: Entity>(values: &[(&'static str, BindValue)]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let returning = column_list::<E>();
    if values.is_empty() {
        q.sql = format!("INSERT INTO {} DEFAULT VALUES RETURNING {}", quoted(E::TABLE), returning);
        return q;
    }
    let mut cols = Vec::with_capacity(values.len());
    for (col, val) in values {
        cols.push(quoted(col));
        q.push_param(val.clone());
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        quoted(E::TABLE),
        cols.join(", "),
        vec!["?"; values.len()].join(", "),
        returning
    );
    q
}

/// UPDATE by id: SET only the given columns. With nothing to set this degrades to a SELECT.
pub fn update<E: Entity>(id: i64, values: &[(&'static str, BindValue)]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let sets: Vec<String> = values
        .iter()
        .filter(|(col, _)| *col != "id")
        .map(|(col, val)| {
            q.push_param(val.clone());
            format!("{} = ?", quoted(col))
        })
        .collect();
    if sets.is_empty() {
        let mut q = select_by_id::<E>();
        q.push_param(BindValue::Int(id));
        return q;
    }
    q.push_param(BindValue::Int(id));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ? RETURNING {}",
        quoted(E::TABLE),
        sets.join(", "),
        quoted("id"),
        column_list::<E>()
    );
    q
}

/// DELETE by id. Caller binds the id.
pub fn delete<E: Entity>() -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!("DELETE FROM {} WHERE {} = ?", quoted(E::TABLE), quoted("id"));
    q
}
