//! Read-query model shared by the store and the HTTP adapters: filters, sort, pagination.

use crate::sql::BindValue;
use serde::Serialize;

pub const DEFAULT_PER_PAGE: u32 = 5;
pub const MAX_PER_PAGE: u32 = 100;
pub const MAX_LIMIT: u32 = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    /// Substring match, case-insensitive for ASCII.
    Like,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl FilterOp {
    pub fn as_sql(&self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Like => "LIKE",
            FilterOp::Gt => ">",
            FilterOp::Gte => ">=",
            FilterOp::Lt => "<",
            FilterOp::Lte => "<=",
        }
    }
}

/// How a query-string value is typed before binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Int,
    Real,
}

/// Maps a query-string parameter onto a filterable column.
#[derive(Clone, Copy, Debug)]
pub struct FilterParam {
    pub param: &'static str,
    pub column: &'static str,
    pub op: FilterOp,
    pub kind: ValueKind,
}

impl FilterParam {
    pub const fn new(param: &'static str, column: &'static str, op: FilterOp, kind: ValueKind) -> Self {
        Self { param, column, op, kind }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    pub column: &'static str,
    pub op: FilterOp,
    pub value: BindValue,
}

impl Filter {
    pub fn new(column: &'static str, op: FilterOp, value: impl Into<BindValue>) -> Self {
        Self {
            column,
            op,
            value: value.into(),
        }
    }

    pub fn eq(column: &'static str, value: impl Into<BindValue>) -> Self {
        Self::new(column, FilterOp::Eq, value)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Anything other than `desc` sorts ascending.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("desc") {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Sort as requested by a caller; the key is not trusted until resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sort {
    pub key: String,
    pub order: SortOrder,
}

impl Sort {
    pub fn new(key: impl Into<String>, order: SortOrder) -> Self {
        Self { key: key.into(), order }
    }

    /// Picks the key from the allow-list; unknown keys fall back to `id`.
    pub fn resolve(&self, allowed: &[&'static str]) -> ResolvedSort {
        let key = allowed
            .iter()
            .copied()
            .find(|k| *k == self.key)
            .unwrap_or("id");
        ResolvedSort { key, order: self.order }
    }
}

/// Sort whose key is known to be a real column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedSort {
    pub key: &'static str,
    pub order: SortOrder,
}

impl Default for ResolvedSort {
    fn default() -> Self {
        Self {
            key: "id",
            order: SortOrder::Asc,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ListQuery {
    pub filters: Vec<Filter>,
    pub sort: Option<Sort>,
    pub limit: Option<u32>,
    pub offset: Option<u64>,
}

impl ListQuery {
    pub fn filtered(filters: Vec<Filter>) -> Self {
        Self {
            filters,
            ..Default::default()
        }
    }

    pub fn sorted_by(mut self, key: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some(Sort::new(key, order));
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn resolved_sort(&self, allowed: &[&'static str]) -> ResolvedSort {
        self.sort
            .as_ref()
            .map(|s| s.resolve(allowed))
            .unwrap_or_default()
    }
}

/// 1-based page request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }.normalized()
    }

    /// Page below 1 becomes 1; per_page is clamped to `1..=MAX_PER_PAGE`.
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.per_page as u64
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        let per_page = request.per_page as u64;
        Self {
            items,
            page: request.page,
            per_page: request.per_page,
            total,
            total_pages: total.div_ceil(per_page),
            has_next: request.page as u64 * per_page < total,
            has_prev: request.page > 1,
        }
    }

    pub fn map_items<U>(self, items: Vec<U>) -> Page<U> {
        Page {
            items,
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            total_pages: self.total_pages,
            has_next: self.has_next,
            has_prev: self.has_prev,
        }
    }
}
