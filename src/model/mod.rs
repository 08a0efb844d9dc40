//! Entity definitions for the three schema variants and the traits the store is generic over.

mod inventory;
mod library;
mod school;

pub use inventory::*;
pub use library::*;
pub use school::*;

use crate::error::AppError;
use crate::query::FilterParam;
use crate::sql::BindValue;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::sqlite::SqliteRow;

/// A child table holding a foreign key to an entity. Deleting the parent is refused while rows remain.
#[derive(Clone, Copy, Debug)]
pub struct Dependent {
    pub table: &'static str,
    pub column: &'static str,
}

/// One row type backed by one table with an integer `id` primary key.
pub trait Entity: for<'r> sqlx::FromRow<'r, SqliteRow> + Serialize + Send + Sync + Unpin + 'static {
    /// Table name, also the plural payload key (`authors`).
    const TABLE: &'static str;
    /// Human label used in messages (`Author`).
    const NAME: &'static str;
    /// Singular payload key (`author`).
    const KEY: &'static str;
    /// Selected and returned columns, `id` first.
    const COLUMNS: &'static [&'static str];
    const SORTABLE: &'static [&'static str];
    const FILTER_PARAMS: &'static [FilterParam];
    const UNIQUE: &'static [&'static str] = &[];
    const DEPENDENTS: &'static [Dependent] = &[];

    fn id(&self) -> i64;
}

/// A foreign key value that must resolve before a write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    pub table: &'static str,
    pub name: &'static str,
    pub id: i64,
}

impl Reference {
    pub fn to<E: Entity>(id: i64) -> Self {
        Self {
            table: E::TABLE,
            name: E::NAME,
            id,
        }
    }
}

/// A typed write request: either a full construction request or a patch.
pub trait Changeset: Send + Sync {
    type Entity: Entity;

    fn validate(&self) -> Result<(), AppError>;

    /// Columns to write. Patches return only the fields that were supplied.
    fn values(&self) -> Vec<(&'static str, BindValue)>;

    fn references(&self) -> Vec<Reference> {
        Vec::new()
    }
}

/// Deserializes a present key (even `null`) as `Some`, so patches can tell "clear" from "absent".
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Pushes a patch field when present.
pub(crate) fn push_present<T>(values: &mut Vec<(&'static str, BindValue)>, column: &'static str, field: &Option<T>)
where
    T: Clone + Into<BindValue>,
{
    if let Some(v) = field {
        values.push((column, v.clone().into()));
    }
}

/// Treats a blank optional string as absent.
pub(crate) fn non_blank(s: &Option<String>) -> Option<String> {
    s.as_ref()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
