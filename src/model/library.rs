//! Variant A: authors and their books.

use super::{nullable, non_blank, push_present, Changeset, Dependent, Entity, Reference};
use crate::error::AppError;
use crate::query::{FilterOp, FilterParam, ValueKind};
use crate::service::RequestValidator;
use crate::sql::BindValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub bio: Option<String>,
    pub city: Option<String>,
}

impl Entity for Author {
    const TABLE: &'static str = "authors";
    const NAME: &'static str = "Author";
    const KEY: &'static str = "author";
    const COLUMNS: &'static [&'static str] = &["id", "name", "bio", "city"];
    const SORTABLE: &'static [&'static str] = &["id", "name", "city"];
    const FILTER_PARAMS: &'static [FilterParam] = &[
        FilterParam::new("name", "name", FilterOp::Like, ValueKind::Text),
        FilterParam::new("city", "city", FilterOp::Eq, ValueKind::Text),
    ];
    const DEPENDENTS: &'static [Dependent] = &[Dependent {
        table: "books",
        column: "author_id",
    }];

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewAuthor {
    #[serde(default)]
    pub name: String,
    pub bio: Option<String>,
    pub city: Option<String>,
}

impl Changeset for NewAuthor {
    type Entity = Author;

    fn validate(&self) -> Result<(), AppError> {
        RequestValidator::required_text("name", &self.name)
    }

    fn values(&self) -> Vec<(&'static str, BindValue)> {
        vec![
            ("name", self.name.trim().into()),
            ("bio", self.bio.clone().into()),
            ("city", self.city.clone().into()),
        ]
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AuthorPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub bio: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub city: Option<Option<String>>,
}

impl Changeset for AuthorPatch {
    type Entity = Author;

    fn validate(&self) -> Result<(), AppError> {
        RequestValidator::not_blank("name", self.name.as_deref())
    }

    fn values(&self) -> Vec<(&'static str, BindValue)> {
        let mut values = Vec::new();
        push_present(&mut values, "name", &self.name.as_ref().map(|n| n.trim().to_string()));
        push_present(&mut values, "bio", &self.bio);
        push_present(&mut values, "city", &self.city);
        values
    }
}

/// The part of an author embedded in a book.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AuthorRef {
    pub id: i64,
    pub name: String,
}

impl From<&Author> for AuthorRef {
    fn from(a: &Author) -> Self {
        Self {
            id: a.id,
            name: a.name.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub year: Option<i64>,
    pub isbn: Option<String>,
    pub created_at: DateTime<Utc>,
    pub author_id: i64,
}

impl Entity for Book {
    const TABLE: &'static str = "books";
    const NAME: &'static str = "Book";
    const KEY: &'static str = "book";
    const COLUMNS: &'static [&'static str] = &["id", "title", "year", "isbn", "created_at", "author_id"];
    const SORTABLE: &'static [&'static str] = &["id", "title", "year", "created_at"];
    const FILTER_PARAMS: &'static [FilterParam] = &[
        FilterParam::new("title", "title", FilterOp::Like, ValueKind::Text),
        FilterParam::new("author_id", "author_id", FilterOp::Eq, ValueKind::Int),
        FilterParam::new("year", "year", FilterOp::Eq, ValueKind::Int),
        FilterParam::new("min_year", "year", FilterOp::Gte, ValueKind::Int),
        FilterParam::new("max_year", "year", FilterOp::Lte, ValueKind::Int),
        FilterParam::new("isbn", "isbn", FilterOp::Eq, ValueKind::Text),
    ];
    const UNIQUE: &'static [&'static str] = &["isbn"];

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewBook {
    #[serde(default)]
    pub title: String,
    pub year: Option<i64>,
    pub isbn: Option<String>,
    pub author_id: Option<i64>,
}

impl Changeset for NewBook {
    type Entity = Book;

    fn validate(&self) -> Result<(), AppError> {
        RequestValidator::required_text("title", &self.title)?;
        RequestValidator::required("author_id", &self.author_id)
    }

    fn values(&self) -> Vec<(&'static str, BindValue)> {
        vec![
            ("title", self.title.trim().into()),
            ("year", self.year.into()),
            ("isbn", non_blank(&self.isbn).into()),
            ("author_id", self.author_id.into()),
            ("created_at", Utc::now().into()),
        ]
    }

    fn references(&self) -> Vec<Reference> {
        self.author_id.map(Reference::to::<Author>).into_iter().collect()
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct BookPatch {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub year: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub isbn: Option<Option<String>>,
    pub author_id: Option<i64>,
}

impl Changeset for BookPatch {
    type Entity = Book;

    fn validate(&self) -> Result<(), AppError> {
        RequestValidator::not_blank("title", self.title.as_deref())
    }

    fn values(&self) -> Vec<(&'static str, BindValue)> {
        let mut values = Vec::new();
        push_present(&mut values, "title", &self.title.as_ref().map(|t| t.trim().to_string()));
        push_present(&mut values, "year", &self.year);
        push_present(&mut values, "isbn", &self.isbn.as_ref().map(non_blank));
        push_present(&mut values, "author_id", &self.author_id);
        values
    }

    fn references(&self) -> Vec<Reference> {
        self.author_id.map(Reference::to::<Author>).into_iter().collect()
    }
}

/// A book with its author fetched explicitly by id. `author` is `None` only if the row is gone.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BookView {
    #[serde(flatten)]
    pub book: Book,
    pub author: Option<AuthorRef>,
}
