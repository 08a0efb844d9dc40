//! Binds each entity to its request types and its presentation, so handlers can stay generic.

use crate::error::AppError;
use crate::model::*;
use crate::query::Filter;
use crate::store::EntityStore;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;

#[async_trait]
pub trait Resource: Entity {
    type New: Changeset<Entity = Self> + DeserializeOwned + Send + 'static;
    type Patch: Changeset<Entity = Self> + DeserializeOwned + Send + 'static;
    type View: Serialize + Send;

    /// Turn stored records into what the API returns, fetching parents where needed.
    async fn present(store: &EntityStore, records: Vec<Self>) -> Result<Vec<Self::View>, AppError>;

    /// Filters that need a lookup before they can be applied. `None` means nothing can match.
    async fn lookup_filters(
        _store: &EntityStore,
        _params: &HashMap<String, String>,
    ) -> Result<Option<Vec<Filter>>, AppError> {
        Ok(Some(Vec::new()))
    }
}

/// `?course=<name>` resolves to a `course_id` filter.
async fn course_name_filter(store: &EntityStore, params: &HashMap<String, String>) -> Result<Option<Vec<Filter>>, AppError> {
    match params.get("course") {
        None => Ok(Some(Vec::new())),
        Some(name) => Ok(store
            .course_by_name(name)
            .await?
            .map(|course| vec![Filter::eq("course_id", course.id)])),
    }
}

#[async_trait]
impl Resource for Author {
    type New = NewAuthor;
    type Patch = AuthorPatch;
    type View = Author;

    async fn present(_store: &EntityStore, records: Vec<Self>) -> Result<Vec<Self::View>, AppError> {
        Ok(records)
    }
}

#[async_trait]
impl Resource for Book {
    type New = NewBook;
    type Patch = BookPatch;
    type View = BookView;

    async fn present(store: &EntityStore, records: Vec<Self>) -> Result<Vec<Self::View>, AppError> {
        store.book_views(records).await
    }
}

#[async_trait]
impl Resource for Course {
    type New = NewCourse;
    type Patch = CoursePatch;
    type View = Course;

    async fn present(_store: &EntityStore, records: Vec<Self>) -> Result<Vec<Self::View>, AppError> {
        Ok(records)
    }
}

#[async_trait]
impl Resource for Student {
    type New = NewStudent;
    type Patch = StudentPatch;
    type View = StudentView;

    async fn present(store: &EntityStore, records: Vec<Self>) -> Result<Vec<Self::View>, AppError> {
        store.student_views(records).await
    }

    async fn lookup_filters(
        store: &EntityStore,
        params: &HashMap<String, String>,
    ) -> Result<Option<Vec<Filter>>, AppError> {
        course_name_filter(store, params).await
    }
}

#[async_trait]
impl Resource for Teacher {
    type New = NewTeacher;
    type Patch = TeacherPatch;
    type View = TeacherView;

    async fn present(store: &EntityStore, records: Vec<Self>) -> Result<Vec<Self::View>, AppError> {
        store.teacher_views(records).await
    }

    async fn lookup_filters(
        store: &EntityStore,
        params: &HashMap<String, String>,
    ) -> Result<Option<Vec<Filter>>, AppError> {
        course_name_filter(store, params).await
    }
}

#[async_trait]
impl Resource for Product {
    type New = NewProduct;
    type Patch = ProductPatch;
    type View = Product;

    async fn present(_store: &EntityStore, records: Vec<Self>) -> Result<Vec<Self::View>, AppError> {
        Ok(records)
    }
}
