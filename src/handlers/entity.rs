//! JSON CRUD handlers, generic over the entity resource: create, read, update, delete, list, page.

use crate::error::AppError;
use crate::handlers::query::{list_query, page_request};
use crate::model::{Book, Entity, Student, Teacher};
use crate::query::{ListQuery, Page};
use crate::response::{self, Envelope};
use crate::service::Resource;
use crate::state::AppState;
use crate::store::EntityStore;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    Json,
};
use std::collections::HashMap;

pub(crate) fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(v)| v)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

pub(crate) fn path_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, AppError> {
    path.map(|Path(id)| id)
        .map_err(|_| AppError::BadRequest("id must be an integer".into()))
}

async fn present_one<R: Resource>(store: &EntityStore, record: R) -> Result<R::View, AppError> {
    let id = record.id();
    R::present(store, vec![record])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound(format!("{} {} not found", R::NAME, id)))
}

/// Full query for a list request: plain filters plus any that need a lookup first.
/// `None` means a lookup filter matched nothing, so the result is empty.
async fn resolve_query<R: Resource>(
    store: &EntityStore,
    params: &HashMap<String, String>,
) -> Result<Option<ListQuery>, AppError> {
    let mut query = list_query::<R>(params)?;
    match R::lookup_filters(store, params).await? {
        Some(extra) => {
            query.filters.extend(extra);
            Ok(Some(query))
        }
        None => Ok(None),
    }
}

pub async fn list<R: Resource>(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Envelope, AppError> {
    let sort = list_query::<R>(&params)?.resolved_sort(R::SORTABLE);
    let records = match resolve_query::<R>(&state.store, &params).await? {
        Some(query) => state.store.list::<R>(&query).await?,
        None => Vec::new(),
    };
    let views = R::present(&state.store, records).await?;
    Ok(response::success_many(R::TABLE, views, sort))
}

pub async fn page<R: Resource>(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Envelope, AppError> {
    let request = page_request(&params, state.config.default_per_page);
    let sort = list_query::<R>(&params)?.resolved_sort(R::SORTABLE);
    let mut page = match resolve_query::<R>(&state.store, &params).await? {
        Some(query) => state.store.paginate::<R>(&query, request).await?,
        None => Page::new(Vec::new(), request, 0),
    };
    let views = R::present(&state.store, std::mem::take(&mut page.items)).await?;
    Ok(response::success_page(R::TABLE, page.map_items(views), sort))
}

pub async fn create<R: Resource>(
    State(state): State<AppState>,
    payload: Result<Json<R::New>, JsonRejection>,
) -> Result<Envelope, AppError> {
    let new = body(payload)?;
    let record = state.store.create(&new).await?;
    let view = present_one::<R>(&state.store, record).await?;
    Ok(response::created_one(R::KEY, view))
}

pub async fn read<R: Resource>(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Envelope, AppError> {
    let record = state.store.get::<R>(path_id(id)?).await?;
    let view = present_one::<R>(&state.store, record).await?;
    Ok(response::success_one(R::KEY, view))
}

pub async fn update<R: Resource>(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<R::Patch>, JsonRejection>,
) -> Result<Envelope, AppError> {
    let id = path_id(id)?;
    let patch = body(payload)?;
    let record = state.store.update(id, &patch).await?;
    let view = present_one::<R>(&state.store, record).await?;
    Ok(response::success_one(R::KEY, view))
}

pub async fn delete<R: Resource>(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Envelope, AppError> {
    state.store.delete::<R>(path_id(id)?).await?;
    Ok(response::success_message(format!("{} deleted successfully", R::NAME)))
}

pub async fn books_by_author(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Envelope, AppError> {
    let books = state.store.books_by_author(path_id(id)?).await?;
    let views = state.store.book_views(books).await?;
    Ok(response::success_many(Book::TABLE, views, Default::default()))
}

pub async fn students_of_course(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Envelope, AppError> {
    let students = state.store.students_of_course(path_id(id)?).await?;
    let views = state.store.student_views(students).await?;
    Ok(response::success_many(Student::TABLE, views, Default::default()))
}

pub async fn teachers_of_course(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Envelope, AppError> {
    let teachers = state.store.teachers_of_course(path_id(id)?).await?;
    let views = state.store.teacher_views(teachers).await?;
    Ok(response::success_many(Teacher::TABLE, views, Default::default()))
}
