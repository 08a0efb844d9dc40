//! JSON CRUD routes, one set per entity, plus parent-to-children listings.

use crate::handlers::entity::{
    books_by_author, create, delete as delete_handler, list, page, read, students_of_course, teachers_of_course, update,
};
use crate::model::{Author, Book, Course, Product, Student, Teacher};
use crate::service::Resource;
use crate::state::AppState;
use axum::{routing::get, Router};

/// `/{plural}`, `/{plural}/page` and `/{plural}/:id` for one entity.
fn resource_routes<R: Resource>() -> Router<AppState> {
    let base = format!("/{}", R::TABLE);
    Router::new()
        .route(&base, get(list::<R>).post(create::<R>))
        .route(&format!("{base}/page"), get(page::<R>))
        .route(
            &format!("{base}/:id"),
            get(read::<R>).put(update::<R>).patch(update::<R>).delete(delete_handler::<R>),
        )
}

pub fn entity_routes(state: AppState) -> Router {
    Router::new()
        .merge(resource_routes::<Author>())
        .merge(resource_routes::<Book>())
        .merge(resource_routes::<Course>())
        .merge(resource_routes::<Student>())
        .merge(resource_routes::<Teacher>())
        .merge(resource_routes::<Product>())
        .route("/authors/:id/books", get(books_by_author))
        .route("/courses/:id/students", get(students_of_course))
        .route("/courses/:id/teachers", get(teachers_of_course))
        .with_state(state)
}
