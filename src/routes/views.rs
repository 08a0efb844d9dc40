//! Browser routes: endpoint index, tables, add/edit forms, delete buttons.

use crate::handlers::views::{add_form, add_submit, delete_submit, edit_form, edit_submit, index, list_page, HtmlResource};
use crate::model::{Course, Product, Student, Teacher};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

fn html_routes<R: HtmlResource>() -> Router<AppState> {
    let base = format!("/{}", R::TABLE);
    let router = Router::new()
        .route(&base, get(list_page::<R>))
        .route(&format!("{base}/add"), get(add_form::<R>).post(add_submit::<R>))
        .route(&format!("{base}/:id/delete"), post(delete_submit::<R>));
    if R::EDITABLE {
        router.route(&format!("{base}/:id/edit"), get(edit_form::<R>).post(edit_submit::<R>))
    } else {
        router
    }
}

pub fn view_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .merge(html_routes::<Course>())
        .merge(html_routes::<Student>())
        .merge(html_routes::<Teacher>())
        .merge(html_routes::<Product>())
        .with_state(state)
}
