//! Server-rendered HTML pages for courses, students, teachers and products.

use crate::error::AppError;
use crate::handlers::entity::path_id;
use crate::handlers::query::list_query;
use crate::model::*;
use crate::query::{Filter, FilterOp, ListQuery, SortOrder, ValueKind};
use crate::service::Resource;
use crate::state::AppState;
use axum::{
    extract::{rejection::PathRejection, Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt::Write;

/// One input on an add or edit form.
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: ValueKind,
}

impl FormField {
    const fn new(name: &'static str, label: &'static str, kind: ValueKind) -> Self {
        Self { name, label, kind }
    }
}

/// How an entity is shown as a table row and edited through a form.
pub trait HtmlResource: Resource {
    const TITLE: &'static str;
    const HEADERS: &'static [&'static str];
    const FIELDS: &'static [FormField];
    const EDITABLE: bool = false;
    /// Row count for a bare `?latest`.
    const LATEST: u32 = 5;

    fn cells(view: &Self::View) -> Vec<String>;

    /// Current values in `FIELDS` order, for prefilling the edit form.
    fn field_values(&self) -> Vec<String>;
}

impl HtmlResource for Course {
    const TITLE: &'static str = "Courses";
    const HEADERS: &'static [&'static str] = &["ID", "Name", "Description"];
    const FIELDS: &'static [FormField] = &[
        FormField::new("name", "Name", ValueKind::Text),
        FormField::new("description", "Description", ValueKind::Text),
    ];

    fn cells(c: &Course) -> Vec<String> {
        vec![c.id.to_string(), c.name.clone(), c.description.clone().unwrap_or_default()]
    }

    fn field_values(&self) -> Vec<String> {
        vec![self.name.clone(), self.description.clone().unwrap_or_default()]
    }
}

const MEMBER_FIELDS: &[FormField] = &[
    FormField::new("name", "Name", ValueKind::Text),
    FormField::new("email", "Email", ValueKind::Text),
    FormField::new("course_id", "Course ID", ValueKind::Int),
];

fn course_cell(course: &Option<CourseRef>) -> String {
    course.as_ref().map(|c| c.name.clone()).unwrap_or_else(|| "-".into())
}

impl HtmlResource for Student {
    const TITLE: &'static str = "Students";
    const HEADERS: &'static [&'static str] = &["ID", "Name", "Email", "Course"];
    const FIELDS: &'static [FormField] = MEMBER_FIELDS;
    const EDITABLE: bool = true;

    fn cells(v: &StudentView) -> Vec<String> {
        vec![
            v.student.id.to_string(),
            v.student.name.clone(),
            v.student.email.clone(),
            course_cell(&v.course),
        ]
    }

    fn field_values(&self) -> Vec<String> {
        vec![self.name.clone(), self.email.clone(), self.course_id.to_string()]
    }
}

impl HtmlResource for Teacher {
    const TITLE: &'static str = "Teachers";
    const HEADERS: &'static [&'static str] = &["ID", "Name", "Email", "Course"];
    const FIELDS: &'static [FormField] = MEMBER_FIELDS;
    const EDITABLE: bool = true;
    const LATEST: u32 = 3;

    fn cells(v: &TeacherView) -> Vec<String> {
        vec![
            v.teacher.id.to_string(),
            v.teacher.name.clone(),
            v.teacher.email.clone(),
            course_cell(&v.course),
        ]
    }

    fn field_values(&self) -> Vec<String> {
        vec![self.name.clone(), self.email.clone(), self.course_id.to_string()]
    }
}

impl HtmlResource for Product {
    const TITLE: &'static str = "Products";
    const HEADERS: &'static [&'static str] = &["ID", "Name", "Quantity", "Price"];
    const FIELDS: &'static [FormField] = &[
        FormField::new("name", "Name", ValueKind::Text),
        FormField::new("quantity", "Quantity", ValueKind::Int),
        FormField::new("price", "Price", ValueKind::Real),
    ];

    fn cells(p: &Product) -> Vec<String> {
        vec![p.id.to_string(), p.name.clone(), p.quantity.to_string(), format!("{:.2}", p.price)]
    }

    fn field_values(&self) -> Vec<String> {
        vec![self.name.clone(), self.quantity.to_string(), self.price.to_string()]
    }
}

/// Escapes text for element content and double-quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Wraps a body fragment in the page shell. `body` must already be escaped.
fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n\
         <nav><a href=\"/\">Home</a> | <a href=\"/courses\">Courses</a> | <a href=\"/students\">Students</a> | \
         <a href=\"/teachers\">Teachers</a> | <a href=\"/products\">Products</a></nav>\n\
         <h1>{title}</h1>\n{body}\n</body>\n</html>\n",
        title = escape(title),
    ))
}

/// Store errors rendered as an HTML page with the same status the JSON API would use.
pub struct HtmlError(AppError);

impl From<AppError> for HtmlError {
    fn from(e: AppError) -> Self {
        Self(e)
    }
}

impl IntoResponse for HtmlError {
    fn into_response(self) -> Response {
        self.0.log_rejection();
        let body = format!(
            "<p class=\"error\">{}</p>\n<p><a href=\"javascript:history.back()\">Back</a></p>",
            escape(&self.0.public_message())
        );
        (self.0.status(), layout("Error", &body)).into_response()
    }
}

pub async fn index() -> Html<String> {
    let links = [
        ("/courses", "Courses (?search=)"),
        ("/students", "Students (?search=, ?sort=name, ?latest[=N], ?course=name)"),
        ("/teachers", "Teachers (?search=, ?sort=name, ?latest[=N], ?course=name)"),
        ("/products", "Products (?search=)"),
    ];
    let api = [
        "/api/authors",
        "/api/books",
        "/api/courses",
        "/api/students",
        "/api/teachers",
        "/api/products",
        "/health",
        "/ready",
        "/version",
    ];
    let mut body = String::from("<h2>Pages</h2>\n<ul>\n");
    for (href, label) in links {
        let _ = writeln!(body, "<li><a href=\"{href}\">{}</a></li>", escape(label));
    }
    body.push_str("</ul>\n<h2>JSON API</h2>\n<ul>\n");
    for href in api {
        let _ = writeln!(body, "<li><a href=\"{href}\">{href}</a></li>");
    }
    body.push_str("</ul>");
    layout("Entity Store", &body)
}

/// Table query for a browser list page. Takes the same filters and sort as the JSON list,
/// plus `?search=` on name and `?latest[=N]` for the newest rows by id.
fn page_query<R: HtmlResource>(params: &HashMap<String, String>) -> Result<ListQuery, AppError> {
    let mut query = list_query::<R>(params)?;
    if let Some(term) = params.get("search").map(|v| v.trim()).filter(|v| !v.is_empty()) {
        query.filters.push(Filter::new("name", FilterOp::Like, term));
    }
    let Some(raw) = params.get("latest").map(|v| v.trim()) else {
        return Ok(query);
    };
    let n = if raw.is_empty() {
        R::LATEST
    } else {
        raw.parse::<u32>()
            .map_err(|_| AppError::BadRequest("latest must be a non-negative integer".into()))?
    };
    Ok(query.sorted_by("id", SortOrder::Desc).with_limit(n))
}

fn render_table<R: HtmlResource>(views: &[R::View]) -> String {
    let mut html = format!("<p><a href=\"/{}/add\">Add</a></p>\n", R::TABLE);
    if views.is_empty() {
        html.push_str("<p>No records.</p>");
        return html;
    }
    html.push_str("<table>\n<tr>");
    for h in R::HEADERS {
        let _ = write!(html, "<th>{h}</th>");
    }
    html.push_str("<th></th></tr>\n");
    for view in views {
        let cells = R::cells(view);
        html.push_str("<tr>");
        for cell in &cells {
            let _ = write!(html, "<td>{}</td>", escape(cell));
        }
        // first cell is always the id
        let id = cells.first().map(String::as_str).unwrap_or_default();
        html.push_str("<td>");
        if R::EDITABLE {
            let _ = write!(html, "<a href=\"/{}/{id}/edit\">Edit</a> ", R::TABLE);
        }
        let _ = write!(
            html,
            "<form method=\"post\" action=\"/{}/{id}/delete\" style=\"display:inline\"><button type=\"submit\">Delete</button></form>",
            R::TABLE
        );
        html.push_str("</td></tr>\n");
    }
    html.push_str("</table>");
    html
}

fn render_form(action: &str, fields: &[FormField], values: &[String]) -> String {
    let mut html = format!("<form method=\"post\" action=\"{}\">\n", escape(action));
    for (i, field) in fields.iter().enumerate() {
        let input_type = match field.kind {
            ValueKind::Text => "text",
            ValueKind::Int | ValueKind::Real => "number",
        };
        let step = if matches!(field.kind, ValueKind::Real) { " step=\"any\"" } else { "" };
        let value = values.get(i).map(|v| escape(v)).unwrap_or_default();
        let _ = writeln!(
            html,
            "<p><label>{label} <input type=\"{input_type}\"{step} name=\"{name}\" value=\"{value}\"></label></p>",
            label = escape(field.label),
            name = field.name,
        );
    }
    html.push_str("<p><button type=\"submit\">Save</button></p>\n</form>");
    html
}

/// Submitted form values as a JSON object, typed per field. Blank inputs are left out.
fn form_to_json(fields: &[FormField], form: &HashMap<String, String>) -> Result<Value, AppError> {
    let mut object = Map::new();
    for field in fields {
        let Some(raw) = form.get(field.name).map(|v| v.trim()).filter(|v| !v.is_empty()) else {
            continue;
        };
        let value = match field.kind {
            ValueKind::Text => Value::from(raw),
            ValueKind::Int => raw
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| AppError::BadRequest(format!("{} must be an integer", field.name)))?,
            ValueKind::Real => raw
                .parse::<f64>()
                .map(Value::from)
                .map_err(|_| AppError::BadRequest(format!("{} must be a number", field.name)))?,
        };
        object.insert(field.name.to_string(), value);
    }
    Ok(Value::Object(object))
}

fn decode_form<T: serde::de::DeserializeOwned>(fields: &[FormField], form: &HashMap<String, String>) -> Result<T, AppError> {
    serde_json::from_value(form_to_json(fields, form)?).map_err(|e| AppError::BadRequest(e.to_string()))
}

fn to_list<R: HtmlResource>() -> Redirect {
    Redirect::to(&format!("/{}", R::TABLE))
}

pub async fn list_page<R: HtmlResource>(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Html<String>, HtmlError> {
    let mut query = page_query::<R>(&params)?;
    let records = match R::lookup_filters(&state.store, &params).await? {
        Some(filters) => {
            query.filters.extend(filters);
            state.store.list::<R>(&query).await?
        }
        None => Vec::new(),
    };
    let views = R::present(&state.store, records).await?;
    Ok(layout(R::TITLE, &render_table::<R>(&views)))
}

pub async fn add_form<R: HtmlResource>() -> Html<String> {
    let action = format!("/{}/add", R::TABLE);
    layout(&format!("Add {}", R::NAME), &render_form(&action, R::FIELDS, &[]))
}

pub async fn add_submit<R: HtmlResource>(
    State(state): State<AppState>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Redirect, HtmlError> {
    let new: R::New = decode_form(R::FIELDS, &form)?;
    state.store.create(&new).await?;
    Ok(to_list::<R>())
}

pub async fn edit_form<R: HtmlResource>(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Html<String>, HtmlError> {
    let id = path_id(id)?;
    let record = state.store.get::<R>(id).await?;
    let action = format!("/{}/{id}/edit", R::TABLE);
    let body = render_form(&action, R::FIELDS, &record.field_values());
    Ok(layout(&format!("Edit {}", R::NAME), &body))
}

pub async fn edit_submit<R: HtmlResource>(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Redirect, HtmlError> {
    let id = path_id(id)?;
    let patch: R::Patch = decode_form(R::FIELDS, &form)?;
    state.store.update(id, &patch).await?;
    Ok(to_list::<R>())
}

pub async fn delete_submit<R: HtmlResource>(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Redirect, HtmlError> {
    state.store.delete::<R>(path_id(id)?).await?;
    Ok(to_list::<R>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_and_quotes() {
        assert_eq!(
            escape(r#"<script>alert("x" & 'y')</script>"#),
            "&lt;script&gt;alert(&quot;x&quot; &amp; &#39;y&#39;)&lt;/script&gt;"
        );
        assert_eq!(escape("Python Basics"), "Python Basics");
    }

    #[test]
    fn form_values_are_typed_and_blanks_dropped() {
        let form: HashMap<String, String> = [("name", " Desk "), ("quantity", ""), ("price", "12.5")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let value = form_to_json(Product::FIELDS, &form).unwrap();
        assert_eq!(value, serde_json::json!({"name": "Desk", "price": 12.5}));

        let new: NewProduct = decode_form(Product::FIELDS, &form).unwrap();
        assert_eq!(new.quantity, None);
        assert_eq!(new.price, Some(12.5));
    }

    #[test]
    fn bad_number_in_form_is_bad_request() {
        let form: HashMap<String, String> = [("course_id".to_string(), "abc".to_string())].into_iter().collect();
        let err = form_to_json(MEMBER_FIELDS, &form).unwrap_err();
        assert_eq!(err.to_string(), "course_id must be an integer");
    }

    fn query_params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn latest_overrides_name_sort() {
        let q = page_query::<Student>(&query_params(&[("latest", "3"), ("sort", "name")])).unwrap();
        assert_eq!(q.limit, Some(3));
        assert_eq!(q.resolved_sort(Student::SORTABLE).key, "id");
        assert_eq!(q.resolved_sort(Student::SORTABLE).order, SortOrder::Desc);
    }

    #[test]
    fn bare_latest_uses_per_entity_default() {
        let students = page_query::<Student>(&query_params(&[("latest", "")])).unwrap();
        assert_eq!(students.limit, Some(5));
        let teachers = page_query::<Teacher>(&query_params(&[("latest", "")])).unwrap();
        assert_eq!(teachers.limit, Some(3));
        assert!(page_query::<Teacher>(&query_params(&[("latest", "many")])).is_err());
    }

    #[test]
    fn search_filters_by_name() {
        let q = page_query::<Product>(&query_params(&[("search", " desk ")])).unwrap();
        assert_eq!(q.filters, vec![Filter::new("name", FilterOp::Like, "desk")]);
        assert_eq!(q.limit, None);
    }

    #[test]
    fn user_text_in_table_is_escaped() {
        let course = Course {
            id: 1,
            name: "<b>Rust</b>".into(),
            description: None,
        };
        let html = render_table::<Course>(&[course]);
        assert!(html.contains("&lt;b&gt;Rust&lt;/b&gt;"));
        assert!(!html.contains("<b>Rust</b>"));
    }
}
