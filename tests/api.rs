mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use entity_store::{build_router, AppConfig, AppState, EntityStore};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app() -> (Router, EntityStore) {
    let store = common::store().await;
    let state = AppState::new(store.clone(), AppConfig::default());
    (build_router(state), store)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn send_form(app: &Router, uri: &str, form: &str) -> (StatusCode, String, Option<String>) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    (status, String::from_utf8_lossy(&bytes).into_owned(), location)
}

async fn get_html(app: &Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

#[tokio::test]
async fn author_and_book_lifecycle() {
    let (app, _) = app().await;

    let (status, body) = send(&app, Method::POST, "/api/authors", Some(json!({"name": "Ada", "city": "London"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    let ada_id = body["author"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/books",
        Some(json!({"title": "Algorithms", "year": 1843, "author_id": ada_id})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let book_id = body["book"]["id"].as_i64().unwrap();
    assert_eq!(body["book"]["author"], json!({"id": ada_id, "name": "Ada"}));

    let (status, body) = send(&app, Method::GET, &format!("/api/books/{book_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["book"]["title"], "Algorithms");
    assert_eq!(body["book"]["author"]["name"], "Ada");

    let (status, body) = send(&app, Method::PATCH, &format!("/api/books/{book_id}"), Some(json!({"year": 1850}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["book"]["year"], 1850);
    assert_eq!(body["book"]["title"], "Algorithms");

    let (status, body) = send(&app, Method::GET, &format!("/api/authors/{ada_id}/books"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    let (status, body) = send(&app, Method::DELETE, &format!("/api/authors/{ada_id}"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (status, body) = send(&app, Method::DELETE, &format!("/api/books/{book_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Book deleted successfully");

    let (status, _) = send(&app, Method::GET, &format!("/api/books/{book_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn error_statuses_use_the_envelope() {
    let (app, _) = app().await;

    let (status, body) = send(&app, Method::POST, "/api/authors", Some(json!({"city": "Oslo"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"success": false, "error": "name is required"}));

    let (status, body) = send(&app, Method::POST, "/api/books", Some(json!({"title": "X", "author_id": 5}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Author 5 not found");

    let (status, body) = send(&app, Method::GET, "/api/books?year=soon", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = send(&app, Method::GET, "/api/books?offset=18446744073709551615", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "offset must be a non-negative integer");

    let (status, _) = send(&app, Method::GET, "/api/books?limit=-3", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::GET, "/api/books?offset=9223372036854775807", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);

    let (status, body) = send(&app, Method::GET, "/api/products/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "id must be an integer");

    let (status, _) = send(&app, Method::PUT, "/api/products/1", Some(json!({"name": "X"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_email_is_conflict() {
    let (app, _) = app().await;
    let (_, body) = send(&app, Method::POST, "/api/courses", Some(json!({"name": "Data Science"}))).await;
    let course_id = body["course"]["id"].as_i64().unwrap();

    let student = json!({"name": "Sam", "email": "sam@school.test", "course_id": course_id});
    let (status, _) = send(&app, Method::POST, "/api/students", Some(student.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(&app, Method::POST, "/api/students", Some(student)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Student with this email already exists");

    let (_, body) = send(&app, Method::GET, "/api/students", None).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["students"][0]["course"]["name"], "Data Science");
}

#[tokio::test]
async fn page_envelope_and_sort_echo() {
    let (app, _) = app().await;
    for (name, price) in [("Desk", 120.0), ("Lamp", 20.0), ("Chair", 60.0)] {
        send(&app, Method::POST, "/api/products", Some(json!({"name": name, "price": price}))).await;
    }

    let (status, body) = send(&app, Method::GET, "/api/products/page?page=1&per_page=2&sort=price&order=desc", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["has_next"], true);
    assert_eq!(body["has_prev"], false);
    assert_eq!(body["sort"], "price");
    assert_eq!(body["order"], "desc");
    let names: Vec<&str> = body["products"].as_array().unwrap().iter().map(|p| p["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["Desk", "Chair"]);

    let (_, body) = send(&app, Method::GET, "/api/products?sort=colour&max_price=100", None).await;
    assert_eq!(body["sort"], "id");
    assert_eq!(body["count"], 2);
}

#[tokio::test]
async fn students_filtered_by_course_name() {
    let (app, _) = app().await;
    let (_, a) = send(&app, Method::POST, "/api/courses", Some(json!({"name": "Python Basics"}))).await;
    let (_, b) = send(&app, Method::POST, "/api/courses", Some(json!({"name": "Web Development"}))).await;
    let a = a["course"]["id"].as_i64().unwrap();
    let b = b["course"]["id"].as_i64().unwrap();
    for (name, course_id) in [("Ann", a), ("Ben", b), ("Cy", a)] {
        let email = format!("{}@school.test", name.to_lowercase());
        send(&app, Method::POST, "/api/students", Some(json!({"name": name, "email": email, "course_id": course_id}))).await;
    }

    let (_, body) = send(&app, Method::GET, "/api/students?course=Python%20Basics", None).await;
    assert_eq!(body["count"], 2);
    let (_, body) = send(&app, Method::GET, "/api/students?course=Unknown", None).await;
    assert_eq!(body["count"], 0);
    let (_, body) = send(&app, Method::GET, &format!("/api/courses/{b}/students"), None).await;
    assert_eq!(body["students"][0]["name"], "Ben");
}

#[tokio::test]
async fn service_routes_respond() {
    let (app, _) = app().await;
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    let (status, body) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "ok");
    let (_, body) = send(&app, Method::GET, "/version", None).await;
    assert_eq!(body["name"], "entity-store");
}

#[tokio::test]
async fn html_pages_escape_and_redirect() {
    let (app, store) = app().await;
    let (status, _, location) = send_form(&app, "/courses/add", "name=%3Cscript%3Ex%3C%2Fscript%3E&description=").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/courses"));

    let (status, html) = get_html(&app, "/courses").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("&lt;script&gt;x&lt;/script&gt;"));
    assert!(!html.contains("<script>x</script>"));

    let course = common::course(&store, "Python Basics").await;
    let (status, _, _) = send_form(&app, "/students/add", &format!("name=Sam&email=sam%40school.test&course_id={}", course.id)).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    let (_, html) = get_html(&app, "/students?course=Python%20Basics").await;
    assert!(html.contains("sam@school.test"));

    for (name, email) in [("Kim", "kim"), ("Lee", "lee"), ("Max", "max"), ("Noa", "noa"), ("Ola", "ola")] {
        common::student(&store, name, &format!("{email}@school.test"), course.id).await;
    }
    let (_, html) = get_html(&app, "/students?search=Ki").await;
    assert!(html.contains("kim@school.test"));
    assert!(!html.contains("sam@school.test"));

    // bare ?latest shows the newest five of six students
    let (status, html) = get_html(&app, "/students?latest").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("ola@school.test"));
    assert!(!html.contains("sam@school.test"));

    let (status, html, _) = send_form(&app, "/students/add", "name=&email=x%40y&course_id=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(html.contains("name is required"));

    let (status, _) = get_html(&app, "/students/999/edit").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send_form(&app, &format!("/courses/{}/delete", course.id), "").await;
    assert_eq!(status, StatusCode::CONFLICT);
}
