//! Schema DDL for all entity tables. Idempotent: every statement is `IF NOT EXISTS`.
//! Parents come before children so foreign keys resolve.

use crate::error::AppError;
use sqlx::SqlitePool;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS authors (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        bio TEXT,
        city TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS books (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        year INTEGER,
        isbn TEXT UNIQUE,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        author_id INTEGER NOT NULL REFERENCES authors(id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_books_author_id ON books(author_id)",
    r#"
    CREATE TABLE IF NOT EXISTS courses (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        description TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS students (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        course_id INTEGER NOT NULL REFERENCES courses(id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_students_course_id ON students(course_id)",
    r#"
    CREATE TABLE IF NOT EXISTS teachers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        course_id INTEGER NOT NULL REFERENCES courses(id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_teachers_course_id ON teachers(course_id)",
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        quantity INTEGER NOT NULL DEFAULT 0,
        price REAL NOT NULL
    )
    "#,
];

/// Create every table and index that does not exist yet.
pub async fn apply_schema(pool: &SqlitePool) -> Result<(), AppError> {
    for ddl in SCHEMA {
        sqlx::query(ddl).execute(pool).await?;
    }
    tracing::debug!(statements = SCHEMA.len(), "schema applied");
    Ok(())
}
