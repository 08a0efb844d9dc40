//! HTTP handlers: generic JSON CRUD, query-string parsing, and HTML pages.

pub mod entity;
pub mod query;
pub mod views;
