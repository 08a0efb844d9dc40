//! Entity store: typed CRUD over SQLite with JSON and HTML routes.

pub mod config;
pub mod error;
pub mod handlers;
pub mod migration;
pub mod model;
pub mod query;
pub mod response;
pub mod routes;
pub mod seed;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::AppConfig;
pub use error::{AppError, ConfigError};
pub use migration::apply_schema;
pub use query::{Filter, ListQuery, Page, PageRequest, SortOrder};
pub use routes::build_router;
pub use seed::seed_if_empty;
pub use service::Resource;
pub use state::AppState;
pub use store::{ensure_database_exists, EntityStore};
