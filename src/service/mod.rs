//! Entity store operations: generic CRUD, related fetches, per-entity presentation.

mod crud;
mod relations;
mod resource;
mod validation;
pub use resource::Resource;
pub use validation::RequestValidator;
