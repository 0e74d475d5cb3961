#![doc = "The `taskhive` library crate."]
#![doc = ""]
#![doc = "Core logic for the task-management backend: credential handling and token"]
#![doc = "issuance, the bearer-token authorization gate, request validation, the"]
#![doc = "owner-scoped task repository with its filter/sort/paginate query builder,"]
#![doc = "route handlers, and error translation. The binary (`main.rs`) wires these"]
#![doc = "into an HTTP server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod tasks;
pub mod validate;

pub use crate::config::Config;
pub use crate::error::{AppError, FieldError};
