//! Todo management module
//!
//! REST endpoints for the authenticated user's todo items.

pub mod api;

pub use api::{TodoApiError, TodoApiState, todo_api_router};
