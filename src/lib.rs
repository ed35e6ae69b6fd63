//! Todo API - Multi-user task list service
//!
//! An HTTP API where accounts register with email and password, log in for
//! a short-lived bearer token, and manage their own todo items.

pub mod app;
pub mod core;
