//! Database module for the todo service
//!
//! This module provides database connectivity, models, and repositories
//! for persistent storage using SQLite and SQLx.

pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used items
pub use models::*;
pub use pool::{
    DbConfig, DbError, create_memory_pool, create_pool, create_pool_with_migrations, health_check,
};
pub use repositories::{TodoRepository, TodoRepositoryError, UserRepository, UserRepositoryError};

// Re-export sqlx types that might be needed
pub use sqlx::SqlitePool;
