//! Core domain: authentication, persistence, todos and notifications

pub mod auth;
pub mod config;
pub mod db;
pub mod notifications;
pub mod todos;
