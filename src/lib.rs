//! Coffeehouse - coffee-shop ordering backend
//!
//! Accounts and roles, a menu catalog, and transactional order placement
//! behind a REST API, backed by SQLite or PostgreSQL.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod http;
pub mod interfaces;
pub mod orders;
pub mod storage;
pub mod utils;
