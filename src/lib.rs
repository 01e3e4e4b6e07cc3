//! Juicebox Library
//!
//! Data-access layer for a small blog: users, posts, tags and the
//! post/tag labeling, stored in PostgreSQL.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod logger;
pub mod models;
pub mod repositories;
pub mod schema;

pub use repositories::Repositories;
