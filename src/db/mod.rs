//! Database layer
//!
//! The local backend: an SQLite store accessed through sqlx. It is used when
//! `backend.driver` is `local` and by the test suite.
//!
//! # Usage
//!
//! ```ignore
//! use eepd::config::DatabaseConfig;
//! use eepd::db::{create_pool, migrations};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! migrations::run_migrations(&pool).await?;
//! pool.ping().await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool, DatabasePool, DynDatabasePool, SqliteDatabase};
