//! PostgreSQL storage backend for the Taskd server.
//!
//! Implements the `TaskStorage` and `UserStorage` traits from
//! `taskd-storage` on top of a pooled PostgreSQL connection.
//!
//! # Example
//!
//! ```ignore
//! use taskd_db_postgres::{PostgresConfig, PostgresStorage};
//!
//! let config = PostgresConfig::new("postgres://localhost/taskd");
//! let storage = PostgresStorage::connect(&config).await?;
//! ```

pub mod config;
pub mod error;
pub mod pool;
pub mod schema;
pub mod storage;

pub use config::PostgresConfig;
pub use error::{PostgresError, Result};
pub use pool::create_pool;
pub use storage::PostgresStorage;
