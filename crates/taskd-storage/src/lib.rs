//! Storage abstraction layer for the Taskd server.
//!
//! This crate defines the traits all storage backends implement, the
//! shared error type, and an in-memory backend used by tests and
//! single-process development setups.
//!
//! # Example
//!
//! ```ignore
//! use taskd_storage::{MemoryStorage, NewTask, TaskStorage};
//!
//! let storage = MemoryStorage::new();
//! let task = storage.create(NewTask::new("buy milk", None)).await?;
//! ```

pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

pub use error::StorageError;
pub use memory::MemoryStorage;
pub use traits::{TaskStorage, UserStorage};
pub use types::{NewTask, NewUser, TaskChanges};

/// Type alias for a shareable task storage instance.
pub type DynTaskStorage = std::sync::Arc<dyn TaskStorage>;

/// Type alias for a shareable user storage instance.
pub type DynUserStorage = std::sync::Arc<dyn UserStorage>;
