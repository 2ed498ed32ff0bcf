//! # agenda-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the `EntityStore` port defined in `agenda-app::ports::storage`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Encode records as JSON, one table per record type
//!
//! ## Dependency rule
//! Depends on `agenda-app` (for port traits) and `agenda-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod error;
pub mod pool;
pub mod store;

pub use error::StorageError;
pub use pool::{Config, Database};
pub use store::{SqliteEventStore, SqliteRoomStore, SqliteScheduleStore, SqliteStore};
