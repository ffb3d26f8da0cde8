//! Storage layer for the gatehouse edge device.
//!
//! This crate provides the SQLite-backed offline event cache: a durable,
//! ordered, append-only queue of decided access events awaiting confirmation
//! from the central server. The cache is the device's delivery guarantee —
//! an event appended here survives crashes and restarts until the sync
//! engine confirms it server-side.
//!
//! # Architecture
//!
//! - [`Database`] - Connection pool manager with automatic migrations
//! - [`EventCache`] - Cache access trait (append / pending / mark status)
//! - [`SqliteEventCache`] - SQLite implementation over the pool
//!
//! # Single-writer-per-field discipline
//!
//! Two components share the cache: the decision engine only appends, and the
//! sync engine only mutates `sync_status` by event id. Neither touches the
//! other's rows/fields, so pool-level serialization is sufficient to avoid
//! lost updates.
//!
//! # Durability
//!
//! The pool runs SQLite in WAL mode with `synchronous = FULL`: an `append`
//! that has returned is on disk. The read loop relies on this before
//! acknowledging a read.
//!
//! # Examples
//!
//! ```no_run
//! use gatehouse_storage::{Database, DatabaseConfig, EventCache, SqliteEventCache};
//! use gatehouse_core::{AccessEvent, EventType, TagId};
//! use chrono::Utc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DatabaseConfig::new("gatehouse.db").auto_migrate(true);
//! let db = Database::new(config).await?;
//! let cache = SqliteEventCache::new(db.pool().clone());
//!
//! let event = AccessEvent::decided(
//!     TagId::new("RFID004")?,
//!     Some("Ana Costa".to_string()),
//!     EventType::Entry,
//!     Utc::now(),
//! );
//!
//! cache.append(&event).await?;
//! let pending = cache.pending_events().await?;
//! assert_eq!(pending.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod connection;
pub mod error;
pub mod models;

pub use cache::{EventCache, SqliteEventCache};
pub use connection::{Database, DatabaseConfig};
pub use error::{StorageError, StorageResult};
pub use models::EventRecord;
