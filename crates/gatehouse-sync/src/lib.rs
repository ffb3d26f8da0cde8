//! Synchronization layer for the gatehouse edge device.
//!
//! This crate drains the offline event cache against the central server's
//! log endpoint and keeps the local collaborator replica fresh. It is fully
//! decoupled from the read loop: network failures live and die here, retried
//! with capped exponential backoff, and never block an access decision.
//!
//! # Delivery contract
//!
//! Events are delivered oldest-first carrying their locally generated id as
//! an idempotency key. A transient failure (network error, timeout, 5xx)
//! stops the cycle early so later events are never confirmed ahead of
//! earlier ones; a permanent rejection (4xx other than 409) marks the event
//! failed and moves on. The server treats a repeated idempotency key as a
//! no-op, which makes redelivery after a crash safe.

#![allow(async_fn_in_trait)]

pub mod engine;
pub mod error;
pub mod http;
pub mod refresh;
pub mod transport;

pub use engine::{SyncEngine, SyncEngineConfig, SyncReport};
pub use error::{SyncError, SyncResult};
pub use http::{ApiConfig, HttpLogClient, HttpRegistryClient};
pub use refresh::RefreshTask;
pub use transport::{AccessLogBody, DeliveryOutcome, LogSink, RegistrySource};
