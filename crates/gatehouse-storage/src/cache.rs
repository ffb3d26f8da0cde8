#![allow(async_fn_in_trait)]

use crate::error::{StorageError, StorageResult};
use crate::models::EventRecord;
use chrono::Utc;
use gatehouse_core::{AccessEvent, EventType, EventTypeCounts, SyncStatus, SyncStatusCounts};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Offline event cache contract.
///
/// The cache is an ordered durable queue: `append` is the only path by which
/// an event enters the system, `pending_events` re-offers everything not yet
/// confirmed (oldest first), and the two `mark_*` operations are the sync
/// engine's only write surface. Events are addressed by id, never by queue
/// position, so pruning confirmed rows cannot disturb pending ones.
///
/// # Implementation Note
///
/// This trait uses native async trait methods (Edition 2024 feature),
/// eliminating the need for the async-trait crate while maintaining
/// full async/await support in trait methods.
pub trait EventCache: Send + Sync {
    /// Append a decided event. Durable before it returns.
    async fn append(&self, event: &AccessEvent) -> StorageResult<Uuid>;

    /// All events not yet confirmed, in insertion (causal) order.
    async fn pending_events(&self) -> StorageResult<Vec<AccessEvent>>;

    /// Mark an event as confirmed by the server.
    async fn mark_confirmed(&self, event_id: Uuid) -> StorageResult<()>;

    /// Mark an event as permanently rejected by the server.
    async fn mark_failed(&self, event_id: Uuid) -> StorageResult<()>;

    /// Delete confirmed events. Returns the number of rows pruned.
    async fn prune_confirmed(&self) -> StorageResult<u64>;

    /// Event totals by type (session report).
    async fn event_type_counts(&self) -> StorageResult<EventTypeCounts>;

    /// Event totals by sync status (session report).
    async fn sync_status_counts(&self) -> StorageResult<SyncStatusCounts>;
}

/// SQLite implementation of the offline event cache
pub struct SqliteEventCache {
    pool: SqlitePool,
}

impl SqliteEventCache {
    /// Create a new SQLite event cache over a connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn set_status(&self, event_id: Uuid, status: SyncStatus) -> StorageResult<()> {
        let result = sqlx::query("UPDATE access_events SET sync_status = ? WHERE event_id = ?")
            .bind(status.as_str())
            .bind(event_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::EventNotFound { event_id });
        }
        Ok(())
    }
}

impl EventCache for SqliteEventCache {
    async fn append(&self, event: &AccessEvent) -> StorageResult<Uuid> {
        sqlx::query(
            r#"
            INSERT INTO access_events (
                event_id, rfid_tag, collaborator_name, event_type,
                access_granted, occurred_at, sync_status, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(event.event_id.to_string())
        .bind(event.tag.as_str())
        .bind(&event.collaborator_name)
        .bind(event.event_type.as_str())
        .bind(event.access_granted)
        .bind(event.occurred_at)
        .bind(event.sync_status.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(event.event_id)
    }

    async fn pending_events(&self) -> StorageResult<Vec<AccessEvent>> {
        let records = sqlx::query_as::<_, EventRecord>(
            r#"
            SELECT seq, event_id, rfid_tag, collaborator_name,
                   event_type, access_granted, occurred_at,
                   sync_status, created_at
            FROM access_events
            WHERE sync_status != 'confirmed'
            ORDER BY seq ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        records
            .into_iter()
            .map(EventRecord::into_event)
            .collect()
    }

    async fn mark_confirmed(&self, event_id: Uuid) -> StorageResult<()> {
        self.set_status(event_id, SyncStatus::Confirmed).await
    }

    async fn mark_failed(&self, event_id: Uuid) -> StorageResult<()> {
        self.set_status(event_id, SyncStatus::Failed).await
    }

    async fn prune_confirmed(&self) -> StorageResult<u64> {
        let result = sqlx::query("DELETE FROM access_events WHERE sync_status = 'confirmed'")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn event_type_counts(&self) -> StorageResult<EventTypeCounts> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT event_type, COUNT(*) FROM access_events GROUP BY event_type")
                .fetch_all(&self.pool)
                .await?;

        let mut counts = EventTypeCounts::default();
        for (name, count) in rows {
            let event_type =
                EventType::parse(&name).map_err(|e| StorageError::Decode(e.to_string()))?;
            let count = count as u64;
            match event_type {
                EventType::Entry => counts.entry += count,
                EventType::ReentryAck => counts.reentry_ack += count,
                EventType::Exit => counts.exit += count,
                EventType::Denied => counts.denied += count,
                EventType::Unknown => counts.unknown += count,
            }
        }
        Ok(counts)
    }

    async fn sync_status_counts(&self) -> StorageResult<SyncStatusCounts> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT sync_status, COUNT(*) FROM access_events GROUP BY sync_status")
                .fetch_all(&self.pool)
                .await?;

        let mut counts = SyncStatusCounts::default();
        for (name, count) in rows {
            let status =
                SyncStatus::parse(&name).map_err(|e| StorageError::Decode(e.to_string()))?;
            let count = count as u64;
            match status {
                SyncStatus::Pending => counts.pending += count,
                SyncStatus::Confirmed => counts.confirmed += count,
                SyncStatus::Failed => counts.failed += count,
            }
        }
        Ok(counts)
    }
}
