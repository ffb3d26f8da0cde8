//! Integration tests for the offline event cache over an on-disk database.
//!
//! These tests exercise the crash-recovery contract: events appended before
//! a process death must be re-offered, in their original order, once the
//! device restarts and reopens the cache.

use chrono::Utc;
use gatehouse_core::{AccessEvent, EventType, SyncStatus, TagId};
use gatehouse_storage::{Database, DatabaseConfig, EventCache, SqliteEventCache};
use uuid::Uuid;

fn event(tag: &str, event_type: EventType) -> AccessEvent {
    AccessEvent::decided(
        TagId::new(tag).unwrap(),
        Some("Ana Costa".to_string()),
        event_type,
        Utc::now(),
    )
}

async fn open(path: &std::path::Path) -> Database {
    Database::new(DatabaseConfig::new(path.to_string_lossy().to_string()))
        .await
        .unwrap()
}

#[tokio::test]
async fn pending_events_survive_restart_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gatehouse.db");

    let first = event("RFID004", EventType::Entry);
    let second = event("RFID004", EventType::ReentryAck);
    let third = event("RFID004", EventType::Exit);

    // first process: append three events, then die before any confirmation
    {
        let db = open(&path).await;
        let cache = SqliteEventCache::new(db.pool().clone());
        cache.append(&first).await.unwrap();
        cache.append(&second).await.unwrap();
        cache.append(&third).await.unwrap();
        db.close().await;
    }

    // second process: everything pending is re-offered in causal order
    let db = open(&path).await;
    let cache = SqliteEventCache::new(db.pool().clone());
    let pending = cache.pending_events().await.unwrap();

    let ids: Vec<Uuid> = pending.iter().map(|e| e.event_id).collect();
    assert_eq!(ids, vec![first.event_id, second.event_id, third.event_id]);
    assert!(pending.iter().all(|e| e.sync_status == SyncStatus::Pending));
}

#[tokio::test]
async fn confirmation_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gatehouse.db");

    let confirmed = event("RFID004", EventType::Entry);
    let still_pending = event("RFID004", EventType::ReentryAck);

    {
        let db = open(&path).await;
        let cache = SqliteEventCache::new(db.pool().clone());
        cache.append(&confirmed).await.unwrap();
        cache.append(&still_pending).await.unwrap();
        cache.mark_confirmed(confirmed.event_id).await.unwrap();
        db.close().await;
    }

    let db = open(&path).await;
    let cache = SqliteEventCache::new(db.pool().clone());
    let pending = cache.pending_events().await.unwrap();

    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].event_id, still_pending.event_id);
}

#[tokio::test]
async fn failed_events_survive_restart_and_pruning() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gatehouse.db");

    let failed = event("RFID003", EventType::Denied);
    let confirmed = event("RFID004", EventType::Entry);

    {
        let db = open(&path).await;
        let cache = SqliteEventCache::new(db.pool().clone());
        cache.append(&failed).await.unwrap();
        cache.append(&confirmed).await.unwrap();
        cache.mark_failed(failed.event_id).await.unwrap();
        cache.mark_confirmed(confirmed.event_id).await.unwrap();
        cache.prune_confirmed().await.unwrap();
        db.close().await;
    }

    let db = open(&path).await;
    let cache = SqliteEventCache::new(db.pool().clone());

    let remaining = cache.pending_events().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].event_id, failed.event_id);
    assert_eq!(remaining[0].sync_status, SyncStatus::Failed);

    let counts = cache.sync_status_counts().await.unwrap();
    assert_eq!(counts.failed, 1);
    assert_eq!(counts.confirmed, 0);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gatehouse.db");

    let db = open(&path).await;
    // running migrate again on an already-migrated database is a no-op
    db.migrate().await.unwrap();
    db.health_check().await.unwrap();
}
