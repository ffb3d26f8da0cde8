//! Integration tests for the sync engine against a real SQLite cache.
//!
//! The log sink is an in-memory fake with a switchable online/offline state,
//! which makes every connectivity scenario deterministic: offline runs,
//! reconnects, permanent rejections, and redelivery after a simulated
//! process restart.

use chrono::Utc;
use gatehouse_core::{AccessEvent, EventType, SyncStatus, TagId};
use gatehouse_engine::{DecisionEngine, replica::replace_shared, shared_replica};
use gatehouse_storage::{Database, DatabaseConfig, EventCache, SqliteEventCache};
use gatehouse_sync::{DeliveryOutcome, LogSink, SyncEngine, SyncEngineConfig, SyncError, SyncResult};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Default)]
struct SinkState {
    online: bool,
    reject: HashSet<Uuid>,
    delivered: Vec<Uuid>,
}

/// In-memory log sink with scriptable connectivity and rejections.
#[derive(Clone, Default)]
struct ScriptedSink {
    state: Arc<Mutex<SinkState>>,
}

impl ScriptedSink {
    fn online() -> Self {
        let sink = Self::default();
        sink.set_online(true);
        sink
    }

    fn offline() -> Self {
        Self::default()
    }

    fn set_online(&self, online: bool) {
        self.state.lock().expect("sink lock").online = online;
    }

    fn reject(&self, event_id: Uuid) {
        self.state.lock().expect("sink lock").reject.insert(event_id);
    }

    fn delivered(&self) -> Vec<Uuid> {
        self.state.lock().expect("sink lock").delivered.clone()
    }
}

impl LogSink for ScriptedSink {
    async fn deliver(&self, event: &AccessEvent) -> SyncResult<DeliveryOutcome> {
        let mut state = self.state.lock().expect("sink lock");
        if !state.online {
            return Err(SyncError::unreachable("connection refused"));
        }
        if state.reject.contains(&event.event_id) {
            return Ok(DeliveryOutcome::Rejected { status: 422 });
        }
        // idempotency: a repeated key is a no-op on the server
        let duplicate = state.delivered.contains(&event.event_id);
        state.delivered.push(event.event_id);
        Ok(if duplicate {
            DeliveryOutcome::AlreadyDelivered
        } else {
            DeliveryOutcome::Delivered
        })
    }
}

fn event(tag: &str, event_type: EventType) -> AccessEvent {
    AccessEvent::decided(
        TagId::new(tag).unwrap(),
        Some("Ana Costa".to_string()),
        event_type,
        Utc::now(),
    )
}

async fn in_memory_cache() -> (Database, SqliteEventCache) {
    let db = Database::in_memory().await.unwrap();
    let cache = SqliteEventCache::new(db.pool().clone());
    (db, cache)
}

#[tokio::test]
async fn delivers_pending_events_oldest_first() {
    let (_db, cache) = in_memory_cache().await;
    let sink = ScriptedSink::online();

    let first = event("RFID004", EventType::Entry);
    let second = event("RFID004", EventType::ReentryAck);
    let third = event("RFID004", EventType::Exit);
    cache.append(&first).await.unwrap();
    cache.append(&second).await.unwrap();
    cache.append(&third).await.unwrap();

    let engine = SyncEngine::new(sink.clone(), cache, SyncEngineConfig::default());
    let report = engine.sync_cycle().await.unwrap();

    assert_eq!(report.sent, 3);
    assert_eq!(report.confirmed, 3);
    assert_eq!(report.failed, 0);
    assert_eq!(
        sink.delivered(),
        vec![first.event_id, second.event_id, third.event_id]
    );
}

#[tokio::test]
async fn transient_failure_stops_cycle_and_preserves_order() {
    let (_db, cache) = in_memory_cache().await;
    let sink = ScriptedSink::offline();

    let a = event("RFID004", EventType::Entry);
    let b = event("RFID004", EventType::ReentryAck);
    cache.append(&a).await.unwrap();
    cache.append(&b).await.unwrap();

    let engine = SyncEngine::new(sink.clone(), cache, SyncEngineConfig::default());

    // offline: the cycle stops at the first event, B is never attempted
    let report = engine.sync_cycle().await.unwrap();
    assert_eq!(report.sent, 1);
    assert_eq!(report.confirmed, 0);
    assert!(report.interrupted());
    assert!(sink.delivered().is_empty());

    // reconnect: both confirm, A strictly before B
    sink.set_online(true);
    let report = engine.sync_cycle().await.unwrap();
    assert_eq!(report.confirmed, 2);
    assert_eq!(sink.delivered(), vec![a.event_id, b.event_id]);
}

#[tokio::test]
async fn rejected_event_is_marked_failed_and_does_not_block_queue() {
    let (_db, cache) = in_memory_cache().await;
    let sink = ScriptedSink::online();

    let bad = event("RFID004", EventType::Entry);
    let good = event("RFID004", EventType::ReentryAck);
    cache.append(&bad).await.unwrap();
    cache.append(&good).await.unwrap();
    sink.reject(bad.event_id);

    let engine = SyncEngine::new(sink.clone(), cache, SyncEngineConfig::default());
    let report = engine.sync_cycle().await.unwrap();

    assert_eq!(report.confirmed, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(sink.delivered(), vec![good.event_id]);
}

#[tokio::test]
async fn failed_events_are_not_redelivered() {
    let (_db, cache) = in_memory_cache().await;
    let sink = ScriptedSink::online();

    let bad = event("RFID004", EventType::Entry);
    cache.append(&bad).await.unwrap();
    sink.reject(bad.event_id);

    let engine = SyncEngine::new(sink.clone(), cache, SyncEngineConfig::default());
    engine.sync_cycle().await.unwrap();

    // second cycle: the failed event stays failed, nothing is sent
    let report = engine.sync_cycle().await.unwrap();
    assert_eq!(report.sent, 0);
    assert!(sink.delivered().is_empty());
}

#[tokio::test]
async fn crash_between_append_and_confirmation_redelivers_safely() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gatehouse.db");
    let config = DatabaseConfig::new(path.to_string_lossy().to_string());

    let first = event("RFID004", EventType::Entry);
    let second = event("RFID002", EventType::Entry);

    // first process dies after appending, before any sync cycle
    {
        let db = Database::new(config.clone()).await.unwrap();
        let cache = SqliteEventCache::new(db.pool().clone());
        cache.append(&first).await.unwrap();
        cache.append(&second).await.unwrap();
        db.close().await;
    }

    // restart: the sync engine re-offers both, in their original order
    let db = Database::new(config).await.unwrap();
    let cache = SqliteEventCache::new(db.pool().clone());
    let sink = ScriptedSink::online();
    let engine = SyncEngine::new(sink.clone(), cache, SyncEngineConfig::default());

    let report = engine.sync_cycle().await.unwrap();
    assert_eq!(report.confirmed, 2);
    assert_eq!(sink.delivered(), vec![first.event_id, second.event_id]);

    // a further cycle delivers nothing: exactly once from the cache's view
    engine.sync_cycle().await.unwrap();
    assert_eq!(sink.delivered().len(), 2);
}

#[tokio::test]
async fn duplicate_delivery_after_lost_ack_confirms_via_idempotency_key() {
    let (_db, cache) = in_memory_cache().await;
    let sink = ScriptedSink::online();

    let e = event("RFID004", EventType::Entry);
    cache.append(&e).await.unwrap();

    // deliver once out-of-band: simulates a crash after the server received
    // the event but before mark_confirmed ran
    sink.deliver(&e).await.unwrap();

    let engine = SyncEngine::new(sink.clone(), cache, SyncEngineConfig::default());
    let report = engine.sync_cycle().await.unwrap();

    // the server answers "already delivered"; locally that is a confirmation
    assert_eq!(report.confirmed, 1);
    assert_eq!(report.failed, 0);
}

/// Concrete scenario from the field: tag of an authorized collaborator read
/// three times with the network down throughout, then the device reconnects.
#[tokio::test]
async fn offline_visit_cycle_confirms_in_order_on_reconnect() {
    let (_db, cache) = in_memory_cache().await;
    let sink = ScriptedSink::offline();

    let replica = shared_replica();
    replace_shared(
        &replica,
        vec![gatehouse_core::CollaboratorRecord {
            id: 1,
            name: "Ana".to_string(),
            tag: TagId::new("T1T1").unwrap(),
            has_access: true,
        }],
    );
    let mut decisions = DecisionEngine::new(replica);

    let tag = TagId::new("T1T1").unwrap();
    let mut decided = Vec::new();
    for _ in 0..3 {
        let decision = decisions.decide(tag.clone(), Utc::now());
        cache.append(&decision.event).await.unwrap();
        decided.push(decision.event);
    }

    // decisions were never blocked by the dead network
    assert_eq!(decided[0].event_type, EventType::Entry);
    assert_eq!(decided[1].event_type, EventType::ReentryAck);
    assert_eq!(decided[2].event_type, EventType::Exit);
    assert!(decided.iter().all(|e| e.access_granted));
    assert_eq!(decisions.visits().occupancy(), 0);

    let engine = SyncEngine::new(sink.clone(), cache, SyncEngineConfig::default());

    // while offline everything stays pending
    engine.sync_cycle().await.unwrap();
    assert!(sink.delivered().is_empty());

    // on reconnect all three confirm, in decision order
    sink.set_online(true);
    let report = engine.sync_cycle().await.unwrap();
    assert_eq!(report.confirmed, 3);
    assert_eq!(
        sink.delivered(),
        decided.iter().map(|e| e.event_id).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn confirmed_events_leave_pending_set() {
    let (_db, cache) = in_memory_cache().await;
    let sink = ScriptedSink::online();

    let e = event("RFID004", EventType::Entry);
    cache.append(&e).await.unwrap();

    let engine = SyncEngine::new(sink, cache, SyncEngineConfig::default());
    engine.sync_cycle().await.unwrap();

    // a second cycle has nothing left to offer
    let report = engine.sync_cycle().await.unwrap();
    assert_eq!(report, gatehouse_sync::SyncReport::default());
}

#[tokio::test]
async fn pending_after_offline_cycle_have_pending_status() {
    let (_db, cache) = in_memory_cache().await;
    let sink = ScriptedSink::offline();

    let e = event("RFID004", EventType::Entry);
    cache.append(&e).await.unwrap();

    // engine borrows a clone of the pool-backed cache so we can inspect it
    let db_view = SqliteEventCache::new(_db.pool().clone());
    let engine = SyncEngine::new(sink, cache, SyncEngineConfig::default());
    engine.sync_cycle().await.unwrap();

    let pending = db_view.pending_events().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].sync_status, SyncStatus::Pending);
}
