use chrono::{DateTime, Utc};
use gatehouse_core::{AccessEvent, EventType, SyncStatus, TagId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{StorageError, StorageResult};

/// One row of the offline event cache.
///
/// The row is the storage representation of an [`AccessEvent`] plus the
/// queue metadata the cache itself owns:
///
/// * `seq` - queue position; insertion order is causal order and the sync
///   engine drains oldest-first
/// * `created_at` - when the row was written, as opposed to `occurred_at`,
///   the device-clock time of the read (the two differ when appends happen
///   while the disk is briefly busy)
///
/// Enum-typed fields (`event_type`, `sync_status`) are stored as their
/// canonical text names; [`EventRecord::into_event`] parses them back and
/// reports corrupt rows as [`StorageError::Decode`].
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    /// Queue position (auto-increment primary key)
    pub seq: i64,

    /// Event id, unique, also the idempotency key for delivery
    pub event_id: String,

    /// Tag that produced the read
    pub rfid_tag: String,

    /// Collaborator name (NULL for unrecognized tags)
    pub collaborator_name: Option<String>,

    /// Local event type name (entry, reentry_ack, exit, denied, unknown)
    pub event_type: String,

    /// Whether access was granted
    pub access_granted: bool,

    /// When the read occurred (device clock)
    pub occurred_at: DateTime<Utc>,

    /// Sync state (pending, confirmed, failed)
    pub sync_status: String,

    /// When the row was written
    pub created_at: DateTime<Utc>,
}

impl EventRecord {
    /// Decode the row back into an [`AccessEvent`].
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Decode`] if any stored field no longer parses
    /// (a corrupt or hand-edited row).
    pub fn into_event(self) -> StorageResult<AccessEvent> {
        let event_id = Uuid::parse_str(&self.event_id)
            .map_err(|e| StorageError::Decode(format!("event_id '{}': {}", self.event_id, e)))?;
        let tag = TagId::new(&self.rfid_tag)
            .map_err(|e| StorageError::Decode(format!("rfid_tag '{}': {}", self.rfid_tag, e)))?;
        let event_type = EventType::parse(&self.event_type)
            .map_err(|e| StorageError::Decode(e.to_string()))?;
        let sync_status = SyncStatus::parse(&self.sync_status)
            .map_err(|e| StorageError::Decode(e.to_string()))?;

        Ok(AccessEvent {
            event_id,
            tag,
            collaborator_name: self.collaborator_name,
            event_type,
            access_granted: self.access_granted,
            occurred_at: self.occurred_at,
            sync_status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> EventRecord {
        EventRecord {
            seq: 1,
            event_id: Uuid::new_v4().to_string(),
            rfid_tag: "RFID004".to_string(),
            collaborator_name: Some("Ana Costa".to_string()),
            event_type: "entry".to_string(),
            access_granted: true,
            occurred_at: Utc::now(),
            sync_status: "pending".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_into_event() {
        let rec = record();
        let event = rec.clone().into_event().unwrap();

        assert_eq!(event.event_id.to_string(), rec.event_id);
        assert_eq!(event.tag.as_str(), "RFID004");
        assert_eq!(event.event_type, EventType::Entry);
        assert_eq!(event.sync_status, SyncStatus::Pending);
        assert!(event.access_granted);
    }

    #[test]
    fn test_into_event_rejects_corrupt_event_id() {
        let mut rec = record();
        rec.event_id = "not-a-uuid".to_string();
        assert!(matches!(rec.into_event(), Err(StorageError::Decode(_))));
    }

    #[test]
    fn test_into_event_rejects_corrupt_event_type() {
        let mut rec = record();
        rec.event_type = "teleport".to_string();
        assert!(matches!(rec.into_event(), Err(StorageError::Decode(_))));
    }
}
