//! Transport contracts between the sync layer and the central server.
//!
//! The sync engine and refresh task are written against these traits rather
//! than concrete HTTP clients, so tests can substitute in-memory fakes and
//! drive every failure mode deterministically (the same seam the storage
//! layer gets from its repository trait).

use crate::error::SyncResult;
use gatehouse_core::{AccessEvent, CollaboratorRecord};
use serde::Serialize;

/// Wire body for `POST /api/logs/access`.
///
/// `idempotency_key` carries the locally generated event id; the server must
/// treat a repeated key as a no-op, which makes duplicate delivery after a
/// crash safe. `event_type` uses the server's taxonomy (a reentry
/// acknowledgment is reported as `entry`).
#[derive(Debug, Clone, Serialize)]
pub struct AccessLogBody {
    pub rfid_tag: String,
    pub collaborator_name: Option<String>,
    pub event_type: &'static str,
    pub access_granted: bool,
    pub idempotency_key: String,
}

impl From<&AccessEvent> for AccessLogBody {
    fn from(event: &AccessEvent) -> Self {
        Self {
            rfid_tag: event.tag.as_str().to_string(),
            collaborator_name: event.collaborator_name.clone(),
            event_type: event.event_type.wire_name(),
            access_granted: event.access_granted,
            idempotency_key: event.event_id.to_string(),
        }
    }
}

/// Outcome of delivering one event to the log endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Server acknowledged the event (2xx).
    Delivered,

    /// Server already has this idempotency key (409); treated as confirmed.
    AlreadyDelivered,

    /// Server permanently rejected the event (other 4xx). Not retried.
    Rejected {
        /// HTTP status code returned.
        status: u16,
    },
}

/// Delivery endpoint for decided access events.
///
/// Transient failures (server unreachable, timeout, 5xx) are reported as
/// [`SyncError::Unreachable`](crate::SyncError::Unreachable) errors;
/// permanent rejections come back as [`DeliveryOutcome::Rejected`].
pub trait LogSink: Send + Sync {
    /// Deliver one event, carrying its id as the idempotency key.
    async fn deliver(&self, event: &AccessEvent) -> SyncResult<DeliveryOutcome>;
}

/// Source of the full collaborator registry, for replica rebuilds.
pub trait RegistrySource: Send + Sync {
    /// Fetch the complete current collaborator set.
    async fn fetch_all(&self) -> SyncResult<Vec<CollaboratorRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gatehouse_core::{EventType, TagId};

    #[test]
    fn test_body_carries_idempotency_key() {
        let event = AccessEvent::decided(
            TagId::new("RFID004").unwrap(),
            Some("Ana Costa".to_string()),
            EventType::Entry,
            Utc::now(),
        );
        let body = AccessLogBody::from(&event);

        assert_eq!(body.idempotency_key, event.event_id.to_string());
        assert_eq!(body.rfid_tag, "RFID004");
        assert_eq!(body.event_type, "entry");
        assert!(body.access_granted);
    }

    #[test]
    fn test_reentry_ack_maps_to_entry_on_wire() {
        let event = AccessEvent::decided(
            TagId::new("RFID004").unwrap(),
            Some("Ana Costa".to_string()),
            EventType::ReentryAck,
            Utc::now(),
        );
        let body = AccessLogBody::from(&event);
        assert_eq!(body.event_type, "entry");

        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"event_type\":\"entry\""));
        assert!(!json.contains("reentry"));
    }

    #[test]
    fn test_unknown_tag_body_has_no_name() {
        let event = AccessEvent::decided(
            TagId::new("X9X9X9").unwrap(),
            None,
            EventType::Unknown,
            Utc::now(),
        );
        let body = AccessLogBody::from(&event);

        assert_eq!(body.event_type, "unknown");
        assert_eq!(body.collaborator_name, None);
        assert!(!body.access_granted);
    }
}
