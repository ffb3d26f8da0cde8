use crate::{
    Result,
    constants::{MAX_TAG_LENGTH, MIN_TAG_LENGTH},
    error::Error,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// Tag identifier read from a physical RFID tag (3-20 characters)
///
/// Immutable once read; the same normalized form is used for replica lookups,
/// visit state keys, and cached events.
///
/// # Security
/// This type implements constant-time comparison to prevent timing attacks
/// when comparing tag identifiers against the collaborator replica.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct TagId(String);

impl TagId {
    /// Create a new tag identifier with validation.
    ///
    /// The identifier is normalized (trimmed and converted to uppercase)
    /// before validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidTagFormat` if:
    /// - The identifier length is not between 3-20 characters
    /// - The identifier contains non-ASCII characters
    pub fn new(raw: &str) -> Result<Self> {
        // Normalize: trim and uppercase
        let raw = raw.trim().to_uppercase();

        let len = raw.len();
        if !(MIN_TAG_LENGTH..=MAX_TAG_LENGTH).contains(&len) {
            return Err(Error::InvalidTagFormat(format!(
                "Tag must be {MIN_TAG_LENGTH}-{MAX_TAG_LENGTH} chars, got {len}"
            )));
        }

        // Ensure ASCII only
        if !raw.is_ascii() {
            return Err(Error::InvalidTagFormat("Tag must be ASCII".to_string()));
        }

        Ok(TagId(raw))
    }

    /// Get the tag identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TagId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TagId::new(s)
    }
}

/// Constant-time comparison implementation for TagId
///
/// This prevents timing attacks by ensuring comparison takes the same time
/// regardless of where the strings differ.
impl PartialEq for TagId {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

/// Hash implementation for TagId
///
/// Implements standard hashing for use in hash-based collections.
impl std::hash::Hash for TagId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

/// Decided outcome of a single tag read
///
/// `ReentryAck` acknowledges presence without counting as a new entry; on the
/// wire it maps to the server's `entry` taxonomy (see [`EventType::wire_name`])
/// while the local cache keeps the distinct type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// First read of an absent collaborator: they entered the room.
    Entry,
    /// Second consecutive read: presence acknowledged, not a new entry.
    ReentryAck,
    /// Third consecutive read: they left the room.
    Exit,
    /// Known collaborator without access.
    Denied,
    /// Tag not present in any replica refresh (possible intrusion).
    Unknown,
}

impl EventType {
    /// Local event type name, as stored in the offline cache.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Entry => "entry",
            EventType::ReentryAck => "reentry_ack",
            EventType::Exit => "exit",
            EventType::Denied => "denied",
            EventType::Unknown => "unknown",
        }
    }

    /// Event type name in the server's taxonomy.
    ///
    /// The server log endpoint only knows `entry`, `exit`, `denied` and
    /// `unknown`; a reentry acknowledgment is reported as `entry` per its
    /// semantic framing.
    #[must_use]
    pub fn wire_name(self) -> &'static str {
        match self {
            EventType::Entry | EventType::ReentryAck => "entry",
            EventType::Exit => "exit",
            EventType::Denied => "denied",
            EventType::Unknown => "unknown",
        }
    }

    /// Parse a local event type name back into the enum.
    ///
    /// # Errors
    /// Returns `Error::UnknownEventType` for any name not produced by
    /// [`EventType::as_str`].
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "entry" => Ok(EventType::Entry),
            "reentry_ack" => Ok(EventType::ReentryAck),
            "exit" => Ok(EventType::Exit),
            "denied" => Ok(EventType::Denied),
            "unknown" => Ok(EventType::Unknown),
            _ => Err(Error::UnknownEventType(s.to_string())),
        }
    }

    /// Returns `true` if this event type grants access.
    #[inline]
    #[must_use]
    pub fn grants_access(self) -> bool {
        matches!(
            self,
            EventType::Entry | EventType::ReentryAck | EventType::Exit
        )
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Synchronization state of a cached event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Not yet acknowledged by the server; re-offered on every sync cycle.
    Pending,
    /// Durably recorded on the server; eligible for pruning.
    Confirmed,
    /// Permanently rejected by the server; kept for the session report.
    Failed,
}

impl SyncStatus {
    /// Status name as stored in the cache.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SyncStatus::Pending => "pending",
            SyncStatus::Confirmed => "confirmed",
            SyncStatus::Failed => "failed",
        }
    }

    /// Parse a status name back into the enum.
    ///
    /// # Errors
    /// Returns `Error::UnknownSyncStatus` for any name not produced by
    /// [`SyncStatus::as_str`].
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(SyncStatus::Pending),
            "confirmed" => Ok(SyncStatus::Confirmed),
            "failed" => Ok(SyncStatus::Failed),
            _ => Err(Error::UnknownSyncStatus(s.to_string())),
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable record of a decided access event
///
/// Created exclusively by the decision engine; `sync_status` is mutated only
/// by the sync engine. The locally generated `event_id` doubles as the
/// idempotency key for server delivery, making duplicate delivery after a
/// crash safe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessEvent {
    /// Locally generated unique identifier (also the idempotency key).
    pub event_id: Uuid,

    /// Tag that produced the read.
    pub tag: TagId,

    /// Collaborator name (None for unrecognized tags).
    pub collaborator_name: Option<String>,

    /// Decided outcome of the read.
    pub event_type: EventType,

    /// Whether access was granted.
    pub access_granted: bool,

    /// When the read occurred (device clock).
    pub occurred_at: DateTime<Utc>,

    /// Synchronization state against the central server.
    pub sync_status: SyncStatus,
}

impl AccessEvent {
    /// Create a freshly decided event with a new id and `Pending` status.
    ///
    /// `access_granted` is derived from the event type; the decision engine
    /// never grants on `Denied` or `Unknown`.
    #[must_use]
    pub fn decided(
        tag: TagId,
        collaborator_name: Option<String>,
        event_type: EventType,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            tag,
            collaborator_name,
            event_type,
            access_granted: event_type.grants_access(),
            occurred_at,
            sync_status: SyncStatus::Pending,
        }
    }
}

/// Read-only replica entry for one collaborator
///
/// Owned and mutated by the central registry; the device only ever replaces
/// the whole replica. At most one record exists per tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaboratorRecord {
    /// Registry identifier.
    pub id: i64,

    /// Collaborator display name.
    pub name: String,

    /// Tag assigned to this collaborator (unique within the replica).
    pub tag: TagId,

    /// Whether this collaborator is currently authorized.
    pub has_access: bool,
}

/// Feedback output channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackChannel {
    /// Granted indicator (green).
    Granted,
    /// Denied indicator (red).
    Denied,
}

impl fmt::Display for FeedbackChannel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FeedbackChannel::Granted => write!(f, "granted"),
            FeedbackChannel::Denied => write!(f, "denied"),
        }
    }
}

/// Feedback output pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackPattern {
    /// Assert the output for the command duration, then deassert.
    Solid,
    /// Toggle the output n times within the command duration.
    Blink(u8),
}

/// Ephemeral actuation command produced by a decision
///
/// Fire-and-forget relative to the decision path: feedback runs in the
/// background and never blocks the next tag read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackCommand {
    /// Which indicator to drive.
    pub channel: FeedbackChannel,

    /// How to drive it.
    pub pattern: FeedbackPattern,

    /// Total actuation window.
    pub duration: Duration,
}

impl FeedbackCommand {
    /// Solid granted indication for the given duration.
    #[must_use]
    pub fn granted_solid(duration: Duration) -> Self {
        Self {
            channel: FeedbackChannel::Granted,
            pattern: FeedbackPattern::Solid,
            duration,
        }
    }

    /// Solid denied indication for the given duration.
    #[must_use]
    pub fn denied_solid(duration: Duration) -> Self {
        Self {
            channel: FeedbackChannel::Denied,
            pattern: FeedbackPattern::Solid,
            duration,
        }
    }

    /// Blinking denied indication: `count` toggles within `window`.
    #[must_use]
    pub fn denied_blink(count: u8, window: Duration) -> Self {
        Self {
            channel: FeedbackChannel::Denied,
            pattern: FeedbackPattern::Blink(count),
            duration: window,
        }
    }
}

/// Event totals by type, for the session report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventTypeCounts {
    pub entry: u64,
    pub reentry_ack: u64,
    pub exit: u64,
    pub denied: u64,
    pub unknown: u64,
}

impl EventTypeCounts {
    /// Add one event of the given type.
    pub fn increment(&mut self, event_type: EventType) {
        match event_type {
            EventType::Entry => self.entry += 1,
            EventType::ReentryAck => self.reentry_ack += 1,
            EventType::Exit => self.exit += 1,
            EventType::Denied => self.denied += 1,
            EventType::Unknown => self.unknown += 1,
        }
    }

    /// Total events across all types.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.entry + self.reentry_ack + self.exit + self.denied + self.unknown
    }
}

/// Event totals by sync status, for the session report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStatusCounts {
    pub pending: u64,
    pub confirmed: u64,
    pub failed: u64,
}
