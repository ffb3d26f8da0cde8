//! Local collaborator replica (the cached half of the access policy oracle).
//!
//! The device holds a read-only replica of the central collaborator registry
//! so that policy lookups work while offline. The replica is only ever
//! replaced wholesale by a successful refresh; a failed refresh is silent to
//! lookup callers and simply leaves the previous replica (however stale) in
//! place. A tag that never appeared in any successful refresh is always
//! unknown.

use chrono::{DateTime, Utc};
use gatehouse_core::{CollaboratorRecord, TagId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::warn;

/// Answer to a policy lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyAnswer {
    /// Tag not present in any successful refresh (possible intrusion).
    Unknown,

    /// Tag belongs to a known collaborator.
    Known {
        /// Collaborator display name.
        name: String,
        /// Whether the collaborator is currently authorized.
        has_access: bool,
    },
}

/// Read-only replica of the collaborator registry.
///
/// Invariant: at most one record per tag. Duplicate tags in a refresh
/// payload keep the last record and log a warning.
#[derive(Debug, Default)]
pub struct CollaboratorReplica {
    records: HashMap<TagId, CollaboratorRecord>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl CollaboratorReplica {
    /// Create an empty replica (every tag unknown).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole replica with a freshly fetched record set.
    ///
    /// Returns the number of records installed.
    pub fn replace_all(&mut self, records: Vec<CollaboratorRecord>) -> usize {
        let mut map = HashMap::with_capacity(records.len());
        for record in records {
            if let Some(previous) = map.insert(record.tag.clone(), record) {
                warn!(tag = %previous.tag, "duplicate tag in registry payload, keeping last");
            }
        }
        self.records = map;
        self.refreshed_at = Some(Utc::now());
        self.records.len()
    }

    /// Answer a policy lookup from the current replica.
    #[must_use]
    pub fn lookup(&self, tag: &TagId) -> PolicyAnswer {
        match self.records.get(tag) {
            Some(record) => PolicyAnswer::Known {
                name: record.name.clone(),
                has_access: record.has_access,
            },
            None => PolicyAnswer::Unknown,
        }
    }

    /// Number of records in the replica.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no refresh has ever populated the replica.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// When the replica was last successfully refreshed.
    #[must_use]
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }
}

/// Replica shared between the decision engine and the refresh task.
///
/// Lookups are short synchronous reads; the lock is never held across an
/// await point.
pub type SharedReplica = Arc<RwLock<CollaboratorReplica>>;

/// Create an empty shared replica.
#[must_use]
pub fn shared_replica() -> SharedReplica {
    Arc::new(RwLock::new(CollaboratorReplica::new()))
}

/// Look up a tag through the shared replica.
///
/// A poisoned lock falls back to the inner replica: a panic elsewhere must
/// not take the decision path down with it.
#[must_use]
pub fn lookup_shared(replica: &SharedReplica, tag: &TagId) -> PolicyAnswer {
    match replica.read() {
        Ok(guard) => guard.lookup(tag),
        Err(poisoned) => poisoned.into_inner().lookup(tag),
    }
}

/// Replace the shared replica with a freshly fetched record set.
///
/// Returns the number of records installed.
pub fn replace_shared(replica: &SharedReplica, records: Vec<CollaboratorRecord>) -> usize {
    match replica.write() {
        Ok(mut guard) => guard.replace_all(records),
        Err(poisoned) => poisoned.into_inner().replace_all(records),
    }
}
