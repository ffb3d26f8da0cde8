//! Event decision engine.
//!
//! Consumes one tag read at a time, consults the collaborator replica and
//! the visit state store, and produces the decided access event plus the
//! feedback command that goes with it. Decisions are purely local: server
//! reachability never enters the picture, and a read that arrives while the
//! device is offline advances the state machine identically.

use crate::replica::{PolicyAnswer, SharedReplica, lookup_shared};
use crate::report::SessionStats;
use crate::visit::{Passage, VisitStateStore};
use chrono::{DateTime, Utc};
use gatehouse_core::{
    AccessEvent, EventType, FeedbackCommand, TagId,
    constants::{
        BLINK_WINDOW_SECS, DENY_SOLID_SECS, GRANT_SOLID_SECS, INTRUSION_BLINK_COUNT, MSG_ACCESS_DENIED,
        MSG_GOODBYE, MSG_UNKNOWN_TAG, MSG_WELCOME, MSG_WELCOME_BACK,
    },
};
use std::time::Duration;
use tracing::{info, warn};

/// One decided read: the event to record, the feedback to show, and the
/// operator-facing message.
#[derive(Debug, Clone)]
pub struct Decision {
    /// Event to append to the offline cache.
    pub event: AccessEvent,

    /// Feedback command for the indicator channels.
    pub feedback: FeedbackCommand,

    /// Human-readable message for the operator console.
    pub message: String,
}

/// The access-event state machine.
///
/// Owns the visit state store exclusively; reads are decided strictly one at
/// a time in arrival order, so there are no concurrent transitions to race.
pub struct DecisionEngine {
    visits: VisitStateStore,
    replica: SharedReplica,
    stats: SessionStats,
}

impl DecisionEngine {
    /// Create an engine over a shared collaborator replica.
    ///
    /// The visit store starts empty: after a restart everyone is absent.
    #[must_use]
    pub fn new(replica: SharedReplica) -> Self {
        Self {
            visits: VisitStateStore::new(),
            replica,
            stats: SessionStats::default(),
        }
    }

    /// Decide one tag read.
    ///
    /// Unrecognized and unauthorized reads never mutate visit state; an
    /// authorized read advances the 3-read cycle for its tag.
    pub fn decide(&mut self, tag: TagId, read_at: DateTime<Utc>) -> Decision {
        match lookup_shared(&self.replica, &tag) {
            PolicyAnswer::Unknown => {
                warn!(%tag, "unrecognized tag, possible intrusion attempt");
                self.stats.record_intrusion();
                Decision {
                    event: AccessEvent::decided(tag, None, EventType::Unknown, read_at),
                    feedback: FeedbackCommand::denied_blink(
                        INTRUSION_BLINK_COUNT,
                        Duration::from_secs(BLINK_WINDOW_SECS),
                    ),
                    message: MSG_UNKNOWN_TAG.to_string(),
                }
            }
            PolicyAnswer::Known {
                name,
                has_access: false,
            } => {
                info!(%tag, collaborator = %name, "access denied");
                self.stats.record_denied(&name);
                Decision {
                    event: AccessEvent::decided(
                        tag,
                        Some(name.clone()),
                        EventType::Denied,
                        read_at,
                    ),
                    feedback: FeedbackCommand::denied_solid(Duration::from_secs(DENY_SOLID_SECS)),
                    message: format!("{MSG_ACCESS_DENIED}, {name}"),
                }
            }
            PolicyAnswer::Known {
                name,
                has_access: true,
            } => self.decide_authorized(tag, name, read_at),
        }
    }

    fn decide_authorized(&mut self, tag: TagId, name: String, read_at: DateTime<Utc>) -> Decision {
        let (event_type, message) = match self.visits.advance(&tag, read_at) {
            Passage::Entered => (EventType::Entry, format!("{MSG_WELCOME}, {name}")),
            Passage::Acknowledged { .. } => {
                (EventType::ReentryAck, format!("{MSG_WELCOME_BACK}, {name}"))
            }
            Passage::Exited { entered_at } => {
                let stay = (read_at - entered_at).to_std().unwrap_or_default();
                self.stats.record_stay(&name, stay);
                (EventType::Exit, format!("{MSG_GOODBYE}, {name}"))
            }
        };

        info!(%tag, collaborator = %name, event = %event_type, "access granted");

        Decision {
            event: AccessEvent::decided(tag, Some(name), event_type, read_at),
            feedback: FeedbackCommand::granted_solid(Duration::from_secs(GRANT_SOLID_SECS)),
            message,
        }
    }

    /// The visit state store (read-only view).
    #[must_use]
    pub fn visits(&self) -> &VisitStateStore {
        &self.visits
    }

    /// Session statistics accumulated so far.
    #[must_use]
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// The shared replica this engine consults.
    #[must_use]
    pub fn replica(&self) -> &SharedReplica {
        &self.replica
    }
}
