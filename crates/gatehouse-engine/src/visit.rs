//! Per-tag visit state machine.
//!
//! Each authorized tag walks a strict 3-read cycle driven purely by read
//! count since it was last absent, never by wall-clock time:
//!
//! - read 1: `Absent` -> `PresentFirstSeen` (entry)
//! - read 2: `PresentFirstSeen` -> `PresentAcknowledged` (presence ack)
//! - read 3: `PresentAcknowledged` -> removed (exit)
//! - read 4: entry again
//!
//! `Absent` is implicit: a tag with no entry in the store is absent. The
//! store is in-memory only and not persisted across restarts; after a
//! restart everyone is treated as absent. That is an explicit design choice,
//! not a bug.

use chrono::{DateTime, Utc};
use gatehouse_core::TagId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Visit state for one present tag.
///
/// The original entry time is carried through the acknowledgment so that the
/// exit transition can report how long the collaborator stayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum VisitState {
    /// First read seen; the collaborator just entered.
    PresentFirstSeen {
        /// When the entry read occurred.
        entered_at: DateTime<Utc>,
    },

    /// Second read seen; presence acknowledged, still inside.
    PresentAcknowledged {
        /// When the original entry read occurred.
        entered_at: DateTime<Utc>,
    },
}

impl VisitState {
    /// The entry time carried by either variant.
    #[must_use]
    pub fn entered_at(&self) -> DateTime<Utc> {
        match self {
            VisitState::PresentFirstSeen { entered_at }
            | VisitState::PresentAcknowledged { entered_at } => *entered_at,
        }
    }
}

/// Outcome of advancing the cycle for one read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Passage {
    /// The tag was absent and is now present (entry).
    Entered,

    /// The tag was present; this read acknowledges it (not a new entry).
    Acknowledged {
        /// When the collaborator originally entered.
        entered_at: DateTime<Utc>,
    },

    /// The tag completed its cycle and is absent again (exit).
    Exited {
        /// When the collaborator originally entered.
        entered_at: DateTime<Utc>,
    },
}

/// In-memory mapping from tag to current visit state.
///
/// Single source of truth for the per-tag cycle, owned exclusively by the
/// decision engine. Occupancy is derived from the map on demand rather than
/// kept as a counter that could drift.
#[derive(Debug, Default)]
pub struct VisitStateStore {
    states: HashMap<TagId, VisitState>,
}

impl VisitStateStore {
    /// Create an empty store (everyone absent).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of a tag, or `None` if absent.
    #[must_use]
    pub fn state_of(&self, tag: &TagId) -> Option<&VisitState> {
        self.states.get(tag)
    }

    /// Advance the cycle for one read of an authorized tag.
    pub fn advance(&mut self, tag: &TagId, read_at: DateTime<Utc>) -> Passage {
        match self.states.remove(tag) {
            None => {
                self.states.insert(
                    tag.clone(),
                    VisitState::PresentFirstSeen {
                        entered_at: read_at,
                    },
                );
                Passage::Entered
            }
            Some(VisitState::PresentFirstSeen { entered_at }) => {
                self.states
                    .insert(tag.clone(), VisitState::PresentAcknowledged { entered_at });
                Passage::Acknowledged { entered_at }
            }
            Some(VisitState::PresentAcknowledged { entered_at }) => {
                // removal above already returned the tag to implicit Absent
                Passage::Exited { entered_at }
            }
        }
    }

    /// Tags currently present, with their entry times.
    #[must_use]
    pub fn present(&self) -> Vec<(TagId, DateTime<Utc>)> {
        self.states
            .iter()
            .map(|(tag, state)| (tag.clone(), state.entered_at()))
            .collect()
    }

    /// Number of tags currently present (derived, never stored).
    #[must_use]
    pub fn occupancy(&self) -> usize {
        self.states.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(s: &str) -> TagId {
        TagId::new(s).unwrap()
    }

    #[test]
    fn test_three_read_cycle() {
        let mut store = VisitStateStore::new();
        let t1 = tag("RFID001");
        let now = Utc::now();

        assert_eq!(store.advance(&t1, now), Passage::Entered);
        assert_eq!(
            store.advance(&t1, now),
            Passage::Acknowledged { entered_at: now }
        );
        assert_eq!(store.advance(&t1, now), Passage::Exited { entered_at: now });

        // cycle restarts on the fourth read
        assert_eq!(store.advance(&t1, now), Passage::Entered);
    }

    #[test]
    fn test_exit_returns_to_absent() {
        let mut store = VisitStateStore::new();
        let t1 = tag("RFID001");
        let now = Utc::now();

        store.advance(&t1, now);
        store.advance(&t1, now);
        store.advance(&t1, now);

        assert!(store.state_of(&t1).is_none());
        assert_eq!(store.occupancy(), 0);
    }

    #[test]
    fn test_entry_time_carried_through_ack() {
        let mut store = VisitStateStore::new();
        let t1 = tag("RFID001");
        let entered = Utc::now();
        let later = entered + chrono::Duration::minutes(30);

        store.advance(&t1, entered);
        assert_eq!(
            store.advance(&t1, later),
            Passage::Acknowledged {
                entered_at: entered
            }
        );
        assert_eq!(
            store.advance(&t1, later),
            Passage::Exited {
                entered_at: entered
            }
        );
    }

    #[test]
    fn test_tags_cycle_independently() {
        let mut store = VisitStateStore::new();
        let t1 = tag("RFID001");
        let t2 = tag("RFID002");
        let now = Utc::now();

        assert_eq!(store.advance(&t1, now), Passage::Entered);
        assert_eq!(store.advance(&t2, now), Passage::Entered);
        assert_eq!(store.occupancy(), 2);

        assert!(matches!(
            store.advance(&t1, now),
            Passage::Acknowledged { .. }
        ));
        assert!(matches!(store.advance(&t1, now), Passage::Exited { .. }));

        // t2 is still in its first state
        assert_eq!(store.occupancy(), 1);
        assert!(matches!(
            store.state_of(&t2),
            Some(VisitState::PresentFirstSeen { .. })
        ));
    }

    #[test]
    fn test_present_listing() {
        let mut store = VisitStateStore::new();
        let now = Utc::now();
        store.advance(&tag("RFID001"), now);
        store.advance(&tag("RFID002"), now);

        let present = store.present();
        assert_eq!(present.len(), 2);
        assert!(present.iter().all(|(_, at)| *at == now));
    }
}
