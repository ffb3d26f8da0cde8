//! Periodic collaborator replica refresh.
//!
//! Best-effort by contract: a failed refresh is logged and otherwise silent,
//! leaving the previous replica in place. Lookups never notice; only
//! freshness is affected.

use crate::error::SyncResult;
use crate::transport::RegistrySource;
use gatehouse_engine::{SharedReplica, replica::replace_shared};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Rebuilds the local collaborator replica from the remote registry.
pub struct RefreshTask<R> {
    source: R,
    replica: SharedReplica,
}

impl<R: RegistrySource> RefreshTask<R> {
    /// Create a refresh task over a registry source and the shared replica.
    pub fn new(source: R, replica: SharedReplica) -> Self {
        Self { source, replica }
    }

    /// Fetch the registry once and replace the replica wholesale.
    ///
    /// Returns the number of records installed.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails; the previous replica is left
    /// untouched in that case.
    pub async fn refresh_once(&self) -> SyncResult<usize> {
        let records = self.source.fetch_all().await?;
        let installed = replace_shared(&self.replica, records);
        debug!(collaborators = installed, "replica refreshed");
        Ok(installed)
    }

    /// Refresh on the given interval until shutdown is signalled.
    pub async fn run(self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("refresh task stopping");
                        return;
                    }
                }
                _ = tokio::time::sleep(interval) => {
                    // silent to lookup callers: stale replica stays authoritative
                    if let Err(e) = self.refresh_once().await {
                        warn!(error = %e, "replica refresh failed, keeping previous replica");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use gatehouse_core::{CollaboratorRecord, TagId};
    use gatehouse_engine::{PolicyAnswer, replica::lookup_shared, shared_replica};
    use std::sync::Mutex;

    struct ScriptedRegistry {
        responses: Mutex<Vec<SyncResult<Vec<CollaboratorRecord>>>>,
    }

    impl ScriptedRegistry {
        fn new(responses: Vec<SyncResult<Vec<CollaboratorRecord>>>) -> Self {
            Self {
                responses: Mutex::new(responses),
            }
        }
    }

    impl RegistrySource for ScriptedRegistry {
        async fn fetch_all(&self) -> SyncResult<Vec<CollaboratorRecord>> {
            self.responses
                .lock()
                .expect("registry script lock")
                .remove(0)
        }
    }

    fn ana() -> CollaboratorRecord {
        CollaboratorRecord {
            id: 1,
            name: "Ana Costa".to_string(),
            tag: TagId::new("RFID004").unwrap(),
            has_access: true,
        }
    }

    #[tokio::test]
    async fn test_refresh_once_installs_records() {
        let replica = shared_replica();
        let task = RefreshTask::new(ScriptedRegistry::new(vec![Ok(vec![ana()])]), replica.clone());

        let installed = task.refresh_once().await.unwrap();
        assert_eq!(installed, 1);

        let answer = lookup_shared(&replica, &TagId::new("RFID004").unwrap());
        assert!(matches!(answer, PolicyAnswer::Known { .. }));
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_replica() {
        let replica = shared_replica();
        let task = RefreshTask::new(
            ScriptedRegistry::new(vec![
                Ok(vec![ana()]),
                Err(SyncError::unreachable("connection refused")),
            ]),
            replica.clone(),
        );

        task.refresh_once().await.unwrap();
        assert!(task.refresh_once().await.is_err());

        // the stale replica still answers
        let answer = lookup_shared(&replica, &TagId::new("RFID004").unwrap());
        assert_eq!(
            answer,
            PolicyAnswer::Known {
                name: "Ana Costa".to_string(),
                has_access: true,
            }
        );
    }
}
