//! The sync engine: drains the offline cache against the log endpoint.
//!
//! Runs as an independent periodic task, fully decoupled from the read loop.
//! It only reads and writes cache entries by id and never touches visit
//! state. Between failing cycles the delay grows exponentially up to a cap;
//! retries continue unbounded while offline, because events are never
//! dropped for connectivity reasons.

use crate::error::{SyncError, SyncResult};
use crate::transport::{DeliveryOutcome, LogSink};
use gatehouse_core::SyncStatus;
use gatehouse_core::constants::{
    DEFAULT_SYNC_BACKOFF_BASE_MS, DEFAULT_SYNC_BACKOFF_CAP_MS, DEFAULT_SYNC_INTERVAL_SECS,
};
use gatehouse_storage::EventCache;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Result of one sync cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Deliveries attempted this cycle.
    pub sent: usize,

    /// Events confirmed (delivered or already known to the server).
    pub confirmed: usize,

    /// Events permanently rejected and marked failed.
    pub failed: usize,
}

impl SyncReport {
    /// Returns `true` if the cycle stopped early on a transient failure.
    #[must_use]
    pub fn interrupted(&self) -> bool {
        self.sent > self.confirmed + self.failed
    }
}

/// Timing configuration for the sync engine.
#[derive(Debug, Clone)]
pub struct SyncEngineConfig {
    /// Interval between cycles while the server is reachable.
    pub interval: Duration,

    /// Initial backoff delay after a failing cycle.
    pub backoff_base: Duration,

    /// Maximum backoff delay.
    pub backoff_cap: Duration,
}

impl Default for SyncEngineConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_SYNC_INTERVAL_SECS),
            backoff_base: Duration::from_millis(DEFAULT_SYNC_BACKOFF_BASE_MS),
            backoff_cap: Duration::from_millis(DEFAULT_SYNC_BACKOFF_CAP_MS),
        }
    }
}

/// Capped exponential backoff between failing cycles.
#[derive(Debug)]
struct Backoff {
    base: Duration,
    cap: Duration,
    current: Option<Duration>,
}

impl Backoff {
    fn new(base: Duration, cap: Duration) -> Self {
        Self {
            base,
            cap,
            current: None,
        }
    }

    fn next(&mut self) -> Duration {
        let next = match self.current {
            None => self.base,
            Some(current) => (current * 2).min(self.cap),
        };
        self.current = Some(next);
        next
    }

    fn reset(&mut self) {
        self.current = None;
    }
}

/// Drains pending events from the offline cache to a log sink.
pub struct SyncEngine<S, C> {
    sink: S,
    cache: C,
    config: SyncEngineConfig,
}

impl<S: LogSink, C: EventCache> SyncEngine<S, C> {
    /// Create a sync engine over a sink and cache.
    pub fn new(sink: S, cache: C, config: SyncEngineConfig) -> Self {
        Self {
            sink,
            cache,
            config,
        }
    }

    /// Run one sync cycle: deliver pending events oldest-first.
    ///
    /// Stops early on the first transient failure so that a later event is
    /// never confirmed ahead of an earlier one (out-of-order delivery would
    /// corrupt the server's entry/exit reconstruction). Permanently rejected
    /// events are marked failed and do not block the rest of the queue.
    ///
    /// # Errors
    ///
    /// Returns an error only for cache failures; delivery failures are
    /// absorbed into the report.
    pub async fn sync_cycle(&self) -> SyncResult<SyncReport> {
        let pending = self.cache.pending_events().await?;
        let mut report = SyncReport::default();

        for event in pending {
            // failed events are permanent; they stay for the report only
            if event.sync_status == SyncStatus::Failed {
                continue;
            }

            report.sent += 1;
            match self.sink.deliver(&event).await {
                Ok(DeliveryOutcome::Delivered) | Ok(DeliveryOutcome::AlreadyDelivered) => {
                    self.cache.mark_confirmed(event.event_id).await?;
                    report.confirmed += 1;
                }
                Ok(DeliveryOutcome::Rejected { status }) => {
                    warn!(event_id = %event.event_id, status, "event rejected, marked failed");
                    self.cache.mark_failed(event.event_id).await?;
                    report.failed += 1;
                }
                Err(e) if e.is_transient() => {
                    debug!(event_id = %event.event_id, error = %e,
                        "server unreachable, stopping cycle to preserve order");
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        if report.confirmed > 0 {
            info!(
                confirmed = report.confirmed,
                failed = report.failed,
                "sync cycle completed"
            );
        }
        Ok(report)
    }

    /// Run cycles until shutdown is signalled.
    ///
    /// A clean cycle schedules the next one after the configured interval; a
    /// cycle interrupted by a transient failure schedules it after the
    /// current backoff delay instead.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut backoff = Backoff::new(self.config.backoff_base, self.config.backoff_cap);
        let mut delay = self.config.interval;

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("sync engine stopping");
                        return;
                    }
                }
                _ = tokio::time::sleep(delay) => {
                    delay = match self.sync_cycle().await {
                        Ok(report) if report.interrupted() => {
                            let next = backoff.next();
                            debug!(delay_ms = next.as_millis() as u64, "backing off");
                            next
                        }
                        Ok(_) => {
                            backoff.reset();
                            self.config.interval
                        }
                        Err(e) => {
                            error!(error = %e, "sync cycle failed");
                            backoff.next()
                        }
                    };
                }
            }
        }
    }
}
