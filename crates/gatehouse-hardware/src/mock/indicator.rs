//! Mock indicator implementation for testing.

use crate::{Result, traits::IndicatorDevice};
use gatehouse_core::FeedbackChannel;
use std::sync::{Arc, Mutex};

/// Mock two-channel indicator that records output transitions.
///
/// Every `set_output` call is appended to a shared transition log that the
/// companion [`MockIndicatorHandle`] can inspect, so tests can assert on the
/// exact actuation sequence a feedback command produced.
///
/// # Examples
///
/// ```
/// use gatehouse_hardware::mock::MockIndicator;
/// use gatehouse_hardware::traits::IndicatorDevice;
/// use gatehouse_core::FeedbackChannel;
///
/// #[tokio::main]
/// async fn main() -> gatehouse_hardware::Result<()> {
///     let (mut indicator, handle) = MockIndicator::new();
///
///     indicator.set_output(FeedbackChannel::Granted, true).await?;
///     indicator.set_output(FeedbackChannel::Granted, false).await?;
///
///     assert_eq!(handle.transitions().len(), 2);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockIndicator {
    transitions: Arc<Mutex<Vec<(FeedbackChannel, bool)>>>,
}

impl MockIndicator {
    /// Create a new mock indicator and its inspection handle.
    pub fn new() -> (Self, MockIndicatorHandle) {
        let transitions = Arc::new(Mutex::new(Vec::new()));
        let indicator = Self {
            transitions: Arc::clone(&transitions),
        };
        (indicator, MockIndicatorHandle { transitions })
    }
}

impl IndicatorDevice for MockIndicator {
    async fn set_output(&mut self, channel: FeedbackChannel, on: bool) -> Result<()> {
        self.transitions
            .lock()
            .map_err(|_| crate::HardwareError::other("indicator transition log poisoned"))?
            .push((channel, on));
        Ok(())
    }
}

/// Handle for inspecting a mock indicator's recorded transitions.
#[derive(Debug, Clone)]
pub struct MockIndicatorHandle {
    transitions: Arc<Mutex<Vec<(FeedbackChannel, bool)>>>,
}

impl MockIndicatorHandle {
    /// Snapshot of all recorded transitions, in actuation order.
    pub fn transitions(&self) -> Vec<(FeedbackChannel, bool)> {
        self.transitions
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Number of transitions recorded for one channel.
    pub fn count_for(&self, channel: FeedbackChannel) -> usize {
        self.transitions()
            .iter()
            .filter(|(c, _)| *c == channel)
            .count()
    }

    /// Clear the transition log.
    pub fn clear(&self) {
        if let Ok(mut guard) = self.transitions.lock() {
            guard.clear();
        }
    }
}
