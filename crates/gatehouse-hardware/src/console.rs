//! Console indicator for hardware-free runs.

use crate::{Result, traits::IndicatorDevice};
use gatehouse_core::FeedbackChannel;
use tracing::info;

/// Indicator that logs output transitions instead of driving hardware.
///
/// Used by the binary when no physical feedback device is attached, so an
/// operator watching the log still sees the granted/denied indications a
/// deployed device would show.
#[derive(Debug, Default)]
pub struct ConsoleIndicator;

impl ConsoleIndicator {
    /// Create a new console indicator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl IndicatorDevice for ConsoleIndicator {
    async fn set_output(&mut self, channel: FeedbackChannel, on: bool) -> Result<()> {
        info!(%channel, on, "indicator output");
        Ok(())
    }
}
