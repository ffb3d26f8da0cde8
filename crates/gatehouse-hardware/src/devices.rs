//! Enum wrappers for hardware device dispatch.
//!
//! Native `async fn` in traits (RPITIT - Rust Edition 2024) are not
//! object-safe, so `Box<dyn TagReader>` is unavailable. These enums provide
//! concrete type dispatch at compile time instead:
//!
//! - Zero-cost abstraction (monomorphization at compile-time)
//! - Type-safe extensibility
//! - Support for feature flags (conditional compilation)
//!
//! # Examples
//!
//! ```
//! use gatehouse_hardware::devices::AnyTagReader;
//! use gatehouse_hardware::mock::MockTagReader;
//!
//! let (reader, _handle) = MockTagReader::new();
//! let any_reader = AnyTagReader::Mock(reader);
//! // Can now be used polymorphically through the TagReader trait
//! ```

use crate::Result;
use crate::console::ConsoleIndicator;
use crate::mock::{MockIndicator, MockTagReader};
use crate::stdin::StdinTagReader;
use crate::traits::{IndicatorDevice, TagRead, TagReader};
use gatehouse_core::FeedbackChannel;

/// Enum wrapper for tag reader dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyTagReader {
    /// Mock reader for development and testing.
    Mock(MockTagReader),
    /// Stdin-driven reader for hardware-free operation.
    Stdin(StdinTagReader),
    // TODO(hardware-spi): add the MFRC522 reader variant once the SPI
    // driver lands behind the hardware-spi feature.
}

impl TagReader for AnyTagReader {
    async fn next_read(&mut self) -> Result<TagRead> {
        match self {
            Self::Mock(device) => device.next_read().await,
            Self::Stdin(device) => device.next_read().await,
        }
    }
}

/// Enum wrapper for indicator device dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyIndicatorDevice {
    /// Mock indicator for testing.
    Mock(MockIndicator),
    /// Console indicator for hardware-free operation.
    Console(ConsoleIndicator),
}

impl IndicatorDevice for AnyIndicatorDevice {
    async fn set_output(&mut self, channel: FeedbackChannel, on: bool) -> Result<()> {
        match self {
            Self::Mock(device) => device.set_output(channel, on).await,
            Self::Console(device) => device.set_output(channel, on).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_core::TagId;

    #[tokio::test]
    async fn test_any_tag_reader_dispatch() {
        let (reader, handle) = MockTagReader::new();
        let mut any_reader = AnyTagReader::Mock(reader);

        handle.present(TagId::new("RFID001").unwrap()).await.unwrap();
        let read = any_reader.next_read().await.unwrap();
        assert_eq!(read.tag.as_str(), "RFID001");
    }

    #[tokio::test]
    async fn test_any_indicator_dispatch() {
        let (indicator, handle) = MockIndicator::new();
        let mut any_indicator = AnyIndicatorDevice::Mock(indicator);

        any_indicator
            .set_output(FeedbackChannel::Granted, true)
            .await
            .unwrap();
        assert_eq!(handle.count_for(FeedbackChannel::Granted), 1);
    }
}
