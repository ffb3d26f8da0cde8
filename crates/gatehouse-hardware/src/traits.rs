//! Hardware device trait definitions.
//!
//! These traits establish the contract between the access pipeline and its
//! peripherals: a tag reader producing a lazy, infinite, non-restartable
//! sequence of reads, and a two-channel indicator for visual feedback.
//! They enable substitution between mock, development, and real hardware
//! implementations.

use crate::error::Result;
use chrono::{DateTime, Utc};
use gatehouse_core::{FeedbackChannel, TagId};

/// A single tag read produced by a reader device.
#[derive(Debug, Clone, PartialEq)]
pub struct TagRead {
    /// Normalized tag identifier.
    pub tag: TagId,

    /// When the reader saw the tag (device clock).
    pub read_at: DateTime<Utc>,
}

impl TagRead {
    /// Create a tag read stamped with the current time.
    #[must_use]
    pub fn now(tag: TagId) -> Self {
        Self {
            tag,
            read_at: Utc::now(),
        }
    }
}

/// Tag reader device abstraction.
///
/// Represents an RFID/NFC reader as a blocking source of tag reads. The
/// sequence is infinite and non-restartable: callers loop over `next_read`
/// until the device disconnects or the process shuts down.
///
/// # Object Safety and Dynamic Dispatch
///
/// **NOTE**: This trait is NOT object-safe because `async fn` methods return
/// `impl Future` (Edition 2024 RPITIT). You cannot use `Box<dyn TagReader>`.
/// Use generic type parameters, or the enum wrapper
/// [`AnyTagReader`](crate::devices::AnyTagReader) for dynamic dispatch.
///
/// # Examples
///
/// ```no_run
/// use gatehouse_hardware::traits::{TagRead, TagReader};
/// use gatehouse_hardware::error::Result;
///
/// async fn wait_for_tag<R: TagReader>(reader: &mut R) -> Result<TagRead> {
///     reader.next_read().await
/// }
/// ```
pub trait TagReader: Send {
    /// Wait for the next tag read.
    ///
    /// Blocks asynchronously until a tag is presented to the reader.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The device is disconnected (the sequence has ended)
    /// - The read produced invalid data (caller should log and continue)
    async fn next_read(&mut self) -> Result<TagRead>;
}

/// Two-channel binary indicator abstraction.
///
/// Represents the feedback hardware: two independent binary outputs
/// (granted/denied), each of which can be asserted and deasserted. Timing
/// (solid-for-duration, blink patterns) is driven by the
/// [`FeedbackController`](crate::feedback::FeedbackController), not by the
/// device.
///
/// Not object-safe for the same RPITIT reason as [`TagReader`]; use
/// [`AnyIndicatorDevice`](crate::devices::AnyIndicatorDevice) for dispatch.
pub trait IndicatorDevice: Send {
    /// Assert or deassert one output channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is disconnected or the output cannot
    /// be driven.
    async fn set_output(&mut self, channel: FeedbackChannel, on: bool) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_read_now() {
        let tag = TagId::new("RFID001").unwrap();
        let read = TagRead::now(tag.clone());
        assert_eq!(read.tag, tag);
    }
}
