//! Debounce wrapper for tag readers.
//!
//! A tag held against a reader produces a burst of identical reads. The
//! wrapper suppresses repeats of the same tag inside a configurable window
//! so a single presentation reaches the decision engine exactly once.
//! A different tag always passes immediately, resetting the window.

use crate::{
    Result,
    traits::{TagRead, TagReader},
};
use gatehouse_core::TagId;
use gatehouse_core::constants::DEFAULT_DEBOUNCE_SECS;
use std::time::{Duration, Instant};
use tracing::trace;

/// Tag reader wrapper that discards spurious repeated reads.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use gatehouse_hardware::debounce::DebouncedReader;
/// use gatehouse_hardware::mock::MockTagReader;
/// use gatehouse_hardware::traits::TagReader;
/// use gatehouse_core::TagId;
///
/// #[tokio::main]
/// async fn main() -> gatehouse_hardware::Result<()> {
///     let (reader, handle) = MockTagReader::new();
///     let mut reader = DebouncedReader::new(reader, Duration::from_secs(3));
///
///     let tag = TagId::new("RFID001").unwrap();
///     handle.present(tag.clone()).await?;
///     handle.present(tag.clone()).await?; // burst repeat, discarded
///     handle.present(TagId::new("RFID002").unwrap()).await?;
///
///     assert_eq!(reader.next_read().await?.tag, tag);
///     assert_eq!(reader.next_read().await?.tag.as_str(), "RFID002");
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct DebouncedReader<R> {
    inner: R,
    window: Duration,
    last: Option<(TagId, Instant)>,
}

impl<R> DebouncedReader<R> {
    /// Wrap a reader with the given debounce window.
    pub fn new(inner: R, window: Duration) -> Self {
        Self {
            inner,
            window,
            last: None,
        }
    }

    /// Wrap a reader with the default window.
    pub fn with_default_window(inner: R) -> Self {
        Self::new(inner, Duration::from_secs(DEFAULT_DEBOUNCE_SECS))
    }

    /// Get the configured debounce window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Unwrap the inner reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: TagReader> TagReader for DebouncedReader<R> {
    async fn next_read(&mut self) -> Result<TagRead> {
        loop {
            let read = self.inner.next_read().await?;
            let now = Instant::now();

            if let Some((last_tag, last_at)) = &self.last
                && *last_tag == read.tag
                && now.duration_since(*last_at) < self.window
            {
                trace!(tag = %read.tag, "debounced repeated read");
                continue;
            }

            self.last = Some((read.tag.clone(), now));
            return Ok(read);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTagReader;

    #[tokio::test]
    async fn test_debounce_discards_burst_repeats() {
        let (reader, handle) = MockTagReader::new();
        let mut reader = DebouncedReader::new(reader, Duration::from_secs(60));

        let tag = TagId::new("RFID001").unwrap();
        handle.present(tag.clone()).await.unwrap();
        handle.present(tag.clone()).await.unwrap();
        handle.present(tag.clone()).await.unwrap();
        handle.present(TagId::new("RFID002").unwrap()).await.unwrap();

        assert_eq!(reader.next_read().await.unwrap().tag, tag);
        // the two repeats are skipped; the next distinct tag comes through
        assert_eq!(reader.next_read().await.unwrap().tag.as_str(), "RFID002");
    }

    #[tokio::test]
    async fn test_debounce_different_tag_passes_immediately() {
        let (reader, handle) = MockTagReader::new();
        let mut reader = DebouncedReader::new(reader, Duration::from_secs(60));

        handle.present(TagId::new("RFID001").unwrap()).await.unwrap();
        handle.present(TagId::new("RFID002").unwrap()).await.unwrap();
        handle.present(TagId::new("RFID001").unwrap()).await.unwrap();

        assert_eq!(reader.next_read().await.unwrap().tag.as_str(), "RFID001");
        assert_eq!(reader.next_read().await.unwrap().tag.as_str(), "RFID002");
        assert_eq!(reader.next_read().await.unwrap().tag.as_str(), "RFID001");
    }

    #[tokio::test]
    async fn test_debounce_same_tag_after_window_passes() {
        let (reader, handle) = MockTagReader::new();
        let mut reader = DebouncedReader::new(reader, Duration::from_millis(20));

        let tag = TagId::new("RFID001").unwrap();
        handle.present(tag.clone()).await.unwrap();
        assert_eq!(reader.next_read().await.unwrap().tag, tag);

        tokio::time::sleep(Duration::from_millis(40)).await;
        handle.present(tag.clone()).await.unwrap();
        assert_eq!(reader.next_read().await.unwrap().tag, tag);
    }

    #[test]
    fn test_default_window() {
        let (reader, _handle) = MockTagReader::new();
        let reader = DebouncedReader::with_default_window(reader);
        assert_eq!(reader.window(), Duration::from_secs(DEFAULT_DEBOUNCE_SECS));
    }
}
