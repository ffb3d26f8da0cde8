//! Mock tag reader implementation for testing and development.
//!
//! This module provides a simulated RFID reader that can be controlled
//! programmatically for testing without requiring physical hardware.

use crate::{
    Result,
    traits::{TagRead, TagReader},
};
use gatehouse_core::TagId;
use tokio::sync::mpsc;

/// Mock tag reader for testing and development.
///
/// This device simulates an RFID reader fed by a channel: the companion
/// [`MockTagReaderHandle`] presents tags, and `next_read` yields them in
/// order. Dropping every handle ends the read sequence, which `next_read`
/// reports as a disconnection.
///
/// # Examples
///
/// ```
/// use gatehouse_hardware::mock::MockTagReader;
/// use gatehouse_hardware::traits::TagReader;
/// use gatehouse_core::TagId;
///
/// #[tokio::main]
/// async fn main() -> gatehouse_hardware::Result<()> {
///     let (mut reader, handle) = MockTagReader::new();
///
///     let tag = TagId::new("RFID001").unwrap();
///     handle.present(tag.clone()).await?;
///
///     let read = reader.next_read().await?;
///     assert_eq!(read.tag, tag);
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockTagReader {
    /// Channel receiver for presented tags
    read_rx: mpsc::Receiver<TagRead>,

    /// Device name
    name: String,
}

impl MockTagReader {
    /// Create a new mock reader with the default name.
    ///
    /// Returns a tuple of (MockTagReader, MockTagReaderHandle) where the
    /// handle is used to simulate tag presentations.
    pub fn new() -> (Self, MockTagReaderHandle) {
        Self::with_name("Mock RFID Reader".to_string())
    }

    /// Create a new mock reader with a custom name.
    pub fn with_name(name: String) -> (Self, MockTagReaderHandle) {
        let (read_tx, read_rx) = mpsc::channel(32);

        let reader = Self {
            read_rx,
            name: name.clone(),
        };

        let handle = MockTagReaderHandle { read_tx, name };

        (reader, handle)
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl TagReader for MockTagReader {
    async fn next_read(&mut self) -> Result<TagRead> {
        self.read_rx
            .recv()
            .await
            .ok_or_else(|| crate::HardwareError::disconnected(self.name.clone()))
    }
}

/// Handle for controlling a mock tag reader.
///
/// Cloneable; every clone feeds the same reader. The reader sequence ends
/// once all handles are dropped.
#[derive(Debug, Clone)]
pub struct MockTagReaderHandle {
    /// Channel sender for presented tags
    read_tx: mpsc::Sender<TagRead>,

    /// Device name
    name: String,
}

impl MockTagReaderHandle {
    /// Present a tag to the reader, stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been dropped and the channel is
    /// closed.
    pub async fn present(&self, tag: TagId) -> Result<()> {
        self.present_read(TagRead::now(tag)).await
    }

    /// Present a fully specified read (custom timestamp) to the reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been dropped and the channel is
    /// closed.
    pub async fn present_read(&self, read: TagRead) -> Result<()> {
        self.read_tx
            .send(read)
            .await
            .map_err(|_| crate::HardwareError::disconnected(self.name.clone()))
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
