//! Hardware abstraction for the gatehouse edge device.
//!
//! This crate isolates the rest of the system from physical peripherals: a
//! tag reader producing an infinite sequence of reads, and two binary
//! indicator outputs (granted/denied) for user feedback. Real GPIO/SPI
//! drivers are out of scope; the traits here are implemented by mock devices
//! for tests, a stdin-driven reader for hardware-free development, and a
//! console indicator that logs output transitions.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro.

#![allow(async_fn_in_trait)]

pub mod console;
pub mod debounce;
pub mod devices;
pub mod error;
pub mod feedback;
pub mod mock;
pub mod stdin;
pub mod traits;

pub use console::ConsoleIndicator;
pub use debounce::DebouncedReader;
pub use devices::{AnyIndicatorDevice, AnyTagReader};
pub use error::{HardwareError, Result};
pub use feedback::{FeedbackController, FeedbackHandle};
pub use mock::{MockIndicator, MockIndicatorHandle, MockTagReader, MockTagReaderHandle};
pub use stdin::StdinTagReader;
pub use traits::{IndicatorDevice, TagRead, TagReader};
