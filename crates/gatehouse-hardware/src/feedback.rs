//! Feedback controller: maps decided commands to indicator actuation.
//!
//! The controller owns the indicator device and executes one command at a
//! time with exact timing: `solid` asserts the output for the command
//! duration then deasserts; `blink(n)` toggles the output n times spread
//! evenly across the duration.
//!
//! Actuation is fire-and-forget relative to the decision path. The read loop
//! hands commands to a [`FeedbackHandle`], which enqueues them for a
//! background task; a tag presented while an indication is still running is
//! never delayed by it.

use crate::devices::AnyIndicatorDevice;
use crate::{Result, traits::IndicatorDevice};
use gatehouse_core::{FeedbackCommand, FeedbackPattern};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Queue depth for pending feedback commands.
///
/// Commands arriving while the queue is full are dropped with a warning;
/// feedback is cosmetic and must never apply backpressure to the read loop.
const FEEDBACK_QUEUE_DEPTH: usize = 8;

/// Executes feedback commands against an indicator device.
pub struct FeedbackController<D> {
    device: D,
}

impl<D: IndicatorDevice> FeedbackController<D> {
    /// Create a controller around an indicator device.
    pub fn new(device: D) -> Self {
        Self { device }
    }

    /// Execute one command to completion.
    ///
    /// # Errors
    ///
    /// Returns an error if the device rejects an output transition.
    pub async fn execute(&mut self, command: &FeedbackCommand) -> Result<()> {
        match command.pattern {
            FeedbackPattern::Solid => {
                self.device.set_output(command.channel, true).await?;
                tokio::time::sleep(command.duration).await;
                self.device.set_output(command.channel, false).await?;
            }
            FeedbackPattern::Blink(count) => {
                if count == 0 {
                    return Ok(());
                }
                // n toggles spread evenly across the window: each cycle is
                // half on, half off.
                let half = command.duration / (u32::from(count) * 2);
                for _ in 0..count {
                    self.device.set_output(command.channel, true).await?;
                    tokio::time::sleep(half).await;
                    self.device.set_output(command.channel, false).await?;
                    tokio::time::sleep(half).await;
                }
            }
        }
        Ok(())
    }

    /// Unwrap the inner device.
    pub fn into_inner(self) -> D {
        self.device
    }
}

impl FeedbackController<AnyIndicatorDevice> {
    /// Spawn the controller as a background task.
    ///
    /// Takes the enum-dispatched device rather than a generic one so the
    /// spawned future has a concrete, provably `Send` type (RPITIT futures
    /// of a generic parameter carry no `Send` bound).
    ///
    /// Returns a cloneable [`FeedbackHandle`] for dispatching commands and
    /// the task handle. The task drains its queue sequentially and exits
    /// when every handle has been dropped.
    pub fn spawn(device: AnyIndicatorDevice) -> (FeedbackHandle, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<FeedbackCommand>(FEEDBACK_QUEUE_DEPTH);
        let mut controller = FeedbackController::new(device);

        let task = tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                if let Err(e) = controller.execute(&command).await {
                    warn!(error = %e, "feedback actuation failed");
                }
            }
            debug!("feedback controller stopped");
        });

        (FeedbackHandle { tx }, task)
    }
}

/// Handle for dispatching feedback commands to a spawned controller.
#[derive(Debug, Clone)]
pub struct FeedbackHandle {
    tx: mpsc::Sender<FeedbackCommand>,
}

impl FeedbackHandle {
    /// Dispatch a command without waiting for it to run.
    ///
    /// Never blocks: if the queue is full or the controller has stopped the
    /// command is dropped with a warning.
    pub fn dispatch(&self, command: FeedbackCommand) {
        if let Err(e) = self.tx.try_send(command) {
            warn!(error = %e, "feedback command dropped");
        }
    }
}
