//! Fire-and-forget progress events over a channel.

use tokio::sync::mpsc;
use tracing::trace;

use crate::domain::models::{Phase, ProgressEvent};

/// Sending half of the progress stream.
///
/// Sends never block; if the receiver has gone away events are dropped.
#[derive(Debug, Clone, Default)]
pub struct ProgressReporter {
    tx: Option<mpsc::UnboundedSender<ProgressEvent>>,
}

impl ProgressReporter {
    /// A reporter plus the receiver a consumer reads events from.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A reporter that discards everything.
    pub const fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, phase: Phase, current: usize, total: usize, message: Option<String>) {
        trace!(phase = %phase, current, total, "progress");
        if let Some(tx) = &self.tx {
            let _ = tx.send(ProgressEvent {
                phase,
                current,
                total,
                message,
            });
        }
    }

    /// Phase start event (`current = 0`).
    pub fn start(&self, phase: Phase, total: usize, message: impl Into<String>) {
        self.emit(phase, 0, total, Some(message.into()));
    }
}
