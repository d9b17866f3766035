/// Progress reporting: the sink interface the engine reports to, and a
/// channel-backed sink that forwards every callback to another thread.
use crossbeam_channel::{Receiver, Sender};
use serde::Serialize;

/// Maximum number of events that may queue up in a [`ChannelSink`].
///
/// A 100 MiB file at 4 MiB chunks produces 25 progress events, so 4 096
/// gives a slow consumer plenty of headroom before the worker stalls on
/// back-pressure.
pub const EVENT_CHANNEL_CAPACITY: usize = 4_096;

/// How a session ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EraseOutcome {
    /// Free space was used up; filler files were removed.
    Completed,
    /// Stopped on request; filler files and checkpoint were kept.
    CancelledRetained,
    /// Stopped on request; filler files were removed and the checkpoint reset.
    CancelledCleaned,
    /// The standalone cleanup removed every filler file and the folder.
    Purged,
}

/// Receiver of engine events, implemented by the caller.
///
/// Called from the worker thread, in write order.
pub trait ProgressSink: Send + Sync {
    /// Percent is 0..=100. Fired per chunk while filling and coarsely while cleaning up.
    fn on_progress(&self, percent: u8, message: &str);

    /// Fired once per filler file, before its content is written.
    fn on_file_created(&self, file_name: &str, size: u64);

    /// Fired exactly once per session on any non-error exit.
    fn on_complete(&self, outcome: EraseOutcome);

    /// Fired exactly once, in place of `on_complete`, when the session fails.
    fn on_error(&self, message: &str);
}

/// One sink callback, as a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EraseEvent {
    Progress { percent: u8, message: String },
    FileCreated { file_name: String, size: u64 },
    Complete { outcome: EraseOutcome },
    Error { message: String },
}

impl EraseEvent {
    /// True for the event that ends a session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Error { .. })
    }
}

/// Sink that sends every callback as an [`EraseEvent`] over a bounded channel.
///
/// Sends are dropped silently once the receiver is gone.
#[derive(Clone)]
pub struct ChannelSink {
    tx: Sender<EraseEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiver that drains it.
    pub fn new() -> (Self, Receiver<EraseEvent>) {
        let (tx, rx) = crossbeam_channel::bounded(EVENT_CHANNEL_CAPACITY);
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelSink {
    fn on_progress(&self, percent: u8, message: &str) {
        let _ = self.tx.send(EraseEvent::Progress {
            percent,
            message: message.to_owned(),
        });
    }

    fn on_file_created(&self, file_name: &str, size: u64) {
        let _ = self.tx.send(EraseEvent::FileCreated {
            file_name: file_name.to_owned(),
            size,
        });
    }

    fn on_complete(&self, outcome: EraseOutcome) {
        let _ = self.tx.send(EraseEvent::Complete { outcome });
    }

    fn on_error(&self, message: &str) {
        let _ = self.tx.send(EraseEvent::Error {
            message: message.to_owned(),
        });
    }
}
