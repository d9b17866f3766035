/// Application state management.
///
/// Centralises the session state the console reads and writes. The erase
/// worker communicates through a `ChannelSink`; state updates happen in
/// `process_events()`, which the main loop calls once per tick.
use crossbeam_channel::Receiver;
use freewipe_core::engine::progress::{ChannelSink, EraseEvent, EraseOutcome};
use freewipe_core::{Checkpoint, EraseEngine, EraseError};
use std::sync::Arc;

/// The current phase of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppPhase {
    /// No session started yet.
    Idle,
    Erasing,
    /// Pause requested; the worker stops before its next file.
    Paused,
    /// Stopped with filler files kept; a new wipe resumes from the checkpoint.
    Stopped,
    Purging,
    /// Session or purge ended without error.
    Finished,
    Failed,
}

/// Maximum number of engine events drained per tick.
///
/// Keeps one tick short when the worker has raced ahead of the console,
/// so typed commands are still handled promptly.
const MAX_EVENTS_PER_TICK: usize = 300;

pub struct AppState {
    engine: EraseEngine,
    sink: ChannelSink,
    events: Receiver<EraseEvent>,

    pub phase: AppPhase,
    /// Last reported percentage of the current phase.
    pub percent: u8,
    /// Last progress message.
    pub status: String,
    /// Filler files announced in this session, in creation order.
    pub files_created: Vec<(String, u64)>,
    /// Sum of the target sizes of `files_created`.
    pub bytes_planned: u64,
    pub outcome: Option<EraseOutcome>,
    pub last_error: Option<String>,
}

impl AppState {
    pub fn new(engine: EraseEngine) -> Self {
        let (sink, events) = ChannelSink::new();
        Self {
            engine,
            sink,
            events,
            phase: AppPhase::Idle,
            percent: 0,
            status: String::new(),
            files_created: Vec::new(),
            bytes_planned: 0,
            outcome: None,
            last_error: None,
        }
    }

    pub fn engine(&self) -> &EraseEngine {
        &self.engine
    }

    pub fn checkpoint(&self) -> Checkpoint {
        self.engine.checkpoint()
    }

    /// True while a worker is running or paused.
    pub fn is_active(&self) -> bool {
        matches!(
            self.phase,
            AppPhase::Erasing | AppPhase::Paused | AppPhase::Purging
        )
    }

    /// Start a wipe, resuming from the checkpoint if a stopped session left one.
    pub fn start_wipe(&mut self) -> Result<(), EraseError> {
        if self.is_active() {
            return Err(EraseError::AlreadyRunning);
        }
        self.reset_session();
        self.engine.start(Arc::new(self.sink.clone()))?;
        self.phase = AppPhase::Erasing;
        Ok(())
    }

    pub fn start_purge(&mut self) -> Result<(), EraseError> {
        if self.is_active() {
            return Err(EraseError::AlreadyRunning);
        }
        self.reset_session();
        self.engine.start_purge(Arc::new(self.sink.clone()))?;
        self.phase = AppPhase::Purging;
        Ok(())
    }

    /// Returns `false` if nothing was running.
    pub fn pause(&mut self) -> bool {
        if self.phase != AppPhase::Erasing {
            return false;
        }
        self.engine.pause();
        self.phase = AppPhase::Paused;
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.phase != AppPhase::Paused {
            return false;
        }
        self.engine.resume();
        self.phase = AppPhase::Erasing;
        true
    }

    /// Ask the worker to stop, keeping or deleting the filler files.
    pub fn stop(&mut self, retain_files: bool) -> bool {
        if !matches!(self.phase, AppPhase::Erasing | AppPhase::Paused) {
            return false;
        }
        self.engine.cancel(retain_files);
        true
    }

    /// Drain pending engine events and apply them. Called once per tick.
    ///
    /// Returns the drained events so the caller can render them.
    pub fn process_events(&mut self) -> Vec<EraseEvent> {
        let drained: Vec<EraseEvent> = self
            .events
            .try_iter()
            .take(MAX_EVENTS_PER_TICK)
            .collect();
        for event in &drained {
            self.apply(event);
        }
        drained
    }

    fn apply(&mut self, event: &EraseEvent) {
        match event {
            EraseEvent::Progress { percent, message } => {
                self.percent = *percent;
                self.status.clone_from(message);
            }
            EraseEvent::FileCreated { file_name, size } => {
                self.files_created.push((file_name.clone(), *size));
                self.bytes_planned += size;
            }
            EraseEvent::Complete { outcome } => {
                self.outcome = Some(*outcome);
                self.phase = match outcome {
                    EraseOutcome::CancelledRetained => AppPhase::Stopped,
                    _ => AppPhase::Finished,
                };
            }
            EraseEvent::Error { message } => {
                self.last_error = Some(message.clone());
                self.phase = AppPhase::Failed;
            }
        }
    }

    fn reset_session(&mut self) {
        self.percent = 0;
        self.status.clear();
        self.files_created.clear();
        self.bytes_planned = 0;
        self.outcome = None;
        self.last_error = None;
    }
}
