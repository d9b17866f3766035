/// Erase engine: runs one free-space erase session on a background worker.
///
/// The worker loops: size the next filler file from the remaining free space,
/// fill it through [`writer::ChunkWriter`], advance the [`Checkpoint`], repeat
/// until the space is used up or the caller cancels. Callers steer it with
/// `pause`/`resume`/`cancel`, from any thread, while events flow to their
/// [`ProgressSink`].
///
/// # Single worker
///
/// A [`BusyGuard`] is claimed with a compare-exchange before a worker is
/// spawned and released when it finishes, so at most one session (or purge)
/// runs at a time. A second `start` fails with [`EraseError::AlreadyRunning`].
///
/// # Pause
///
/// The worker blocks on a condition variable at the top of each iteration
/// while paused. Flag writes happen under the condvar's mutex so a `resume`
/// or `cancel` can never slip between the worker's check and its wait.
///
/// # Checkpoint policy
///
/// | Exit                     | Cleanup | Checkpoint |
/// |--------------------------|---------|------------|
/// | Free space used up       | yes     | reset      |
/// | Cancel, discard files    | yes     | reset      |
/// | Cancel, retain files     | no      | kept       |
/// | I/O or other failure     | no      | kept       |
pub mod cleanup;
pub mod progress;
pub mod writer;

use crate::config::EraseConfig;
use crate::error::EraseError;
use crate::model::{Checkpoint, PatternSource, SecurePatternSource};
use crate::platform::StorageProvider;
use parking_lot::{Condvar, Mutex};
use progress::{EraseOutcome, ProgressSink};
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};
use writer::{progress_percent, ChunkWriter, FillJob, FillOutcome};

/// Observable state of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No worker active; `start` is accepted.
    Idle,
    Running,
    /// A worker is active but will block before its next file.
    Paused,
}

/// State shared between the engine, its control handles, and the worker.
struct Shared {
    busy: AtomicBool,
    paused: AtomicBool,
    cancelled: AtomicBool,
    retain_files: AtomicBool,
    /// Guards flag changes that the paused worker waits on.
    gate: Mutex<()>,
    wake: Condvar,
    checkpoint: Mutex<Checkpoint>,
    patterns: Mutex<Box<dyn PatternSource>>,
}

impl Shared {
    fn new(patterns: Box<dyn PatternSource>) -> Self {
        Self {
            busy: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            cancelled: AtomicBool::new(false),
            retain_files: AtomicBool::new(false),
            gate: Mutex::new(()),
            wake: Condvar::new(),
            checkpoint: Mutex::new(Checkpoint::default()),
            patterns: Mutex::new(patterns),
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Block while paused, until resumed or cancelled.
    fn wait_while_paused(&self) {
        let mut gate = self.gate.lock();
        if self.paused.load(Ordering::Acquire) && !self.is_cancelled() {
            info!("Erase paused");
            while self.paused.load(Ordering::Acquire) && !self.is_cancelled() {
                self.wake.wait(&mut gate);
            }
            info!("Erase resumed");
        }
    }

    fn state(&self) -> EngineState {
        if !self.busy.load(Ordering::Acquire) {
            EngineState::Idle
        } else if self.paused.load(Ordering::Acquire) {
            EngineState::Paused
        } else {
            EngineState::Running
        }
    }
}

/// Proof that this thread owns the single worker slot.
///
/// Dropping it clears every session flag and frees the slot.
struct BusyGuard {
    shared: Arc<Shared>,
}

impl BusyGuard {
    fn claim(shared: &Arc<Shared>) -> Result<Self, EraseError> {
        shared
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| EraseError::AlreadyRunning)?;
        let guard = Self {
            shared: Arc::clone(shared),
        };
        guard.clear_flags();
        Ok(guard)
    }

    fn clear_flags(&self) {
        let _gate = self.shared.gate.lock();
        self.shared.paused.store(false, Ordering::Release);
        self.shared.cancelled.store(false, Ordering::Release);
        self.shared.retain_files.store(false, Ordering::Release);
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.clear_flags();
        self.shared.busy.store(false, Ordering::Release);
        self.shared.wake.notify_all();
    }
}

/// Cloneable handle for steering the active session from any thread,
/// including from inside a [`ProgressSink`] callback.
#[derive(Clone)]
pub struct EraseControl {
    shared: Arc<Shared>,
}

impl EraseControl {
    /// Ask the worker to stop before its next file. No-op when idle.
    pub fn pause(&self) {
        if self.shared.busy.load(Ordering::Acquire) {
            let _gate = self.shared.gate.lock();
            self.shared.paused.store(true, Ordering::Release);
        }
    }

    pub fn resume(&self) {
        let _gate = self.shared.gate.lock();
        self.shared.paused.store(false, Ordering::Release);
        self.shared.wake.notify_all();
    }

    /// Stop the session at the next chunk boundary.
    ///
    /// With `retain_files` the filler files and checkpoint are kept so a
    /// later `start` resumes; otherwise they are deleted and reset.
    pub fn cancel(&self, retain_files: bool) {
        if !self.shared.busy.load(Ordering::Acquire) {
            debug!("Cancel ignored: no active session");
            return;
        }
        let _gate = self.shared.gate.lock();
        self.shared
            .retain_files
            .store(retain_files, Ordering::Release);
        self.shared.cancelled.store(true, Ordering::Release);
        self.shared.wake.notify_all();
    }

    pub fn state(&self) -> EngineState {
        self.shared.state()
    }

    pub fn is_paused(&self) -> bool {
        self.state() == EngineState::Paused
    }
}

/// Orchestrates erase sessions against one storage root.
pub struct EraseEngine {
    config: EraseConfig,
    storage: Arc<dyn StorageProvider>,
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl EraseEngine {
    /// Engine with the default CSPRNG pattern source.
    pub fn new(config: EraseConfig, storage: Arc<dyn StorageProvider>) -> Self {
        Self::with_patterns(config, storage, Box::new(SecurePatternSource::new()))
    }

    pub fn with_patterns(
        config: EraseConfig,
        storage: Arc<dyn StorageProvider>,
        patterns: Box<dyn PatternSource>,
    ) -> Self {
        Self {
            config,
            storage,
            shared: Arc::new(Shared::new(patterns)),
            worker: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &EraseConfig {
        &self.config
    }

    pub fn control(&self) -> EraseControl {
        EraseControl {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn state(&self) -> EngineState {
        self.shared.state()
    }

    pub fn is_running(&self) -> bool {
        self.state() != EngineState::Idle
    }

    /// Snapshot of the resume checkpoint.
    pub fn checkpoint(&self) -> Checkpoint {
        *self.shared.checkpoint.lock()
    }

    pub fn pause(&self) {
        self.control().pause();
    }

    pub fn resume(&self) {
        self.control().resume();
    }

    pub fn cancel(&self, retain_files: bool) {
        self.control().cancel(retain_files);
    }

    /// Start an erase session on a background worker.
    ///
    /// Resumes from the checkpoint left by a retained cancel or a failure.
    /// Rejected with [`EraseError::AlreadyRunning`] while another session or
    /// purge is active, and with [`EraseError::InvalidConfig`]. Rejections are
    /// also sent to `sink`.
    pub fn start(&self, sink: Arc<dyn ProgressSink>) -> Result<(), EraseError> {
        self.config.validate().inspect_err(|e| {
            warn!("Start rejected: {e}");
            sink.on_error(&e.to_string());
        })?;
        let guard = self.claim(sink.as_ref())?;
        let mut slot = self.worker.lock();

        let shared = Arc::clone(&self.shared);
        let storage = Arc::clone(&self.storage);
        let config = self.config.clone();
        let handle = thread::Builder::new()
            .name("freewipe-eraser".into())
            .spawn(move || {
                let result = run_session(&shared, storage.as_ref(), &config, sink.as_ref());
                // Release the guard first so the sink may start a new session from its callback.
                drop(guard);
                match result {
                    Ok(outcome) => {
                        info!("Erase session finished: {outcome:?}");
                        sink.on_complete(outcome);
                    }
                    Err(e) => {
                        error!("Erase session failed: {e}");
                        sink.on_error(&e.to_string());
                    }
                }
            })
            .map_err(EraseError::WorkerSpawn)?;

        *slot = Some(handle);
        Ok(())
    }

    /// Delete every filler file and the filler folder on a background worker.
    ///
    /// Shares the single-worker slot with `start`. A successful purge resets
    /// the checkpoint because the files it described are gone.
    pub fn start_purge(&self, sink: Arc<dyn ProgressSink>) -> Result<(), EraseError> {
        let guard = self.claim(sink.as_ref())?;
        let mut slot = self.worker.lock();

        let shared = Arc::clone(&self.shared);
        let folder = self.config.folder_in(&self.storage.root_path());
        let config = self.config.clone();
        let handle = thread::Builder::new()
            .name("freewipe-purge".into())
            .spawn(move || {
                info!("Purging {}", folder.display());
                let result = cleanup::purge_folder(&folder, &config, sink.as_ref());
                if result.is_ok() {
                    shared.checkpoint.lock().reset();
                }
                drop(guard);
                match result {
                    Ok(report) => {
                        info!(
                            "Purge finished: {} of {} filler files removed",
                            report.deleted, report.total
                        );
                        sink.on_complete(EraseOutcome::Purged);
                    }
                    Err(e) => {
                        error!("Purge failed: {e}");
                        sink.on_error(&e.to_string());
                    }
                }
            })
            .map_err(EraseError::WorkerSpawn)?;

        *slot = Some(handle);
        Ok(())
    }

    /// Block until no worker is running, including sessions started from a
    /// sink callback while waiting. Must not be called from a sink.
    pub fn wait(&self) {
        loop {
            let Some(handle) = self.worker.lock().take() else {
                return;
            };
            if handle.join().is_err() {
                error!("Erase worker panicked");
            }
        }
    }

    fn claim(&self, sink: &dyn ProgressSink) -> Result<BusyGuard, EraseError> {
        BusyGuard::claim(&self.shared).inspect_err(|e| {
            warn!("Start rejected: {e}");
            sink.on_error(&e.to_string());
        })
    }
}

/// Body of the erase worker.
fn run_session(
    shared: &Shared,
    storage: &dyn StorageProvider,
    config: &EraseConfig,
    sink: &dyn ProgressSink,
) -> Result<EraseOutcome, EraseError> {
    let root = storage.root_path();
    let folder = config.folder_in(&root);
    fs::create_dir_all(&folder).map_err(|source| EraseError::FolderCreationFailed {
        path: folder.clone(),
        source,
    })?;

    let free_space = storage
        .free_space_bytes()
        .map_err(|source| EraseError::FreeSpaceUnavailable {
            path: root.clone(),
            source,
        })?;

    let resume_from = *shared.checkpoint.lock();
    info!(
        "Erasing free space of {}: {free_space} bytes free, resuming at file {} ({} bytes)",
        root.display(),
        resume_from.files_created,
        resume_from.bytes_written
    );

    let mut writer = ChunkWriter::new(config.chunk_size);
    // Highest percent reported so far; cleanup never reports below it.
    let mut last_percent: u8 = 0;
    let mut patterns = shared.patterns.lock();

    let exhausted = loop {
        shared.wait_while_paused();
        if shared.is_cancelled() {
            break false;
        }

        let checkpoint = *shared.checkpoint.lock();
        let remaining = checkpoint.remaining(free_space);
        if remaining == 0 {
            break true;
        }

        let size = remaining.min(config.file_size_cap);
        let name = config.filler_name(checkpoint.files_created);
        let path = folder.join(&name);
        debug!("Creating {name} ({size} bytes)");
        sink.on_file_created(&name, size);

        let job = FillJob {
            path: &path,
            target_size: size,
            prior_bytes: checkpoint.bytes_written,
            denominator: free_space,
        };
        match writer.fill_file(&job, &mut **patterns, &shared.cancelled, sink) {
            Ok(FillOutcome::Completed) => {
                let mut checkpoint = shared.checkpoint.lock();
                checkpoint.advance(size);
                last_percent = progress_percent(checkpoint.bytes_written, free_space);
            }
            Ok(FillOutcome::Cancelled { bytes_written }) => {
                if bytes_written > 0 {
                    last_percent =
                        progress_percent(checkpoint.bytes_written + bytes_written, free_space);
                }
                break false;
            }
            Err(EraseError::VolumeFull { path }) => {
                warn!(
                    "Volume filled up before the estimate while writing {}",
                    path.display()
                );
                break true;
            }
            Err(e) => return Err(e),
        }
    };
    drop(patterns);

    if exhausted {
        cleanup::remove_filler_files(&folder, config, 100, sink);
        shared.checkpoint.lock().reset();
        Ok(EraseOutcome::Completed)
    } else if shared.retain_files.load(Ordering::Acquire) {
        let checkpoint = *shared.checkpoint.lock();
        info!(
            "Stopped with {} filler files retained ({} bytes)",
            checkpoint.files_created, checkpoint.bytes_written
        );
        Ok(EraseOutcome::CancelledRetained)
    } else {
        cleanup::remove_filler_files(&folder, config, last_percent, sink);
        shared.checkpoint.lock().reset();
        Ok(EraseOutcome::CancelledCleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared() -> Arc<Shared> {
        Arc::new(Shared::new(Box::new(SecurePatternSource::new())))
    }

    #[test]
    fn guard_is_exclusive_until_dropped() {
        let shared = shared();
        let guard = BusyGuard::claim(&shared).unwrap();
        assert!(matches!(
            BusyGuard::claim(&shared),
            Err(EraseError::AlreadyRunning)
        ));
        drop(guard);
        assert!(BusyGuard::claim(&shared).is_ok());
    }

    #[test]
    fn guard_drop_clears_flags() {
        let shared = shared();
        let control = EraseControl {
            shared: Arc::clone(&shared),
        };
        let guard = BusyGuard::claim(&shared).unwrap();
        control.pause();
        control.cancel(true);
        assert_eq!(control.state(), EngineState::Paused);
        drop(guard);

        assert_eq!(control.state(), EngineState::Idle);
        assert!(!shared.paused.load(Ordering::Acquire));
        assert!(!shared.is_cancelled());
        assert!(!shared.retain_files.load(Ordering::Acquire));
    }

    #[test]
    fn controls_are_ignored_when_idle() {
        let shared = shared();
        let control = EraseControl {
            shared: Arc::clone(&shared),
        };
        control.pause();
        control.cancel(false);
        assert!(!shared.paused.load(Ordering::Acquire));
        assert!(!shared.is_cancelled());
    }

    /// A paused wait must return as soon as another thread resumes.
    #[test]
    fn resume_wakes_paused_waiter() {
        let shared = shared();
        let _guard = BusyGuard::claim(&shared).unwrap();
        let control = EraseControl {
            shared: Arc::clone(&shared),
        };
        control.pause();

        let waiter = {
            let shared = Arc::clone(&shared);
            thread::spawn(move || shared.wait_while_paused())
        };
        thread::sleep(std::time::Duration::from_millis(50));
        assert!(!waiter.is_finished());
        control.resume();
        waiter.join().unwrap();
    }

    #[test]
    fn cancel_wakes_paused_waiter() {
        let shared = shared();
        let _guard = BusyGuard::claim(&shared).unwrap();
        let control = EraseControl {
            shared: Arc::clone(&shared),
        };
        control.pause();

        let waiter = {
            let shared = Arc::clone(&shared);
            thread::spawn(move || shared.wait_while_paused())
        };
        control.cancel(false);
        waiter.join().unwrap();
        assert!(shared.is_cancelled());
    }
}
