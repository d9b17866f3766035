/// End-to-end tests for `AppState`, the console's session state machine.
///
/// These drive a real `EraseEngine` against a temporary directory with a
/// fixed free-space figure, pumping `process_events()` the way the main loop
/// does once per tick.
use freewipe_cli::app::session_loop;
use freewipe_cli::render::Renderer;
use freewipe_cli::state::{AppPhase, AppState};
use freewipe_core::engine::progress::{EraseEvent, EraseOutcome};
use freewipe_core::engine::EngineState;
use freewipe_core::model::size::{KIB, MIB};
use freewipe_core::platform::FixedStorage;
use freewipe_core::{EraseConfig, EraseEngine, EraseError};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn small_config() -> EraseConfig {
    EraseConfig::default()
        .with_file_size_cap(100 * KIB)
        .with_chunk_size(16 * KIB as usize)
}

fn state_at(root: &Path, free: u64) -> AppState {
    AppState::new(EraseEngine::new(
        small_config(),
        Arc::new(FixedStorage::new(root, free)),
    ))
}

/// Pump `process_events()` while the session is active, or panic after 60 s.
/// Returns every event seen.
fn pump_until_done(state: &mut AppState) -> Vec<EraseEvent> {
    let deadline = Instant::now() + Duration::from_secs(60);
    let mut seen = Vec::new();
    while state.is_active() {
        assert!(
            Instant::now() < deadline,
            "session did not finish within 60 seconds"
        );
        seen.extend(state.process_events());
        std::thread::sleep(Duration::from_millis(5));
    }
    seen
}

fn filler_count(root: &Path) -> usize {
    let folder = small_config().folder_in(root);
    fs::read_dir(folder).map(|dir| dir.count()).unwrap_or(0)
}

// ── Wipe lifecycle ────────────────────────────────────────────────────────────

#[test]
fn start_wipe_sets_erasing_phase() {
    let tmp = TempDir::new().unwrap();
    let mut state = state_at(tmp.path(), 250 * KIB);
    state.start_wipe().unwrap();
    assert_eq!(state.phase, AppPhase::Erasing);
    pump_until_done(&mut state);
}

#[test]
fn wipe_completes_and_records_files() {
    let tmp = TempDir::new().unwrap();
    let mut state = state_at(tmp.path(), 250 * KIB);
    state.start_wipe().unwrap();
    pump_until_done(&mut state);

    assert_eq!(state.phase, AppPhase::Finished);
    assert_eq!(state.outcome, Some(EraseOutcome::Completed));
    let names: Vec<&str> = state.files_created.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, ["wipe_0.tmp", "wipe_1.tmp", "wipe_2.tmp"]);
    assert_eq!(state.bytes_planned, 250 * KIB);
    assert!(state.checkpoint().is_fresh());
    assert!(small_config().folder_in(tmp.path()).is_dir());
    assert_eq!(filler_count(tmp.path()), 0, "session cleanup empties the folder");
}

#[test]
fn second_start_while_active_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let mut state = state_at(tmp.path(), 4 * MIB);
    state.start_wipe().unwrap();
    assert!(matches!(state.start_wipe(), Err(EraseError::AlreadyRunning)));
    assert!(matches!(state.start_purge(), Err(EraseError::AlreadyRunning)));
    state.stop(false);
    pump_until_done(&mut state);
    assert_eq!(state.outcome, Some(EraseOutcome::CancelledCleaned));
}

// ── Pause, stop, resume ───────────────────────────────────────────────────────

#[test]
fn pause_and_resume_toggle_phase() {
    let tmp = TempDir::new().unwrap();
    let mut state = state_at(tmp.path(), 4 * MIB);
    state.start_wipe().unwrap();

    assert!(state.pause());
    assert_eq!(state.phase, AppPhase::Paused);
    assert_eq!(state.engine().state(), EngineState::Paused);
    assert!(!state.pause(), "pausing twice is a no-op");

    assert!(state.resume());
    assert_eq!(state.phase, AppPhase::Erasing);
    pump_until_done(&mut state);
    assert_eq!(state.phase, AppPhase::Finished);
}

#[test]
fn stop_keeps_files_and_wipe_resumes_from_checkpoint() {
    let tmp = TempDir::new().unwrap();
    let mut state = state_at(tmp.path(), 4 * MIB);
    state.start_wipe().unwrap();
    state.pause();
    assert!(state.stop(true));
    pump_until_done(&mut state);

    assert_eq!(state.phase, AppPhase::Stopped);
    assert_eq!(state.outcome, Some(EraseOutcome::CancelledRetained));
    assert!(!state.is_active());
    let checkpoint = state.checkpoint();
    assert!(checkpoint.files_created < 41);
    assert!(filler_count(tmp.path()) >= checkpoint.files_created as usize);

    state.start_wipe().unwrap();
    assert!(state.files_created.is_empty(), "session view resets on restart");
    pump_until_done(&mut state);

    assert_eq!(state.phase, AppPhase::Finished);
    let first = &state.files_created[0].0;
    assert_eq!(
        first,
        &small_config().filler_name(checkpoint.files_created),
        "numbering continues where the stopped session left off"
    );
    assert_eq!(
        state.bytes_planned,
        4 * MIB - checkpoint.bytes_written,
        "the resumed session only covers the remaining space"
    );
    assert_eq!(filler_count(tmp.path()), 0);
}

// ── Purge and failure ─────────────────────────────────────────────────────────

#[test]
fn purge_removes_retained_files() {
    let tmp = TempDir::new().unwrap();
    let folder = small_config().folder_in(tmp.path());
    fs::create_dir_all(&folder).unwrap();
    fs::write(folder.join("wipe_0.tmp"), [0u8; 64]).unwrap();
    fs::write(folder.join("wipe_1.tmp"), [0u8; 64]).unwrap();

    let mut state = state_at(tmp.path(), 0);
    state.start_purge().unwrap();
    assert_eq!(state.phase, AppPhase::Purging);
    pump_until_done(&mut state);

    assert_eq!(state.phase, AppPhase::Finished);
    assert_eq!(state.outcome, Some(EraseOutcome::Purged));
    assert_eq!(state.percent, 100);
    assert!(!folder.exists());
}

#[test]
fn folder_creation_failure_fails_the_session() {
    let tmp = TempDir::new().unwrap();
    let not_a_dir = tmp.path().join("plain.txt");
    fs::write(&not_a_dir, b"x").unwrap();

    let mut state = state_at(&not_a_dir, 250 * KIB);
    state.start_wipe().unwrap();
    pump_until_done(&mut state);

    assert_eq!(state.phase, AppPhase::Failed);
    let message = state.last_error.clone().unwrap();
    assert!(message.contains("cannot create folder"), "{message}");
}

#[test]
fn session_loop_reports_failure_as_error() {
    let tmp = TempDir::new().unwrap();
    let not_a_dir = tmp.path().join("plain.txt");
    fs::write(&not_a_dir, b"x").unwrap();

    let mut state = state_at(&not_a_dir, 250 * KIB);
    state.start_wipe().unwrap();
    let result = session_loop(&mut state, &Renderer::new(false), crossbeam_channel::never());
    let err = result.unwrap_err();
    assert!(err.to_string().contains("cannot create folder"), "{err}");
}

#[test]
fn session_loop_returns_when_purge_finishes() {
    let tmp = TempDir::new().unwrap();
    let mut state = state_at(tmp.path(), 0);
    state.start_purge().unwrap();
    session_loop(&mut state, &Renderer::new(true), crossbeam_channel::never()).unwrap();
    assert_eq!(state.phase, AppPhase::Finished);
}
