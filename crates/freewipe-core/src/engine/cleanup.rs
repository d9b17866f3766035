/// Cleanup: removes filler files, and for the standalone purge, the folder.
///
/// Only entries named `<prefix><digits>.tmp` are touched; anything else in
/// the folder is left alone, which makes the final folder removal fail.
use super::progress::ProgressSink;
use super::writer::progress_percent;
use crate::config::EraseConfig;
use crate::error::EraseError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Report progress after every this many deletions (and after the last one).
const PROGRESS_EVERY: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Filler files found.
    pub total: usize,
    pub deleted: usize,
    pub failed: usize,
}

/// Filler files in `folder`, ordered by index.
pub fn list_filler_files(folder: &Path, config: &EraseConfig) -> io::Result<Vec<PathBuf>> {
    let mut found: Vec<(u32, PathBuf)> = Vec::new();
    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        let name = entry.file_name();
        if let Some(index) = name.to_str().and_then(|n| config.filler_index(n)) {
            found.push((index, entry.path()));
        }
    }
    found.sort_unstable_by_key(|(index, _)| *index);
    Ok(found.into_iter().map(|(_, path)| path).collect())
}

/// Delete every filler file in `folder`. Best effort: individual failures
/// are logged and counted, never returned.
///
/// Reported percentages never drop below `floor`, so a session's progress
/// stays monotonic through its cleanup. The message carries the
/// `deleted/total` count either way.
pub fn remove_filler_files(
    folder: &Path,
    config: &EraseConfig,
    floor: u8,
    sink: &dyn ProgressSink,
) -> CleanupReport {
    let files = match list_filler_files(folder, config) {
        Ok(files) => files,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return CleanupReport::default(),
        Err(e) => {
            warn!("Cannot list {}: {e}", folder.display());
            return CleanupReport::default();
        }
    };

    let mut report = CleanupReport {
        total: files.len(),
        ..CleanupReport::default()
    };
    for (i, path) in files.iter().enumerate() {
        let removed = match fs::remove_file(path) {
            Ok(()) => {
                report.deleted += 1;
                true
            }
            Err(e) => {
                report.failed += 1;
                warn!("Cannot remove {}: {e}", path.display());
                false
            }
        };

        let deleted = report.deleted;
        let last = i + 1 == report.total;
        if (removed && deleted % PROGRESS_EVERY == 0) || last {
            let percent = progress_percent(deleted as u64, report.total as u64).max(floor);
            sink.on_progress(
                percent,
                &format!("Removing filler files {deleted}/{}", report.total),
            );
        }
    }

    debug!(
        "Cleanup of {}: {} deleted, {} failed",
        folder.display(),
        report.deleted,
        report.failed
    );
    report
}

/// Delete every filler file and then the folder itself.
///
/// A missing folder is a successful no-op. Per-file failures only surface
/// through the folder removal failing with [`EraseError::CleanupFailed`].
pub fn purge_folder(
    folder: &Path,
    config: &EraseConfig,
    sink: &dyn ProgressSink,
) -> Result<CleanupReport, EraseError> {
    if !folder.exists() {
        sink.on_progress(100, "Nothing to clean up");
        return Ok(CleanupReport::default());
    }

    sink.on_progress(0, "Starting cleanup");
    let report = remove_filler_files(folder, config, 0, sink);
    fs::remove_dir(folder).map_err(|source| EraseError::CleanupFailed {
        path: folder.to_path_buf(),
        source,
    })?;
    sink.on_progress(100, "Cleanup complete");
    Ok(report)
}
