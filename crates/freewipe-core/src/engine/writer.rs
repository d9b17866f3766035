/// Chunk writer: fills one filler file with per-chunk random patterns.
///
/// # Memory
///
/// One buffer of the configured chunk size is allocated when the writer is
/// built and reused for every chunk of every file, so memory use does not
/// depend on file or volume size. The final chunk of a file uses a prefix of
/// the buffer.
///
/// # Cancellation
///
/// The cancel flag is read once at the top of each chunk iteration. A chunk
/// already being written completes; nothing is rolled back, and a cancelled
/// file is left on disk with whatever was written.
use super::progress::ProgressSink;
use crate::error::EraseError;
use crate::model::size::format_gib;
use crate::model::PatternSource;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// One filler file to produce.
#[derive(Debug, Clone, Copy)]
pub struct FillJob<'a> {
    pub path: &'a Path,
    /// Final size of the file when not cancelled.
    pub target_size: u64,
    /// Bytes written by earlier files of the session, for cumulative progress.
    pub prior_bytes: u64,
    /// Free-space figure percentages are computed against.
    pub denominator: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOutcome {
    /// The whole target size was written and synced.
    Completed,
    /// Stopped early by the cancel flag.
    Cancelled { bytes_written: u64 },
}

/// `floor(done * 100 / denominator)`, clamped to 100.
pub fn progress_percent(done: u64, denominator: u64) -> u8 {
    if denominator == 0 {
        return 100;
    }
    let percent = u128::from(done) * 100 / u128::from(denominator);
    percent.min(100) as u8
}

pub struct ChunkWriter {
    buffer: Vec<u8>,
}

impl ChunkWriter {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            buffer: vec![0u8; chunk_size],
        }
    }

    /// Size of the reusable chunk buffer.
    pub fn chunk_size(&self) -> usize {
        self.buffer.len()
    }

    /// Write `job.target_size` bytes to `job.path`, truncating any existing file.
    pub fn fill_file(
        &mut self,
        job: &FillJob<'_>,
        patterns: &mut dyn PatternSource,
        cancel: &AtomicBool,
        sink: &dyn ProgressSink,
    ) -> Result<FillOutcome, EraseError> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(job.path)
            .map_err(|e| EraseError::from_write(job.path.to_path_buf(), e))?;

        let mut written: u64 = 0;
        while written < job.target_size {
            if cancel.load(Ordering::Acquire) {
                debug!(
                    "Cancelled {} after {written} of {} bytes",
                    job.path.display(),
                    job.target_size
                );
                return Ok(FillOutcome::Cancelled {
                    bytes_written: written,
                });
            }

            let pattern = patterns.next_pattern();
            let len = (job.target_size - written).min(self.buffer.len() as u64) as usize;
            patterns.fill(pattern, &mut self.buffer[..len]);
            file.write_all(&self.buffer[..len])
                .map_err(|e| EraseError::from_write(job.path.to_path_buf(), e))?;
            written += len as u64;

            let cumulative = job.prior_bytes + written;
            sink.on_progress(
                progress_percent(cumulative, job.denominator),
                &format!(
                    "Writing {} - written: {}",
                    pattern.label(),
                    format_gib(cumulative)
                ),
            );
        }

        sync(&file, job.path)?;
        Ok(FillOutcome::Completed)
    }
}

fn sync(file: &File, path: &Path) -> Result<(), EraseError> {
    file.sync_all()
        .map_err(|e| EraseError::from_write(path.to_path_buf(), e))
}
