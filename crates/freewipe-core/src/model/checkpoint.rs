/// Resume checkpoint: how far an erase has progressed.
///
/// Lives in memory only. The engine's worker is the single writer; it
/// advances the checkpoint after each filler file has been fully written
/// and synced, never for partial progress inside a file.
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Checkpoint {
    /// Bytes in filler files that were completely written and synced.
    pub bytes_written: u64,
    /// Number of completed filler files; also the index of the next one.
    pub files_created: u32,
}

impl Checkpoint {
    /// True when nothing has been written yet.
    pub fn is_fresh(&self) -> bool {
        self.bytes_written == 0 && self.files_created == 0
    }

    /// Bytes still to fill given the session's free-space figure.
    pub fn remaining(&self, free_space: u64) -> u64 {
        free_space.saturating_sub(self.bytes_written)
    }

    /// Record one completed filler file.
    pub(crate) fn advance(&mut self, file_size: u64) {
        self.bytes_written += file_size;
        self.files_created += 1;
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}
