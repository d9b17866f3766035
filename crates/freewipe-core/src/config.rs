/// Session configuration: where filler files live, how they are named,
/// and how large files and chunks may grow.
///
/// Defaults mirror the values the engine has always used: a `DataWiper`
/// folder under the storage root, `wipe_<n>.tmp` files capped at 100 MiB,
/// written in 4 MiB chunks.
use crate::error::EraseError;
use crate::model::size::MIB;
use std::path::{Path, PathBuf};

/// Name of the dedicated subfolder created under the storage root.
pub const DEFAULT_FOLDER_NAME: &str = "DataWiper";

/// Fixed prefix of every filler file name.
pub const DEFAULT_FILE_PREFIX: &str = "wipe_";

/// Fixed suffix of every filler file name.
pub const FILLER_SUFFIX: &str = ".tmp";

/// Largest filler file the engine creates.
pub const DEFAULT_FILE_SIZE_CAP: u64 = 100 * MIB;

/// Size of the reusable write buffer. Bounds the engine's memory use.
pub const DEFAULT_CHUNK_SIZE: usize = 4 * MIB as usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EraseConfig {
    pub folder_name: String,
    pub file_prefix: String,
    pub file_size_cap: u64,
    pub chunk_size: usize,
}

impl Default for EraseConfig {
    fn default() -> Self {
        Self {
            folder_name: DEFAULT_FOLDER_NAME.to_owned(),
            file_prefix: DEFAULT_FILE_PREFIX.to_owned(),
            file_size_cap: DEFAULT_FILE_SIZE_CAP,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl EraseConfig {
    pub fn with_file_size_cap(mut self, bytes: u64) -> Self {
        self.file_size_cap = bytes;
        self
    }

    pub fn with_chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = bytes;
        self
    }

    pub fn with_folder_name(mut self, name: impl Into<String>) -> Self {
        self.folder_name = name.into();
        self
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), EraseError> {
        if self.chunk_size == 0 {
            return Err(EraseError::InvalidConfig("chunk size must be > 0".into()));
        }
        if self.file_size_cap == 0 {
            return Err(EraseError::InvalidConfig(
                "file size cap must be > 0".into(),
            ));
        }
        if self.folder_name.is_empty() || self.folder_name.contains(['/', '\\']) {
            return Err(EraseError::InvalidConfig(format!(
                "folder name {:?} must be a single path component",
                self.folder_name
            )));
        }
        if self.file_prefix.is_empty() {
            return Err(EraseError::InvalidConfig("file prefix must not be empty".into()));
        }
        Ok(())
    }

    /// The dedicated subfolder under `root`.
    pub fn folder_in(&self, root: &Path) -> PathBuf {
        root.join(&self.folder_name)
    }

    /// File name of the filler file with the given index, e.g. `wipe_3.tmp`.
    pub fn filler_name(&self, index: u32) -> String {
        format!("{}{index}{FILLER_SUFFIX}", self.file_prefix)
    }

    /// Parse the index out of a filler file name.
    ///
    /// Returns `None` for anything that is not exactly prefix + decimal digits + suffix.
    pub fn filler_index(&self, file_name: &str) -> Option<u32> {
        let digits = file_name
            .strip_prefix(self.file_prefix.as_str())?
            .strip_suffix(FILLER_SUFFIX)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}
