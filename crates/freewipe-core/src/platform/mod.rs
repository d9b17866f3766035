/// Platform functionality: storage root and free-space queries.
///
/// The engine never computes free space itself; it asks a
/// [`StorageProvider`]. [`VolumeStorage`] answers from the mounted volume
/// table, [`FixedStorage`] reports a constant figure.
pub mod volumes;

use std::io;
use std::path::PathBuf;

pub use volumes::{enumerate_volumes, VolumeInfo, VolumeKind, VolumeStorage};

/// Source of the storage root and its current free space.
pub trait StorageProvider: Send + Sync {
    /// Directory under which the filler folder is created.
    fn root_path(&self) -> PathBuf;

    /// Bytes currently available to this process on the root's volume.
    fn free_space_bytes(&self) -> io::Result<u64>;
}

/// Provider with a fixed free-space figure, independent of the real volume.
#[derive(Debug, Clone)]
pub struct FixedStorage {
    root: PathBuf,
    free_space: u64,
}

impl FixedStorage {
    pub fn new(root: impl Into<PathBuf>, free_space: u64) -> Self {
        Self {
            root: root.into(),
            free_space,
        }
    }
}

impl StorageProvider for FixedStorage {
    fn root_path(&self) -> PathBuf {
        self.root.clone()
    }

    fn free_space_bytes(&self) -> io::Result<u64> {
        Ok(self.free_space)
    }
}
