/// Errors raised by the erase engine.
///
/// Every variant ends up on the caller's sink as `on_error(message)`, so the
/// `Display` text is what the user reads.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EraseError {
    /// `start` or `start_purge` was called while a worker is still active.
    #[error("an erase session is already running")]
    AlreadyRunning,

    #[error("cannot create folder {}: {source}", path.display())]
    FolderCreationFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Open, write, or sync of a filler file failed.
    #[error("writing {} failed: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The volume ran out of space before the estimated free space was used up.
    /// The engine treats this as exhaustion, not as a failure.
    #[error("volume is full while writing {}", path.display())]
    VolumeFull { path: PathBuf },

    #[error("cannot remove {}: {source}", path.display())]
    CleanupFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot determine free space of {}: {source}", path.display())]
    FreeSpaceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to spawn worker thread: {0}")]
    WorkerSpawn(#[source] io::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl EraseError {
    /// Classify an I/O error raised while writing `path`.
    pub(crate) fn from_write(path: PathBuf, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::StorageFull {
            Self::VolumeFull { path }
        } else {
            Self::WriteFailed { path, source }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_full_is_classified_as_volume_full() {
        let err = EraseError::from_write(
            PathBuf::from("wipe_0.tmp"),
            io::Error::from(io::ErrorKind::StorageFull),
        );
        assert!(matches!(err, EraseError::VolumeFull { .. }));
    }

    #[test]
    fn other_write_errors_stay_write_failed() {
        let err = EraseError::from_write(
            PathBuf::from("wipe_0.tmp"),
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, EraseError::WriteFailed { .. }));
        assert!(err.to_string().contains("wipe_0.tmp"));
    }
}
