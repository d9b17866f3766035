/// Volume enumeration and free-space lookup using `sysinfo`.
///
/// Lists mounted volumes with their kind, name, filesystem, and
/// total/free space, and resolves which volume holds a given path.
use super::StorageProvider;
use crate::model::size;
use std::io;
use std::path::{Path, PathBuf};
use sysinfo::{Disk, DiskKind, Disks};
use tracing::debug;

/// Information about a single mounted volume.
#[derive(Debug, Clone)]
pub struct VolumeInfo {
    /// Mount point path, e.g. "/" or "C:\".
    pub mount_point: PathBuf,
    /// Device or volume name.
    pub name: String,
    /// Filesystem name (e.g. "ext4", "NTFS").
    pub filesystem: String,
    pub kind: VolumeKind,
    pub is_removable: bool,
    /// Total capacity in bytes.
    pub total_bytes: u64,
    /// Space available to this process in bytes.
    pub free_bytes: u64,
    /// Used space in bytes.
    pub used_bytes: u64,
    /// Usage percentage (0.0–100.0).
    pub usage_percent: f32,
    /// Formatted total size string.
    pub total_display: String,
    /// Formatted free size string.
    pub free_display: String,
}

/// Storage medium classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeKind {
    Hdd,
    Ssd,
    Unknown,
}

impl VolumeKind {
    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Hdd => "HDD",
            Self::Ssd => "SSD",
            Self::Unknown => "Unknown",
        }
    }
}

impl From<DiskKind> for VolumeKind {
    fn from(kind: DiskKind) -> Self {
        match kind {
            DiskKind::HDD => Self::Hdd,
            DiskKind::SSD => Self::Ssd,
            DiskKind::Unknown(_) => Self::Unknown,
        }
    }
}

impl From<&Disk> for VolumeInfo {
    fn from(disk: &Disk) -> Self {
        let total_bytes = disk.total_space();
        let free_bytes = disk.available_space();
        let used_bytes = total_bytes.saturating_sub(free_bytes);
        let usage_percent = if total_bytes > 0 {
            (used_bytes as f64 / total_bytes as f64 * 100.0) as f32
        } else {
            0.0
        };
        Self {
            mount_point: disk.mount_point().to_path_buf(),
            name: disk.name().to_string_lossy().into_owned(),
            filesystem: disk.file_system().to_string_lossy().into_owned(),
            kind: disk.kind().into(),
            is_removable: disk.is_removable(),
            total_bytes,
            free_bytes,
            used_bytes,
            usage_percent,
            total_display: size::format_size(total_bytes),
            free_display: size::format_size(free_bytes),
        }
    }
}

/// Enumerate all mounted volumes, sorted by mount point.
pub fn enumerate_volumes() -> Vec<VolumeInfo> {
    let disks = Disks::new_with_refreshed_list();
    let mut volumes: Vec<VolumeInfo> = disks.list().iter().map(VolumeInfo::from).collect();
    volumes.sort_by(|a, b| a.mount_point.cmp(&b.mount_point));
    volumes
}

/// The volume whose mount point is the longest prefix of `path`.
fn containing_volume<'a>(volumes: &'a [VolumeInfo], path: &Path) -> Option<&'a VolumeInfo> {
    volumes
        .iter()
        .filter(|v| path.starts_with(&v.mount_point))
        .max_by_key(|v| v.mount_point.as_os_str().len())
}

/// Storage provider backed by the live volume table.
///
/// An optional limit caps the reported free space, which bounds how much a
/// session writes.
#[derive(Debug, Clone)]
pub struct VolumeStorage {
    root: PathBuf,
    limit: Option<u64>,
}

impl VolumeStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }
}

impl StorageProvider for VolumeStorage {
    fn root_path(&self) -> PathBuf {
        self.root.clone()
    }

    fn free_space_bytes(&self) -> io::Result<u64> {
        let root = self.root.canonicalize()?;
        let volumes = enumerate_volumes();
        let volume = containing_volume(&volumes, &root).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no mounted volume contains {}", root.display()),
            )
        })?;
        debug!(
            "{} is on {} with {} free",
            root.display(),
            volume.mount_point.display(),
            volume.free_display
        );
        let free = volume.free_bytes;
        Ok(self.limit.map_or(free, |limit| limit.min(free)))
    }
}
