/// FreeWipe Core: free-space erase engine, fill patterns, and cleanup.
///
/// This crate contains all business logic with zero UI dependencies.
/// It is designed to be reusable across different frontends (CLI, GUI, TUI).
///
/// # Modules
///
/// - [`engine`]: Background erase session, chunk writer, cleanup, and event sink.
/// - [`model`]: Checkpoint, fill patterns, and size formatting.
/// - [`platform`]: Storage-root and free-space providers backed by `sysinfo`.
/// - [`config`]: Folder, naming, and sizing parameters of a session.
/// - [`error`]: The error type reported through the event sink.
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod platform;

pub use config::EraseConfig;
pub use engine::progress::{ChannelSink, EraseEvent, EraseOutcome, ProgressSink};
pub use engine::{EngineState, EraseControl, EraseEngine};
pub use error::EraseError;
pub use model::{Checkpoint, Pattern, PatternSource};
pub use platform::{FixedStorage, StorageProvider, VolumeStorage};
