/// Data model: resume checkpoint, fill patterns, and size formatting.
pub mod checkpoint;
pub mod pattern;
pub mod size;

pub use checkpoint::Checkpoint;
pub use pattern::{Pattern, PatternSource, ScriptedPatternSource, SecurePatternSource};
