/// FreeWipe CLI: interactive console frontend for the erase engine.
///
/// - [`args`]: command-line definition.
/// - [`state`]: session state driven by drained engine events.
/// - [`input`]: single-letter commands typed while a session runs.
/// - [`render`]: text or JSON-lines output.
/// - [`app`]: the run loops for each subcommand.
pub mod app;
pub mod args;
pub mod input;
pub mod render;
pub mod state;

pub use app::run;
pub use args::Cli;
pub use state::{AppPhase, AppState};
