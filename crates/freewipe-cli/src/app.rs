/// Run loops for each subcommand.
///
/// The wipe loop alternates between draining engine events and waiting up
/// to one tick for a typed command, so output stays live while the user is
/// idle and commands take effect without waiting for the next event.
use crate::args::{Cli, Command, RootArg, WipeArgs};
use crate::input::{self, UserCommand};
use crate::render::{self, Renderer};
use crate::state::{AppPhase, AppState};
use anyhow::{anyhow, ensure, Context, Result};
use crossbeam_channel::{never, select, Receiver};
use freewipe_core::engine::progress::{EraseEvent, EraseOutcome};
use freewipe_core::model::size::{format_count, format_size};
use freewipe_core::platform::{self, VolumeStorage};
use freewipe_core::{EraseConfig, EraseEngine};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// How long the loop waits for input before draining events again.
const TICK: Duration = Duration::from_millis(100);

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Command::Wipe(args)) => run_wipe(&args),
        Some(Command::Purge(root)) => run_purge(&root),
        Some(Command::Volumes) => {
            print!("{}", render::volume_table(&platform::enumerate_volumes()));
            Ok(())
        }
        None => run_wipe(&WipeArgs::default()),
    }
}

fn build_engine(root: &Path, config: EraseConfig, limit: Option<u64>) -> Result<EraseEngine> {
    ensure!(root.is_dir(), "{} is not a directory", root.display());
    config.validate()?;
    let storage = VolumeStorage::new(root).with_limit(limit);
    Ok(EraseEngine::new(config, Arc::new(storage)))
}

fn run_wipe(args: &WipeArgs) -> Result<()> {
    let root = &args.root.root;
    let engine = build_engine(root, args.config(), args.limit_bytes())?;
    let renderer = Renderer::new(args.json);
    let mut state = AppState::new(engine);
    let input = input::spawn_stdin_reader().context("failed to start the input reader")?;

    info!("Wiping free space under {}", root.display());
    renderer.notice(&format!("Wiping free space under {}", root.display()));
    renderer.notice(input::HELP);
    state
        .start_wipe()
        .context("failed to start the erase session")?;

    session_loop(&mut state, &renderer, input)
}

fn run_purge(root: &RootArg) -> Result<()> {
    let engine = build_engine(&root.root, EraseConfig::default(), None)?;
    let renderer = Renderer::new(false);
    let mut state = AppState::new(engine);

    state.start_purge().context("failed to start cleanup")?;
    session_loop(&mut state, &renderer, never())
}

/// Drive the state until the session ends. Returns an error if it failed.
pub fn session_loop(
    state: &mut AppState,
    renderer: &Renderer,
    mut input: Receiver<String>,
) -> Result<()> {
    loop {
        for event in state.process_events() {
            renderer.event(&event);
            if event
                == (EraseEvent::Complete {
                    outcome: EraseOutcome::CancelledRetained,
                })
            {
                let checkpoint = state.checkpoint();
                renderer.notice(&format!(
                    "{} filler files ({}) kept. Type w to continue or q to quit.",
                    format_count(u64::from(checkpoint.files_created)),
                    format_size(checkpoint.bytes_written)
                ));
            }
        }

        match state.phase {
            AppPhase::Finished => return Ok(()),
            AppPhase::Failed => {
                return Err(anyhow!(state
                    .last_error
                    .clone()
                    .unwrap_or_else(|| "erase session failed".to_owned())))
            }
            _ => {}
        }

        select! {
            recv(input) -> line => match line {
                Ok(line) => {
                    if let Some(command) = UserCommand::parse(&line) {
                        if handle_command(state, renderer, command)? {
                            return Ok(());
                        }
                    }
                }
                Err(_) => {
                    // End of input: nothing more can be typed.
                    if state.phase == AppPhase::Stopped {
                        return Ok(());
                    }
                    input = never();
                }
            },
            default(TICK) => {}
        }
    }
}

/// Apply one typed command. Returns `true` when the loop should exit.
fn handle_command(state: &mut AppState, renderer: &Renderer, command: UserCommand) -> Result<bool> {
    match command {
        UserCommand::Pause => {
            if state.pause() {
                renderer.notice("Pausing after the current file");
            }
        }
        UserCommand::Resume => {
            if state.resume() {
                renderer.notice("Resuming");
            }
        }
        UserCommand::Stop => {
            if state.stop(true) {
                renderer.notice("Stopping, filler files will be kept");
            }
        }
        UserCommand::Cancel => {
            if state.stop(false) {
                renderer.notice("Cancelling, filler files will be deleted");
            }
        }
        UserCommand::Wipe => {
            if state.phase == AppPhase::Stopped {
                let checkpoint = state.checkpoint();
                renderer.notice(&format!(
                    "Resuming at file {}",
                    checkpoint.files_created
                ));
                state
                    .start_wipe()
                    .context("failed to resume the erase session")?;
            }
        }
        UserCommand::Quit => match state.phase {
            AppPhase::Stopped => return Ok(true),
            AppPhase::Erasing | AppPhase::Paused => {
                state.stop(false);
                renderer.notice("Cancelling, filler files will be deleted");
            }
            _ => {}
        },
        UserCommand::Help => renderer.notice(input::HELP),
    }
    Ok(false)
}
