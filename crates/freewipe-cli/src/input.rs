/// Console commands typed while a session is running.
///
/// Lines are read on a dedicated thread and forwarded over a channel so the
/// main loop can keep draining engine events while waiting for input.
use crossbeam_channel::{Receiver, Sender};
use std::io::BufRead;
use std::thread;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    Pause,
    Resume,
    /// Stop and keep filler files for a later resume.
    Stop,
    /// Stop and delete filler files.
    Cancel,
    /// Resume a stopped session from its checkpoint.
    Wipe,
    Quit,
    Help,
}

impl UserCommand {
    /// Parse one input line. Only the first non-blank character counts.
    pub fn parse(line: &str) -> Option<Self> {
        let c = line.trim().chars().next()?.to_ascii_lowercase();
        Some(match c {
            'p' => Self::Pause,
            'r' => Self::Resume,
            's' => Self::Stop,
            'c' => Self::Cancel,
            'w' => Self::Wipe,
            'q' => Self::Quit,
            'h' | '?' => Self::Help,
            _ => return None,
        })
    }
}

pub const HELP: &str = "commands: [p]ause  [r]esume  [s]top and keep files  [c]ancel and delete files  [w]ipe again from checkpoint  [q]uit";

/// Spawn the stdin reader. The receiver disconnects at end of input.
pub fn spawn_stdin_reader() -> std::io::Result<Receiver<String>> {
    let (tx, rx) = crossbeam_channel::bounded::<String>(64);
    thread::Builder::new()
        .name("freewipe-stdin".into())
        .spawn(move || read_lines(std::io::stdin().lock(), tx))?;
    Ok(rx)
}

fn read_lines(reader: impl BufRead, tx: Sender<String>) {
    for line in reader.lines() {
        match line {
            Ok(line) => {
                if tx.send(line).is_err() {
                    break;
                }
            }
            Err(e) => {
                debug!("stdin closed: {e}");
                break;
            }
        }
    }
}
