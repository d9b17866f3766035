/// Command-line arguments.
use clap::{Args, Parser, Subcommand};
use freewipe_core::model::size::MIB;
use freewipe_core::EraseConfig;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "freewipe",
    version,
    about = "Overwrite free disk space so deleted files cannot be recovered"
)]
pub struct Cli {
    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fill free space with filler files, then delete them (default).
    Wipe(WipeArgs),
    /// Delete all filler files and the filler folder.
    Purge(RootArg),
    /// List mounted volumes and their free space.
    Volumes,
}

#[derive(Debug, Clone, Args)]
pub struct RootArg {
    /// Directory on the volume to wipe; the filler folder is created here.
    #[arg(long, env = "FREEWIPE_ROOT", default_value = ".")]
    pub root: PathBuf,
}

#[derive(Debug, Clone, Args)]
pub struct WipeArgs {
    #[command(flatten)]
    pub root: RootArg,

    /// Write at most this many MiB instead of all free space.
    #[arg(long, value_name = "MIB")]
    pub limit_mib: Option<u64>,

    /// Largest filler file in MiB.
    #[arg(long, value_name = "MIB", default_value_t = 100)]
    pub file_cap_mib: u64,

    /// Emit events as JSON lines on stdout.
    #[arg(long)]
    pub json: bool,
}

/// Used when no subcommand is given.
impl Default for WipeArgs {
    fn default() -> Self {
        Self {
            root: RootArg {
                root: std::env::var_os("FREEWIPE_ROOT")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(".")),
            },
            limit_mib: None,
            file_cap_mib: 100,
            json: false,
        }
    }
}

impl WipeArgs {
    pub fn config(&self) -> EraseConfig {
        EraseConfig::default().with_file_size_cap(self.file_cap_mib.saturating_mul(MIB))
    }

    pub fn limit_bytes(&self) -> Option<u64> {
        self.limit_mib.map(|mib| mib.saturating_mul(MIB))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn wipe_flags_map_to_config() {
        let cli = Cli::parse_from([
            "freewipe",
            "wipe",
            "--root",
            "/mnt/usb",
            "--limit-mib",
            "512",
            "--file-cap-mib",
            "10",
        ]);
        let Some(Command::Wipe(args)) = cli.command else {
            panic!("expected wipe subcommand");
        };
        assert_eq!(args.root.root, PathBuf::from("/mnt/usb"));
        assert_eq!(args.limit_bytes(), Some(512 * MIB));
        assert_eq!(args.config().file_size_cap, 10 * MIB);
        assert!(!args.json);
    }

    #[test]
    fn no_subcommand_is_allowed() {
        let cli = Cli::parse_from(["freewipe", "-v"]);
        assert!(cli.verbose);
        assert!(cli.command.is_none());
    }
}
