//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Shaderkit - emulator shader cache manager
///
/// Counts, installs and shares per-title shader caches.
#[derive(Parser, Debug)]
#[command(name = "shaderkit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "SHADERKIT_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Count shaders in the local cache of a title
    Count(TitleArgs),

    /// Compare local and shared shader counts
    Status(TitleArgs),

    /// Download the shared cache of a title
    Install(InstallArgs),

    /// Validate the local cache with a real emulator run and share it
    Share(ShareArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments shared by per-title commands
#[derive(Parser, Debug)]
pub struct TitleArgs {
    /// Title id, e.g. 0100ABCD12345000
    pub title_id: String,

    /// Emulator data directory (defaults to paths.data_root)
    #[arg(long)]
    pub data_root: Option<PathBuf>,
}

/// Arguments for the install command
#[derive(Parser, Debug)]
pub struct InstallArgs {
    #[command(flatten)]
    pub title: TitleArgs,

    /// Replace an existing local cache without asking
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the share command
#[derive(Parser, Debug)]
pub struct ShareArgs {
    #[command(flatten)]
    pub title: TitleArgs,

    /// Emulator binary to launch (prompted for when omitted)
    #[arg(short, long)]
    pub emulator: Option<PathBuf>,

    /// Shader count of the shared cache (fetched when omitted)
    #[arg(long)]
    pub remote_count: Option<u64>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}
