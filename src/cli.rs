use std::path::PathBuf;

use clap::Parser;

/// Version string: the release/git-describe version when the build provided
/// one, the crate version otherwise.
pub const VERSION: &str = match option_env!("PROVISION_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};

/// Provision a workstation: dotfiles, packages, environment and tools.
///
/// Without `--install` or `--all` only dotfiles and environment settings
/// (editor, git, groups, desktop) are applied.
#[derive(Parser, Debug)]
#[command(name = "provision", version = VERSION)]
pub struct Cli {
    /// Also install configured packages
    #[arg(short, long)]
    pub install: bool,

    /// Run every phase, including packages and tool installers
    #[arg(short, long)]
    pub all: bool,

    /// Configuration file (default: $PROVISION_CONFIG, then conf/provision.toml)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Preview changes without applying
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Skip tasks whose name contains any of these (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Run only tasks whose name contains any of these (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,
}
