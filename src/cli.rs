use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    version,
    name = "bvs",
    about = "Switch between versions of infrastructure CLI binaries (terraform, helm, kubectl, ...)"
)]
pub struct Cli {
    /// Tool to operate on
    #[arg(value_name = "TOOL")]
    pub tool: String,

    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding versioned binaries (defaults to ~/.bvs/versions)
    #[arg(long, global = true)]
    pub bin_dir: Option<PathBuf>,

    /// Directory receiving the active symlinks (defaults to ~/.bvs/bin)
    #[arg(long, global = true)]
    pub symlink_dir: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Path to config file (defaults to ~/.config/bvs/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List upstream versions; unless -a is given, only the highest PATCH
    /// for each MAJOR.MINOR is returned
    Versions {
        /// Prefix for versions to return
        #[arg(short = 'v', long = "version")]
        prefix: Option<String>,
        /// Return ALL versions
        #[arg(short = 'a', long)]
        all: bool,
    },
    /// Download (if not cached) and symlink a specific version
    Activate {
        /// Specify the version
        #[arg(short = 'v', long)]
        version: String,
    },
}
