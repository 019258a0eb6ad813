use anyhow::{Context, Result};
use fs_err as fs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::cli::Cli;

/// Resolved once in main and passed by reference into the pipeline; nothing
/// mutates it afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub bin_dir: PathBuf,
    pub symlink_dir: PathBuf,
    pub log_level: String,
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    bin_dir: Option<PathBuf>,
    #[serde(default)]
    symlink_dir: Option<PathBuf>,
    #[serde(default)]
    log_level: Option<String>,
}

impl Config {
    /// Priority per setting: CLI flag > environment > config file > default.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let file = load_file_config(cli.config.as_deref())?;
        let home = dirs::home_dir();

        let bin_dir = cli
            .bin_dir
            .clone()
            .or_else(|| std::env::var_os("BVS_BIN_DIR").map(PathBuf::from))
            .or(file.bin_dir)
            .or_else(|| home.as_ref().map(|h| h.join(".bvs").join("versions")))
            .context("cannot determine bin directory (no home directory)")?;

        let symlink_dir = cli
            .symlink_dir
            .clone()
            .or_else(|| std::env::var_os("BVS_SYMLINK_DIR").map(PathBuf::from))
            .or(file.symlink_dir)
            .or_else(|| home.as_ref().map(|h| h.join(".bvs").join("bin")))
            .context("cannot determine symlink directory (no home directory)")?;

        let log_level = cli
            .log_level
            .clone()
            .or(file.log_level)
            .unwrap_or_else(|| "info".to_string());

        Ok(Config {
            bin_dir,
            symlink_dir,
            log_level,
        })
    }
}

fn load_file_config(explicit: Option<&Path>) -> Result<FileConfig> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match dirs::config_dir().map(|d| d.join("bvs").join("config.toml")) {
            Some(p) if p.exists() => p,
            _ => return Ok(FileConfig::default()),
        },
    };
    let data =
        fs::read_to_string(&path).with_context(|| format!("reading config {}", path.display()))?;
    toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))
}
