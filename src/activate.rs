use fs_err as fs;
use reqwest::blocking::Client;
use std::path::Path;
use tracing::{debug, info};

use crate::archive;
use crate::config::Config;
use crate::error::{Result, SwitchError};
use crate::fetch;
use crate::platform::Platform;
use crate::release::Release;
use crate::tools::{ArchiveKind, Download, ToolDef};

/// Makes `version` of `tool` the active one: download the platform artifact
/// unless it is already cached, unpack it under the version directory, then
/// chmod and re-point the stable symlink for every binary the tool ships.
/// Any failing step aborts the pipeline; in particular nothing is extracted
/// after a failed download and no download is attempted for a version the
/// release source does not know.
pub fn activate(
    client: &Client,
    tool: &ToolDef,
    version: &str,
    cfg: &Config,
    platform: &Platform,
) -> Result<()> {
    if !tool.supports(platform) {
        return Err(SwitchError::UnsupportedTarget {
            tool: tool.name.to_string(),
            os: platform.os.name(),
            arch: platform.arch.name(),
        });
    }
    let version_dir = cfg.bin_dir.join(tool.name).join(version);
    let primary = version_dir.join(tool.primary_binary());
    if primary.exists() {
        debug!(
            "{} {version} already cached at {}, skipping download",
            tool.name,
            primary.display()
        );
    } else {
        let url = resolve_url(client, tool, version, platform)?;
        info!(
            "Downloading version {version} of {} to path {}",
            tool.name,
            primary.display()
        );
        download_and_unpack(client, tool, &url, &version_dir, &primary, platform)?;
    }

    info!("Activating version {version} of {}", tool.name);
    for binary in tool.binaries {
        let target = version_dir.join(binary);
        make_executable(&target)?;
        swap_symlink(&target, &cfg.symlink_dir.join(binary))?;
    }
    Ok(())
}

fn resolve_url(
    client: &Client,
    tool: &ToolDef,
    version: &str,
    platform: &Platform,
) -> Result<String> {
    match &tool.download {
        Download::Template(template) => Ok(tool.render_url(template, version, platform)),
        Download::FromDiscovery => {
            let releases = tool.discovery.source().discover(client, platform)?;
            lookup_download(&releases, tool, version)
        }
    }
}

/// A requested version absent from the discovered release map is fatal;
/// activation never proceeds with a guessed URL.
fn lookup_download(releases: &[Release], tool: &ToolDef, version: &str) -> Result<String> {
    releases
        .iter()
        .find(|r| r.tag == version)
        .and_then(|r| r.download.clone())
        .ok_or_else(|| SwitchError::VersionNotFound {
            tool: tool.name.to_string(),
            version: version.to_string(),
        })
}

fn download_and_unpack(
    client: &Client,
    tool: &ToolDef,
    url: &str,
    version_dir: &Path,
    primary: &Path,
    platform: &Platform,
) -> Result<()> {
    fs::create_dir_all(version_dir)?;
    match &tool.archive {
        ArchiveKind::RawBinary => fetch::fetch(client, url, primary),
        ArchiveKind::TarGz { filter } => {
            let archive_path = version_dir.join(format!("{}.tar.gz", tool.primary_binary()));
            fetch::fetch(client, url, &archive_path)?;
            let rendered = filter.as_ref().map(|f| f.render(tool, platform));
            archive::extract_tar_gz(&archive_path, version_dir, rendered.as_ref())
        }
        ArchiveKind::Zip => {
            let archive_path = version_dir.join(format!("{}.zip", tool.primary_binary()));
            fetch::fetch(client, url, &archive_path)?;
            archive::extract_zip(&archive_path, version_dir)?;
            fs::remove_file(&archive_path)?;
            Ok(())
        }
    }
}

fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms)?;
    Ok(())
}

/// Removes whatever occupies the stable path (regular file, stale or live
/// symlink) immediately before creating the new link, so there is never a
/// window with both the old target linked and the new one missing.
fn swap_symlink(target: &Path, link: &Path) -> Result<()> {
    if let Some(parent) = link.parent() {
        fs::create_dir_all(parent)?;
    }
    if fs::symlink_metadata(link).is_ok() {
        fs::remove_file(link)?;
    }
    info!("creating symlink {} -> {}", link.display(), target.display());
    std::os::unix::fs::symlink(target, link)?;
    Ok(())
}
