use flate2::read::GzDecoder;
use fs_err as fs;
use std::io;
use std::path::{Path, PathBuf};
use tar::{Archive, EntryType};
use tracing::warn;
use zip::ZipArchive;

use crate::error::{Result, SwitchError};

/// Filter for fat tar.gz archives: only entries whose name starts with
/// `matches` are materialized, with `strip` removed from the output path.
#[derive(Debug, Clone)]
pub struct EntryFilter {
    pub matches: String,
    pub strip: String,
}

/// Unpacks a gzip-compressed tarball into `dest`. Only directories and
/// regular files are accepted, preserving the archive's mode bits. The
/// archive file itself is removed afterwards, best-effort.
pub fn extract_tar_gz(archive_path: &Path, dest: &Path, filter: Option<&EntryFilter>) -> Result<()> {
    let file = fs::File::open(archive_path)?;
    let mut archive = Archive::new(GzDecoder::new(file));
    let entries = archive
        .entries()
        .map_err(|e| corrupt(archive_path, e))?;
    for entry in entries {
        let mut entry = entry.map_err(|e| corrupt(archive_path, e))?;
        let name = entry
            .path()
            .map_err(|e| corrupt(archive_path, e))?
            .to_string_lossy()
            .into_owned();
        let rel = match filter {
            Some(f) => {
                if !name.starts_with(&f.matches) {
                    continue;
                }
                name.strip_prefix(&f.strip).unwrap_or(&name).to_string()
            }
            None => name.clone(),
        };
        if rel.is_empty() {
            continue;
        }
        let out_path = dest.join(&rel);
        let mode = entry.header().mode().unwrap_or(0o644);
        match entry.header().entry_type() {
            EntryType::Directory => {
                fs::create_dir_all(&out_path)?;
                set_mode(&out_path, mode)?;
            }
            EntryType::Regular => {
                if let Some(parent) = out_path.parent() {
                    fs::create_dir_all(parent)?;
                }
                let mut out = fs::File::create(&out_path)?;
                io::copy(&mut entry, &mut out)?;
                set_mode(&out_path, mode)?;
            }
            _ => return Err(SwitchError::UnsupportedEntryType { entry: name }),
        }
    }
    if let Err(err) = fs::remove_file(archive_path) {
        warn!("failed to remove archive file {}: {err}", archive_path.display());
    }
    Ok(())
}

/// Unpacks a zip archive into `dest`. Every entry path must resolve inside
/// `dest`; anything escaping via `..` or an absolute path is rejected before
/// a byte is written. The caller removes the archive after success.
pub fn extract_zip(archive_path: &Path, dest: &Path) -> Result<()> {
    let file = fs::File::open(archive_path)?;
    let mut zip = ZipArchive::new(file).map_err(|e| corrupt(archive_path, e))?;
    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(|e| corrupt(archive_path, e))?;
        let rel = entry
            .enclosed_name()
            .map(Path::to_path_buf)
            .ok_or_else(|| SwitchError::PathTraversal(PathBuf::from(entry.name())))?;
        let out_path = dest.join(rel);
        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = fs::File::create(&out_path)?;
        io::copy(&mut entry, &mut out)?;
        if let Some(mode) = entry.unix_mode() {
            set_mode(&out_path, mode)?;
        }
    }
    Ok(())
}

fn corrupt(
    path: &Path,
    err: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> SwitchError {
    SwitchError::CorruptArchive {
        path: path.to_path_buf(),
        source: err.into(),
    }
}

fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;

    fn write_tar_gz(path: &Path, entries: &[(&str, &[u8], u32)]) {
        let file = std::fs::File::create(path).unwrap();
        let gz = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(gz);
        for (name, data, mode) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(*mode);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn tar_filter_strips_prefix_and_skips_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("bundle.tar.gz");
        write_tar_gz(
            &archive,
            &[
                ("teleport/teleport", b"teleport-bin", 0o755),
                ("teleport/tsh", b"tsh-bin", 0o755),
                ("teleport/examples/readme", b"docs", 0o644),
                ("other/file", b"nope", 0o644),
            ],
        );
        let filter = EntryFilter {
            matches: "teleport/t".to_string(),
            strip: "teleport/".to_string(),
        };
        extract_tar_gz(&archive, dir.path(), Some(&filter)).unwrap();

        assert_eq!(
            std::fs::read(dir.path().join("teleport")).unwrap(),
            b"teleport-bin"
        );
        assert_eq!(std::fs::read(dir.path().join("tsh")).unwrap(), b"tsh-bin");
        assert!(!dir.path().join("examples").exists());
        assert!(!dir.path().join("other").exists());
        // archive removed after extraction
        assert!(!archive.exists());
    }

    #[test]
    fn tar_without_filter_extracts_everything_with_modes() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("tofu.tar.gz");
        write_tar_gz(&archive, &[("tofu", b"tofu-bin", 0o755), ("LICENSE", b"text", 0o644)]);
        extract_tar_gz(&archive, dir.path(), None).unwrap();

        assert_eq!(std::fs::read(dir.path().join("tofu")).unwrap(), b"tofu-bin");
        assert!(dir.path().join("LICENSE").exists());
        let mode = std::fs::metadata(dir.path().join("tofu"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn tar_symlink_entry_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("link.tar.gz");
        let file = std::fs::File::create(&archive).unwrap();
        let gz = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(gz);
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(EntryType::Symlink);
        header.set_size(0);
        builder
            .append_link(&mut header, "evil-link", "/etc/passwd")
            .unwrap();
        builder.into_inner().unwrap().finish().unwrap();

        let err = extract_tar_gz(&archive, dir.path(), None).unwrap_err();
        assert!(matches!(err, SwitchError::UnsupportedEntryType { .. }));
    }

    fn write_zip(path: &Path, entries: &[(&str, &[u8], Option<u32>)]) {
        let file = std::fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, data, mode) in entries {
            let mut options = zip::write::FileOptions::default();
            if let Some(mode) = mode {
                options = options.unix_permissions(*mode);
            }
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn zip_extracts_files_preserving_permissions() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("terraform.zip");
        write_zip(&archive, &[("terraform", b"tf-bin", Some(0o755))]);
        let dest = dir.path().join("out");
        std::fs::create_dir_all(&dest).unwrap();
        extract_zip(&archive, &dest).unwrap();

        assert_eq!(std::fs::read(dest.join("terraform")).unwrap(), b"tf-bin");
        let mode = std::fs::metadata(dest.join("terraform"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn zip_rejects_parent_dir_escape() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("evil.zip");
        write_zip(&archive, &[("../escape.txt", b"pwned", None)]);
        let dest = dir.path().join("out");
        std::fs::create_dir_all(&dest).unwrap();

        let err = extract_zip(&archive, &dest).unwrap_err();
        assert!(matches!(err, SwitchError::PathTraversal(_)));
        assert!(!dir.path().join("escape.txt").exists());
    }

    #[test]
    fn zip_rejects_absolute_paths() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("evil.zip");
        write_zip(&archive, &[("/tmp/bvs-absolute-escape", b"pwned", None)]);
        let dest = dir.path().join("out");
        std::fs::create_dir_all(&dest).unwrap();

        let err = extract_zip(&archive, &dest).unwrap_err();
        assert!(matches!(err, SwitchError::PathTraversal(_)));
        assert!(!Path::new("/tmp/bvs-absolute-escape").exists());
    }
}
