use fs_err as fs;
use reqwest::blocking::Client;
use std::io;
use std::path::Path;

use crate::error::{Result, SwitchError};

/// Single GET of a release asset streamed to `dest`, overwriting any existing
/// file. Any non-2xx status is a failure; no retry, no resume.
pub fn fetch(client: &Client, url: &str, dest: &Path) -> Result<()> {
    let mut resp = client.get(url).send()?;
    let status = resp.status();
    if !status.is_success() {
        return Err(SwitchError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut out = fs::File::create(dest)?;
    io::copy(&mut resp, &mut out)?;
    Ok(())
}
