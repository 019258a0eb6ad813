use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::Client;
use serde::Deserialize;

use super::{Release, ReleaseSource};
use crate::error::{Result, SwitchError};
use crate::platform::Platform;

const DOWNLOAD_BASE: &str = "https://goteleport.com";

static BUILD_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""buildId":"([^"]+)""#).unwrap());

/// goteleport.com serves its download manifest under a rotating build id.
/// Discovery first scrapes the id out of the stable page, then fetches the
/// keyed manifest and keeps the tar.gz asset matching the current platform
/// for each listed version.
pub struct TeleportManifest {
    base: String,
}

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(rename = "pageProps")]
    page_props: PageProps,
}

#[derive(Debug, Deserialize)]
struct PageProps {
    #[serde(rename = "initialDownloads", default)]
    initial_downloads: Vec<MajorLine>,
}

#[derive(Debug, Deserialize)]
struct MajorLine {
    #[serde(default)]
    versions: Vec<ManifestVersion>,
}

#[derive(Debug, Deserialize)]
struct ManifestVersion {
    version: String,
    #[serde(default)]
    assets: Vec<Asset>,
}

#[derive(Debug, Deserialize)]
struct Asset {
    name: String,
    os: String,
    arch: String,
    #[serde(rename = "publicUrl")]
    public_url: String,
}

impl TeleportManifest {
    pub fn new() -> Self {
        Self {
            base: DOWNLOAD_BASE.to_string(),
        }
    }
}

impl ReleaseSource for TeleportManifest {
    fn discover(&self, client: &Client, platform: &Platform) -> Result<Vec<Release>> {
        let url = format!("{}/_next/data/latest/download.json", self.base);
        let body = client.get(&url).send()?.text()?;
        let build_id = BUILD_ID_RE
            .captures(&body)
            .and_then(|cap| cap.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or(SwitchError::BuildIdNotFound)?;

        let url = format!("{}/_next/data/{build_id}/download.json", self.base);
        let resp = client.get(&url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SwitchError::HttpStatus {
                url,
                status: status.as_u16(),
            });
        }
        let body = resp.text()?;
        let manifest: Manifest =
            serde_json::from_str(&body).map_err(|e| SwitchError::MalformedResponse {
                url,
                reason: e.to_string(),
            })?;

        let (os, arch) = (platform.os.name(), platform.arch.name());
        let mut releases = Vec::new();
        for line in &manifest.page_props.initial_downloads {
            for version in &line.versions {
                for asset in &version.assets {
                    if asset.os == os && asset.arch == arch && asset.name.ends_with(".tar.gz") {
                        releases.push(Release {
                            tag: version.version.clone(),
                            download: Some(asset.public_url.clone()),
                        });
                    }
                }
            }
        }
        Ok(releases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Arch, Os};

    fn linux_amd64() -> Platform {
        Platform {
            os: Os::Linux,
            arch: Arch::Amd64,
        }
    }

    const MANIFEST: &str = r#"{
        "pageProps": {
            "initialDownloads": [
                {
                    "majorVersion": "15",
                    "versions": [
                        {
                            "version": "15.2.0",
                            "assets": [
                                {
                                    "name": "teleport-v15.2.0-linux-amd64-bin.tar.gz",
                                    "os": "linux",
                                    "arch": "amd64",
                                    "publicUrl": "https://cdn.example.com/teleport-15.2.0-linux.tar.gz"
                                },
                                {
                                    "name": "teleport-v15.2.0-darwin-arm64-bin.tar.gz",
                                    "os": "darwin",
                                    "arch": "arm64",
                                    "publicUrl": "https://cdn.example.com/teleport-15.2.0-darwin.tar.gz"
                                },
                                {
                                    "name": "teleport-v15.2.0-linux-amd64.pkg",
                                    "os": "linux",
                                    "arch": "amd64",
                                    "publicUrl": "https://cdn.example.com/teleport-15.2.0.pkg"
                                }
                            ]
                        }
                    ]
                }
            ]
        }
    }"#;

    #[test]
    fn resolves_build_id_then_filters_assets() {
        let mut server = mockito::Server::new();
        let _page = server
            .mock("GET", "/_next/data/latest/download.json")
            .with_status(200)
            .with_body(r#"<script>{"buildId":"abc123","other":1}</script>"#)
            .create();
        let _manifest = server
            .mock("GET", "/_next/data/abc123/download.json")
            .with_status(200)
            .with_body(MANIFEST)
            .create();

        let source = TeleportManifest { base: server.url() };
        let releases = source.discover(&Client::new(), &linux_amd64()).unwrap();
        assert_eq!(releases.len(), 1);
        assert_eq!(releases[0].tag, "15.2.0");
        assert_eq!(
            releases[0].download.as_deref(),
            Some("https://cdn.example.com/teleport-15.2.0-linux.tar.gz")
        );
    }

    #[test]
    fn missing_build_id_is_fatal() {
        let mut server = mockito::Server::new();
        let _page = server
            .mock("GET", "/_next/data/latest/download.json")
            .with_status(200)
            .with_body("<html>no build marker here</html>")
            .create();

        let source = TeleportManifest { base: server.url() };
        let err = source
            .discover(&Client::new(), &linux_amd64())
            .unwrap_err();
        assert!(matches!(err, SwitchError::BuildIdNotFound));
    }

    #[test]
    fn manifest_error_status_is_fatal() {
        let mut server = mockito::Server::new();
        let _page = server
            .mock("GET", "/_next/data/latest/download.json")
            .with_status(200)
            .with_body(r#"{"buildId":"abc123"}"#)
            .create();
        let _manifest = server
            .mock("GET", "/_next/data/abc123/download.json")
            .with_status(404)
            .create();

        let source = TeleportManifest { base: server.url() };
        let err = source
            .discover(&Client::new(), &linux_amd64())
            .unwrap_err();
        assert!(matches!(err, SwitchError::HttpStatus { status: 404, .. }));
    }
}
