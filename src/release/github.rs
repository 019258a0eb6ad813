use reqwest::blocking::Client;
use serde::Deserialize;

use super::{Release, ReleaseSource};
use crate::error::{Result, SwitchError};
use crate::platform::Platform;

const GITHUB_API: &str = "https://api.github.com";

/// Paged GitHub REST releases listing: requests pages until an empty one
/// comes back. A GITHUB_TOKEN in the environment is used as a bearer token
/// to soften unauthenticated rate limits; its absence is not an error.
pub struct GithubReleases {
    owner: String,
    repo: String,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct GithubRelease {
    tag_name: String,
}

impl GithubReleases {
    pub fn new(owner: &str, repo: &str) -> Self {
        Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            api_base: GITHUB_API.to_string(),
        }
    }
}

impl ReleaseSource for GithubReleases {
    fn discover(&self, client: &Client, _platform: &Platform) -> Result<Vec<Release>> {
        let token = std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty());
        let mut releases = Vec::new();
        let mut page = 1u32;
        loop {
            let url = format!(
                "{}/repos/{}/{}/releases?page={page}",
                self.api_base, self.owner, self.repo
            );
            let mut req = client
                .get(&url)
                .header("Accept", "application/vnd.github+json")
                .header("X-GitHub-Api-Version", "2022-11-28")
                .header("User-Agent", "bvs");
            if let Some(token) = &token {
                req = req.bearer_auth(token);
            }
            let resp = req.send()?;
            let status = resp.status();
            if !status.is_success() {
                return Err(SwitchError::HttpStatus {
                    url,
                    status: status.as_u16(),
                });
            }
            let batch: Vec<GithubRelease> =
                resp.json().map_err(|e| SwitchError::MalformedResponse {
                    url,
                    reason: e.to_string(),
                })?;
            if batch.is_empty() {
                break;
            }
            releases.extend(batch.into_iter().map(|r| Release {
                tag: r.tag_name,
                download: None,
            }));
            page += 1;
        }
        Ok(releases)
    }
}
