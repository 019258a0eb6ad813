use regex::Regex;
use reqwest::blocking::Client;

use super::{Release, ReleaseSource};
use crate::error::{Result, SwitchError};
use crate::platform::Platform;

const RELEASES_BASE: &str = "https://releases.hashicorp.com";

/// HashiCorp publishes releases as an HTML directory index; version strings
/// are scraped out of the /{product}/{version}/ path segments. No pagination.
pub struct HashicorpIndex {
    product: String,
    base: String,
}

impl HashicorpIndex {
    pub fn new(product: &str) -> Self {
        Self {
            product: product.to_string(),
            base: RELEASES_BASE.to_string(),
        }
    }
}

impl ReleaseSource for HashicorpIndex {
    fn discover(&self, client: &Client, _platform: &Platform) -> Result<Vec<Release>> {
        let url = format!("{}/{}/", self.base, self.product);
        let resp = client.get(&url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SwitchError::HttpStatus {
                url,
                status: status.as_u16(),
            });
        }
        let body = resp.text()?;
        let pattern = format!(r"/{}/([\w.-]+)/", regex::escape(&self.product));
        let re = Regex::new(&pattern).map_err(|e| SwitchError::MalformedResponse {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        let mut tags: Vec<String> = Vec::new();
        for cap in re.captures_iter(&body) {
            let tag = cap[1].to_string();
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        Ok(tags
            .into_iter()
            .map(|tag| Release { tag, download: None })
            .collect())
    }
}
