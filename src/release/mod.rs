pub mod github;
pub mod hashicorp;
pub mod teleport;

use reqwest::blocking::Client;

use crate::error::Result;
use crate::platform::Platform;
use crate::tools::Discovery;

/// One published release: the upstream tag string, plus a resolved download
/// URL when discovery itself yields one (build-manifest sources). Lives for a
/// single list/activate invocation.
#[derive(Debug, Clone)]
pub struct Release {
    pub tag: String,
    pub download: Option<String>,
}

/// Common capability of the per-upstream discovery variants: produce the
/// available releases, in discovery order, for the current platform.
pub trait ReleaseSource {
    fn discover(&self, client: &Client, platform: &Platform) -> Result<Vec<Release>>;
}

impl Discovery {
    pub fn source(&self) -> Box<dyn ReleaseSource> {
        match self {
            Discovery::GithubReleases { owner, repo } => {
                Box::new(github::GithubReleases::new(owner, repo))
            }
            Discovery::HashicorpIndex { product } => {
                Box::new(hashicorp::HashicorpIndex::new(product))
            }
            Discovery::TeleportManifest => Box::new(teleport::TeleportManifest::new()),
        }
    }
}
