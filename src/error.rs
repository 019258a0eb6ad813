use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SwitchError>;

/// Failure modes of the discovery/activation pipeline. Adapters and the
/// activator return these to the caller; nothing below the CLI layer
/// terminates the process.
#[derive(Debug, Error)]
pub enum SwitchError {
    #[error("unsupported platform: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("{tool} has no release for {os}/{arch}")]
    UnsupportedTarget {
        tool: String,
        os: &'static str,
        arch: &'static str,
    },

    #[error("unknown tool '{name}' (supported: {supported})")]
    UnknownTool { name: String, supported: String },

    #[error(transparent)]
    Network(#[from] reqwest::Error),

    #[error("unexpected status code {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("malformed response from {url}: {reason}")]
    MalformedResponse { url: String, reason: String },

    #[error("buildId not found in download page")]
    BuildIdNotFound,

    #[error("version {version} of {tool} not found, cannot download and activate")]
    VersionNotFound { tool: String, version: String },

    #[error("corrupt archive {path}")]
    CorruptArchive {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("unsupported entry type for archive entry '{entry}'")]
    UnsupportedEntryType { entry: String },

    #[error("archive entry escapes destination: {0}")]
    PathTraversal(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
