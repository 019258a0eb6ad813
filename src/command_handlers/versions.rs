use reqwest::blocking::Client;
use tracing::info;

use crate::error::Result;
use crate::platform::Platform;
use crate::select;
use crate::tools::ToolDef;

/// Prints newline-delimited version tags: all of them in discovery order with
/// `all`, otherwise collapsed to the highest patch per minor line.
pub fn list(
    client: &Client,
    tool: &ToolDef,
    platform: &Platform,
    prefix: &str,
    all: bool,
) -> Result<()> {
    info!("Fetching a list of versions...");
    let releases = tool.discovery.source().discover(client, platform)?;
    let tags: Vec<String> = releases.into_iter().map(|r| r.tag).collect();
    let selected = if all {
        select::select_all(&tags, prefix)
    } else {
        select::latest_per_minor(&tags, prefix)
    };
    for tag in selected {
        println!("{tag}");
    }
    Ok(())
}
