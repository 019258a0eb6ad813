use reqwest::blocking::Client;

use crate::cli::Commands;
use crate::command_handlers::versions;
use crate::config::Config;
use crate::error::Result;
use crate::platform::Platform;
use crate::tools::ToolDef;

pub fn dispatch(cmd: Commands, tool: &ToolDef, cfg: &Config, platform: &Platform) -> Result<()> {
    let client = Client::new();
    match cmd {
        Commands::Versions { prefix, all } => {
            versions::list(&client, tool, platform, prefix.as_deref().unwrap_or(""), all)
        }
        Commands::Activate { version } => {
            crate::activate::activate(&client, tool, &version, cfg, platform)?;
            println!("Activated {} {}", tool.name, version);
            Ok(())
        }
    }
}
