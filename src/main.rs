mod activate;
mod archive;
mod cli;
mod command_handlers;
mod config;
mod error;
mod fetch;
mod logging;
mod platform;
mod release;
mod select;
mod tools;

use clap::Parser;
use tracing::error;

use crate::cli::Cli;
use crate::config::Config;
use crate::error::SwitchError;
use crate::platform::Platform;

fn main() {
    let cli = Cli::parse();
    let cfg = match Config::resolve(&cli) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("bvs: {err:#}");
            std::process::exit(1);
        }
    };
    logging::init(&cfg.log_level);
    if let Err(err) = run(cli, &cfg) {
        error!("{err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli, cfg: &Config) -> anyhow::Result<()> {
    // fail on unsupported hosts before touching the network
    let platform = Platform::detect()?;
    let tool = tools::find(&cli.tool).ok_or_else(|| SwitchError::UnknownTool {
        name: cli.tool.clone(),
        supported: tools::names().join(", "),
    })?;
    command_handlers::dispatch::dispatch(cli.command, tool, cfg, &platform)?;
    Ok(())
}
