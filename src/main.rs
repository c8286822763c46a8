use agent_monitor::cli::{Cli, Commands};
use agent_monitor::{commands, hooks};
use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    // Hook stdout is read by Claude Code, so logs go to stderr only
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::HooksManifest { ref command }) => commands::handle_hooks_manifest(command),
        Some(Commands::Send { dry_run }) => send(&cli, dry_run).await,
        None => send(&cli, false).await,
    }
}

async fn send(cli: &Cli, dry_run: bool) -> Result<()> {
    let config = match cli.monitor_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            return Ok(());
        }
    };

    hooks::forward::run(&config, dry_run).await
}
