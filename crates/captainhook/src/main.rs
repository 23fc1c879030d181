mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI args
    let cli = Cli::parse();

    // Initialize logging
    captainhook_runtime::init_logging(cli.verbosity(), cli.log_file.as_deref())?;

    // Handle init command early (doesn't need config)
    if let Commands::Init { path } = &cli.command {
        return commands::init::run_init(path);
    }

    // Load config
    let mut config = config::load_config(cli.config.as_deref())?;

    // Dispatch to command
    match cli.command {
        Commands::Init { .. } => {
            // Already handled above
            unreachable!()
        }
        Commands::Serve {
            listen_addr,
            configdir,
            echo,
        } => {
            config.apply_overrides(listen_addr, configdir, echo);
            commands::serve::execute(&config).await?;
        }
        Commands::Validate { configdir, ids } => {
            config.apply_overrides(None, configdir, false);
            commands::validate::execute(&ids, &config).await?;
        }
    }

    Ok(())
}
