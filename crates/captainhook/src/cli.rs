use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "captainhook")]
#[command(about = "CaptainHook - run configured scripts when a webhook fires", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level (-v); without it info, with -q errors only
    #[arg(short, long, action = ArgAction::Count, global = true, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Append logs to this file instead of stdout
    #[arg(long = "log", global = true)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// 0 = errors only, 1 = info (default), 2 = debug; repeated -v caps at debug
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose.min(1) + 1
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new config file
    Init {
        /// Path for new config file
        #[arg(default_value = "captainhook.toml")]
        path: PathBuf,
    },
    /// Serve webhooks over HTTP
    Serve {
        /// Address to listen on (host:port)
        #[arg(long)]
        listen_addr: Option<String>,
        /// Directory holding <id>.json runbooks
        #[arg(long)]
        configdir: Option<PathBuf>,
        /// Send script output back to the caller
        #[arg(long)]
        echo: bool,
    },
    /// Load runbooks and report whether they parse
    Validate {
        /// Directory holding <id>.json runbooks
        #[arg(long)]
        configdir: Option<PathBuf>,
        /// Runbook ids to check
        #[arg(required = true)]
        ids: Vec<String>,
    },
}
