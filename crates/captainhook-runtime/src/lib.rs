pub mod auth;
pub mod error;
pub mod executor;
pub mod input;
pub mod network;
pub mod orchestrator;
pub mod resolver;
pub mod runbook;
pub mod service;
pub mod settings;

pub use auth::Authorizer;
pub use error::{ErrorCategory, HookError, InputError, NetworkParseError, ScriptError};
pub use executor::{Executor, ProcessExecutor};
pub use input::{Gathered, Input, InputPolicy};
pub use network::{Network, Networks};
pub use orchestrator::Orchestrator;
pub use resolver::Resolver;
pub use runbook::{RunBook, RunBookResponse, Script, ScriptResult, BODY_PLACEHOLDER};
pub use service::{HookOutcome, HookRequest, HookService};
pub use settings::HookSettings;

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

/// Initialize structured JSON logging.
///
/// `RUST_LOG` takes precedence; otherwise verbosity 0 logs errors only,
/// 1 adds info and 2 or more adds debug. Logs go to `log_file` when it can
/// be opened for appending, stdout otherwise.
pub fn init_logging(verbosity: u8, log_file: Option<&Path>) -> anyhow::Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = match verbosity {
        0 => "error",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = fmt().json().with_env_filter(filter);

    let file = log_file.and_then(|path| {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(file),
            Err(e) => {
                eprintln!("Could not open logfile, will use stdout: {e}");
                None
            }
        }
    });

    match file {
        Some(file) => builder.with_writer(Mutex::new(file)).try_init(),
        None => builder.try_init(),
    }
    .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))
}
