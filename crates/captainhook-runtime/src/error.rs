use std::io;
use std::time::Duration;

/// How a request-level failure should be surfaced by the HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    ServerError,
    Unauthorized,
}

/// Failures that abort a hook request before any script runs.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("failed to read runbook '{id}.json'")]
    NotFound { id: String },

    #[error("failed to parse runbook '{id}.json': {source}")]
    Parse {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// Network or token gate refused the caller. Carries no detail on purpose.
    #[error("not authorized")]
    Unauthorized,

    #[error(transparent)]
    Input(#[from] InputError),
}

impl HookError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            HookError::Unauthorized => ErrorCategory::Unauthorized,
            HookError::NotFound { .. } | HookError::Parse { .. } | HookError::Input(_) => {
                ErrorCategory::ServerError
            }
        }
    }
}

/// Reading the request body failed part way through.
#[derive(Debug, thiserror::Error)]
#[error("could not read request body: {0}")]
pub struct InputError(#[from] pub io::Error);

/// Per-script failure. Never escapes the orchestrator; it becomes status -1.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("failed to start '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("stdin pipe unavailable for '{command}'")]
    StdinUnavailable { command: String },

    #[error("failed to wait for '{command}': {source}")]
    Wait {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("'{command}' exceeded its {timeout:?} deadline and was killed")]
    TimedOut { command: String, timeout: Duration },
}

/// A malformed entry in `allowedNetworks`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid CIDR address: {0}")]
pub struct NetworkParseError(pub String);
