use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncRead;
use tracing::{debug, error, info, warn};

use crate::auth::Authorizer;
use crate::error::HookError;
use crate::executor::{Executor, ProcessExecutor};
use crate::input::{self, InputPolicy};
use crate::orchestrator::Orchestrator;
use crate::resolver::Resolver;
use crate::runbook::RunBookResponse;
use crate::settings::HookSettings;

/// Everything the HTTP layer knows about one webhook call.
pub struct HookRequest<R> {
    pub id: String,
    pub remote: IpAddr,
    /// Header name/value pairs in arrival order.
    pub headers: Vec<(String, Vec<u8>)>,
    /// Token presented by the caller, if any.
    pub credential: Option<String>,
    pub body: R,
}

#[derive(Debug)]
pub enum HookOutcome {
    /// Scripts ran to completion.
    Completed {
        response: RunBookResponse,
        exec_time: Duration,
    },
    /// Scripts were handed to a detached task; nothing to report.
    Detached,
}

/// Resolves, gates and runs RunBooks for incoming webhook calls.
pub struct HookService {
    settings: Arc<HookSettings>,
    resolver: Resolver,
    authorizer: Authorizer,
    orchestrator: Orchestrator,
}

impl HookService {
    pub fn new(settings: HookSettings) -> Self {
        let executor = ProcessExecutor::new().with_timeout(settings.script_timeout);
        Self::with_executor(settings, Arc::new(executor))
    }

    pub fn with_executor(settings: HookSettings, executor: Arc<dyn Executor>) -> Self {
        Self {
            resolver: Resolver::new(settings.config_dir.clone()),
            authorizer: Authorizer::new(settings.static_token.clone()),
            orchestrator: Orchestrator::new(executor),
            settings: Arc::new(settings),
        }
    }

    pub fn settings(&self) -> &HookSettings {
        &self.settings
    }

    /// Whether script output may be sent back to the caller.
    pub fn echo(&self) -> bool {
        self.settings.echo
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub async fn handle<R>(&self, request: HookRequest<R>) -> Result<HookOutcome, HookError>
    where
        R: AsyncRead + Unpin,
    {
        let HookRequest {
            id,
            remote,
            headers,
            credential,
            body,
        } = request;

        info!(hook = %id, address = %remote, "Received webhook");

        let mut runbook = self.resolver.resolve(&id).await.map_err(|e| {
            error!(hook = %id, error = %e, "RunBook error");
            e
        })?;

        if !runbook.addr_is_allowed(remote) {
            warn!(hook = %id, address = %remote, "Not authorized");
            return Err(HookError::Unauthorized);
        }
        if let Err(e) = self.authorizer.authorize(&runbook, credential.as_deref()) {
            warn!(hook = %id, address = %remote, "Authentication failure");
            return Err(e);
        }

        debug!(hook = %id, address = %remote, "Gathering request input");
        let mut gathered = input::gather(headers, body).await;
        if let Some(e) = gathered.error.take() {
            error!(hook = %id, error = %e, "Could not read request body");
            if self.settings.input_policy == InputPolicy::Strict {
                return Err(e.into());
            }
        }

        if self.settings.interpolate_body {
            runbook.interpolate_body(&gathered.body_text());
        }

        info!(hook = %id, address = %remote, num_scripts = runbook.scripts.len(), "Executing hook scripts");

        if runbook.fire_and_forget {
            let num_scripts = runbook.scripts.len();
            self.orchestrator.spawn_detached(runbook, gathered.input);
            info!(hook = %id, address = %remote, num_scripts, "Script execution started, returning 200");
            return Ok(HookOutcome::Detached);
        }

        let response = self.orchestrator.execute(&mut runbook, &gathered.input).await;
        info!(
            hook = %id,
            address = %remote,
            elapsed_ms = runbook.exec_time.as_millis() as u64,
            "Script execution complete"
        );

        Ok(HookOutcome::Completed {
            response,
            exec_time: runbook.exec_time,
        })
    }
}
