use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info};

use crate::executor::Executor;
use crate::input::Input;
use crate::runbook::{RunBook, RunBookResponse, ScriptResult};

/// Runs the scripts of a RunBook, one after another, and collects a result
/// for each of them.
#[derive(Clone)]
pub struct Orchestrator {
    executor: Arc<dyn Executor>,
}

impl Orchestrator {
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }

    /// Execute every script in declared order with the same `input`.
    ///
    /// A script that fails to start or cannot be waited on is recorded with
    /// status -1 and the remaining scripts still run, so the response always
    /// holds exactly one result per script. `runbook.exec_time` is updated.
    pub async fn execute(&self, runbook: &mut RunBook, input: &Input) -> RunBookResponse {
        let start = Instant::now();
        let mut results = Vec::with_capacity(runbook.scripts.len());

        for (step, script) in runbook.scripts.iter().enumerate() {
            debug!(hook = %runbook.id, step, script = %script.command, "Executing script");

            let result = match self.executor.exec(script, input).await {
                Ok(result) => result,
                Err(e) => {
                    error!(hook = %runbook.id, step, script = %script.command, error = %e, "Script failed");
                    ScriptResult::failed()
                }
            };

            debug!(
                hook = %runbook.id,
                step,
                script = %script.command,
                status_code = result.status_code,
                stdout_bytes = result.stdout.len(),
                stderr_bytes = result.stderr.len(),
                "Script results"
            );
            results.push(result);
        }

        runbook.exec_time = start.elapsed();
        RunBookResponse { results }
    }

    /// Fire-and-forget: run the RunBook on its own task and return at once.
    ///
    /// There is no handle, result channel or cancellation. The outcome is
    /// only logged.
    pub fn spawn_detached(&self, mut runbook: RunBook, input: Input) {
        let orchestrator = self.clone();
        tokio::spawn(async move {
            let response = orchestrator.execute(&mut runbook, &input).await;
            let failed = response.results.iter().filter(|r| !r.success()).count();
            info!(
                hook = %runbook.id,
                num_scripts = response.results.len(),
                failed,
                elapsed_ms = runbook.exec_time.as_millis() as u64,
                "Detached script execution complete"
            );
        });
    }
}
