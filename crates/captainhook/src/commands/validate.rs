use crate::config::Config;
use anyhow::Result;
use captainhook_runtime::Resolver;

/// Resolve each runbook and print a one-line report per id.
pub async fn execute(ids: &[String], config: &Config) -> Result<()> {
    let resolver = Resolver::new(config.runbook_dir()?);
    let mut failed = 0;

    for id in ids {
        match resolver.resolve(id).await {
            Ok(rb) => {
                let mode = if rb.fire_and_forget { "async" } else { "sync" };
                println!(
                    "{id}: ok ({} scripts, {} networks, auth {}, {mode})",
                    rb.scripts.len(),
                    rb.allowed_networks.len(),
                    if rb.auth_token.is_empty() { "off" } else { "on" },
                );
            }
            Err(e) => {
                failed += 1;
                println!("{id}: {e}");
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} runbooks failed to load", ids.len());
    }
    Ok(())
}
