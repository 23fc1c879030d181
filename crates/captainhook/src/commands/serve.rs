use crate::config::Config;
use anyhow::Result;
use captainhook_gateway::{start_server, AppState};
use captainhook_runtime::HookService;
use tracing::info;

pub async fn execute(config: &Config) -> Result<()> {
    let settings = config.hook_settings()?;

    info!(
        listen = %config.server.listen_addr,
        config_dir = %settings.config_dir.display(),
        echo = settings.echo,
        static_auth = settings.static_token.is_some(),
        script_timeout_secs = settings.script_timeout.map(|t| t.as_secs()),
        "=== Booting CaptainHook v{}, matey! Arr!",
        env!("CARGO_PKG_VERSION")
    );

    let state = AppState::new(HookService::new(settings));
    start_server(state, &config.server.listen_addr).await?;

    Ok(())
}
