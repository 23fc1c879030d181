use anyhow::{Context, Result};
use captainhook_runtime::{HookSettings, InputPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub runbooks: RunbooksConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub execution: ExecutionConfig,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default)]
    pub echo: bool,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RunbooksConfig {
    /// Directory holding `<id>.json` files; `~` and `$VAR` are expanded
    #[serde(default)]
    pub dir: Option<String>,

    #[serde(default)]
    pub interpolate_body: bool,

    #[serde(default)]
    pub input_policy: InputPolicy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Each runbook's own `auth` token, if it has one
    #[default]
    Runbook,
    /// One token from the environment for every runbook
    Static,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub mode: AuthMode,

    #[serde(default = "default_token_env")]
    pub token_env: String,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ExecutionConfig {
    #[serde(default)]
    pub script_timeout_secs: Option<u64>,
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_token_env() -> String {
    "CPNHOOK_TOKEN".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            echo: false,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::default(),
            token_env: default_token_env(),
        }
    }
}

impl Config {
    /// CLI flags win over the file.
    pub fn apply_overrides(
        &mut self,
        listen_addr: Option<String>,
        configdir: Option<PathBuf>,
        echo: bool,
    ) {
        if let Some(addr) = listen_addr {
            self.server.listen_addr = addr;
        }
        if let Some(dir) = configdir {
            self.runbooks.dir = Some(dir.to_string_lossy().into_owned());
        }
        if echo {
            self.server.echo = true;
        }
    }

    pub fn runbook_dir(&self) -> Result<PathBuf> {
        let raw = self
            .runbooks
            .dir
            .as_deref()
            .filter(|d| !d.is_empty())
            .context("configdir is required")?;
        let expanded = shellexpand::full(raw)
            .with_context(|| format!("Failed to expand configdir {raw:?}"))?;
        Ok(PathBuf::from(expanded.into_owned()))
    }

    /// Build the immutable runtime settings, reading the static token from
    /// the environment when static auth is selected.
    pub fn hook_settings(&self) -> Result<HookSettings> {
        self.hook_settings_with_env(|name| std::env::var(name).ok())
    }

    fn hook_settings_with_env(&self, env: impl Fn(&str) -> Option<String>) -> Result<HookSettings> {
        let config_dir = self.runbook_dir()?;
        anyhow::ensure!(config_dir.is_dir(), "configdir {:?} is not a directory", config_dir);

        let static_token = match self.auth.mode {
            AuthMode::Runbook => None,
            AuthMode::Static => {
                let token = env(&self.auth.token_env).filter(|t| !t.is_empty());
                Some(token.with_context(|| {
                    format!("Static auth selected but ${} is not set", self.auth.token_env)
                })?)
            }
        };

        Ok(HookSettings::new(config_dir)
            .with_echo(self.server.echo)
            .with_static_token(static_token)
            .with_interpolate_body(self.runbooks.interpolate_body)
            .with_input_policy(self.runbooks.input_policy)
            .with_script_timeout(self.execution.script_timeout_secs.map(Duration::from_secs)))
    }
}

/// Load config from file or use defaults
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        let content =
            fs::read_to_string(path).context(format!("Failed to read config file: {:?}", path))?;

        let config: Config = toml::from_str(&content).context("Failed to parse TOML config")?;

        Ok(config)
    } else {
        Ok(Config::default())
    }
}
