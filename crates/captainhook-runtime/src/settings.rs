use std::path::PathBuf;
use std::time::Duration;

use crate::input::InputPolicy;

/// Process-wide settings, fixed at startup and shared read-only by every
/// request.
#[derive(Debug, Clone)]
pub struct HookSettings {
    /// Directory holding `<id>.json` RunBooks.
    pub config_dir: PathBuf,
    /// Render script output in the HTTP response.
    pub echo: bool,
    /// Token every caller must present regardless of RunBook.
    pub static_token: Option<String>,
    /// Replace `{{body}}` in script arguments with the request body.
    pub interpolate_body: bool,
    pub input_policy: InputPolicy,
    /// Per-script deadline. `None` lets scripts run indefinitely.
    pub script_timeout: Option<Duration>,
}

impl HookSettings {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            echo: false,
            static_token: None,
            interpolate_body: false,
            input_policy: InputPolicy::default(),
            script_timeout: None,
        }
    }

    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn with_static_token(mut self, token: Option<String>) -> Self {
        self.static_token = token;
        self
    }

    pub fn with_interpolate_body(mut self, enabled: bool) -> Self {
        self.interpolate_body = enabled;
        self
    }

    pub fn with_input_policy(mut self, policy: InputPolicy) -> Self {
        self.input_policy = policy;
        self
    }

    pub fn with_script_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.script_timeout = timeout;
        self
    }
}
