use anyhow::Result;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# CaptainHook Configuration

[server]
listen_addr = "127.0.0.1:8080"
# Send script output back to the caller
echo = false

[runbooks]
# One <id>.json file per hook; POST /<id> runs it
dir = "~/.config/captainhook/hooks"
# Replace {{body}} in script arguments with the request body
interpolate_body = false
# "best_effort" runs scripts even if the request body could not be read
# completely; "strict" rejects the request instead
input_policy = "best_effort"

[auth]
# "runbook": each runbook's optional "auth" token
# "static": one token, read from token_env, for every runbook
mode = "runbook"
token_env = "CPNHOOK_TOKEN"

[execution]
# Kill scripts running longer than this (unset: no limit)
# script_timeout_secs = 60
"#;

/// Initialize a new config file
pub fn run_init(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("Config already exists at {:?}", path);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, DEFAULT_CONFIG)?;
    println!("Created config at {:?}", path);
    Ok(())
}
