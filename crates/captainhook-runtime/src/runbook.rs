use std::net::IpAddr;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use crate::network::Networks;

/// Marker replaced by the raw request body when interpolation is enabled.
pub const BODY_PLACEHOLDER: &str = "{{body}}";

/// An explicit `null` reads the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One command of a RunBook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Script {
    pub command: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub args: Vec<String>,
}

impl Script {
    pub fn new(command: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Copy of this script with `{{body}}` in every argument replaced by `body`.
    pub fn interpolate(&self, body: &str) -> Script {
        Script {
            command: self.command.clone(),
            args: self
                .args
                .iter()
                .map(|arg| {
                    if arg.contains(BODY_PLACEHOLDER) {
                        arg.replace(BODY_PLACEHOLDER, body)
                    } else {
                        arg.clone()
                    }
                })
                .collect(),
        }
    }
}

/// Captured outcome of one script. `status_code` is -1 when the process
/// could not be started or its exit status is unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScriptResult {
    pub stdout: String,
    pub stderr: String,
    pub status_code: i32,
}

impl ScriptResult {
    pub fn failed() -> Self {
        Self {
            status_code: -1,
            ..Self::default()
        }
    }

    pub fn success(&self) -> bool {
        self.status_code == 0
    }
}

/// One result per configured script, in script order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RunBookResponse {
    pub results: Vec<ScriptResult>,
}

/// A named hook configuration, loaded fresh for every request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunBook {
    #[serde(skip)]
    pub id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub scripts: Vec<Script>,

    #[serde(default, rename = "allowedNetworks")]
    pub allowed_networks: Networks,

    #[serde(default, rename = "auth", deserialize_with = "null_as_default")]
    pub auth_token: String,

    /// Acknowledge the caller before the scripts run.
    #[serde(default, rename = "async")]
    pub fire_and_forget: bool,

    /// Wall-clock time of the most recent `execute`.
    #[serde(skip)]
    pub exec_time: Duration,
}

impl RunBook {
    pub fn new(id: impl Into<String>, scripts: Vec<Script>) -> Self {
        Self {
            id: id.into(),
            scripts,
            ..Self::default()
        }
    }

    pub fn addr_is_allowed(&self, remote: IpAddr) -> bool {
        self.allowed_networks.addr_is_allowed(remote)
    }

    /// Substitute the request body into every script argument.
    pub fn interpolate_body(&mut self, body: &str) {
        for script in &mut self.scripts {
            *script = script.interpolate(body);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALLOWED_NETWORKS_OK: &str = r#"
    {
      "scripts": [ { "command": "echo" } ],
      "allowedNetworks": [ "127.0.0.1/32", "10.0.0.0/8" ]
    }"#;

    const ALLOWED_NETWORKS_BAD: &str = r#"
    {
      "scripts": [ { "command": "echo" } ],
      "allowedNetworks": [ "127.0.0.1/32", "10.0" ]
    }"#;

    #[test]
    fn test_network_unmarshalling() {
        let rb: RunBook = serde_json::from_str(ALLOWED_NETWORKS_OK).unwrap();
        assert_eq!(rb.allowed_networks.len(), 2);
        assert_eq!(rb.scripts, vec![Script::new("echo", Vec::<String>::new())]);

        let res: Result<RunBook, _> = serde_json::from_str(ALLOWED_NETWORKS_BAD);
        assert!(res.is_err());
    }

    #[test]
    fn test_optional_fields_default() {
        let rb: RunBook = serde_json::from_str(r#"{"scripts": []}"#).unwrap();
        assert!(rb.scripts.is_empty());
        assert!(rb.allowed_networks.is_empty());
        assert!(rb.auth_token.is_empty());
        assert!(!rb.fire_and_forget);
    }

    #[test]
    fn test_null_fields_read_as_absent() {
        let rb: RunBook =
            serde_json::from_str(r#"{"scripts":[{"command":"echo","args":null}],"auth":null}"#)
                .unwrap();
        assert_eq!(rb.scripts, vec![Script::new("echo", Vec::<String>::new())]);
        assert!(rb.auth_token.is_empty());

        let rb: RunBook = serde_json::from_str(r#"{"scripts":null}"#).unwrap();
        assert!(rb.scripts.is_empty());
    }

    #[test]
    fn test_auth_and_async_fields() {
        let rb: RunBook =
            serde_json::from_str(r#"{"scripts": [], "auth": "s3cret", "async": true}"#).unwrap();
        assert_eq!(rb.auth_token, "s3cret");
        assert!(rb.fire_and_forget);
    }

    #[test]
    fn test_interpolate_body() {
        let mut rb = RunBook::new(
            "deploy",
            vec![
                Script::new("notify", ["--payload={{body}}", "--static"]),
                Script::new("log", ["{{body}}{{body}}"]),
            ],
        );
        rb.interpolate_body("ref=main");

        assert_eq!(rb.scripts[0].args, vec!["--payload=ref=main", "--static"]);
        assert_eq!(rb.scripts[1].args, vec!["ref=mainref=main"]);
    }

    #[test]
    fn test_response_serialization() {
        let resp = RunBookResponse {
            results: vec![ScriptResult {
                stdout: "foo\n".into(),
                stderr: String::new(),
                status_code: 0,
            }],
        };
        assert_eq!(
            serde_json::to_string(&resp).unwrap(),
            r#"{"results":[{"stdout":"foo\n","stderr":"","status_code":0}]}"#
        );
    }
}
