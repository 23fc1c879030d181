use std::path::{Path, PathBuf};

use tracing::error;

use crate::error::HookError;
use crate::runbook::RunBook;

/// Loads RunBooks from `<root>/<id>.json`. Nothing is cached; every call
/// reads and parses the file again.
#[derive(Debug, Clone)]
pub struct Resolver {
    root: PathBuf,
}

impl Resolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }

    pub async fn resolve(&self, id: &str) -> Result<RunBook, HookError> {
        if !is_valid_id(id) {
            return Err(HookError::NotFound { id: id.to_string() });
        }

        let path = self.path_for(id);
        let data = tokio::fs::read(&path).await.map_err(|e| {
            error!(hook = id, path = %path.display(), error = %e, "Failed to read runbook");
            HookError::NotFound { id: id.to_string() }
        })?;

        let mut runbook: RunBook =
            serde_json::from_slice(&data).map_err(|source| HookError::Parse {
                id: id.to_string(),
                source,
            })?;
        runbook.id = id.to_string();
        Ok(runbook)
    }
}

/// Ids map straight to file names, so anything that could leave the root
/// is refused.
fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && id != "." && id != ".." && !id.contains(['/', '\\', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, id: &str, body: &str) {
        std::fs::write(dir.path().join(format!("{id}.json")), body).unwrap();
    }

    #[tokio::test]
    async fn test_resolve_sets_id() {
        let dir = TempDir::new().unwrap();
        write(&dir, "deploy", r#"{"scripts":[{"command":"echo","args":["foo"]}]}"#);

        let rb = Resolver::new(dir.path()).resolve("deploy").await.unwrap();
        assert_eq!(rb.id, "deploy");
        assert_eq!(rb.scripts.len(), 1);
        assert_eq!(rb.scripts[0].args, vec!["foo"]);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = Resolver::new(dir.path()).resolve("nope").await.unwrap_err();
        assert!(matches!(err, HookError::NotFound { ref id } if id == "nope"));
    }

    #[tokio::test]
    async fn test_malformed_json_is_parse_error() {
        let dir = TempDir::new().unwrap();
        write(&dir, "broken", r#"{"scripts": [ "#);
        let err = Resolver::new(dir.path()).resolve("broken").await.unwrap_err();
        assert!(matches!(err, HookError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_bad_network_is_parse_error() {
        let dir = TempDir::new().unwrap();
        write(&dir, "nets", r#"{"scripts": [], "allowedNetworks": ["127.0.0.1/32", "10.0"]}"#);
        let err = Resolver::new(dir.path()).resolve("nets").await.unwrap_err();
        assert!(matches!(err, HookError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_traversal_ids_rejected() {
        let dir = TempDir::new().unwrap();
        let resolver = Resolver::new(dir.path().join("hooks"));
        write(&dir, "secret", r#"{"scripts": []}"#);

        for id in ["", ".", "..", "../secret", "a/b", "a\\b"] {
            assert!(
                matches!(resolver.resolve(id).await, Err(HookError::NotFound { .. })),
                "{id:?} should be rejected"
            );
        }
    }
}
