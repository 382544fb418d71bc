use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

use super::Extractor;
use crate::error::{ExtractError, ExtractResult};
use crate::ir::model::Extraction;

pub const DEFAULT_SCRIPT: &str = "scripts/extract.js";
pub const DEFAULT_NODE: &str = "node";

/// Runs the Node extraction script and decodes `{"ir": ..., "interfaceNames": [...]}` from its stdout.
#[derive(Debug, Clone)]
pub struct ScriptExtractor {
    node: String,
    script: PathBuf,
    node_path: Option<String>,
}

impl ScriptExtractor {
    pub fn new(node: impl Into<String>, script: impl AsRef<Path>) -> Self {
        Self { node: node.into(), script: script.as_ref().to_path_buf(), node_path: None }
    }

    /// Fixes `NODE_PATH` for the child instead of discovering it.
    pub fn with_node_path(mut self, node_path: impl Into<String>) -> Self {
        self.node_path = Some(node_path.into());
        self
    }

    fn resolve_node_path(&self) -> Option<String> {
        if self.node_path.is_some() {
            return self.node_path.clone();
        }
        if std::env::var_os("NODE_PATH").is_some() {
            return None;
        }
        discover_global_node_path()
    }
}

/// Asks npm where global modules live. Failure is not fatal; the script may not need it.
fn discover_global_node_path() -> Option<String> {
    match Command::new("npm").args(["root", "-g"]).output() {
        Ok(out) if out.status.success() => {
            let path = String::from_utf8_lossy(&out.stdout).trim().to_string();
            if path.is_empty() {
                None
            } else {
                debug!(node_path = %path, "discovered global node modules");
                Some(path)
            }
        }
        Ok(out) => {
            warn!(status = %out.status, "`npm root -g` failed; NODE_PATH left unset");
            None
        }
        Err(err) => {
            warn!(error = %err, "could not run npm; NODE_PATH left unset");
            None
        }
    }
}

impl Extractor for ScriptExtractor {
    fn extract(&self) -> ExtractResult<Extraction> {
        let mut cmd = Command::new(&self.node);
        cmd.arg(&self.script);
        if let Some(node_path) = self.resolve_node_path() {
            cmd.env("NODE_PATH", node_path);
        }

        debug!(node = %self.node, script = %self.script.display(), "running extraction script");
        let out = cmd.output().map_err(|source| ExtractError::Spawn { program: self.node.clone(), source })?;
        if !out.status.success() {
            return Err(ExtractError::Failed {
                status: out.status,
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }

        let extraction: Extraction = serde_json::from_slice(&out.stdout)?;
        debug!(
            interfaces = extraction.interface_names.len(),
            keys = extraction.ir.len(),
            "extraction script finished"
        );
        Ok(extraction)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fake_script(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("extract.sh");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn decodes_script_output() {
        let dir = TempDir::new().unwrap();
        let script = fake_script(
            &dir,
            r#"printf '%s' '{"ir":{"A":[{"kind":"property","interface":"A","name":"x","type":"number"}]},"interfaceNames":["C","A"]}'"#,
        );
        let extraction = ScriptExtractor::new("sh", &script).with_node_path("/nowhere").extract().unwrap();
        assert_eq!(extraction.interface_names, vec!["C", "A"]);
        assert_eq!(extraction.ir["A"][0]["name"], "x");
    }

    #[test]
    fn passes_node_path_to_child() {
        let dir = TempDir::new().unwrap();
        let script = fake_script(&dir, r#"printf '{"ir":{},"interfaceNames":["%s"]}' "$NODE_PATH""#);
        let extraction = ScriptExtractor::new("sh", &script).with_node_path("/opt/modules").extract().unwrap();
        assert_eq!(extraction.interface_names, vec!["/opt/modules"]);
    }

    #[test]
    fn non_zero_exit_is_failure() {
        let dir = TempDir::new().unwrap();
        let script = fake_script(&dir, "echo 'cannot find module typescript' >&2\nexit 3");
        let err = ScriptExtractor::new("sh", &script).with_node_path("/nowhere").extract().unwrap_err();
        match err {
            ExtractError::Failed { stderr, .. } => assert_eq!(stderr, "cannot find module typescript"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn garbage_output_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let script = fake_script(&dir, "echo not json");
        let err = ScriptExtractor::new("sh", &script).with_node_path("/nowhere").extract().unwrap_err();
        assert!(matches!(err, ExtractError::Decode(_)));
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let err = ScriptExtractor::new("webir-no-such-node", "x.js").with_node_path("/nowhere").extract().unwrap_err();
        assert!(matches!(err, ExtractError::Spawn { .. }));
    }
}
