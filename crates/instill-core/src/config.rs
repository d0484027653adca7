//! Workspace configuration.
//!
//! Every setting resolves as: env var > `.instill/config.json` (dot-notation
//! keys) > built-in default. A missing or unparseable config file is the same
//! as an empty one.

use std::fs;
use std::path::{Path, PathBuf};

/// Default location of the repository-wide instruction file.
pub const DEFAULT_REPO_FILE: &str = ".github/copilot-instructions.md";

/// Default directory holding `*.instructions.md` files.
pub const DEFAULT_INSTRUCTIONS_DIR: &str = ".github/instructions";

/// Tools whose target file triggers path-scoped injection.
pub const DEFAULT_FILE_TOOLS: &[&str] = &["read", "edit", "write"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstillConfig {
    /// Repository-wide instruction file, relative to the project root.
    pub repo_file: PathBuf,
    /// Directory of path-scoped instruction files, relative to the project root.
    pub instructions_dir: PathBuf,
    /// Tool names that carry a target file path.
    pub file_tools: Vec<String>,
}

impl Default for InstillConfig {
    fn default() -> Self {
        Self {
            repo_file: PathBuf::from(DEFAULT_REPO_FILE),
            instructions_dir: PathBuf::from(DEFAULT_INSTRUCTIONS_DIR),
            file_tools: DEFAULT_FILE_TOOLS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl InstillConfig {
    /// Resolve the configuration for `root` from the process environment and
    /// the workspace config file.
    pub fn resolve(root: &Path) -> Self {
        Self::resolve_with(root, |key| std::env::var(key).ok())
    }

    /// Resolve with an explicit environment lookup.
    pub fn resolve_with(root: &Path, env: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let repo_file = env("INSTILL_REPO_FILE")
            .filter(|v| !v.trim().is_empty())
            .or_else(|| config_str(root, "loader.repo_file"))
            .map(PathBuf::from)
            .unwrap_or(defaults.repo_file);

        let instructions_dir = env("INSTILL_INSTRUCTIONS_DIR")
            .filter(|v| !v.trim().is_empty())
            .or_else(|| config_str(root, "loader.instructions_dir"))
            .map(PathBuf::from)
            .unwrap_or(defaults.instructions_dir);

        let file_tools = env("INSTILL_FILE_TOOLS")
            .map(|v| split_list(&v))
            .filter(|tools| !tools.is_empty())
            .or_else(|| config_list(root, "bridge.file_tools"))
            .unwrap_or(defaults.file_tools);

        Self {
            repo_file,
            instructions_dir,
            file_tools,
        }
    }
}

/// Read a raw JSON value from `.instill/config.json` using dot-notation keys.
pub fn config_value(root: &Path, key: &str) -> Option<serde_json::Value> {
    let config_path = root.join(".instill").join("config.json");
    let content = fs::read_to_string(&config_path).ok()?;
    let val: serde_json::Value = serde_json::from_str(&content).ok()?;
    let mut current = val;
    for part in key.split('.') {
        current = current.get(part)?.clone();
    }
    Some(current)
}

fn config_str(root: &Path, key: &str) -> Option<String> {
    config_value(root, key)?.as_str().map(str::to_string)
}

/// Accepts either a JSON array of strings or a comma-separated string.
fn config_list(root: &Path, key: &str) -> Option<Vec<String>> {
    let items = match config_value(root, key)? {
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        serde_json::Value::String(s) => split_list(&s),
        _ => return None,
    };
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_without_config_file() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = InstillConfig::resolve_with(tmp.path(), no_env);
        assert_eq!(cfg, InstillConfig::default());
        assert_eq!(cfg.file_tools, vec!["read", "edit", "write"]);
    }

    #[test]
    fn config_file_overrides_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join(".instill")).unwrap();
        fs::write(
            tmp.path().join(".instill").join("config.json"),
            r#"{"loader":{"instructions_dir":"docs/rules"},"bridge":{"file_tools":["read","patch"]}}"#,
        )
        .unwrap();

        let cfg = InstillConfig::resolve_with(tmp.path(), no_env);
        assert_eq!(cfg.instructions_dir, PathBuf::from("docs/rules"));
        assert_eq!(cfg.repo_file, PathBuf::from(DEFAULT_REPO_FILE));
        assert_eq!(cfg.file_tools, vec!["read", "patch"]);
    }

    #[test]
    fn env_beats_config_file() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join(".instill")).unwrap();
        fs::write(
            tmp.path().join(".instill").join("config.json"),
            r#"{"bridge":{"file_tools":"read"}}"#,
        )
        .unwrap();

        let cfg = InstillConfig::resolve_with(tmp.path(), |key| match key {
            "INSTILL_FILE_TOOLS" => Some("edit, multiedit ,".to_string()),
            "INSTILL_REPO_FILE" => Some("AGENTS.md".to_string()),
            _ => None,
        });
        assert_eq!(cfg.file_tools, vec!["edit", "multiedit"]);
        assert_eq!(cfg.repo_file, PathBuf::from("AGENTS.md"));
    }

    #[test]
    fn config_value_walks_dotted_keys() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join(".instill")).unwrap();
        fs::write(
            tmp.path().join(".instill").join("config.json"),
            r#"{"a":{"b":{"c":3}}}"#,
        )
        .unwrap();
        assert_eq!(
            config_value(tmp.path(), "a.b.c"),
            Some(serde_json::json!(3))
        );
        assert!(config_value(tmp.path(), "a.x").is_none());
    }

    #[test]
    fn malformed_config_is_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join(".instill")).unwrap();
        fs::write(tmp.path().join(".instill").join("config.json"), "{not json").unwrap();
        let cfg = InstillConfig::resolve_with(tmp.path(), no_env);
        assert_eq!(cfg, InstillConfig::default());
    }
}
