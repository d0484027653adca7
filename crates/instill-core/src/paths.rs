use std::path::{Path, PathBuf};

use crate::config::InstillConfig;

/// All well-known paths for a project.
#[derive(Debug, Clone)]
pub struct InstillPaths {
    pub root: PathBuf,
    pub repo_file: PathBuf,
    pub instructions_dir: PathBuf,
}

impl InstillPaths {
    /// Derive all paths from a project root. Pure computation, no I/O.
    pub fn discover(root: impl Into<PathBuf>, config: &InstillConfig) -> Self {
        let root = root.into();
        Self {
            repo_file: root.join(&config.repo_file),
            instructions_dir: root.join(&config.instructions_dir),
            root,
        }
    }

    /// Path of `path` relative to the project root, with forward slashes.
    ///
    /// Returns `None` when `path` resolves outside the root. Relative inputs
    /// are taken as relative to the root. `.` and `..` components are folded
    /// lexically; absolute inputs that do not share the root's prefix, or
    /// whose remainder climbs above it, are retried after canonicalizing
    /// (the file itself may not exist yet, so its parent is tried too).
    pub fn relative(&self, path: &str) -> Option<String> {
        let normalized = path.replace('\\', "/");
        let candidate = Path::new(&normalized);
        if candidate.is_relative() {
            return normalize_relative(candidate);
        }
        if let Some(relative) = candidate
            .strip_prefix(&self.root)
            .ok()
            .and_then(normalize_relative)
        {
            return Some(relative);
        }
        let canonical = candidate.canonicalize().ok().or_else(|| {
            let parent = candidate.parent()?.canonicalize().ok()?;
            Some(parent.join(candidate.file_name()?))
        })?;
        let rest = canonical.strip_prefix(&self.root).ok()?;
        normalize_relative(rest)
    }
}

/// Fold `.`/`..` components of a relative path. `None` if the path escapes
/// upward, is empty, or carries a root or prefix.
fn normalize_relative(path: &Path) -> Option<String> {
    use std::path::Component;

    let mut parts: Vec<String> = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
