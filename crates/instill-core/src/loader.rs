//! Instruction discovery.
//!
//! Reads the repository-wide instruction file and every
//! `*.instructions.md` in the instructions directory. Missing files and
//! directories yield empty results; a broken individual file is logged and
//! skipped.

use std::fs;
use std::path::Path;

use crate::config::InstillConfig;
use crate::frontmatter::parse_instruction;
use crate::paths::InstillPaths;
use crate::record::InstructionRecord;
use crate::LoadError;

/// File-name suffix of path-scoped instruction files.
pub const INSTRUCTION_SUFFIX: &str = ".instructions.md";

/// Everything loaded for one project.
#[derive(Debug, Clone, Default)]
pub struct InstructionSet {
    pub repo: Option<String>,
    pub scoped: Vec<InstructionRecord>,
}

impl InstructionSet {
    pub fn is_empty(&self) -> bool {
        self.repo.is_none() && self.scoped.is_empty()
    }
}

/// Load all instructions under `root`.
///
/// Fails only when `root` is not a usable directory.
pub fn load(root: &Path, config: &InstillConfig) -> Result<InstructionSet, LoadError> {
    if !root.is_dir() {
        return Err(LoadError::InvalidRoot(root.to_path_buf()));
    }
    let paths = InstillPaths::discover(root, config);

    let repo = load_repo_instructions(&paths.repo_file);
    let scoped = load_scoped_instructions(&paths.instructions_dir);

    tracing::info!(
        root = %root.display(),
        repo = repo.is_some(),
        scoped = scoped.len(),
        "loaded instructions"
    );
    Ok(InstructionSet { repo, scoped })
}

/// Read the repository-wide instruction file. Blank files count as absent.
pub fn load_repo_instructions(path: &Path) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Load every `*.instructions.md` in `dir`, sorted by file name.
///
/// Files without any `applyTo` glob are not path-scoped and are skipped.
pub fn load_scoped_instructions(dir: &Path) -> Vec<InstructionRecord> {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => {
            tracing::debug!(dir = %dir.display(), "no instructions directory");
            return vec![];
        }
    };

    let mut files: Vec<_> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(INSTRUCTION_SUFFIX))
        })
        .collect();
    files.sort();

    let mut records = Vec::new();
    for path in files {
        match load_instruction_file(&path) {
            Ok(Some(record)) => {
                tracing::debug!(
                    identity = %record.identity,
                    patterns = ?record.scope_patterns,
                    "loaded path-scoped instruction"
                );
                records.push(record);
            }
            Ok(None) => {
                tracing::debug!(path = %path.display(), "skipping instruction without applyTo");
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping instruction file");
            }
        }
    }
    records
}

/// Parse a single instruction file. `Ok(None)` when it has no scope.
pub fn load_instruction_file(path: &Path) -> Result<Option<InstructionRecord>, LoadError> {
    let identity = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if !is_marker_safe(&identity) {
        return Err(LoadError::InvalidIdentity { identity });
    }
    let raw = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed = parse_instruction(&raw).map_err(|source| LoadError::Frontmatter {
        identity: identity.clone(),
        source,
    })?;

    let patterns = parsed.frontmatter.apply_to();
    if patterns.is_empty() {
        return Ok(None);
    }

    let record = InstructionRecord::new(identity.clone(), patterns, parsed.body, path)
        .map_err(|(pattern, source)| LoadError::Glob {
            identity,
            pattern,
            source,
        })?
        .with_description(parsed.frontmatter.description);
    Ok(Some(record))
}

/// Identities are carried verbatim in `<copilot-instruction:ID>` tags.
fn is_marker_safe(identity: &str) -> bool {
    !identity.is_empty() && !identity.contains(['>', '<', '\n', '\r'])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn load_full_project() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write(root, ".github/copilot-instructions.md", "Follow TDD.\n\n");
        write(
            root,
            ".github/instructions/ts.instructions.md",
            "---\napplyTo: \"**/*.ts\"\n---\nUse strict types.\n",
        );
        write(
            root,
            ".github/instructions/all.instructions.md",
            "---\napplyTo: \"src/**/*\"\ndescription: Source tree\n---\nKeep modules small.\n",
        );

        let set = load(root, &InstillConfig::default()).unwrap();
        assert_eq!(set.repo.as_deref(), Some("Follow TDD."));
        let ids: Vec<_> = set.scoped.iter().map(|r| r.identity.as_str()).collect();
        assert_eq!(ids, vec!["all.instructions.md", "ts.instructions.md"]);
        assert_eq!(set.scoped[0].description.as_deref(), Some("Source tree"));
        assert_eq!(set.scoped[1].body, "Use strict types.\n");
        assert!(set.scoped[1].matches("src/a.ts"));
    }

    #[test]
    fn missing_directories_yield_empty_set() {
        let tmp = tempfile::tempdir().unwrap();
        let set = load(tmp.path(), &InstillConfig::default()).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn invalid_root_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope");
        let err = load(&missing, &InstillConfig::default()).unwrap_err();
        assert!(matches!(err, LoadError::InvalidRoot(_)));

        let file = tmp.path().join("file.txt");
        fs::write(&file, "x").unwrap();
        assert!(load(&file, &InstillConfig::default()).is_err());
    }

    #[test]
    fn blank_repo_file_is_absent() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), ".github/copilot-instructions.md", "  \n\n");
        let set = load(tmp.path(), &InstillConfig::default()).unwrap();
        assert!(set.repo.is_none());
    }

    #[test]
    fn skips_unscoped_and_foreign_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join(".github/instructions");
        write(tmp.path(), ".github/instructions/README.md", "---\napplyTo: '**'\n---\nno");
        write(tmp.path(), ".github/instructions/plain.instructions.md", "no front-matter");
        write(
            tmp.path(),
            ".github/instructions/bad-glob.instructions.md",
            "---\napplyTo: 'src/['\n---\nbody",
        );
        write(
            tmp.path(),
            ".github/instructions/bad-yaml.instructions.md",
            "---\napplyTo: [oops\n---\nbody",
        );
        write(
            tmp.path(),
            ".github/instructions/ok.instructions.md",
            "---\napplyTo: '**/*.md'\n---\nbody",
        );
        fs::create_dir_all(dir.join("nested.instructions.md")).unwrap();

        let records = load_scoped_instructions(&dir);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].identity, "ok.instructions.md");
    }

    #[test]
    fn custom_instructions_dir_from_config() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "docs/rules/rs.instructions.md",
            "---\napplyTo: '**/*.rs'\n---\nNo unwrap.",
        );
        let config = InstillConfig {
            instructions_dir: "docs/rules".into(),
            ..InstillConfig::default()
        };
        let set = load(tmp.path(), &config).unwrap();
        assert_eq!(set.scoped.len(), 1);
        assert_eq!(set.scoped[0].identity, "rs.instructions.md");
    }

    #[test]
    fn unquoted_globs_are_loaded() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            ".github/instructions/ts.instructions.md",
            "---\napplyTo: **/*.ts\n---\nUse strict types.",
        );
        write(
            tmp.path(),
            ".github/instructions/py.instructions.md",
            "---\napplyTo: *.py\n---\nUse black.",
        );
        let set = load(tmp.path(), &InstillConfig::default()).unwrap();
        assert_eq!(set.scoped.len(), 2);
        assert!(set.scoped[0].matches("tools/gen.py"));
        assert!(set.scoped[1].matches("src/deep/a.ts"));
    }

    #[test]
    fn names_that_break_markers_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join(".github/instructions");
        let rule = "---\napplyTo: '**/*.ts'\n---\nbody";
        write(tmp.path(), ".github/instructions/a>b.instructions.md", rule);
        write(tmp.path(), ".github/instructions/ok.instructions.md", rule);

        let err = load_instruction_file(&dir.join("a>b.instructions.md")).unwrap_err();
        match err {
            LoadError::InvalidIdentity { identity } => assert_eq!(identity, "a>b.instructions.md"),
            other => panic!("unexpected error: {other}"),
        }

        let records = load_scoped_instructions(&dir);
        let ids: Vec<_> = records.iter().map(|r| r.identity.as_str()).collect();
        assert_eq!(ids, vec!["ok.instructions.md"]);
    }

    #[test]
    fn load_file_reports_glob_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("x.instructions.md");
        fs::write(&path, "---\napplyTo: 'a/['\n---\nbody").unwrap();
        let err = load_instruction_file(&path).unwrap_err();
        match err {
            LoadError::Glob {
                identity, pattern, ..
            } => {
                assert_eq!(identity, "x.instructions.md");
                assert_eq!(pattern, "a/[");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
