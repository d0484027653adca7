use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};

/// A path-scoped instruction loaded from a `*.instructions.md` file.
///
/// Immutable once built. `identity` is the source file's base name; it keys
/// the delivery ledger and is embedded verbatim in injection markers.
#[derive(Debug, Clone)]
pub struct InstructionRecord {
    pub identity: String,
    pub scope_patterns: Vec<String>,
    pub body: String,
    pub description: Option<String>,
    pub source: PathBuf,
    matcher: GlobSet,
    /// Patterns without a `/`, also tried against the bare file name.
    basename_matcher: GlobSet,
}

impl InstructionRecord {
    /// Compile `scope_patterns` into a matcher.
    ///
    /// Returns the first offending pattern alongside the glob error.
    pub fn new(
        identity: impl Into<String>,
        scope_patterns: Vec<String>,
        body: impl Into<String>,
        source: impl Into<PathBuf>,
    ) -> Result<Self, (String, globset::Error)> {
        let mut full = GlobSetBuilder::new();
        let mut basename = GlobSetBuilder::new();
        for pattern in &scope_patterns {
            let glob = compile(pattern).map_err(|e| (pattern.clone(), e))?;
            if !pattern.contains('/') {
                basename.add(glob.clone());
            }
            full.add(glob);
        }
        let matcher = full.build().map_err(|e| (scope_patterns.join(", "), e))?;
        let basename_matcher = basename
            .build()
            .map_err(|e| (scope_patterns.join(", "), e))?;

        Ok(Self {
            identity: identity.into(),
            scope_patterns,
            body: body.into(),
            description: None,
            source: source.into(),
            matcher,
            basename_matcher,
        })
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Test a project-relative path against this record's scope.
    pub fn matches(&self, candidate: &str) -> bool {
        let normalized = candidate.replace('\\', "/");
        let normalized = normalized.trim_start_matches("./");
        if self.matcher.is_match(normalized) {
            return true;
        }
        let file_name = Path::new(normalized)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("");
        !file_name.is_empty() && self.basename_matcher.is_match(file_name)
    }
}

/// `*` and `?` stop at `/`; `**` crosses directories.
fn compile(pattern: &str) -> Result<Glob, globset::Error> {
    GlobBuilder::new(pattern.trim_start_matches("./"))
        .literal_separator(true)
        .build()
}
