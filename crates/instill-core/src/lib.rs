pub mod config;
pub mod frontmatter;
pub mod loader;
pub mod paths;
pub mod record;

pub use config::InstillConfig;
pub use loader::{load, InstructionSet};
pub use paths::InstillPaths;
pub use record::InstructionRecord;

use std::path::PathBuf;

/// Errors raised while loading instructions.
///
/// Only `InvalidRoot` escapes [`load`]; the per-file variants are logged and
/// the offending file is skipped.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("project root is missing or not a directory: {}", .0.display())]
    InvalidRoot(PathBuf),
    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("instruction name {identity:?} cannot appear inside a marker")]
    InvalidIdentity { identity: String },
    #[error("malformed front-matter in {identity}")]
    Frontmatter {
        identity: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid glob {pattern:?} in {identity}")]
    Glob {
        identity: String,
        pattern: String,
        #[source]
        source: globset::Error,
    },
}
