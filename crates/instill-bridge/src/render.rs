//! Injected text and the marker wire format.
//!
//! Each path-scoped block is wrapped in
//! `<copilot-instruction:IDENTITY>` … `</copilot-instruction:IDENTITY>`.
//! The opening tag is what [`extract_markers`] scrapes back out of history,
//! so the format here and the pattern there must stay in lockstep.

use std::collections::HashSet;
use std::sync::LazyLock;

use instill_core::InstructionRecord;
use regex::Regex;

/// Opening tag prefix for path-scoped instruction blocks.
pub const MARKER_OPEN: &str = "<copilot-instruction:";

/// Closing tag prefix for path-scoped instruction blocks.
pub const MARKER_CLOSE: &str = "</copilot-instruction:";

/// Header placed above the repository-wide instructions.
pub const REPO_HEADER: &str = "## Repository Instructions";

static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<copilot-instruction:([^>]+)>").unwrap());

/// Wrap one path-scoped instruction in its marker pair.
pub fn instruction_block(record: &InstructionRecord) -> String {
    format!(
        "{MARKER_OPEN}{id}>\n## Path-Specific Instructions (applies to: {scope})\n\n{body}\n{MARKER_CLOSE}{id}>",
        id = record.identity,
        scope = record.scope_patterns.join(", "),
        body = record.body.trim_end(),
    )
}

/// Blocks for a single tool call, separated by a blank line.
pub fn instruction_blocks(records: &[&InstructionRecord]) -> Option<String> {
    if records.is_empty() {
        return None;
    }
    Some(
        records
            .iter()
            .map(|r| instruction_block(r))
            .collect::<Vec<_>>()
            .join("\n\n"),
    )
}

/// Repository-wide instructions as a system-prompt section. No marker.
pub fn repo_section(text: &str) -> String {
    format!("{REPO_HEADER}\n\n{text}")
}

/// Append injected text after a tool's own output.
pub fn append_to_output(output: &str, injected: &str) -> String {
    format!("{output}\n\n{injected}")
}

/// Distinct identities of every opening marker in `text`, added to `found`.
pub fn extract_markers(text: &str, found: &mut HashSet<String>) {
    if !text.contains(MARKER_OPEN) {
        return;
    }
    for cap in MARKER_RE.captures_iter(text) {
        found.insert(cap[1].to_string());
    }
}
