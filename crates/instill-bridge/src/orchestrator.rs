use std::collections::HashSet;
use std::path::Path;

use instill_core::{InstillConfig, InstillPaths, InstructionRecord, InstructionSet, LoadError};
use instill_session::SessionTracker;

use crate::host::{HostEvent, Message, ToolCall, ToolOutput};
use crate::render;

/// Argument keys that may carry a tool's target file, in lookup order.
const PATH_ARG_KEYS: &[&str] = &["filePath", "file_path", "path"];

/// Binds loaded instructions and the delivery ledger to host hooks.
///
/// Hooks never fail. Anything the bridge does not understand (non-file tools,
/// missing or non-string paths, paths outside the project) is a no-op.
#[derive(Debug)]
pub struct Orchestrator {
    paths: InstillPaths,
    repo: Option<String>,
    scoped: Vec<InstructionRecord>,
    file_tools: Vec<String>,
    tracker: SessionTracker,
}

impl Orchestrator {
    /// Load instructions for `root` using the resolved workspace config.
    pub fn load(root: &Path) -> Result<Self, LoadError> {
        let config = InstillConfig::resolve(root);
        Self::load_with(root, &config)
    }

    pub fn load_with(root: &Path, config: &InstillConfig) -> Result<Self, LoadError> {
        let root = root
            .canonicalize()
            .map_err(|_| LoadError::InvalidRoot(root.to_path_buf()))?;
        let set = instill_core::load(&root, config)?;
        Ok(Self::new(&root, set, config))
    }

    /// Build from an already-loaded instruction set.
    pub fn new(root: &Path, set: InstructionSet, config: &InstillConfig) -> Self {
        Self {
            paths: InstillPaths::discover(root, config),
            repo: set.repo,
            scoped: set.scoped,
            file_tools: config.file_tools.clone(),
            tracker: SessionTracker::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.paths.root
    }

    pub fn repo_instructions(&self) -> Option<&str> {
        self.repo.as_deref()
    }

    pub fn instructions(&self) -> &[InstructionRecord] {
        &self.scoped
    }

    pub fn tracker(&self) -> &SessionTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut SessionTracker {
        &mut self.tracker
    }

    /// Project-relative, forward-slash form of a tool's target path.
    pub fn relative_path(&self, path: &str) -> Option<String> {
        self.paths.relative(path)
    }

    /// Records whose scope covers a project-relative path.
    pub fn matching(&self, relative_path: &str) -> Vec<&InstructionRecord> {
        self.scoped
            .iter()
            .filter(|r| r.matches(relative_path))
            .collect()
    }

    // ── Hook: system prompt ──

    /// Append the repository-wide instructions to the outgoing system prompt.
    ///
    /// Emitted on every turn; system prompts are not part of history.
    pub fn system_prompt(&mut self, session_id: Option<&str>, system: &mut Vec<String>) {
        let Some(text) = &self.repo else {
            return;
        };
        system.push(render::repo_section(text));
        if let Some(session) = session_id.filter(|s| !s.is_empty()) {
            if !self.tracker.has_repo_instructions(session) {
                tracing::debug!(session, "repository instructions first sent");
                self.tracker.mark_repo_instructions_injected(session);
            }
        }
    }

    // ── Hook: compaction ──

    /// Carry the repository-wide instructions through history summarization.
    pub fn compacting(&mut self, session_id: &str, context: &mut Vec<String>) {
        if let Some(text) = &self.repo {
            tracing::debug!(session = session_id, "preserving repository instructions");
            context.push(render::repo_section(text));
        }
    }

    // ── Hook: before tool execution ──

    /// Decide which path-scoped instructions this call delivers and stage them.
    ///
    /// Delivery is recorded immediately, before the tool runs.
    pub fn before_tool(&mut self, call: &ToolCall, args: &serde_json::Value) {
        if !self.file_tools.iter().any(|t| t == &call.tool) {
            return;
        }
        let Some(raw_path) = target_path(args) else {
            return;
        };
        let Some(relative) = self.relative_path(raw_path) else {
            tracing::debug!(tool = %call.tool, path = raw_path, "path outside project root");
            return;
        };

        let session = call.session_id.as_str();
        let matched: Vec<&InstructionRecord> = self
            .scoped
            .iter()
            .filter(|r| !self.tracker.is_file_injected(session, &r.identity))
            .filter(|r| r.matches(&relative))
            .collect();

        let Some(text) = render::instruction_blocks(&matched) else {
            return;
        };
        for record in &matched {
            self.tracker.mark_file_injected(session, &record.identity);
        }
        tracing::debug!(
            session,
            call = %call.call_id,
            path = %relative,
            injected = ?matched.iter().map(|r| r.identity.as_str()).collect::<Vec<_>>(),
            "staged path-scoped instructions"
        );
        self.tracker.set_pending(&call.call_id, text);
    }

    // ── Hook: after tool execution ──

    /// Append staged instructions to the tool's output.
    pub fn after_tool(&mut self, call: &ToolCall, output: &mut ToolOutput) {
        let Some(staged) = self.tracker.consume_pending(&call.call_id) else {
            return;
        };
        output.output = render::append_to_output(&output.output, &staged);
    }

    // ── Hook: message transform ──

    /// Resync the delivery ledger with markers present in `messages`.
    pub fn transform_messages(&mut self, messages: &[Message]) {
        let mut present = HashSet::new();
        for part in messages.iter().flat_map(|m| m.parts.iter()) {
            if let Some(output) = part.tool_output() {
                render::extract_markers(output, &mut present);
            }
        }
        self.tracker.sync_with_markers(&present);
    }

    // ── Hook: session events ──

    pub fn on_event(&mut self, event: &HostEvent) {
        if let Some(session) = event.invalidated_session() {
            tracing::debug!(session, "clearing session delivery state");
            self.tracker.clear_session(session);
        }
    }
}

/// First string-valued path argument.
fn target_path(args: &serde_json::Value) -> Option<&str> {
    PATH_ARG_KEYS
        .iter()
        .find_map(|key| args.get(*key))
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
}
