//! Session-scoped injection state.
//!
//! [`SessionTracker`] is the delivery ledger for one host process: which
//! path-scoped instructions each session has already been shown, whether the
//! repository-wide instructions went out, and text staged between the pre-
//! and post-execution halves of a tool call.
//!
//! The ledger is a cache. Conversation history is the real record of what
//! the model has seen, so [`SessionTracker::sync_with_markers`] trims the
//! ledger to whatever markers are still present after the host edits history.
//!
//! Every operation is total: unknown sessions, files, and calls read as
//! false, empty, or `None`.

use std::collections::{HashMap, HashSet};

#[derive(Debug, Default, Clone)]
pub struct SessionTracker {
    delivered_files: HashMap<String, HashSet<String>>,
    repo_delivered: HashSet<String>,
    pending_by_call: HashMap<String, String>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Path-scoped delivery ledger ──

    /// Whether `file_key` has been delivered in `session`.
    pub fn is_file_injected(&self, session: &str, file_key: &str) -> bool {
        self.delivered_files
            .get(session)
            .is_some_and(|files| files.contains(file_key))
    }

    /// Record delivery of `file_key` in `session`. Idempotent.
    pub fn mark_file_injected(&mut self, session: &str, file_key: &str) {
        self.delivered_files
            .entry(session.to_string())
            .or_default()
            .insert(file_key.to_string());
    }

    /// Forget delivery of `file_key` in `session`. No-op if absent.
    pub fn clear_file_marker(&mut self, session: &str, file_key: &str) {
        if let Some(files) = self.delivered_files.get_mut(session) {
            files.remove(file_key);
        }
    }

    /// Snapshot of delivered file keys for `session`.
    pub fn injected_files(&self, session: &str) -> HashSet<String> {
        self.delivered_files
            .get(session)
            .cloned()
            .unwrap_or_default()
    }

    /// Trim every session's ledger to keys present in `present_markers`.
    ///
    /// A pure filter: keys missing from the ledger are never added back.
    /// Sessions left with nothing delivered are dropped.
    pub fn sync_with_markers(&mut self, present_markers: &HashSet<String>) {
        let mut evicted = 0usize;
        for files in self.delivered_files.values_mut() {
            let before = files.len();
            files.retain(|key| present_markers.contains(key));
            evicted += before - files.len();
        }
        self.delivered_files.retain(|_, files| !files.is_empty());
        if evicted > 0 {
            tracing::debug!(
                evicted,
                present = present_markers.len(),
                "resynced delivery ledger with history markers"
            );
        }
    }

    // ── Repository-wide instructions ──

    pub fn has_repo_instructions(&self, session: &str) -> bool {
        self.repo_delivered.contains(session)
    }

    pub fn mark_repo_instructions_injected(&mut self, session: &str) {
        self.repo_delivered.insert(session.to_string());
    }

    // ── Pending per-call payloads ──

    /// Stage `text` for `call_id`, replacing anything already staged.
    pub fn set_pending(&mut self, call_id: &str, text: impl Into<String>) {
        self.pending_by_call.insert(call_id.to_string(), text.into());
    }

    pub fn pending(&self, call_id: &str) -> Option<&str> {
        self.pending_by_call.get(call_id).map(String::as_str)
    }

    /// Take the staged text for `call_id`, removing it.
    pub fn consume_pending(&mut self, call_id: &str) -> Option<String> {
        self.pending_by_call.remove(call_id)
    }

    // ── Lifecycle ──

    /// Drop all delivery state for `session`. Pending call payloads are kept.
    pub fn clear_session(&mut self, session: &str) {
        self.delivered_files.remove(session);
        self.repo_delivered.remove(session);
    }

    /// Number of sessions with any delivery state.
    pub fn session_count(&self) -> usize {
        let mut sessions: HashSet<&str> =
            self.delivered_files.keys().map(String::as_str).collect();
        sessions.extend(self.repo_delivered.iter().map(String::as_str));
        sessions.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending_by_call.len()
    }
}
