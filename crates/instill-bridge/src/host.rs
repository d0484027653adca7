//! Shapes the host hands to hooks.
//!
//! Deserialization is lenient: unknown part types, tool states, and events
//! decode to catch-all variants so the bridge can ignore them.

use serde::{Deserialize, Serialize};

/// Identity of one tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ToolCall {
    #[serde(alias = "sessionID", alias = "sessionId")]
    pub session_id: String,
    #[serde(alias = "callID", alias = "callId")]
    pub call_id: String,
    pub tool: String,
}

impl ToolCall {
    pub fn new(session_id: &str, call_id: &str, tool: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            call_id: call_id.to_string(),
            tool: tool.to_string(),
        }
    }
}

/// Mutable result of a tool execution.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ToolOutput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// One message of the conversation history.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Message {
    #[serde(default)]
    pub info: serde_json::Value,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Part {
    Text {
        #[serde(default)]
        text: String,
    },
    Tool {
        #[serde(default, alias = "callID")]
        call_id: String,
        #[serde(default)]
        tool: String,
        state: ToolState,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ToolState {
    Pending,
    Running,
    Completed {
        #[serde(default)]
        output: String,
    },
    Error {
        #[serde(default)]
        error: String,
    },
    #[serde(other)]
    Unknown,
}

impl Part {
    /// Output text of a completed tool call.
    pub fn tool_output(&self) -> Option<&str> {
        match self {
            Part::Tool {
                state: ToolState::Completed { output },
                ..
            } => Some(output),
            _ => None,
        }
    }
}

/// Session lifecycle events relevant to the delivery ledger.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum HostEvent {
    /// History was summarized; everything injected so far is gone.
    #[serde(rename = "session.compacted")]
    SessionCompacted { properties: CompactedProps },
    #[serde(rename = "session.deleted")]
    SessionDeleted { properties: DeletedProps },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CompactedProps {
    #[serde(rename = "sessionID", alias = "sessionId", alias = "session_id")]
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DeletedProps {
    pub info: SessionInfo,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SessionInfo {
    pub id: String,
}

impl HostEvent {
    /// Session whose delivery state this event invalidates.
    pub fn invalidated_session(&self) -> Option<&str> {
        match self {
            HostEvent::SessionCompacted { properties } => Some(&properties.session_id),
            HostEvent::SessionDeleted { properties } => Some(&properties.info.id),
            HostEvent::Other => None,
        }
    }
}
