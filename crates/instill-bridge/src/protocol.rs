//! Line-delimited JSON hook protocol.
//!
//! The host plugin writes one request per line, tagged by `"hook"`, and reads
//! one response line back. Requests are applied to a single long-lived
//! [`Orchestrator`] so session state survives across hooks.
//!
//! Fail-open: a line that cannot be decoded gets `{"ok":false,"error":...}`
//! and the server keeps going.

use serde::Deserialize;
use serde_json::json;

use crate::host::{HostEvent, Message, ToolCall, ToolOutput};
use crate::orchestrator::Orchestrator;

#[derive(Debug, Deserialize)]
#[serde(tag = "hook", rename_all = "snake_case")]
pub enum HookRequest {
    SystemPrompt {
        #[serde(default, alias = "sessionID", alias = "sessionId")]
        session_id: Option<String>,
        #[serde(default)]
        system: Vec<String>,
    },
    Compacting {
        #[serde(default, alias = "sessionID", alias = "sessionId")]
        session_id: String,
        #[serde(default)]
        context: Vec<String>,
    },
    BeforeTool {
        #[serde(alias = "sessionID", alias = "sessionId")]
        session_id: String,
        #[serde(alias = "callID", alias = "callId")]
        call_id: String,
        tool: String,
        #[serde(default)]
        args: serde_json::Value,
    },
    AfterTool {
        #[serde(alias = "sessionID", alias = "sessionId")]
        session_id: String,
        #[serde(alias = "callID", alias = "callId")]
        call_id: String,
        tool: String,
        #[serde(default)]
        output: ToolOutput,
    },
    TransformMessages {
        #[serde(default)]
        messages: Vec<Message>,
    },
    Event {
        event: HostEvent,
    },
}

/// Apply one decoded request and build its response payload.
pub fn dispatch(orch: &mut Orchestrator, request: HookRequest) -> serde_json::Value {
    match request {
        HookRequest::SystemPrompt {
            session_id,
            mut system,
        } => {
            orch.system_prompt(session_id.as_deref(), &mut system);
            json!({ "ok": true, "system": system })
        }
        HookRequest::Compacting {
            session_id,
            mut context,
        } => {
            orch.compacting(&session_id, &mut context);
            json!({ "ok": true, "context": context })
        }
        HookRequest::BeforeTool {
            session_id,
            call_id,
            tool,
            args,
        } => {
            let call = ToolCall {
                session_id,
                call_id,
                tool,
            };
            orch.before_tool(&call, &args);
            json!({ "ok": true })
        }
        HookRequest::AfterTool {
            session_id,
            call_id,
            tool,
            mut output,
        } => {
            let call = ToolCall {
                session_id,
                call_id,
                tool,
            };
            orch.after_tool(&call, &mut output);
            json!({ "ok": true, "output": output })
        }
        HookRequest::TransformMessages { messages } => {
            orch.transform_messages(&messages);
            json!({ "ok": true })
        }
        HookRequest::Event { event } => {
            orch.on_event(&event);
            json!({ "ok": true })
        }
    }
}

/// Handle one raw protocol line. Blank lines produce no response.
pub fn handle_line(orch: &mut Orchestrator, line: &str) -> anyhow::Result<Option<String>> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    let response = match serde_json::from_str::<HookRequest>(line) {
        Ok(request) => dispatch(orch, request),
        Err(e) => {
            tracing::warn!(error = %e, "unreadable hook request");
            json!({ "ok": false, "error": e.to_string() })
        }
    };
    Ok(Some(serde_json::to_string(&response)?))
}
