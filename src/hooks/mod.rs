pub mod event;
pub mod forward;

use crate::error::MonitorError;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;

pub use event::{EventExtra, MonitorEvent};

/// Hook input from Claude Code
/// See: https://docs.anthropic.com/en/docs/claude-code/hooks
///
/// One struct covers every hook event; fields a given event does not carry
/// are `None`. Values are kept as raw JSON and forwarded as-is, so an
/// unexpected type in one field never drops the event. Unknown fields are
/// ignored.
#[derive(Debug, Default, Deserialize)]
pub struct HookInput {
    /// Session identifier
    pub session_id: Option<Value>,

    /// Hook event name (e.g., "SessionStart", "PreToolUse", "Stop")
    pub hook_event_name: Option<Value>,

    /// Path to the transcript JSONL file
    pub transcript_path: Option<Value>,

    /// Current working directory
    pub cwd: Option<Value>,

    /// Tool name for tool events (e.g., "Bash", "Write", "mcp__server__tool")
    pub tool_name: Option<Value>,

    /// Tool input - raw JSON (varies by tool)
    pub tool_input: Option<Value>,

    /// Notification kind for Notification events (e.g., "permission_prompt")
    pub notification_type: Option<Value>,

    /// SessionStart source ("startup", "resume", "clear", "compact").
    /// `Some` whenever the key is present, `Some(Value::Null)` for explicit null.
    #[serde(default, deserialize_with = "present")]
    pub source: Option<Value>,

    /// SessionEnd reason, with the same presence rule as `source`
    #[serde(default, deserialize_with = "present")]
    pub reason: Option<Value>,

    /// PostToolUseFailure error text
    pub error: Option<Value>,
    pub error_message: Option<Value>,

    /// SubagentStart/SubagentStop identifiers
    pub subagent_id: Option<Value>,
    pub agent_id: Option<Value>,
    pub task: Option<Value>,
    pub description: Option<Value>,
}

/// Marks a field as present whenever its key appears, including explicit null
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl HookInput {
    /// Parse a hook payload; anything other than a JSON object is rejected
    pub fn from_slice(bytes: &[u8]) -> Result<Self, MonitorError> {
        match serde_json::from_slice::<Value>(bytes)? {
            value @ Value::Object(_) => Ok(serde_json::from_value(value)?),
            other => Err(MonitorError::Payload {
                found: json_type_name(&other),
            }),
        }
    }

    pub fn event_name(&self) -> Option<HookEventName> {
        self.hook_event_name
            .as_ref()
            .and_then(Value::as_str)
            .map(|name| HookEventName::from(name.to_string()))
    }

    /// Non-empty transcript path, if any
    pub fn transcript_path(&self) -> Option<&str> {
        self.transcript_path
            .as_ref()
            .and_then(Value::as_str)
            .filter(|p| !p.is_empty())
    }

    /// Error text for a failed tool call, preferring `error` over `error_message`
    pub fn failure_message(&self) -> Value {
        first_truthy(&self.error, &self.error_message)
    }

    pub fn subagent_id(&self) -> Value {
        first_truthy(&self.subagent_id, &self.agent_id)
    }

    pub fn subagent_task(&self) -> Value {
        first_truthy(&self.task, &self.description)
    }
}

/// `primary` when it holds a truthy value, otherwise `fallback` as-is
fn first_truthy(primary: &Option<Value>, fallback: &Option<Value>) -> Value {
    primary
        .as_ref()
        .filter(|v| is_truthy(v))
        .or(fallback.as_ref())
        .cloned()
        .unwrap_or(Value::Null)
}

/// Null, false, zero and empty strings/arrays/objects count as absent
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Claude Code lifecycle hook names
///
/// Unrecognised names are kept verbatim in [`HookEventName::Other`] so new
/// host events still reach the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HookEventName {
    SessionStart,
    SessionEnd,
    UserPromptSubmit,
    PreToolUse,
    PostToolUse,
    PostToolUseFailure,
    PermissionRequest,
    Notification,
    Stop,
    SubagentStart,
    SubagentStop,
    PreCompact,
    Other(String),
}

impl HookEventName {
    /// Every named event, in the order hooks.json lists them
    pub const KNOWN: [HookEventName; 12] = [
        Self::SessionStart,
        Self::SessionEnd,
        Self::UserPromptSubmit,
        Self::PreToolUse,
        Self::PostToolUse,
        Self::PostToolUseFailure,
        Self::PermissionRequest,
        Self::Notification,
        Self::Stop,
        Self::SubagentStart,
        Self::SubagentStop,
        Self::PreCompact,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::SessionStart => "SessionStart",
            Self::SessionEnd => "SessionEnd",
            Self::UserPromptSubmit => "UserPromptSubmit",
            Self::PreToolUse => "PreToolUse",
            Self::PostToolUse => "PostToolUse",
            Self::PostToolUseFailure => "PostToolUseFailure",
            Self::PermissionRequest => "PermissionRequest",
            Self::Notification => "Notification",
            Self::Stop => "Stop",
            Self::SubagentStart => "SubagentStart",
            Self::SubagentStop => "SubagentStop",
            Self::PreCompact => "PreCompact",
            Self::Other(name) => name,
        }
    }

    /// Events that attach the session transcript and token usage
    pub fn wants_transcript(&self) -> bool {
        matches!(
            self,
            Self::Stop | Self::SessionStart | Self::PostToolUse | Self::PostToolUseFailure
        )
    }

    /// Events scoped to a tool call, registered with a `*` matcher
    pub fn is_tool_event(&self) -> bool {
        matches!(
            self,
            Self::PreToolUse | Self::PostToolUse | Self::PostToolUseFailure | Self::PermissionRequest
        )
    }

    pub fn is_subagent_event(&self) -> bool {
        matches!(self, Self::SubagentStart | Self::SubagentStop)
    }
}

impl From<String> for HookEventName {
    fn from(name: String) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|known| known.as_str() == name)
            .unwrap_or(Self::Other(name))
    }
}

impl From<HookEventName> for String {
    fn from(name: HookEventName) -> Self {
        match name {
            HookEventName::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for HookEventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> HookInput {
        HookInput::from_slice(value.to_string().as_bytes()).expect("hook input")
    }

    #[test]
    fn test_event_name_round_trip() {
        assert_eq!(HookEventName::from("Stop".to_string()), HookEventName::Stop);
        assert_eq!(
            HookEventName::from("FutureEvent".to_string()),
            HookEventName::Other("FutureEvent".to_string())
        );
        assert_eq!(String::from(HookEventName::PreCompact), "PreCompact");
    }

    #[test]
    fn test_non_string_event_name_has_no_kind() {
        assert_eq!(parse(json!({"hook_event_name": 3})).event_name(), None);
        assert_eq!(
            parse(json!({"hook_event_name": "Stop"})).event_name(),
            Some(HookEventName::Stop)
        );
    }

    #[test]
    fn test_source_presence_is_tracked() {
        assert_eq!(parse(json!({})).source, None);
        assert_eq!(parse(json!({"source": null})).source, Some(Value::Null));
        assert_eq!(parse(json!({"source": "startup"})).source, Some(json!("startup")));
    }

    #[test]
    fn test_failure_message_prefers_truthy_error() {
        let input = parse(json!({"error": "boom", "error_message": "other"}));
        assert_eq!(input.failure_message(), json!("boom"));

        let input = parse(json!({"error": "", "error_message": "other"}));
        assert_eq!(input.failure_message(), json!("other"));

        let input = parse(json!({"error": {"code": 1}}));
        assert_eq!(input.failure_message(), json!({"code": 1}));

        let input = parse(json!({"error": {}, "error_message": ""}));
        assert_eq!(input.failure_message(), json!(""));

        assert_eq!(parse(json!({})).failure_message(), Value::Null);
    }

    #[test]
    fn test_subagent_fallbacks() {
        let input = parse(json!({"subagent_id": 0, "agent_id": "a-1", "description": "review code"}));
        assert_eq!(input.subagent_id(), json!("a-1"));
        assert_eq!(input.subagent_task(), json!("review code"));
    }

    #[test]
    fn test_mistyped_fields_are_kept() {
        let input = parse(json!({"session_id": 42, "cwd": ["/a"], "hook_event_name": "Stop"}));
        assert_eq!(input.session_id, Some(json!(42)));
        assert_eq!(input.cwd, Some(json!(["/a"])));
    }

    #[test]
    fn test_transcript_path_must_be_non_empty_string() {
        assert_eq!(parse(json!({"transcript_path": ""})).transcript_path(), None);
        assert_eq!(parse(json!({"transcript_path": 7})).transcript_path(), None);
        assert_eq!(
            parse(json!({"transcript_path": "/tmp/t.jsonl"})).transcript_path(),
            Some("/tmp/t.jsonl")
        );
    }

    #[test]
    fn test_payload_errors() {
        assert!(matches!(
            HookInput::from_slice(b"[1, 2]"),
            Err(MonitorError::Payload { found: "array" })
        ));
        assert!(matches!(
            HookInput::from_slice(b"not json"),
            Err(MonitorError::InvalidJson(_))
        ));
        assert!(HookInput::from_slice(br#"{"hook_event_name": "Stop"}"#).is_ok());
    }
}
