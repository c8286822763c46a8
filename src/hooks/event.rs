//! Event payload posted to the dashboard's `/api/events` endpoint

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

use super::{HookEventName, HookInput};
use crate::host::HostInfo;
use crate::transcript::{TokenUsage, Transcript, TranscriptItem};

/// Session id reported when the hook payload has none
pub const UNKNOWN_SESSION: &str = "unknown";

/// One forwarded hook event
///
/// Fields serialize in declaration order. Payload values are forwarded as
/// raw JSON. `error_message` and the `subagent_*` fields are event-specific:
/// they are omitted for other events and serialize as `null` when the event
/// applies but the payload had no value.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorEvent {
    pub session_id: Value,
    pub hook_event: Value,
    pub timestamp: String,
    pub tool_name: Value,
    pub tool_input: Value,
    pub cwd: Value,
    pub notification_type: Value,
    pub hostname: String,
    pub platform: String,
    pub user: String,
    pub extra: EventExtra,
    pub transcript: Vec<TranscriptItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subagent_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subagent_task: Option<Value>,
}

/// Loosely structured event details
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventExtra {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

impl MonitorEvent {
    /// Build the event for a hook payload, without transcript data
    pub fn new(input: &HookInput, host: &HostInfo, now: DateTime<Utc>) -> Self {
        let event = input.event_name();
        let is_subagent = event.as_ref().is_some_and(HookEventName::is_subagent_event);
        let passthrough = |field: &Option<Value>| field.clone().unwrap_or(Value::Null);

        Self {
            session_id: input
                .session_id
                .clone()
                .unwrap_or_else(|| Value::from(UNKNOWN_SESSION)),
            hook_event: passthrough(&input.hook_event_name),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Micros, false),
            tool_name: passthrough(&input.tool_name),
            tool_input: passthrough(&input.tool_input),
            cwd: passthrough(&input.cwd),
            notification_type: passthrough(&input.notification_type),
            hostname: host.hostname.clone(),
            platform: host.platform.clone(),
            user: host.user.clone(),
            extra: EventExtra {
                source: input.source.clone(),
                reason: input.reason.clone(),
                usage: None,
            },
            transcript: Vec::new(),
            error_message: (event == Some(HookEventName::PostToolUseFailure))
                .then(|| input.failure_message()),
            subagent_id: is_subagent.then(|| input.subagent_id()),
            subagent_task: is_subagent.then(|| input.subagent_task()),
        }
    }

    /// Build the event and attach the transcript when the hook calls for it
    pub fn from_hook(
        input: &HookInput,
        host: &HostInfo,
        now: DateTime<Utc>,
        max_transcript_messages: usize,
    ) -> Self {
        let mut event = Self::new(input, host, now);

        let Some(name) = input.event_name().filter(|name| name.wants_transcript()) else {
            return event;
        };

        let Some(path) = input.transcript_path() else {
            log::info!("{name}: no transcript_path provided");
            return event;
        };

        if !Path::new(path).exists() {
            log::warn!("{name}: transcript file not found: {path}");
            return event;
        }

        let transcript = Transcript::read(Path::new(path), max_transcript_messages)
            .unwrap_or_else(|e| {
                log::warn!("{name}: {e}");
                Transcript::default()
            });
        event.attach_transcript(&transcript);

        log::info!(
            "{name}: read {} raw, {} simplified from {path}",
            transcript.len(),
            event.transcript.len()
        );

        event
    }

    /// Replace the transcript items and usage totals
    pub fn attach_transcript(&mut self, transcript: &Transcript) {
        self.transcript = transcript.simplify();
        self.extra.usage = transcript.usage();
    }
}
