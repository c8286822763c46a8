//! Claude Code transcript reading
//!
//! A transcript is a JSONL file with one entry per line. Only `user` and
//! `assistant` entries carry conversation content; everything else
//! (summaries, system records, file snapshots) is dropped on read.
//!
//! Entries are condensed into [`TranscriptItem`]s before being attached to an
//! event, and assistant entries contribute to the session's [`TokenUsage`].

use serde::Serialize;
use serde_json::{Map, Value};
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{MonitorError, Result};

/// Maximum characters of message text forwarded per item
pub const MAX_TEXT_CHARS: usize = 2000;

/// Speaker of a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    User,
    Assistant,
}

impl EntryKind {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One conversation entry from the transcript file
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptEntry {
    pub kind: EntryKind,
    pub uuid: Option<String>,
    pub timestamp: Option<String>,
    /// The entry's `message` object, empty when absent
    pub message: Map<String, Value>,
}

impl TranscriptEntry {
    /// Parse a raw JSONL record, returning `None` for non-conversation entries
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut obj) = value else {
            return None;
        };

        let kind = obj.get("type").and_then(Value::as_str).and_then(EntryKind::parse)?;
        let message = match obj.remove("message") {
            Some(Value::Object(m)) => m,
            _ => Map::new(),
        };

        Some(Self {
            kind,
            uuid: string_field(&obj, "uuid"),
            timestamp: string_field(&obj, "timestamp"),
            message,
        })
    }

    /// `message.role`, falling back to the entry type
    pub fn role(&self) -> &str {
        self.message
            .get("role")
            .and_then(Value::as_str)
            .unwrap_or_else(|| self.kind.as_str())
    }

    fn content(&self) -> Option<&Value> {
        self.message.get("content")
    }
}

/// Condensed transcript item sent to the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TranscriptItem {
    Message {
        role: String,
        text: String,
        uuid: Option<String>,
        timestamp: Option<String>,
    },
    ToolUse {
        role: String,
        tool_name: Option<String>,
        tool_input: Value,
        tool_use_id: Option<String>,
        uuid: Option<String>,
        timestamp: Option<String>,
    },
}

/// Cumulative token counts across assistant turns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read_tokens: u64,
    pub cache_create_tokens: u64,
}

/// The retained tail of a session transcript
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    pub entries: Vec<TranscriptEntry>,
}

impl Transcript {
    /// Read the newest `max_entries` conversation entries from a JSONL file
    ///
    /// Blank lines, malformed JSON and non-conversation records are skipped.
    pub fn read(path: &Path, max_entries: usize) -> Result<Self> {
        let to_err = |source| MonitorError::Transcript {
            path: path.display().to_string(),
            source,
        };

        let file = std::fs::File::open(path).map_err(to_err)?;
        let mut entries = Vec::new();

        for line in BufReader::new(file).lines() {
            let line = line.map_err(to_err)?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Ok(value) = serde_json::from_str::<Value>(line) else {
                continue;
            };
            if let Some(entry) = TranscriptEntry::from_value(value) {
                entries.push(entry);
            }
        }

        Ok(Self::from_entries(entries, max_entries))
    }

    /// Keep only the newest `max_entries` of already parsed entries
    pub fn from_entries(mut entries: Vec<TranscriptEntry>, max_entries: usize) -> Self {
        if entries.len() > max_entries {
            entries.drain(..entries.len() - max_entries);
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flatten entries into message and tool-use items, in transcript order
    pub fn simplify(&self) -> Vec<TranscriptItem> {
        let mut items = Vec::new();

        for entry in &self.entries {
            if let Some(text) = entry.content().and_then(extract_text) {
                if !text.is_empty() {
                    items.push(TranscriptItem::Message {
                        role: entry.role().to_string(),
                        text: truncate_chars(&text, MAX_TEXT_CHARS),
                        uuid: entry.uuid.clone(),
                        timestamp: entry.timestamp.clone(),
                    });
                }
            }

            let Some(Value::Array(blocks)) = entry.content() else {
                continue;
            };
            for block in blocks.iter().filter_map(Value::as_object) {
                if block.get("type").and_then(Value::as_str) != Some("tool_use") {
                    continue;
                }
                items.push(TranscriptItem::ToolUse {
                    role: EntryKind::Assistant.as_str().to_string(),
                    tool_name: string_field(block, "name"),
                    tool_input: block.get("input").cloned().unwrap_or(Value::Null),
                    tool_use_id: string_field(block, "id"),
                    uuid: entry.uuid.clone(),
                    timestamp: entry.timestamp.clone(),
                });
            }
        }

        items
    }

    /// Sum token usage over assistant entries, saturating at `u64::MAX`
    ///
    /// Returns `None` when neither input nor output tokens were recorded.
    pub fn usage(&self) -> Option<TokenUsage> {
        let mut total = TokenUsage::default();

        for entry in self.entries.iter().filter(|e| e.kind == EntryKind::Assistant) {
            let Some(usage) = entry.message.get("usage").and_then(Value::as_object) else {
                continue;
            };
            let count = |key: &str| usage.get(key).and_then(Value::as_u64).unwrap_or(0);
            total.input_tokens = total.input_tokens.saturating_add(count("input_tokens"));
            total.output_tokens = total.output_tokens.saturating_add(count("output_tokens"));
            total.cache_read_tokens = total
                .cache_read_tokens
                .saturating_add(count("cache_read_input_tokens"));
            total.cache_create_tokens = total
                .cache_create_tokens
                .saturating_add(count("cache_creation_input_tokens"));
        }

        if total.input_tokens == 0 && total.output_tokens == 0 {
            None
        } else {
            Some(total)
        }
    }
}

/// Extract displayable text from a message `content` value
///
/// Strings pass through. Arrays join their text blocks and bare strings with
/// newlines; an array with neither yields `None`.
pub fn extract_text(content: &Value) -> Option<String> {
    match content {
        Value::String(s) => Some(s.clone()),
        Value::Array(blocks) => {
            let texts: Vec<&str> = blocks
                .iter()
                .filter_map(|block| match block {
                    Value::Object(obj) if obj.get("type").and_then(Value::as_str) == Some("text") => {
                        Some(obj.get("text").and_then(Value::as_str).unwrap_or(""))
                    }
                    Value::String(s) => Some(s.as_str()),
                    _ => None,
                })
                .collect();
            if texts.is_empty() {
                None
            } else {
                Some(texts.join("\n"))
            }
        }
        _ => None,
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn entry(value: Value) -> TranscriptEntry {
        TranscriptEntry::from_value(value).expect("conversation entry")
    }

    #[test]
    fn test_non_conversation_entries_are_dropped() {
        assert!(TranscriptEntry::from_value(json!({"type": "summary"})).is_none());
        assert!(TranscriptEntry::from_value(json!({"message": {}})).is_none());
        assert!(TranscriptEntry::from_value(json!(["user"])).is_none());
    }

    #[test]
    fn test_role_falls_back_to_entry_type() {
        let e = entry(json!({"type": "user", "message": {"content": "hi"}}));
        assert_eq!(e.role(), "user");

        let e = entry(json!({"type": "user", "message": {"role": "system", "content": "hi"}}));
        assert_eq!(e.role(), "system");
    }

    #[test]
    fn test_extract_text_variants() {
        assert_eq!(extract_text(&json!("plain")), Some("plain".to_string()));
        assert_eq!(
            extract_text(&json!([
                {"type": "text", "text": "one"},
                {"type": "tool_use", "name": "Bash"},
                "two"
            ])),
            Some("one\ntwo".to_string())
        );
        assert_eq!(extract_text(&json!([{"type": "tool_use"}])), None);
        assert_eq!(extract_text(&json!([{"type": "text"}])), Some(String::new()));
        assert_eq!(extract_text(&json!(42)), None);
    }

    #[test]
    fn test_simplify_splits_text_and_tool_use() {
        let transcript = Transcript::from_entries(
            vec![entry(json!({
                "type": "assistant",
                "uuid": "u-1",
                "timestamp": "2025-01-01T00:00:00Z",
                "message": {
                    "role": "assistant",
                    "content": [
                        {"type": "text", "text": "Listing files"},
                        {"type": "tool_use", "id": "toolu_1", "name": "Bash", "input": {"command": "ls"}}
                    ]
                }
            }))],
            100,
        );

        let items = transcript.simplify();
        assert_eq!(items.len(), 2);
        assert_eq!(
            serde_json::to_value(&items).expect("serialize"),
            json!([
                {
                    "type": "message",
                    "role": "assistant",
                    "text": "Listing files",
                    "uuid": "u-1",
                    "timestamp": "2025-01-01T00:00:00Z"
                },
                {
                    "type": "tool_use",
                    "role": "assistant",
                    "tool_name": "Bash",
                    "tool_input": {"command": "ls"},
                    "tool_use_id": "toolu_1",
                    "uuid": "u-1",
                    "timestamp": "2025-01-01T00:00:00Z"
                }
            ])
        );
    }

    #[test]
    fn test_simplify_skips_empty_text() {
        let transcript = Transcript::from_entries(
            vec![entry(json!({"type": "user", "message": {"content": [{"type": "text", "text": ""}]}}))],
            100,
        );
        assert!(transcript.simplify().is_empty());
    }

    #[test]
    fn test_text_is_truncated_by_chars() {
        let long = "é".repeat(MAX_TEXT_CHARS + 50);
        let transcript = Transcript::from_entries(
            vec![entry(json!({"type": "user", "message": {"content": long}}))],
            100,
        );
        match &transcript.simplify()[0] {
            TranscriptItem::Message { text, .. } => assert_eq!(text.chars().count(), MAX_TEXT_CHARS),
            other => panic!("unexpected item {other:?}"),
        }
    }

    #[test]
    fn test_usage_sums_assistant_entries_only() {
        let transcript = Transcript::from_entries(
            vec![
                entry(json!({"type": "user", "message": {"usage": {"input_tokens": 1000}}})),
                entry(json!({"type": "assistant", "message": {"usage": {
                    "input_tokens": 10, "output_tokens": 5,
                    "cache_read_input_tokens": 100, "cache_creation_input_tokens": 7
                }}})),
                entry(json!({"type": "assistant", "message": {"usage": {"input_tokens": 3, "output_tokens": 2}}})),
            ],
            100,
        );
        assert_eq!(
            transcript.usage(),
            Some(TokenUsage {
                input_tokens: 13,
                output_tokens: 7,
                cache_read_tokens: 100,
                cache_create_tokens: 7,
            })
        );
    }

    #[test]
    fn test_usage_none_without_input_or_output() {
        let transcript = Transcript::from_entries(
            vec![entry(json!({"type": "assistant", "message": {"usage": {"cache_read_input_tokens": 50}}}))],
            100,
        );
        assert_eq!(transcript.usage(), None);
    }

    #[test]
    fn test_usage_saturates_on_huge_counts() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        for _ in 0..2 {
            writeln!(
                file,
                r#"{{"type":"assistant","message":{{"usage":{{"input_tokens":{max},"output_tokens":1,"cache_read_input_tokens":{max}}}}}}}"#,
                max = u64::MAX
            )
            .expect("write");
        }

        let transcript = Transcript::read(file.path(), 100).expect("read");
        assert_eq!(transcript.len(), 2);
        assert_eq!(
            transcript.usage(),
            Some(TokenUsage {
                input_tokens: u64::MAX,
                output_tokens: 2,
                cache_read_tokens: u64::MAX,
                cache_create_tokens: 0,
            })
        );
    }

    #[test]
    fn test_read_empty_file() {
        let file = tempfile::NamedTempFile::new().expect("tempfile");
        let transcript = Transcript::read(file.path(), 100).expect("read");
        assert!(transcript.is_empty());
        assert!(transcript.simplify().is_empty());
        assert_eq!(transcript.usage(), None);
    }

    #[test]
    fn test_read_keeps_newest_entries() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, r#"{{"type":"summary","summary":"x"}}"#).expect("write");
        writeln!(file).expect("write");
        writeln!(file, "not json").expect("write");
        for i in 0..5 {
            writeln!(file, r#"{{"type":"user","uuid":"u-{i}","message":{{"content":"m{i}"}}}}"#)
                .expect("write");
        }

        let transcript = Transcript::read(file.path(), 3).expect("read");
        let uuids: Vec<_> = transcript.entries.iter().filter_map(|e| e.uuid.as_deref()).collect();
        assert_eq!(uuids, vec!["u-2", "u-3", "u-4"]);
    }

    #[test]
    fn test_read_missing_file_is_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = Transcript::read(&dir.path().join("missing.jsonl"), 10).unwrap_err();
        assert!(matches!(err, MonitorError::Transcript { .. }));
    }
}
