//! Generate the plugin's hooks/hooks.json

use anyhow::Result;
use serde_json::{json, Map, Value};
use std::io::Write;

use crate::hooks::HookEventName;

/// Seconds Claude Code waits for a hook before abandoning it
pub const HOOK_TIMEOUT_SECS: u64 = 10;

/// Matcher applied to tool-scoped events
const ALL_TOOLS: &str = "*";

/// Build the hooks.json document registering `command` for every event
pub fn hooks_manifest(command: &str) -> Value {
    let mut hooks = Map::new();

    for event in HookEventName::KNOWN {
        let handler = json!({
            "type": "command",
            "command": command,
            "timeout": HOOK_TIMEOUT_SECS,
        });

        let mut entry = Map::new();
        if event.is_tool_event() {
            entry.insert("matcher".to_string(), json!(ALL_TOOLS));
        }
        entry.insert("hooks".to_string(), json!([handler]));

        hooks.insert(event.to_string(), json!([entry]));
    }

    json!({ "hooks": hooks })
}

/// Handle the `agent-monitor hooks-manifest` subcommand
pub fn handle_hooks_manifest(command: &str) -> Result<()> {
    let manifest = serde_json::to_string_pretty(&hooks_manifest(command))?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{manifest}")?;
    Ok(())
}
