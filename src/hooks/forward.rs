use anyhow::Result;
use chrono::Utc;
use serde_json::Value;
use std::io::{Read, Write};

use super::{HookInput, MonitorEvent};
use crate::cli::MonitorConfig;
use crate::client::MonitorClient;
use crate::error::MonitorError;
use crate::host::HostInfo;

/// Run the forwarding hook for any Claude Code event
///
/// Reads the hook payload from stdin and posts it to the dashboard. Failures
/// are logged and swallowed: a monitoring outage must never break the
/// Claude Code session, so this always returns `Ok`.
pub async fn run(config: &MonitorConfig, dry_run: bool) -> Result<()> {
    let mut payload = Vec::new();
    if let Err(e) = std::io::stdin().read_to_end(&mut payload) {
        log::warn!("{}", MonitorError::Stdin(e));
        return Ok(());
    }

    if dry_run {
        match build_event(&payload, config) {
            Ok(event) => print_event(&event),
            Err(e) => log::warn!("{e}"),
        }
        return Ok(());
    }

    match forward(&payload, config).await {
        Ok(_) => {}
        Err(e @ (MonitorError::InvalidJson(_) | MonitorError::Payload { .. })) => log::warn!("{e}"),
        // Dashboard not running is the common case, keep it out of the way
        Err(e) => log::debug!("{e}"),
    }

    Ok(())
}

fn print_event(event: &MonitorEvent) {
    let json = match serde_json::to_string_pretty(event) {
        Ok(json) => json,
        Err(e) => {
            log::warn!("Failed to serialize event: {e}");
            return;
        }
    };
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = writeln!(stdout, "{json}") {
        log::debug!("Failed to write event to stdout: {e}");
    }
}

/// Parse a raw hook payload into the event that would be sent
pub fn build_event(payload: &[u8], config: &MonitorConfig) -> Result<MonitorEvent, MonitorError> {
    let input = HookInput::from_slice(payload)?;

    log::debug!(
        "Hook {}: session={}, tool={}",
        display_field(&input.hook_event_name),
        display_field(&input.session_id),
        display_field(&input.tool_name)
    );

    Ok(MonitorEvent::from_hook(
        &input,
        &HostInfo::detect(),
        Utc::now(),
        config.max_transcript_messages,
    ))
}

fn display_field(value: &Option<Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "<none>".to_string(),
    }
}

/// Build the event for a hook payload and deliver it
pub async fn forward(payload: &[u8], config: &MonitorConfig) -> Result<MonitorEvent, MonitorError> {
    let event = build_event(payload, config)?;
    MonitorClient::new(config)?.send(&event).await?;
    Ok(event)
}
