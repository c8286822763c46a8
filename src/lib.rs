//! agent-monitor: forwards Claude Code hook events to an agent-dashboard server
//!
//! Claude Code runs the `agent-monitor` binary for each lifecycle hook. The
//! hook payload is enriched with host details and a condensed transcript,
//! then posted to `$AGENT_MONITOR_URL/api/events`.

pub mod cli;
pub mod client;
pub mod commands;
pub mod error;
pub mod hooks;
pub mod host;
pub mod transcript;

pub use cli::MonitorConfig;
pub use client::MonitorClient;
pub use error::MonitorError;
pub use hooks::{HookEventName, HookInput, MonitorEvent};
