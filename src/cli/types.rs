use clap::{Parser, Subcommand};
use reqwest::Url;
use std::time::Duration;

use crate::error::{MonitorError, Result};

/// Default dashboard address when `AGENT_MONITOR_URL` is unset
pub const DEFAULT_MONITOR_URL: &str = "http://localhost:8787";

/// Path the dashboard accepts events on, relative to the base URL
pub const EVENTS_PATH: &str = "/api/events";

/// Default plugin command registered in hooks.json
pub const DEFAULT_HOOK_COMMAND: &str = "${CLAUDE_PLUGIN_ROOT}/bin/agent-monitor send";

/// agent-monitor - forwards Claude Code hook events to an agent-dashboard server
///
/// Claude Code runs this binary for each lifecycle hook and passes the hook
/// payload as JSON on stdin. Without a subcommand it behaves like `send`.
#[derive(Parser, Debug)]
#[command(name = "agent-monitor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Base URL of the agent-dashboard server
    #[arg(
        long,
        global = true,
        value_name = "URL",
        env = "AGENT_MONITOR_URL",
        default_value = DEFAULT_MONITOR_URL
    )]
    pub url: String,

    /// HTTP request timeout in seconds (default: 5)
    #[arg(
        long,
        global = true,
        value_name = "SECONDS",
        env = "AGENT_MONITOR_TIMEOUT_SECS",
        default_value = "5"
    )]
    pub timeout: u64,

    /// Number of newest transcript messages attached to an event (default: 100)
    #[arg(
        long,
        global = true,
        value_name = "COUNT",
        env = "AGENT_MONITOR_MAX_TRANSCRIPT",
        default_value = "100"
    )]
    pub max_transcript_messages: usize,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read a hook payload from stdin and forward it to the dashboard
    Send {
        /// Print the event to stdout instead of sending it
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the plugin's hooks/hooks.json registering every forwarded event
    HooksManifest {
        /// Command Claude Code should run for each hook
        #[arg(long, value_name = "CMD", default_value = DEFAULT_HOOK_COMMAND)]
        command: String,
    },
}

impl Cli {
    /// Resolve flags and environment into a validated [`MonitorConfig`]
    pub fn monitor_config(&self) -> Result<MonitorConfig> {
        MonitorConfig::new(
            &self.url,
            Duration::from_secs(self.timeout),
            self.max_transcript_messages,
        )
    }
}

/// Resolved client configuration
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Dashboard base URL, without trailing slash
    pub base_url: String,
    /// Timeout applied to the whole request
    pub timeout: Duration,
    /// Newest transcript entries kept per event
    pub max_transcript_messages: usize,
}

impl MonitorConfig {
    pub fn new(base_url: &str, timeout: Duration, max_transcript_messages: usize) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');

        let parsed = Url::parse(trimmed).map_err(|e| MonitorError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(MonitorError::InvalidUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        Ok(Self {
            base_url: trimmed.to_string(),
            timeout,
            max_transcript_messages,
        })
    }

    /// Full URL events are POSTed to
    pub fn events_url(&self) -> String {
        format!("{}{}", self.base_url, EVENTS_PATH)
    }
}
