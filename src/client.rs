//! HTTP delivery to the agent-dashboard server

use crate::cli::MonitorConfig;
use crate::error::{MonitorError, Result};
use crate::hooks::MonitorEvent;

/// Posts events to `{base_url}/api/events`
///
/// One attempt per event. The hook process is short-lived, so a failed send
/// is reported to the caller and never retried.
#[derive(Debug, Clone)]
pub struct MonitorClient {
    http: reqwest::Client,
    events_url: String,
}

impl MonitorClient {
    pub fn new(config: &MonitorConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(MonitorError::ClientBuild)?;

        Ok(Self {
            http,
            events_url: config.events_url(),
        })
    }

    pub fn events_url(&self) -> &str {
        &self.events_url
    }

    /// POST one event as JSON, draining the response body
    pub async fn send(&self, event: &MonitorEvent) -> Result<()> {
        let to_err = |source| MonitorError::Request {
            url: self.events_url.clone(),
            source,
        };

        let response = self
            .http
            .post(&self.events_url)
            .json(event)
            .send()
            .await
            .map_err(to_err)?;

        let status = response.status();
        response.bytes().await.map_err(to_err)?;

        if !status.is_success() {
            return Err(MonitorError::Status {
                url: self.events_url.clone(),
                status,
            });
        }

        log::debug!(
            "Delivered {} event for session {} to {}",
            event.hook_event.as_str().unwrap_or("unnamed"),
            event.session_id,
            self.events_url
        );

        Ok(())
    }
}
