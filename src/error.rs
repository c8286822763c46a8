use thiserror::Error;

/// Errors raised while turning a hook payload into a delivered event
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Invalid monitor URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to read hook payload: {0}")]
    Stdin(#[source] std::io::Error),

    #[error("Hook payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Hook payload must be a JSON object, got {found}")]
    Payload { found: &'static str },

    #[error("Failed to read transcript {path}: {source}")]
    Transcript {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Monitor server at {url} returned {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

pub type Result<T> = std::result::Result<T, MonitorError>;
