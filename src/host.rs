//! Host identification attached to every event

use serde::Serialize;

/// Identifies the machine and account a session runs on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostInfo {
    pub hostname: String,
    pub platform: String,
    pub user: String,
}

impl HostInfo {
    /// Collect host info from the running system
    pub fn detect() -> Self {
        Self {
            hostname: whoami::fallible::hostname().unwrap_or_else(|e| {
                log::debug!("Hostname lookup failed: {e}");
                "localhost".to_string()
            }),
            platform: platform_name(std::env::consts::OS).to_string(),
            user: user_from(
                std::env::var("USER").ok(),
                std::env::var("USERNAME").ok(),
            ),
        }
    }
}

/// Map a Rust target OS to the system name the dashboard groups by
pub fn platform_name(os: &str) -> &str {
    match os {
        "linux" => "Linux",
        "macos" => "Darwin",
        "windows" => "Windows",
        other => other,
    }
}

fn user_from(user: Option<String>, username: Option<String>) -> String {
    user.or(username).unwrap_or_else(|| "unknown".to_string())
}
