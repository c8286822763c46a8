mod types;

pub use types::{
    Cli, Commands, MonitorConfig, DEFAULT_HOOK_COMMAND, DEFAULT_MONITOR_URL, EVENTS_PATH,
};
