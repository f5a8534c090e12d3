//! Settings port
//!
//! Configuration is consumed as an immutable snapshot taken at the start of
//! each exchange cycle. Reload points (file watch, explicit reload command)
//! are owned by the provider implementation, never by the coordinator.

use std::time::Duration;

/// Read-only snapshot of the effective configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Completion endpoint host, bare (`api.openai.com`) or a full URL.
    pub api_host: String,
    pub api_key: String,
    /// Optional organization header value; empty means unset.
    pub organization: String,
    pub model: String,
    pub temperature: f64,
    /// Inactivity window after which the watchdog cancels a cycle.
    pub timeout: Duration,
    /// Global system messages, applied before any session-scoped ones.
    pub system_messages: Vec<String>,
    /// Global default for context memory; sessions may override.
    pub enable_context: bool,
}

/// Provider of configuration snapshots
pub trait SettingsProvider: Send + Sync {
    /// Snapshot the current configuration. Called once per exchange cycle.
    fn snapshot(&self) -> Settings;
}
