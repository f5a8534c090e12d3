//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file and
//! are merged across sources before being flattened into a [`Settings`]
//! snapshot.

use std::path::PathBuf;
use std::time::Duration;

use confab_application::ports::settings::Settings;
use serde::{Deserialize, Serialize};

/// Raw API configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileApiConfig {
    /// Endpoint host, bare (`api.openai.com`) or a full base URL.
    pub host: String,
    pub key: String,
    /// Optional organization header; empty means unset.
    pub organization: String,
    /// Inactivity timeout for a streaming response, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for FileApiConfig {
    fn default() -> Self {
        Self {
            host: "api.openai.com".to_string(),
            key: String::new(),
            organization: String::new(),
            timeout_ms: 5000,
        }
    }
}

/// Raw chat configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileChatConfig {
    pub model: String,
    pub temperature: f64,
    /// Global system messages, sent before any session-scoped ones.
    pub system_messages: Vec<String>,
    /// Whether prior conversation is sent along with new questions.
    pub enable_context: bool,
}

impl Default for FileChatConfig {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.5,
            system_messages: Vec::new(),
            enable_context: true,
        }
    }
}

/// Raw storage configuration from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// Database file path; defaults to the platform data directory.
    pub path: Option<PathBuf>,
}

/// Complete raw configuration from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub api: FileApiConfig,
    pub chat: FileChatConfig,
    pub storage: FileStorageConfig,
}

impl FileConfig {
    /// Flatten into the settings snapshot consumed by the coordinator.
    pub fn to_settings(&self) -> Settings {
        Settings {
            api_host: self.api.host.clone(),
            api_key: self.api.key.clone(),
            organization: self.api.organization.clone(),
            model: self.chat.model.clone(),
            temperature: self.chat.temperature,
            timeout: Duration::from_millis(self.api.timeout_ms),
            system_messages: self.chat.system_messages.clone(),
            enable_context: self.chat.enable_context,
        }
    }
}
