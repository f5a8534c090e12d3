//! Configuration loading and the settings snapshot provider.

mod file_config;
mod loader;
mod settings;

pub use file_config::{FileApiConfig, FileChatConfig, FileConfig, FileStorageConfig};
pub use loader::ConfigLoader;
pub use settings::FileSettings;
