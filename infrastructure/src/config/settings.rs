//! File-backed settings provider.

use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

use confab_application::ports::settings::{Settings, SettingsProvider};
use tracing::info;

use super::file_config::FileConfig;
use super::loader::ConfigLoader;

/// [`SettingsProvider`] holding the last loaded configuration.
///
/// The effective settings only change on an explicit [`reload`]; running
/// exchange cycles keep the snapshot they started with.
///
/// [`reload`]: FileSettings::reload
pub struct FileSettings {
    config_path: Option<PathBuf>,
    current: RwLock<Settings>,
}

impl FileSettings {
    /// Load configuration from disk and wrap it as a provider.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, Box<figment::Error>> {
        let config = ConfigLoader::load(config_path.as_ref())?;
        Ok(Self::from_config(config, config_path))
    }

    pub fn from_config(config: FileConfig, config_path: Option<PathBuf>) -> Self {
        Self {
            config_path,
            current: RwLock::new(config.to_settings()),
        }
    }

    /// Re-read configuration sources and swap in the new snapshot.
    pub fn reload(&self) -> Result<(), Box<figment::Error>> {
        let config = ConfigLoader::load(self.config_path.as_ref())?;
        let settings = config.to_settings();
        info!(model = %settings.model, "configuration reloaded");
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = settings;
        Ok(())
    }
}

impl SettingsProvider for FileSettings {
    fn snapshot(&self) -> Settings {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
