//! Configuration file loader with multi-source merging

use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use super::file_config::FileConfig;

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment: `CONFAB_*` (sections split on `__`)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./confab.toml` or `./.confab.toml`
    /// 4. XDG config: `$XDG_CONFIG_HOME/confab/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        for filename in &["confab.toml", ".confab.toml"] {
            let path = PathBuf::from(filename);
            if path.exists() {
                figment = figment.merge(Toml::file(&path));
                break;
            }
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("CONFAB_").split("__"));

        figment.extract().map_err(Box::new)
    }

    /// Get the global config file path
    ///
    /// Returns `$XDG_CONFIG_HOME/confab/config.toml` if set, otherwise the
    /// platform's default config directory.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("confab").join("config.toml"))
    }
}
