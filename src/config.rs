use crate::error::AppError;
use crate::filesystem;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE_NAME: &str = "pixie.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub picker: PickerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickerConfig {
    /// Overrides the platform pictures directory when set
    pub pictures_dir: Option<PathBuf>,
    /// How often the host is polled for replies while a request is in flight
    pub poll_interval_ms: u64,
    /// How long to wait for a reply before giving up on a request
    pub poll_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            picker: PickerConfig {
                pictures_dir: None,
                poll_interval_ms: 100,
                poll_timeout_secs: 60,
            },
        }
    }
}

impl AppConfig {
    /// Load the configuration from the app data directory, writing the
    /// defaults there on first start.
    pub fn load() -> Result<Self, AppError> {
        let config_path = filesystem::get_app_data_dir().join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let config = Self::load_from_file(&config_path)?;
            config.validate()?;
            Ok(config)
        } else {
            log::info!("Config file not found, creating default configuration");
            let default_config = Self::default();
            default_config.save_to_file(&config_path)?;
            Ok(default_config)
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&contents)?;

        log::info!("Configuration loaded from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), AppError> {
        let contents = toml::to_string_pretty(self)?;

        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path.as_ref(), contents)?;

        log::info!("Configuration saved to {}", path.as_ref().display());
        Ok(())
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.picker.poll_interval_ms == 0 {
            return Err(AppError::Config(
                "poll_interval_ms must be at least 1".to_string(),
            ));
        }
        if self.picker.poll_timeout_secs == 0 {
            return Err(AppError::Config(
                "poll_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Directory new photos are saved under
    pub fn pictures_root(&self) -> PathBuf {
        match &self.picker.pictures_dir {
            Some(dir) => dir.clone(),
            None => filesystem::get_pictures_dir(),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.picker.poll_interval_ms)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.picker.poll_timeout_secs)
    }
}
