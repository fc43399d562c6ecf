use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("midi channel {0} out of range (0-15)")]
    InvalidChannel(u8),
    #[error("visible track count must be 1-4, got {0}")]
    InvalidTrackCount(usize),
}

/// Persisted driver settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Substring used to match the hardware's MIDI port names.
    pub midi_device: String,
    /// Zero-indexed MIDI channel. The K2 ships on hardware channel 15,
    /// i.e. 14 here.
    pub midi_channel: u8,
    /// Number of session tracks bound to the four channel strips.
    pub visible_tracks: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            midi_device: "XONE:K2".to_string(),
            midi_channel: 14,
            visible_tracks: 4,
        }
    }
}

/// Loads and persists [`Settings`] as JSON.
///
/// Missing file means defaults; a present but malformed file is an error
/// rather than a silent reset.
pub struct ConfigManager {
    config_path: PathBuf,
    settings: Settings,
}

impl ConfigManager {
    pub fn new(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config_path = path.unwrap_or_else(Self::default_path);
        let settings = if config_path.exists() {
            let contents = fs::read_to_string(&config_path)?;
            let settings: Settings = serde_json::from_str(&contents)?;
            Self::validate(&settings)?;
            log::info!("Loaded settings from {}", config_path.display());
            settings
        } else {
            log::info!(
                "No config at {}, using defaults",
                config_path.display()
            );
            Settings::default()
        };
        Ok(Self {
            config_path,
            settings,
        })
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("xonek2")
            .join("config.json")
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        Self::validate(&self.settings)?;
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.settings)?;
        fs::write(&self.config_path, contents)?;
        log::info!("Saved settings to {}", self.config_path.display());
        Ok(())
    }

    fn validate(settings: &Settings) -> Result<(), ConfigError> {
        if settings.midi_channel > 15 {
            return Err(ConfigError::InvalidChannel(settings.midi_channel));
        }
        if settings.visible_tracks == 0 || settings.visible_tracks > 4 {
            return Err(ConfigError::InvalidTrackCount(settings.visible_tracks));
        }
        Ok(())
    }
}
