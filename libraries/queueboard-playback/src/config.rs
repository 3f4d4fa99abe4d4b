/// Queue board configuration
use crate::error::{QueueError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BoardConfig {
    #[serde(default = "default_binding")]
    pub binding: BindingSettings,

    #[serde(default = "default_persistence")]
    pub persistence: PersistenceSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BindingSettings {
    /// Start a newly bound queue on the track that is already playing, if present
    #[serde(default = "default_prefer_playing_track")]
    pub prefer_playing_track: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PersistenceSettings {
    /// Opening the store (e.g. a SQLite file) is left to the embedder
    #[serde(default)]
    pub enabled: bool,

    /// Quiet period before a burst of edits is written
    #[serde(default = "default_save_debounce_ms")]
    pub save_debounce_ms: u64,
}

impl BoardConfig {
    /// Load configuration from an optional file and the environment
    ///
    /// Environment variables use the `QUEUEBOARD` prefix and `__` between
    /// sections, e.g. `QUEUEBOARD_PERSISTENCE__ENABLED=true`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(QueueError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            settings = settings.add_source(config::File::from(path));
        }

        settings = settings.add_source(
            config::Environment::with_prefix("QUEUEBOARD")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        settings
            .build()
            .map_err(|e| QueueError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| QueueError::Config(e.to_string()))
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.persistence.save_debounce_ms)
    }
}

// Default values
fn default_binding() -> BindingSettings {
    BindingSettings {
        prefer_playing_track: default_prefer_playing_track(),
    }
}

fn default_prefer_playing_track() -> bool {
    true
}

fn default_persistence() -> PersistenceSettings {
    PersistenceSettings {
        enabled: false,
        save_debounce_ms: default_save_debounce_ms(),
    }
}

fn default_save_debounce_ms() -> u64 {
    250
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            binding: default_binding(),
            persistence: default_persistence(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = BoardConfig::default();
        assert!(config.binding.prefer_playing_track);
        assert!(!config.persistence.enabled);
        assert_eq!(config.save_debounce(), Duration::from_millis(250));
    }

    #[test]
    fn load_partial_file_fills_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[persistence]\nenabled = true\nsave_debounce_ms = 40").unwrap();

        let config = BoardConfig::load(Some(file.path())).unwrap();

        assert!(config.persistence.enabled);
        assert_eq!(config.persistence.save_debounce_ms, 40);
        assert!(config.binding.prefer_playing_track);
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = BoardConfig::load(Some(Path::new("/nonexistent/queueboard.toml"))).unwrap_err();
        assert!(matches!(err, QueueError::Config(_)));
    }
}
