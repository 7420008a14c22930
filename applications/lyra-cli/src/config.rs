/// Client configuration
use crate::error::{CliError, Result};
use lyra_playback::{LoopMode, PlaybackConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File read when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "lyra.toml";

/// Environment prefix; nested keys use `__`, e.g. `LYRA_PLAYBACK__VOLUME`
pub const ENV_PREFIX: &str = "LYRA";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LyraConfig {
    #[serde(default = "default_backend")]
    pub backend: BackendSettings,

    #[serde(default = "default_playback")]
    pub playback: PlaybackSettings,

    #[serde(default = "default_session")]
    pub session: SessionSettings,

    #[serde(default = "default_logging")]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendSettings {
    /// Seed fixture; the bundled demo data when unset
    #[serde(default)]
    pub fixture: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackSettings {
    #[serde(default = "default_volume")]
    pub volume: f32,

    #[serde(default)]
    pub loop_mode: LoopMode,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionSettings {
    /// JSON file holding saved preferences (theme)
    #[serde(default = "default_preferences_path")]
    pub preferences_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directives used when `RUST_LOG` is unset
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl LyraConfig {
    /// Load configuration from file and environment
    ///
    /// `path` must exist when given; otherwise `lyra.toml` is read if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let environment = config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true);
        Self::load_with(path, environment)
    }

    pub(crate) fn load_with(path: Option<&Path>, environment: config::Environment) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path).required(true));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Environment overrides the file
        settings = settings.add_source(environment);

        let config = settings
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.playback.volume) {
            return Err(CliError::Config(format!(
                "playback.volume must be within 0.0..=1.0, got {}",
                self.playback.volume
            )));
        }

        if let Some(fixture) = &self.backend.fixture {
            if !fixture.exists() {
                return Err(CliError::Config(format!(
                    "Fixture not found at {}",
                    fixture.display()
                )));
            }
        }

        if self.logging.filter.trim().is_empty() {
            return Err(CliError::Config("logging.filter must not be empty".to_string()));
        }

        Ok(())
    }

    pub fn playback_config(&self) -> PlaybackConfig {
        PlaybackConfig {
            volume: self.playback.volume,
            loop_mode: self.playback.loop_mode,
            ..PlaybackConfig::default()
        }
    }
}

// Default values
fn default_backend() -> BackendSettings {
    BackendSettings { fixture: None }
}

fn default_playback() -> PlaybackSettings {
    PlaybackSettings {
        volume: default_volume(),
        loop_mode: LoopMode::Off,
    }
}

fn default_volume() -> f32 {
    0.5
}

fn default_session() -> SessionSettings {
    SessionSettings {
        preferences_path: default_preferences_path(),
    }
}

fn default_preferences_path() -> PathBuf {
    PathBuf::from("./lyra-preferences.json")
}

fn default_logging() -> LoggingSettings {
    LoggingSettings {
        filter: default_filter(),
    }
}

fn default_filter() -> String {
    "warn,lyra_cli=info".to_string()
}

impl Default for LyraConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            playback: default_playback(),
            session: default_session(),
            logging: default_logging(),
        }
    }
}
