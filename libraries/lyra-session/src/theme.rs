//! Colour theme and the preference storage behind it

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::{Result, SessionError};
use crate::message::MessageStore;

/// Preference key holding the theme name
pub const THEME_KEY: &str = "theme";

/// Toast shown after a theme switch
pub const THEME_CHANGED: &str = "Theme changed.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }
}

// ============================================================================
// Preferences
// ============================================================================

/// Small string key-value store that survives restarts
pub trait Preferences: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Process-local preferences
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Preferences for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences kept in a JSON object on disk
///
/// The whole file is rewritten on every `set`.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FilePreferences {
    /// Open `path`, starting empty if the file does not exist yet
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                SessionError::Preferences(format!("{}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }
}

impl Preferences for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        let content = serde_json::to_string_pretty(&*values)
            .map_err(|e| SessionError::Preferences(e.to_string()))?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

// ============================================================================
// Theme store
// ============================================================================

/// Current theme, persisted through [`Preferences`]
pub struct ThemeStore {
    prefs: Arc<dyn Preferences>,
    messages: MessageStore,
    theme: watch::Sender<Theme>,
}

impl ThemeStore {
    /// Load the saved theme; dark when nothing (or garbage) is saved
    pub fn new(prefs: Arc<dyn Preferences>, messages: MessageStore) -> Self {
        let initial = prefs
            .get(THEME_KEY)
            .and_then(|saved| Theme::parse(&saved))
            .unwrap_or_default();
        let (theme, _) = watch::channel(initial);
        Self {
            prefs,
            messages,
            theme,
        }
    }

    pub fn current(&self) -> Theme {
        *self.theme.borrow()
    }

    pub fn watch(&self) -> watch::Receiver<Theme> {
        self.theme.subscribe()
    }

    /// Switch between dark and light, save the choice and announce it
    ///
    /// A failed save is logged; the switch still applies for this session.
    pub fn toggle(&self) -> Theme {
        let next = self.current().toggled();
        self.theme.send_replace(next);
        if let Err(e) = self.prefs.set(THEME_KEY, next.as_str()) {
            warn!(error = %e, "Failed to save theme");
        }
        info!(theme = next.as_str(), "Theme changed");
        self.messages.show(THEME_CHANGED);
        next
    }
}
