use std::path::Path;
use std::time::Duration;

use log::debug;
use serde::{
    Deserialize,
    Serialize,
};

use crate::models::{
    ShortcutError,
    ShortcutResult,
};
use crate::platform::{
    PLATFORM_ENV,
    Platform,
};

pub const DEFAULT_CHORD_TIMEOUT_MS: u64 = 1000;

pub const CHORD_TIMEOUT_ENV: &str = "SUITE_SHORTCUTS_CHORD_TIMEOUT_MS";
pub const WARN_ON_OVERWRITE_ENV: &str = "SUITE_SHORTCUTS_WARN_ON_OVERWRITE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortcutConfig {
    pub chord_timeout_ms: u64,
    pub warn_on_overwrite: bool,
    pub platform: Option<String>,
}

impl Default for ShortcutConfig {
    fn default() -> Self {
        Self {
            chord_timeout_ms: DEFAULT_CHORD_TIMEOUT_MS,
            warn_on_overwrite: cfg!(debug_assertions),
            platform: None,
        }
    }
}

impl ShortcutConfig {
    pub fn from_json(json: &str) -> ShortcutResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> ShortcutResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_json(&contents)?;
        debug!("Loaded shortcut config from {}", path.display());
        Ok(config)
    }

    /// Defaults overridden by `SUITE_SHORTCUTS_*` environment variables.
    pub fn from_env() -> ShortcutResult<Self> {
        let mut config = Self::default();

        if let Ok(value) = std::env::var(CHORD_TIMEOUT_ENV) {
            config.chord_timeout_ms = value.trim().parse().map_err(|_| {
                ShortcutError::Config(format!("{CHORD_TIMEOUT_ENV} must be a number, got {value}"))
            })?;
        }

        if let Ok(value) = std::env::var(WARN_ON_OVERWRITE_ENV) {
            config.warn_on_overwrite = match value.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ShortcutError::Config(format!(
                        "{WARN_ON_OVERWRITE_ENV} must be a boolean, got {value}"
                    )));
                }
            };
        }

        if let Ok(value) = std::env::var(PLATFORM_ENV)
            && !value.trim().is_empty()
        {
            config.platform = Some(value);
        }

        Ok(config)
    }

    /// Never shorter than the default one second.
    pub fn chord_timeout(&self) -> Duration {
        Duration::from_millis(self.chord_timeout_ms.max(DEFAULT_CHORD_TIMEOUT_MS))
    }

    pub fn resolve_platform(&self) -> Platform {
        match &self.platform {
            Some(identifier) => Platform::from_identifiers(Some(identifier.as_str()), None),
            None => Platform::detect(),
        }
    }
}
