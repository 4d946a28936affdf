use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::animation::clock::DEFAULT_ZERO_DURATION_MS;
use crate::media::types::Repetitions;

/// Persisted playback preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    pub version: u32,
    /// Overrides the repetition count declared by the media.
    pub repetitions: Option<Repetitions>,
    /// Time shown for frames declaring a zero or negative duration.
    pub zero_duration_ms: f64,
    /// Simulated time step of the preview loop.
    pub tick_ms: f64,
    /// The preview gives up on animations still running after this long.
    pub max_preview_ms: f64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            version: 1,
            repetitions: None,
            zero_duration_ms: DEFAULT_ZERO_DURATION_MS,
            tick_ms: 10.0,
            max_preview_ms: 60_000.0,
        }
    }
}

impl PlaybackSettings {
    /// `<config_dir>/frameplay/settings.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("frameplay").join("settings.json"))
    }

    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Read settings from `path`. Missing or unreadable files give defaults,
    /// and out-of-range times fall back to their defaults.
    pub fn load_from(path: &Path) -> Self {
        let loaded: Self = match std::fs::read_to_string(path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                log::warn!("Ignoring malformed settings {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        };
        loaded.validated()
    }

    /// Replace non-positive or non-finite times with the defaults. A zero
    /// preview step would never reach `max_preview_ms`.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        for (name, value, fallback) in [
            ("tick_ms", &mut self.tick_ms, defaults.tick_ms),
            ("max_preview_ms", &mut self.max_preview_ms, defaults.max_preview_ms),
            ("zero_duration_ms", &mut self.zero_duration_ms, defaults.zero_duration_ms),
        ] {
            if !(value.is_finite() && *value > 0.0) {
                log::warn!("Invalid {name} {value}, using {fallback}");
                *value = fallback;
            }
        }
        self
    }

    pub fn save(&self) {
        let Some(path) = Self::default_path() else {
            return;
        };
        if let Err(e) = self.save_to(&path) {
            log::warn!("Failed to save settings: {e}");
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
