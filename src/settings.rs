//! Player settings and preferences
//!
//! Persisted in LocalStorage. Settings pick a difficulty preset and
//! optional budget overrides; [`Settings::tuning`] turns them into the
//! balance values a session runs with.

use serde::{Deserialize, Serialize};

use crate::tuning::{Tuning, TuningError};

/// Difficulty preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DifficultyPreset {
    Relaxed,
    #[default]
    Standard,
    Challenging,
}

impl DifficultyPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyPreset::Relaxed => "Relaxed",
            DifficultyPreset::Standard => "Standard",
            DifficultyPreset::Challenging => "Challenging",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "relaxed" | "easy" => Some(DifficultyPreset::Relaxed),
            "standard" | "normal" => Some(DifficultyPreset::Standard),
            "challenging" | "hard" => Some(DifficultyPreset::Challenging),
            _ => None,
        }
    }

    /// Multiplier (percent) applied to spawn intervals and lifespans
    pub fn pace_percent(&self) -> u64 {
        match self {
            DifficultyPreset::Relaxed => 125,
            DifficultyPreset::Standard => 100,
            DifficultyPreset::Challenging => 80,
        }
    }
}

/// `value * percent / 100`, clamped to `u64::MAX`
fn scale_percent(value: u64, percent: u64) -> u64 {
    (value as u128 * percent as u128 / 100).min(u64::MAX as u128) as u64
}

/// Game settings/preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub difficulty: DifficultyPreset,
    /// Override the session length (seconds)
    pub session_seconds: Option<u32>,
    /// Override the number of misses that end a session
    pub miss_limit: Option<u32>,
}

impl Settings {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "bubble_pop_settings";

    pub fn from_preset(preset: DifficultyPreset) -> Self {
        Self {
            difficulty: preset,
            ..Self::default()
        }
    }

    /// Parse settings JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        serde_json::from_str(json).map_err(|e| TuningError::Parse(e.to_string()))
    }

    /// Balance values for these settings, starting from `base`
    pub fn apply(&self, base: &Tuning) -> Result<Tuning, TuningError> {
        let mut tuning = base.clone();
        let pace = self.difficulty.pace_percent();
        for level in &mut tuning.levels {
            level.spawn_interval_ms = scale_percent(level.spawn_interval_ms, pace);
            level.base_lifespan_ms = scale_percent(level.base_lifespan_ms, pace);
        }
        if let Some(secs) = self.session_seconds {
            tuning.session_seconds = secs;
        }
        if let Some(limit) = self.miss_limit {
            tuning.miss_limit = limit;
        }
        tuning.validate()?;
        Ok(tuning)
    }

    /// Balance values for these settings on top of the default tuning
    pub fn tuning(&self) -> Result<Tuning, TuningError> {
        self.apply(&Tuning::default())
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            match serde_json::to_string(self) {
                Ok(json) => match storage.set_item(Self::STORAGE_KEY, &json) {
                    Ok(()) => log::info!("Settings saved"),
                    Err(e) => log::warn!("Failed to save settings: {:?}", e),
                },
                Err(e) => log::warn!("Failed to encode settings: {}", e),
            }
        } else {
            log::warn!("LocalStorage unavailable, settings not saved");
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
