//! Persisted user settings and the stores that keep them

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::sound::Sound;
use crate::timer::TimerDuration;

/// Countdown target used when nothing valid is stored
pub const DEFAULT_TIMER_DURATION: TimerDuration = TimerDuration::minutes(15);
/// Pause between repeated alarm sounds, in seconds
pub const DEFAULT_SOUND_OFFSET: f64 = 0.2;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings encoding error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("settings lock poisoned")]
    Poisoned,
}

/// User settings, stored as a flat JSON object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Countdown target in seconds. Signed so a corrupt negative value
    /// reads back as the default instead of failing the whole file.
    pub selected_timer_duration: i64,
    pub selected_sound: Sound,
    /// Seconds to wait before replaying the alarm sound
    pub sound_offset: f64,
    pub is_sound_enabled: bool,
    pub repeat_sound: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            selected_timer_duration: DEFAULT_TIMER_DURATION.total_seconds() as i64,
            selected_sound: Sound::default(),
            sound_offset: DEFAULT_SOUND_OFFSET,
            is_sound_enabled: true,
            repeat_sound: true,
        }
    }
}

impl Settings {
    /// The stored countdown target, or 15 minutes if the stored value is negative
    pub fn timer_duration(&self) -> TimerDuration {
        u64::try_from(self.selected_timer_duration)
            .map(TimerDuration::from_secs)
            .unwrap_or(DEFAULT_TIMER_DURATION)
    }

    pub fn set_timer_duration(&mut self, duration: TimerDuration) {
        self.selected_timer_duration = i64::try_from(duration.total_seconds()).unwrap_or(i64::MAX);
    }

    /// Repeat offset as a duration; non-finite or negative values read as zero
    pub fn sound_offset(&self) -> Duration {
        Duration::try_from_secs_f64(self.sound_offset).unwrap_or(Duration::ZERO)
    }
}

/// Partial update of the sound settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub selected_sound: Option<Sound>,
    pub sound_offset: Option<f64>,
    pub is_sound_enabled: Option<bool>,
    pub repeat_sound: Option<bool>,
}

impl SettingsPatch {
    /// Apply the patch, returning whether anything changed
    pub fn apply_to(&self, settings: &mut Settings) -> bool {
        let before = settings.clone();

        if let Some(sound) = self.selected_sound {
            settings.selected_sound = sound;
        }
        if let Some(offset) = self.sound_offset {
            settings.sound_offset = if offset.is_finite() { offset.max(0.0) } else { DEFAULT_SOUND_OFFSET };
        }
        if let Some(enabled) = self.is_sound_enabled {
            settings.is_sound_enabled = enabled;
        }
        if let Some(repeat) = self.repeat_sound {
            settings.repeat_sound = repeat;
        }

        *settings != before
    }
}

/// Key-value persistence for [`Settings`]
pub trait SettingsStore: Send + Sync {
    /// Load stored settings, falling back to defaults for anything missing
    fn load(&self) -> Result<Settings, SettingsError>;
    fn save(&self, settings: &Settings) -> Result<(), SettingsError>;
}

/// Load stored settings, falling back to defaults when the store fails
pub fn load_settings(store: &dyn SettingsStore) -> Settings {
    store.load().unwrap_or_else(|e| {
        warn!("Failed to load settings, using defaults: {}", e);
        Settings::default()
    })
}

/// One-way save requests from the timer session.
///
/// Sending never blocks or touches the disk; a writer task drains the
/// receiver and hands each write to a [`SettingsStore`].
#[derive(Debug, Clone)]
pub struct SettingsWriter {
    tx: mpsc::UnboundedSender<Settings>,
}

impl SettingsWriter {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Settings>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queue `settings` to be written
    pub fn save(&self, settings: &Settings) {
        if self.tx.send(settings.clone()).is_err() {
            warn!("Settings writer is gone, change not persisted");
        }
    }
}

/// Settings kept in a JSON file
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> Result<Settings, SettingsError> {
        if !self.path.exists() {
            debug!("No settings file at {}, using defaults", self.path.display());
            return Ok(Settings::default());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, content)?;
        debug!("Settings written to {}", self.path.display());
        Ok(())
    }
}

/// Settings held in memory only
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    settings: Mutex<Settings>,
}

impl MemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Mutex::new(settings),
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<Settings, SettingsError> {
        self.settings
            .lock()
            .map(|settings| settings.clone())
            .map_err(|_| SettingsError::Poisoned)
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let mut stored = self.settings.lock().map_err(|_| SettingsError::Poisoned)?;
        *stored = settings.clone();
        Ok(())
    }
}
