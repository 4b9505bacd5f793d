//! External collaborator module
//!
//! Boundaries to the outside world the timer session signals or reads:
//! the alarm sound player and the persisted settings store.

pub mod settings;
pub mod sound;

// Re-export main types
pub use settings::{
    load_settings, JsonSettingsStore, MemorySettingsStore, Settings, SettingsError, SettingsPatch,
    SettingsStore, SettingsWriter,
};
pub use sound::{CommandSoundPlayer, SilentSoundPlayer, Sound, SoundPlayer, SoundRequest};
