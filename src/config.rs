//! Configuration and CLI argument handling

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;

use crate::services::{
    CommandSoundPlayer, JsonSettingsStore, MemorySettingsStore, SettingsStore, SilentSoundPlayer,
    SoundPlayer,
};

const SETTINGS_FILENAME: &str = ".simple-timer.json";

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "simple-timer")]
#[command(about = "A countdown timer daemon driven by plain-text time expressions")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Settings file [default: $HOME/.simple-timer.json]
    #[arg(short, long)]
    pub settings: Option<PathBuf>,

    /// Countdown tick period in milliseconds
    #[arg(long, default_value = "100")]
    pub tick_ms: u64,

    /// Alarm alternation period in milliseconds
    #[arg(long, default_value = "100")]
    pub jiggle_ms: u64,

    /// Command used to play alarm sound files
    #[arg(long, default_value = "afplay")]
    pub player: String,

    /// Directory containing the alarm sound files
    #[arg(long, default_value = "/System/Library/Sounds")]
    pub sounds_dir: PathBuf,

    /// Never play sounds
    #[arg(long)]
    pub silent: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn jiggle_period(&self) -> Duration {
        Duration::from_millis(self.jiggle_ms.max(1))
    }

    /// Settings file location, if one can be determined
    pub fn settings_path(&self) -> Option<PathBuf> {
        self.settings.clone().or_else(|| {
            std::env::var_os("HOME").map(|home| PathBuf::from(home).join(SETTINGS_FILENAME))
        })
    }

    /// Build the settings store; in-memory when no path is available
    pub fn settings_store(&self) -> Arc<dyn SettingsStore> {
        match self.settings_path() {
            Some(path) => Arc::new(JsonSettingsStore::new(path)),
            None => Arc::new(MemorySettingsStore::default()),
        }
    }

    pub fn sound_player(&self) -> Arc<dyn SoundPlayer> {
        if self.silent {
            Arc::new(SilentSoundPlayer)
        } else {
            Arc::new(CommandSoundPlayer::new(self.player.clone(), self.sounds_dir.clone()))
        }
    }
}
