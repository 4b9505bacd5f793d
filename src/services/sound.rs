//! Alarm sounds and the players that make them audible

use std::{
    fmt,
    path::PathBuf,
    str::FromStr,
    sync::Mutex,
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tokio::{process::Command, task::JoinHandle, time::sleep};
use tracing::{debug, error, info, warn};

/// Named alarm sounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Sound {
    Basso,
    #[default]
    Blow,
    Bottle,
    Frog,
    Funk,
    Glass,
    Hero,
    Morse,
    Ping,
    Pop,
    Purr,
    Sosumi,
    Submarine,
    Tink,
}

impl Sound {
    pub const ALL: [Sound; 14] = [
        Sound::Basso,
        Sound::Blow,
        Sound::Bottle,
        Sound::Frog,
        Sound::Funk,
        Sound::Glass,
        Sound::Hero,
        Sound::Morse,
        Sound::Ping,
        Sound::Pop,
        Sound::Purr,
        Sound::Sosumi,
        Sound::Submarine,
        Sound::Tink,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Sound::Basso => "Basso",
            Sound::Blow => "Blow",
            Sound::Bottle => "Bottle",
            Sound::Frog => "Frog",
            Sound::Funk => "Funk",
            Sound::Glass => "Glass",
            Sound::Hero => "Hero",
            Sound::Morse => "Morse",
            Sound::Ping => "Ping",
            Sound::Pop => "Pop",
            Sound::Purr => "Purr",
            Sound::Sosumi => "Sosumi",
            Sound::Submarine => "Submarine",
            Sound::Tink => "Tink",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.aiff", self.name())
    }
}

impl fmt::Display for Sound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Sound {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sound::ALL
            .into_iter()
            .find(|sound| sound.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown sound '{}'", s))
    }
}

/// Everything a player needs to sound the alarm
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundRequest {
    pub sound: Sound,
    /// Replay after each playback finishes until stopped
    pub repeat: bool,
    /// Pause between replays
    pub offset: Duration,
}

/// One-way start/stop signals to whatever produces the alarm sound.
///
/// Neither call waits for playback; players must tolerate `stop` without a
/// prior `start` and `start` while already playing.
pub trait SoundPlayer: Send + Sync {
    fn start(&self, request: SoundRequest);
    fn stop(&self);
}

/// A player that only logs
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSoundPlayer;

impl SoundPlayer for SilentSoundPlayer {
    fn start(&self, request: SoundRequest) {
        debug!("Silent player asked to play {}", request.sound);
    }

    fn stop(&self) {
        debug!("Silent player asked to stop");
    }
}

/// Plays sound files by running an external command, e.g. `afplay <file>`
#[derive(Debug)]
pub struct CommandSoundPlayer {
    program: String,
    sounds_dir: PathBuf,
    playback: Mutex<Option<JoinHandle<()>>>,
}

impl CommandSoundPlayer {
    pub fn new(program: impl Into<String>, sounds_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            sounds_dir: sounds_dir.into(),
            playback: Mutex::new(None),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playback
            .lock()
            .map(|playback| playback.as_ref().is_some_and(|task| !task.is_finished()))
            .unwrap_or(false)
    }
}

impl SoundPlayer for CommandSoundPlayer {
    fn start(&self, request: SoundRequest) {
        let Ok(mut playback) = self.playback.lock() else {
            error!("Sound player lock poisoned, not playing {}", request.sound);
            return;
        };
        if playback.as_ref().is_some_and(|task| !task.is_finished()) {
            debug!("Sound already playing");
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No async runtime available, cannot play {}", request.sound);
            return;
        };

        let path = self.sounds_dir.join(request.sound.file_name());
        info!("Playing {} via {}", path.display(), self.program);
        *playback = Some(runtime.spawn(play_repeating(self.program.clone(), path, request)));
    }

    fn stop(&self) {
        if let Ok(mut playback) = self.playback.lock() {
            if let Some(task) = playback.take() {
                // Dropping the command future kills the child process
                task.abort();
                info!("Sound stopped");
            }
        }
    }
}

async fn play_repeating(program: String, path: PathBuf, request: SoundRequest) {
    loop {
        let status = Command::new(&program)
            .arg(&path)
            .kill_on_drop(true)
            .status()
            .await;

        match status {
            Ok(status) if status.success() => {}
            Ok(status) => {
                warn!("{} exited with {}, giving up on alarm sound", program, status);
                return;
            }
            Err(e) => {
                error!("Failed to run {}: {}", program, e);
                return;
            }
        }

        if !request.repeat {
            return;
        }
        sleep(request.offset).await;
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tokio::time::timeout;

    use super::*;

    #[test]
    fn test_sound_names_round_trip() {
        for sound in Sound::ALL {
            assert_eq!(sound.name().parse::<Sound>(), Ok(sound));
        }
        assert_eq!("glass".parse::<Sound>(), Ok(Sound::Glass));
        assert!("Trumpet".parse::<Sound>().is_err());
    }

    #[test]
    fn test_sound_serializes_by_name() {
        assert_eq!(serde_json::to_string(&Sound::Submarine).unwrap(), "\"Submarine\"");
        assert_eq!(Sound::Tink.file_name(), "Tink.aiff");
    }

    #[test]
    fn test_stop_without_start_is_harmless() {
        let player = CommandSoundPlayer::new("true", "/nonexistent");
        player.stop();
        player.stop();
        assert!(!player.is_playing());
    }

    /// Sounds directory whose `Blow.aiff` is a shell script, so `sh` can "play" it
    fn scripted_sounds(script: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(Sound::Blow.file_name()), script).unwrap();
        dir
    }

    /// Sounds directory whose playback appends a line to `plays.log`
    fn logging_sounds() -> (tempfile::TempDir, PathBuf) {
        let sounds = tempfile::tempdir().unwrap();
        let log = sounds.path().join("plays.log");
        std::fs::write(
            sounds.path().join(Sound::Blow.file_name()),
            format!("echo played >> '{}'\n", log.display()),
        )
        .unwrap();
        (sounds, log)
    }

    fn play_count(log: &Path) -> usize {
        std::fs::read_to_string(log).map(|log| log.lines().count()).unwrap_or(0)
    }

    async fn wait_until(mut done: impl FnMut() -> bool) {
        timeout(Duration::from_secs(5), async {
            while !done() {
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
    }

    fn request(repeat: bool) -> SoundRequest {
        SoundRequest {
            sound: Sound::Blow,
            repeat,
            offset: Duration::from_millis(20),
        }
    }

    #[tokio::test]
    async fn test_repeating_sound_replays_until_stopped() {
        let (sounds, log) = logging_sounds();
        let player = CommandSoundPlayer::new("sh", sounds.path());

        player.start(request(true));
        wait_until(|| play_count(&log) >= 3).await;
        assert!(player.is_playing());

        player.stop();
        assert!(!player.is_playing());
        sleep(Duration::from_millis(100)).await;
        let stopped_at = play_count(&log);
        sleep(Duration::from_millis(300)).await;
        assert_eq!(play_count(&log), stopped_at);
    }

    #[tokio::test]
    async fn test_single_sound_plays_once() {
        let (sounds, log) = logging_sounds();
        let player = CommandSoundPlayer::new("sh", sounds.path());

        player.start(request(false));
        wait_until(|| !player.is_playing()).await;
        assert_eq!(play_count(&log), 1);

        sleep(Duration::from_millis(200)).await;
        assert_eq!(play_count(&log), 1);
    }

    #[tokio::test]
    async fn test_start_while_playing_keeps_one_playback() {
        let sounds = scripted_sounds("sleep 5\n");
        let player = CommandSoundPlayer::new("sh", sounds.path());

        player.start(request(true));
        sleep(Duration::from_millis(100)).await;
        assert!(player.is_playing());
        player.start(request(true));
        assert!(player.is_playing());

        player.stop();
        assert!(!player.is_playing());
    }

    #[tokio::test]
    async fn test_failing_command_ends_playback() {
        let sounds = scripted_sounds("exit 3\n");
        let player = CommandSoundPlayer::new("sh", sounds.path());

        player.start(request(true));
        wait_until(|| !player.is_playing()).await;
    }
}
