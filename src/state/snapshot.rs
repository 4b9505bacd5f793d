//! Derived timer state published to observers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::session::Phase;

/// Everything a display needs to render the timer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub phase: Phase,
    /// Countdown target as `MM:SS` or `HH:MM:SS`
    pub target: String,
    pub target_seconds: u64,
    pub started_at: Option<DateTime<Utc>>,
    /// Last computed remaining time, absent while idle
    pub remaining: Option<String>,
    /// Alternating jiggle phase while the alarm is active
    pub completion_state: Option<bool>,
    pub alarm_active: bool,
}

impl TimerSnapshot {
    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Text to show: the remaining time while running, otherwise the target
    pub fn display(&self) -> &str {
        self.remaining.as_deref().unwrap_or(&self.target)
    }
}
