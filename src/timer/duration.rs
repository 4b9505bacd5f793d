//! Timer durations, signed deltas and display formatting

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unit a parsed count is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Hours,
    Minutes,
    Seconds,
}

impl TimeUnit {
    /// Number of seconds in one of this unit
    pub fn seconds_per_unit(self) -> u64 {
        match self {
            TimeUnit::Hours => 3600,
            TimeUnit::Minutes => 60,
            TimeUnit::Seconds => 1,
        }
    }

    /// Convert a count of this unit into seconds, `None` on overflow
    pub fn to_seconds(self, count: u64) -> Option<u64> {
        count.checked_mul(self.seconds_per_unit())
    }
}

/// A non-negative span of time stored as whole seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerDuration(u64);

impl TimerDuration {
    pub const ZERO: TimerDuration = TimerDuration(0);

    pub const fn from_secs(seconds: u64) -> Self {
        Self(seconds)
    }

    pub const fn hours(hours: u64) -> Self {
        Self(hours * 3600)
    }

    pub const fn minutes(minutes: u64) -> Self {
        Self(minutes * 60)
    }

    pub const fn seconds(seconds: u64) -> Self {
        Self(seconds)
    }

    pub const fn total_seconds(&self) -> u64 {
        self.0
    }

    pub const fn hours_part(&self) -> u64 {
        self.0 / 3600
    }

    pub const fn minutes_part(&self) -> u64 {
        (self.0 / 60) % 60
    }

    pub const fn seconds_part(&self) -> u64 {
        self.0 % 60
    }

    pub fn incremented(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// One second less, floored at zero
    pub fn decremented(self) -> Self {
        Self(self.0.saturating_sub(1))
    }

    /// Apply a signed delta, clamping the result at zero
    pub fn offset_by(self, delta: TimerDelta) -> Self {
        let seconds = delta.total_seconds();
        if seconds >= 0 {
            Self(self.0.saturating_add(seconds.unsigned_abs()))
        } else {
            Self(self.0.saturating_sub(seconds.unsigned_abs()))
        }
    }

    /// Render as `MM:SS`, or `HH:MM:SS` once an hour or more is left
    pub fn formatted(&self) -> String {
        let hours = self.hours_part();
        if hours == 0 {
            format!("{:02}:{:02}", self.minutes_part(), self.seconds_part())
        } else {
            format!("{:02}:{:02}:{:02}", hours, self.minutes_part(), self.seconds_part())
        }
    }
}

impl fmt::Display for TimerDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}

/// A signed change to a timer duration, in whole seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerDelta(i64);

impl TimerDelta {
    pub const fn from_secs(seconds: i64) -> Self {
        Self(seconds)
    }

    pub const fn hours(hours: i64) -> Self {
        Self(hours * 3600)
    }

    pub const fn minutes(minutes: i64) -> Self {
        Self(minutes * 60)
    }

    pub const fn seconds(seconds: i64) -> Self {
        Self(seconds)
    }

    pub const fn total_seconds(&self) -> i64 {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for TimerDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "+" };
        write!(f, "{}{}", sign, TimerDuration::from_secs(self.0.unsigned_abs()))
    }
}
