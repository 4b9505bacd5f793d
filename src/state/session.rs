//! Countdown session state machine
//!
//! ```text
//!            start / Set              elapsed >= target
//!   Idle ───────────────► Running ─────────────────────► Completing
//!    ▲                      │  ▲                             │
//!    │        stop          │  │  Add / stop_alarm           │
//!    └──────────────────────┘  └─────────────────────────────┘
//!    ▲                    stop                               │
//!    └───────────────────────────────────────────────────────┘
//! ```
//!
//! The session never owns a clock thread. The host calls [`TimerSession::tick`]
//! on a period while [`TimerSession::needs_tick`] holds, and steps the alarm
//! alternation with [`TimerSession::jiggle`] using the handle returned when the
//! countdown completes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::alarm::{AlarmHandle, AlarmLoop};
use super::snapshot::TimerSnapshot;
use crate::{
    services::{Settings, SettingsPatch, SettingsWriter, SoundPlayer, SoundRequest},
    timer::{TimerAction, TimerDuration},
    utils::Clock,
};

/// Coarse lifecycle state, derived from the session fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Running,
    Completing,
}

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running, or the countdown already finished; nothing changed
    Idle,
    /// Still counting down
    Counting { remaining: TimerDuration },
    /// The countdown just reached zero and a new alarm episode began.
    /// Step it with [`TimerSession::jiggle`] until that returns false.
    Completed { alarm: AlarmHandle },
}

pub struct TimerSession {
    target: TimerDuration,
    started_at: Option<DateTime<Utc>>,
    remaining: Option<String>,
    completion: Option<bool>,
    /// Cleared once the countdown completes so a dismissed alarm stays dismissed
    ticking: bool,
    alarm: AlarmLoop,
    settings: Settings,
    clock: Arc<dyn Clock>,
    player: Arc<dyn SoundPlayer>,
    saves: SettingsWriter,
}

impl TimerSession {
    /// Create an idle session targeting the stored duration. Changes are
    /// queued on `saves` and never written from here.
    pub fn new(
        clock: Arc<dyn Clock>,
        player: Arc<dyn SoundPlayer>,
        settings: Settings,
        saves: SettingsWriter,
    ) -> Self {
        let target = settings.timer_duration();
        info!("Timer session created with {} target", target);

        Self {
            target,
            started_at: None,
            remaining: None,
            completion: None,
            ticking: false,
            alarm: AlarmLoop::new(),
            settings,
            clock,
            player,
            saves,
        }
    }

    /// Apply a parsed action. Any alarm episode ends before the new target takes effect.
    pub fn apply(&mut self, action: TimerAction) {
        match action {
            TimerAction::Set(duration) => {
                self.set_target(duration);
                let now = self.clock.now();
                self.started_at = Some(now);
                self.ticking = true;
                self.remaining = Some(duration.formatted());
                info!("Timer set to {} and started", duration);
            }
            TimerAction::Add(delta) => {
                let target = self.target.offset_by(delta);
                self.set_target(target);
                // A changed target is re-evaluated even after completion
                self.ticking = self.started_at.is_some();
                info!("Timer adjusted by {} to {}", delta, target);
            }
        }
    }

    /// Start counting down from the current target. Returns false if already running.
    pub fn start(&mut self) -> bool {
        if self.started_at.is_some() {
            return false;
        }
        self.stop_alarm(true);
        self.started_at = Some(self.clock.now());
        self.ticking = true;
        self.remaining = Some(self.target.formatted());
        info!("Timer started for {}", self.target);
        true
    }

    /// Stop counting, keeping the target. Returns false if it was not running.
    pub fn stop(&mut self) -> bool {
        let was_running = self.started_at.take().is_some();
        self.ticking = false;
        self.remaining = None;
        self.stop_alarm(true);
        if was_running {
            info!("Timer stopped");
        }
        was_running
    }

    /// Evaluate elapsed time at `now`
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        let Some(started_at) = self.started_at else {
            return TickOutcome::Idle;
        };
        if !self.ticking {
            return TickOutcome::Idle;
        }

        if is_expired(now, started_at, self.target) {
            self.remaining = Some(TimerDuration::ZERO.formatted());
            self.ticking = false;
            if self.completion.is_some() {
                return TickOutcome::Idle;
            }
            let alarm = self.begin_completion();
            return TickOutcome::Completed { alarm };
        }

        let remaining = remaining_until(now, started_at, self.target);
        self.remaining = Some(remaining.formatted());
        debug!("Tick: {} remaining", remaining);
        TickOutcome::Counting { remaining }
    }

    /// Tick using the session's own clock
    pub fn tick_now(&mut self) -> TickOutcome {
        let now = self.clock.now();
        self.tick(now)
    }

    /// Flip the jiggle phase of the alarm episode `handle` belongs to.
    /// Returns false once that episode has been cancelled.
    pub fn jiggle(&mut self, handle: AlarmHandle) -> bool {
        if !self.alarm.is_current(handle) {
            return false;
        }
        self.completion = Some(!self.completion.unwrap_or(false));
        true
    }

    /// End any alarm episode. Safe to call at any time, any number of times.
    pub fn stop_alarm(&mut self, stop_sound: bool) {
        let was_active = self.alarm.cancel();
        self.completion = None;
        if was_active {
            if stop_sound {
                self.player.stop();
            }
            info!("Alarm stopped");
        }
    }

    /// Update the sound settings and persist them
    pub fn update_settings(&mut self, patch: &SettingsPatch) -> &Settings {
        if patch.apply_to(&mut self.settings) {
            if !self.settings.is_sound_enabled && self.alarm.is_active() {
                self.player.stop();
            }
            self.persist();
        }
        &self.settings
    }

    pub fn target(&self) -> TimerDuration {
        self.target
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn remaining_string(&self) -> Option<&str> {
        self.remaining.as_deref()
    }

    pub fn completion_state(&self) -> Option<bool> {
        self.completion
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn is_alarm_active(&self) -> bool {
        self.alarm.is_active()
    }

    /// Whether the host should keep calling [`tick`](Self::tick)
    pub fn needs_tick(&self) -> bool {
        self.started_at.is_some() && self.ticking
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn phase(&self) -> Phase {
        match (self.started_at, self.completion) {
            (None, _) => Phase::Idle,
            (Some(_), None) => Phase::Running,
            (Some(_), Some(_)) => Phase::Completing,
        }
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.phase(),
            target: self.target.formatted(),
            target_seconds: self.target.total_seconds(),
            started_at: self.started_at,
            remaining: self.remaining.clone(),
            completion_state: self.completion,
            alarm_active: self.alarm.is_active(),
        }
    }

    fn set_target(&mut self, target: TimerDuration) {
        self.stop_alarm(true);
        self.target = target;
        self.settings.set_timer_duration(target);
        self.persist();
    }

    fn begin_completion(&mut self) -> AlarmHandle {
        // Keep any sound going; a new episode replaces the old one
        self.stop_alarm(false);
        let handle = self.alarm.start();
        self.completion = Some(true);
        info!("Timer completed, alarm episode {} started", handle.id());

        if self.settings.is_sound_enabled {
            self.player.start(SoundRequest {
                sound: self.settings.selected_sound,
                repeat: self.settings.repeat_sound,
                offset: self.settings.sound_offset(),
            });
        }
        handle
    }

    fn persist(&self) {
        self.saves.save(&self.settings);
    }
}

/// Milliseconds elapsed; time before `started_at` counts as zero
fn elapsed_millis(now: DateTime<Utc>, started_at: DateTime<Utc>) -> u64 {
    u64::try_from((now - started_at).num_milliseconds()).unwrap_or(0)
}

fn is_expired(now: DateTime<Utc>, started_at: DateTime<Utc>, target: TimerDuration) -> bool {
    elapsed_millis(now, started_at) >= target.total_seconds().saturating_mul(1000)
}

/// `target - elapsed + 1` truncated to whole seconds, for an unexpired countdown
fn remaining_until(now: DateTime<Utc>, started_at: DateTime<Utc>, target: TimerDuration) -> TimerDuration {
    let left_ms = target
        .total_seconds()
        .saturating_mul(1000)
        .saturating_sub(elapsed_millis(now, started_at));
    TimerDuration::from_secs(left_ms.saturating_add(1000) / 1000)
}
