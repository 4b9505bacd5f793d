//! Main application state management

use std::{sync::Mutex, time::Instant};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use super::{
    alarm::AlarmHandle,
    session::{TickOutcome, TimerSession},
    snapshot::TimerSnapshot,
};
use crate::{
    services::{Settings, SettingsPatch},
    timer::{ParseError, Query, TimerAction},
};

#[derive(Debug, Error)]
pub enum StateError {
    #[error("timer session lock poisoned")]
    Poisoned,
}

/// What a text query ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Started,
    Stopped,
    Applied(TimerAction),
    /// The query did not parse; nothing changed
    Rejected(ParseError),
}

impl QueryOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            QueryOutcome::Started => "start",
            QueryOutcome::Stopped => "stop",
            QueryOutcome::Applied(TimerAction::Set(_)) => "set",
            QueryOutcome::Applied(TimerAction::Add(_)) => "add",
            QueryOutcome::Rejected(_) => "rejected",
        }
    }
}

/// Owner of the single timer session. Every mutation is serialized through
/// the session lock and followed by a snapshot on the watch channel.
pub struct AppState {
    session: Mutex<TimerSession>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Channel for timer snapshots
    pub timer_update_tx: watch::Sender<TimerSnapshot>,
    /// Keep the receiver alive to prevent channel closure
    pub _timer_update_rx: watch::Receiver<TimerSnapshot>,
    /// Whether the session wants ticks; changes only when that flips
    ticking_tx: watch::Sender<bool>,
}

impl AppState {
    pub fn new(port: u16, host: String, session: TimerSession) -> Self {
        let (timer_update_tx, timer_update_rx) = watch::channel(session.snapshot());
        let (ticking_tx, _) = watch::channel(session.needs_tick());

        Self {
            session: Mutex::new(session),
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            timer_update_tx,
            _timer_update_rx: timer_update_rx,
            ticking_tx,
        }
    }

    /// Run `updater` against the session and publish the resulting snapshot.
    /// `action` is recorded as the last action when given.
    pub fn update_session<F, R>(&self, action: Option<&str>, updater: F) -> Result<R, StateError>
    where
        F: FnOnce(&mut TimerSession) -> R,
    {
        let mut session = self.session.lock().map_err(|_| StateError::Poisoned)?;
        let result = updater(&mut session);
        let snapshot = session.snapshot();
        let needs_tick = session.needs_tick();

        // Publish before releasing the lock so snapshots arrive in mutation order
        self.timer_update_tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
        self.ticking_tx.send_if_modified(|current| {
            let flipped = *current != needs_tick;
            *current = needs_tick;
            flipped
        });
        drop(session);

        if let Some(action) = action {
            self.record_action(action);
        }

        Ok(result)
    }

    /// Route a raw text query: control keywords, otherwise a timer action.
    /// Classification and mutation happen under one lock.
    pub fn submit_query(&self, raw: &str) -> Result<QueryOutcome, StateError> {
        let outcome = self.update_session(None, |session| {
            match Query::classify(raw, session.is_running()) {
                Ok(Query::Start) => {
                    session.start();
                    QueryOutcome::Started
                }
                Ok(Query::Stop) => {
                    session.stop();
                    QueryOutcome::Stopped
                }
                Ok(Query::Action(action)) => {
                    session.apply(action);
                    QueryOutcome::Applied(action)
                }
                Err(e) => QueryOutcome::Rejected(e),
            }
        })?;

        match &outcome {
            QueryOutcome::Rejected(e) => warn!("Rejected timer query {:?}: {}", raw, e),
            accepted => self.record_action(accepted.label()),
        }
        Ok(outcome)
    }

    pub fn apply(&self, action: TimerAction) -> Result<TimerSnapshot, StateError> {
        let label = QueryOutcome::Applied(action).label();
        self.update_session(Some(label), |session| {
            session.apply(action);
            session.snapshot()
        })
    }

    /// Start the countdown. Returns false if it was already running.
    pub fn start(&self) -> Result<bool, StateError> {
        self.update_session(Some("start"), |session| session.start())
    }

    /// Stop the countdown. Returns false if it was not running.
    pub fn stop(&self) -> Result<bool, StateError> {
        self.update_session(Some("stop"), |session| session.stop())
    }

    /// Dismiss the alarm and silence the sound
    pub fn stop_alarm(&self) -> Result<(), StateError> {
        self.update_session(Some("stop-alarm"), |session| session.stop_alarm(true))
    }

    pub fn tick(&self) -> Result<TickOutcome, StateError> {
        self.update_session(None, |session| session.tick_now())
    }

    /// Step the alarm episode `handle`; false once it has been cancelled
    pub fn jiggle(&self, handle: AlarmHandle) -> Result<bool, StateError> {
        self.update_session(None, |session| session.jiggle(handle))
    }

    pub fn update_settings(&self, patch: &SettingsPatch) -> Result<Settings, StateError> {
        info!("Updating settings: {:?}", patch);
        self.update_session(Some("settings"), |session| session.update_settings(patch).clone())
    }

    pub fn get_settings(&self) -> Result<Settings, StateError> {
        self.session
            .lock()
            .map(|session| session.settings().clone())
            .map_err(|_| StateError::Poisoned)
    }

    /// Whether the session currently wants ticks
    pub fn needs_tick(&self) -> bool {
        *self.ticking_tx.borrow()
    }

    /// Receive changes of [`needs_tick`](Self::needs_tick) only
    pub fn subscribe_ticking(&self) -> watch::Receiver<bool> {
        self.ticking_tx.subscribe()
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> TimerSnapshot {
        self.timer_update_tx.borrow().clone()
    }

    /// Receive every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.timer_update_tx.subscribe()
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
