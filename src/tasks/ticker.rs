//! Tick driver background task

use std::{sync::Arc, time::Duration};
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{debug, error, info};

use super::alarm::alarm_task;
use crate::state::{AppState, TickOutcome};

/// Background task that ticks the session while it is counting down.
///
/// Sleeps until the session asks for ticks again, and spawns an
/// [`alarm_task`] whenever a countdown completes.
pub async fn ticker_task(state: Arc<AppState>, period: Duration, jiggle_period: Duration) {
    info!("Starting tick driver, period {:?}", period);

    let mut ticking = state.subscribe_ticking();
    let mut ticks = interval(period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        if !*ticking.borrow_and_update() {
            if ticking.wait_for(|&wanted| wanted).await.is_err() {
                info!("Tick channel closed, stopping tick driver");
                return;
            }
            ticks.reset();
        }

        ticks.tick().await;

        match state.tick() {
            Ok(TickOutcome::Counting { remaining }) => {
                debug!("Countdown at {}", remaining);
            }
            Ok(TickOutcome::Completed { alarm }) => {
                info!("Countdown finished, starting alarm episode {}", alarm.id());
                tokio::spawn(alarm_task(Arc::clone(&state), alarm, jiggle_period));
            }
            Ok(TickOutcome::Idle) => {}
            Err(e) => {
                error!("Failed to tick timer: {}", e);
                sleep(Duration::from_secs(1)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        services::{Settings, SettingsWriter, SilentSoundPlayer},
        state::{Phase, TimerSession},
        utils::ManualClock,
    };

    #[tokio::test(start_paused = true)]
    async fn test_ticker_drives_countdown_to_alarm() {
        let clock = ManualClock::default();
        let session = TimerSession::new(
            Arc::new(clock.clone()),
            Arc::new(SilentSoundPlayer),
            Settings::default(),
            SettingsWriter::new().0,
        );
        let state = Arc::new(AppState::new(0, "127.0.0.1".to_string(), session));
        let task = tokio::spawn(ticker_task(
            Arc::clone(&state),
            Duration::from_millis(100),
            Duration::from_millis(100),
        ));

        state.submit_query("2s").unwrap();
        clock.advance(chrono::Duration::milliseconds(1500));
        sleep(Duration::from_millis(250)).await;
        assert_eq!(state.snapshot().remaining.as_deref(), Some("00:01"));

        clock.advance(chrono::Duration::seconds(1));
        sleep(Duration::from_millis(250)).await;
        let snapshot = state.snapshot();
        assert_eq!(snapshot.phase, Phase::Completing);
        assert_eq!(snapshot.remaining.as_deref(), Some("00:00"));
        assert!(snapshot.alarm_active);

        state.stop().unwrap();
        sleep(Duration::from_millis(250)).await;
        assert_eq!(state.snapshot().phase, Phase::Idle);

        // A parked driver wakes for the next countdown
        state.submit_query("1s").unwrap();
        clock.advance(chrono::Duration::seconds(1));
        sleep(Duration::from_millis(250)).await;
        assert_eq!(state.snapshot().phase, Phase::Completing);

        task.abort();
    }
}
