//! Alarm alternation background task

use std::{sync::Arc, time::Duration};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::state::{AlarmHandle, AppState};

/// Background task that flips the jiggle phase of one alarm episode on a
/// fixed cadence. Exits as soon as the episode is cancelled.
pub async fn alarm_task(state: Arc<AppState>, alarm: AlarmHandle, period: Duration) {
    info!("Alarm episode {} running", alarm.id());

    let mut steps = interval(period);
    steps.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the episode starts in phase `true`
    steps.tick().await;

    loop {
        steps.tick().await;

        match state.jiggle(alarm) {
            Ok(true) => {}
            Ok(false) => {
                debug!("Alarm episode {} cancelled", alarm.id());
                break;
            }
            Err(e) => {
                warn!("Failed to step alarm episode {}: {}", alarm.id(), e);
                break;
            }
        }
    }
}
