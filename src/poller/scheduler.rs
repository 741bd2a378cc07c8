use std::sync::Arc;
use std::time::Duration;

use teloxide::types::ChatId;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use super::{CycleRun, Trigger};
use crate::bot::notifier::Notifier;
use crate::bot::AppState;

/// Spawn the repeating poll task for `destination`.
///
/// First tick fires after `first_delay`, then every `interval`. A tick that
/// finds a cycle already running is skipped.
pub fn spawn(
    state: Arc<AppState>,
    notifier: Arc<dyn Notifier>,
    destination: ChatId,
    first_delay: Duration,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let start = time::Instant::now() + first_delay;
        let mut ticker = time::interval_at(start, interval.max(Duration::from_secs(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            "Scheduled polling every {}s to chat {}",
            interval.as_secs(),
            destination.0
        );

        loop {
            ticker.tick().await;
            let settings = state.settings.snapshot().await;
            match state
                .poller
                .run(notifier.as_ref(), destination, &settings, Trigger::Scheduled)
                .await
            {
                CycleRun::Completed(report) if report.fetch_failed => {
                    tracing::warn!("Scheduled cycle could not reach Divar, retrying next tick");
                }
                CycleRun::Completed(_) => {}
                CycleRun::Busy => {}
            }
        }
    })
}
