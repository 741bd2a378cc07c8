pub mod cycle;
pub mod scheduler;

use std::path::PathBuf;
use std::sync::Arc;

use teloxide::types::ChatId;
use tokio::sync::Mutex;

use crate::bot::notifier::Notifier;
use crate::divar::ListingSource;
use crate::store::models::FilterSettings;
use crate::store::save_seen;
use crate::store::seen::SeenSet;
pub use cycle::{run_cycle, CycleOptions, CycleReport, Trigger};

/// Outcome of asking the poller to run.
#[derive(Debug)]
pub enum CycleRun {
    Completed(CycleReport),
    /// Another cycle was already in flight; nothing was done.
    Busy,
}

/// Owns the seen-set and makes sure only one cycle runs at a time.
pub struct Poller {
    source: Arc<dyn ListingSource>,
    options: CycleOptions,
    seen: Mutex<SeenSet>,
    seen_path: PathBuf,
    running: Mutex<()>,
    last_report: Mutex<Option<CycleReport>>,
}

impl Poller {
    pub fn new(
        source: Arc<dyn ListingSource>,
        options: CycleOptions,
        seen: SeenSet,
        seen_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source,
            options,
            seen: Mutex::new(seen),
            seen_path: seen_path.into(),
            running: Mutex::new(()),
            last_report: Mutex::new(None),
        }
    }

    /// Run one cycle unless one is already in progress. The seen-set is
    /// written to disk only when at least one listing was delivered.
    pub async fn run(
        &self,
        notifier: &dyn Notifier,
        destination: ChatId,
        settings: &FilterSettings,
        trigger: Trigger,
    ) -> CycleRun {
        let Ok(_running) = self.running.try_lock() else {
            tracing::info!("Skipping {} cycle, another one is in flight", trigger);
            return CycleRun::Busy;
        };

        // Work on a copy so readers never wait on network calls. `running`
        // keeps this the only writer.
        let mut seen = self.seen.lock().await.clone();
        let report = run_cycle(
            self.source.as_ref(),
            notifier,
            destination,
            settings,
            &mut seen,
            &self.options,
            trigger,
        )
        .await;

        if report.delivered > 0 {
            if let Err(e) = save_seen(&self.seen_path, &seen).await {
                tracing::error!("Failed to save seen listings to {:?}: {}", self.seen_path, e);
            }
        }
        *self.seen.lock().await = seen;

        *self.last_report.lock().await = Some(report.clone());
        CycleRun::Completed(report)
    }

    pub async fn seen_len(&self) -> usize {
        self.seen.lock().await.len()
    }

    pub async fn last_report(&self) -> Option<CycleReport> {
        self.last_report.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::cycle::tests::{fast_options, listing, FakeSource, RecordingNotifier};
    use super::*;
    use crate::divar::{ListingSummary, SearchQuery};
    use crate::error::ScoutError;
    use crate::store::{load_seen, SettingsStore};
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Search that signals when it starts and then hangs for a while.
    struct SlowSource {
        started: Notify,
        delay: Duration,
    }

    #[async_trait]
    impl ListingSource for SlowSource {
        async fn search(&self, _: &SearchQuery) -> Result<Vec<ListingSummary>, ScoutError> {
            self.started.notify_one();
            tokio::time::sleep(self.delay).await;
            Ok(vec![listing("late")])
        }

        async fn photos(&self, _: &str) -> Vec<String> {
            Vec::new()
        }
    }

    #[tokio::test]
    async fn test_failed_search_leaves_persisted_files_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let seen_path = dir.path().join("seen_ads.json");
        let settings_path = dir.path().join("bot_settings.json");

        let store = SettingsStore::open(&settings_path).await;
        store.update(|s| s.set(crate::store::models::Field::MinPrice, "100")).await.unwrap();
        let seen = SeenSet::from_tokens(["a", "b"].map(String::from), 1000);
        save_seen(&seen_path, &seen).await.unwrap();

        let settings_before = std::fs::read(&settings_path).unwrap();
        let seen_before = std::fs::read(&seen_path).unwrap();

        let poller = Poller::new(Arc::new(FakeSource::failing()), fast_options(), seen, &seen_path);
        let notifier = RecordingNotifier::default();
        let run = poller
            .run(&notifier, ChatId(7), &store.snapshot().await, Trigger::Scheduled)
            .await;

        assert!(matches!(run, CycleRun::Completed(ref r) if r.fetch_failed));
        assert_eq!(std::fs::read(&settings_path).unwrap(), settings_before);
        assert_eq!(std::fs::read(&seen_path).unwrap(), seen_before);
    }

    #[tokio::test]
    async fn test_delivered_tokens_are_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let seen_path = dir.path().join("seen_ads.json");
        let poller = Poller::new(
            Arc::new(FakeSource::returning(&["a", "b"])),
            fast_options(),
            SeenSet::new(1000),
            &seen_path,
        );
        let notifier = RecordingNotifier::default();

        poller
            .run(&notifier, ChatId(7), &FilterSettings::default(), Trigger::Manual)
            .await;

        let reloaded = load_seen(&seen_path, 1000).await;
        assert_eq!(reloaded.to_vec(), vec!["b", "a"]);
        assert_eq!(poller.seen_len().await, 2);
        let last = poller.last_report().await.unwrap();
        assert_eq!(last.delivered, 2);
        assert_eq!(last.trigger, Trigger::Manual);
    }

    #[tokio::test]
    async fn test_nothing_delivered_writes_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let seen_path = dir.path().join("seen_ads.json");
        let poller = Poller::new(
            Arc::new(FakeSource::returning(&[])),
            fast_options(),
            SeenSet::new(1000),
            &seen_path,
        );

        poller
            .run(&RecordingNotifier::default(), ChatId(7), &FilterSettings::default(), Trigger::Scheduled)
            .await;

        assert!(!seen_path.exists());
    }

    #[tokio::test]
    async fn test_overlapping_run_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let poller = Poller::new(
            Arc::new(FakeSource::returning(&["a"])),
            fast_options(),
            SeenSet::new(1000),
            dir.path().join("seen_ads.json"),
        );

        let _in_flight = poller.running.lock().await;
        let run = poller
            .run(&RecordingNotifier::default(), ChatId(7), &FilterSettings::default(), Trigger::Scheduled)
            .await;
        assert!(matches!(run, CycleRun::Busy));
        assert_eq!(poller.seen.lock().await.len(), 0);
    }

    #[tokio::test]
    async fn test_seen_len_answers_while_cycle_in_flight() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(SlowSource {
            started: Notify::new(),
            delay: Duration::from_secs(2),
        });
        let poller = Arc::new(Poller::new(
            source.clone(),
            fast_options(),
            SeenSet::from_tokens(["a".to_string()], 1000),
            dir.path().join("seen_ads.json"),
        ));

        let running = poller.clone();
        let cycle = tokio::spawn(async move {
            running
                .run(&RecordingNotifier::default(), ChatId(7), &FilterSettings::default(), Trigger::Scheduled)
                .await
        });
        source.started.notified().await;

        let len = tokio::time::timeout(Duration::from_millis(500), poller.seen_len()).await;
        assert_eq!(len.expect("seen_len blocked behind the cycle"), 1);

        assert!(matches!(cycle.await.unwrap(), CycleRun::Completed(ref r) if r.delivered == 1));
        assert_eq!(poller.seen_len().await, 2);
    }

    #[tokio::test]
    async fn test_unwritable_seen_file_keeps_memory_authoritative() {
        let dir = tempfile::tempdir().unwrap();
        let seen_path = dir.path().join("missing-dir").join("seen_ads.json");
        let poller = Poller::new(
            Arc::new(FakeSource::returning(&["a", "b"])),
            fast_options(),
            SeenSet::new(1000),
            &seen_path,
        );
        let notifier = RecordingNotifier::default();

        let run = poller
            .run(&notifier, ChatId(7), &FilterSettings::default(), Trigger::Manual)
            .await;

        assert!(matches!(run, CycleRun::Completed(ref r) if r.delivered == 2));
        assert!(!seen_path.exists());
        assert_eq!(poller.seen_len().await, 2);

        // Already-delivered listings are not re-sent on the next tick.
        let again = poller
            .run(&notifier, ChatId(7), &FilterSettings::default(), Trigger::Scheduled)
            .await;
        assert!(matches!(again, CycleRun::Completed(ref r) if r.delivered == 0));
    }
}
