use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::app::error::Result;
use crate::domain::Series;
use crate::fetcher::ChapterFetcher;
use crate::notify::{new_chapter_message, Notifier};
use crate::schedule;
use crate::store::Store;

/// Result of one fetch-compare-notify-store cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// No chapter was known for this series; the fetched one is now the
    /// baseline.
    FirstSeen(i64),
    /// The fetched chapter number exceeds the stored one.
    NewChapter { from: i64, to: i64 },
    /// Nothing newer than the stored chapter.
    UpToDate(i64),
}

/// The detection loop for a single series.
///
/// Exactly one watcher runs per series id, so the compare-then-store
/// sequence in [`check_once`](Self::check_once) is never raced by another
/// writer of the same key.
pub struct SeriesWatcher {
    series: Series,
    store: Arc<dyn Store>,
    fetcher: Arc<dyn ChapterFetcher>,
    notifier: Arc<dyn Notifier>,
    retry_backoff: Duration,
}

impl SeriesWatcher {
    pub fn new(
        series: Series,
        store: Arc<dyn Store>,
        fetcher: Arc<dyn ChapterFetcher>,
        notifier: Arc<dyn Notifier>,
        retry_backoff: Duration,
    ) -> Self {
        Self {
            series,
            store,
            fetcher,
            notifier,
            retry_backoff,
        }
    }

    /// Run one detection cycle: fetch the latest chapter, compare it to the
    /// stored one, notify and persist on a strict increase.
    ///
    /// A missing stored chapter is treated as equal to the fetched one: the
    /// first successful fetch seeds the baseline without announcing it.
    pub async fn check_once(&self) -> Result<CheckOutcome> {
        let fetched = self.fetcher.fetch_last_chapter(&self.series).await?;
        let stored = self.store.get_last_chapter(&self.series.id)?;

        let Some(previous) = stored else {
            self.store.set_last_chapter(&self.series.id, &fetched)?;
            return Ok(CheckOutcome::FirstSeen(fetched.number));
        };

        if fetched.number <= previous.number {
            return Ok(CheckOutcome::UpToDate(previous.number));
        }

        let message = new_chapter_message(&self.series, previous.number, &fetched);
        info!(series = %self.series.id, "{message}");
        self.notifier.notify(&message).await;
        self.store.set_last_chapter(&self.series.id, &fetched)?;

        Ok(CheckOutcome::NewChapter {
            from: previous.number,
            to: fetched.number,
        })
    }

    /// Run the loop until `shutdown` fires.
    ///
    /// After a successful check the next wake time comes from the schedule
    /// (computed from the current time, so a slow fetch cannot make the
    /// next check fire immediately); after a failed one the watcher retries
    /// after a short fixed backoff instead of waiting for the next
    /// configured hour. Errors never escape the loop.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut consecutive_errors: u32 = 0;

        loop {
            let wait = if consecutive_errors == 0 {
                schedule::wait_duration(&self.series.check_hours, Local::now())
            } else {
                self.retry_backoff
            };
            debug!(
                series = %self.series.id,
                wait_secs = wait.as_secs(),
                "Next check scheduled"
            );

            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                _ = tokio::time::sleep(wait) => {}
            }

            let result = tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                result = self.check_once() => result,
            };

            match result {
                Ok(outcome) => {
                    consecutive_errors = 0;
                    match outcome {
                        CheckOutcome::FirstSeen(number) => {
                            info!(series = %self.series.id, number, "Baseline chapter recorded");
                        }
                        CheckOutcome::UpToDate(number) => {
                            info!(series = %self.series.id, number, "No new chapter available");
                        }
                        // Already logged by check_once
                        CheckOutcome::NewChapter { .. } => {}
                    }
                }
                Err(e) => {
                    consecutive_errors += 1;
                    warn!(
                        series = %self.series.id,
                        consecutive_errors,
                        "Check failed: {e}"
                    );
                }
            }
        }

        debug!(series = %self.series.id, "Watcher stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::app::error::WatchError;
    use crate::domain::{ChapterDescriptor, SiteScan};

    #[derive(Default)]
    struct FakeStore {
        chapters: Mutex<HashMap<String, ChapterDescriptor>>,
        writes: AtomicUsize,
        fail_reads: AtomicBool,
        fail_writes: AtomicBool,
    }

    impl Store for FakeStore {
        fn add_series(&self, _series: &Series) -> Result<()> {
            Ok(())
        }

        fn get_series(&self, _id: &str) -> Result<Option<Series>> {
            Ok(None)
        }

        fn get_all_series(&self) -> Result<Vec<Series>> {
            Ok(Vec::new())
        }

        fn remove_series(&self, _id: &str) -> Result<()> {
            Ok(())
        }

        fn get_last_chapter(&self, series_id: &str) -> Result<Option<ChapterDescriptor>> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(WatchError::Config("store read failed".into()));
            }
            Ok(self.chapters.lock().unwrap().get(series_id).cloned())
        }

        fn set_last_chapter(&self, series_id: &str, chapter: &ChapterDescriptor) -> Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(WatchError::Config("store write failed".into()));
            }
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.chapters
                .lock()
                .unwrap()
                .insert(series_id.to_string(), chapter.clone());
            Ok(())
        }
    }

    struct FakeFetcher {
        chapter: Mutex<Option<ChapterDescriptor>>,
    }

    impl FakeFetcher {
        fn returning(chapter: ChapterDescriptor) -> Self {
            Self {
                chapter: Mutex::new(Some(chapter)),
            }
        }

        fn failing() -> Self {
            Self {
                chapter: Mutex::new(None),
            }
        }
    }

    #[async_trait::async_trait]
    impl ChapterFetcher for FakeFetcher {
        async fn fetch_last_chapter(&self, _series: &Series) -> Result<ChapterDescriptor> {
            self.chapter
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| WatchError::ChapterParse("fetch failed".into()))
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, text: &str) {
            self.messages.lock().unwrap().push(text.to_string());
        }
    }

    fn test_series() -> Series {
        Series::new(
            "martial-peak".into(),
            "Martial Peak".into(),
            "https://example.com/manga/martial-peak/".into(),
            SiteScan::Manhuaplus,
            vec![6, 12, 18],
        )
        .unwrap()
    }

    fn chapter(number: i64) -> ChapterDescriptor {
        ChapterDescriptor {
            number,
            description: format!("Chapter {number}"),
            url: format!("https://example.com/chapter-{number}/"),
        }
    }

    fn watcher_with(
        store: Arc<FakeStore>,
        fetcher: Arc<FakeFetcher>,
        notifier: Arc<RecordingNotifier>,
    ) -> SeriesWatcher {
        SeriesWatcher::new(
            test_series(),
            store,
            fetcher,
            notifier,
            Duration::from_secs(30),
        )
    }

    #[tokio::test]
    async fn test_first_run_seeds_baseline_without_notifying() {
        let store = Arc::new(FakeStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let watcher = watcher_with(
            store.clone(),
            Arc::new(FakeFetcher::returning(chapter(42))),
            notifier.clone(),
        );

        let outcome = watcher.check_once().await.unwrap();

        assert_eq!(outcome, CheckOutcome::FirstSeen(42));
        assert!(notifier.messages.lock().unwrap().is_empty());
        assert_eq!(
            store.get_last_chapter("martial-peak").unwrap().unwrap().number,
            42
        );
    }

    #[tokio::test]
    async fn test_new_chapter_notifies_once_and_updates_store() {
        let store = Arc::new(FakeStore::default());
        store.set_last_chapter("martial-peak", &chapter(40)).unwrap();
        let notifier = Arc::new(RecordingNotifier::default());
        let watcher = watcher_with(
            store.clone(),
            Arc::new(FakeFetcher::returning(chapter(42))),
            notifier.clone(),
        );

        let outcome = watcher.check_once().await.unwrap();

        assert_eq!(outcome, CheckOutcome::NewChapter { from: 40, to: 42 });
        let messages = notifier.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("[40 => 42]"));
        assert_eq!(
            store.get_last_chapter("martial-peak").unwrap().unwrap().number,
            42
        );
    }

    #[tokio::test]
    async fn test_unchanged_chapter_is_a_no_op() {
        let store = Arc::new(FakeStore::default());
        store.set_last_chapter("martial-peak", &chapter(42)).unwrap();
        let notifier = Arc::new(RecordingNotifier::default());
        let watcher = watcher_with(
            store.clone(),
            Arc::new(FakeFetcher::returning(chapter(42))),
            notifier.clone(),
        );

        let outcome = watcher.check_once().await.unwrap();

        assert_eq!(outcome, CheckOutcome::UpToDate(42));
        assert!(notifier.messages.lock().unwrap().is_empty());
        // Only the seeding write above, no rewrite of the same value
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_lower_chapter_never_notifies() {
        let store = Arc::new(FakeStore::default());
        store.set_last_chapter("martial-peak", &chapter(42)).unwrap();
        let notifier = Arc::new(RecordingNotifier::default());
        let watcher = watcher_with(
            store.clone(),
            Arc::new(FakeFetcher::returning(chapter(41))),
            notifier.clone(),
        );

        let outcome = watcher.check_once().await.unwrap();

        assert_eq!(outcome, CheckOutcome::UpToDate(42));
        assert!(notifier.messages.lock().unwrap().is_empty());
        assert_eq!(
            store.get_last_chapter("martial-peak").unwrap().unwrap().number,
            42
        );
    }

    #[tokio::test]
    async fn test_repeated_checks_are_idempotent() {
        let store = Arc::new(FakeStore::default());
        store.set_last_chapter("martial-peak", &chapter(40)).unwrap();
        let notifier = Arc::new(RecordingNotifier::default());
        let watcher = watcher_with(
            store.clone(),
            Arc::new(FakeFetcher::returning(chapter(42))),
            notifier.clone(),
        );

        assert_eq!(
            watcher.check_once().await.unwrap(),
            CheckOutcome::NewChapter { from: 40, to: 42 }
        );
        assert_eq!(watcher.check_once().await.unwrap(), CheckOutcome::UpToDate(42));
        assert_eq!(notifier.messages.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_error_leaves_store_untouched() {
        let store = Arc::new(FakeStore::default());
        store.set_last_chapter("martial-peak", &chapter(40)).unwrap();
        let notifier = Arc::new(RecordingNotifier::default());
        let watcher = watcher_with(
            store.clone(),
            Arc::new(FakeFetcher::failing()),
            notifier.clone(),
        );

        assert!(watcher.check_once().await.is_err());
        assert!(notifier.messages.lock().unwrap().is_empty());
        assert_eq!(
            store.get_last_chapter("martial-peak").unwrap().unwrap().number,
            40
        );
    }

    #[tokio::test]
    async fn test_store_read_error_is_transient_not_first_run() {
        let store = Arc::new(FakeStore::default());
        store.set_last_chapter("martial-peak", &chapter(40)).unwrap();
        store.fail_reads.store(true, Ordering::SeqCst);
        let notifier = Arc::new(RecordingNotifier::default());
        let watcher = watcher_with(
            store.clone(),
            Arc::new(FakeFetcher::returning(chapter(42))),
            notifier.clone(),
        );

        // A failing read must not be mistaken for "no prior chapter"
        assert!(watcher.check_once().await.is_err());
        assert!(notifier.messages.lock().unwrap().is_empty());
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_store_write_failure_keeps_detection_pending() {
        let store = Arc::new(FakeStore::default());
        store.set_last_chapter("martial-peak", &chapter(40)).unwrap();
        store.fail_writes.store(true, Ordering::SeqCst);
        let notifier = Arc::new(RecordingNotifier::default());
        let watcher = watcher_with(
            store.clone(),
            Arc::new(FakeFetcher::returning(chapter(42))),
            notifier.clone(),
        );

        assert!(watcher.check_once().await.is_err());
        assert_eq!(notifier.messages.lock().unwrap().len(), 1);
        assert_eq!(
            store.get_last_chapter("martial-peak").unwrap().unwrap().number,
            40
        );

        // Once the store recovers, the same increase is detected again
        store.fail_writes.store(false, Ordering::SeqCst);
        assert_eq!(
            watcher.check_once().await.unwrap(),
            CheckOutcome::NewChapter { from: 40, to: 42 }
        );
        assert_eq!(notifier.messages.lock().unwrap().len(), 2);
        assert_eq!(
            store.get_last_chapter("martial-peak").unwrap().unwrap().number,
            42
        );
    }

    #[tokio::test]
    async fn test_shutdown_during_wait_exits_without_side_effects() {
        let store = Arc::new(FakeStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let watcher = watcher_with(
            store.clone(),
            Arc::new(FakeFetcher::returning(chapter(42))),
            notifier.clone(),
        );

        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();
        let handle = tokio::spawn(watcher.run(rx));

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("watcher did not stop after shutdown")
            .unwrap();
        assert!(notifier.messages.lock().unwrap().is_empty());
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }
}
