use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::app::error::Result;
use crate::fetcher::ChapterFetcher;
use crate::notify::Notifier;
use crate::store::Store;
use crate::watcher::SeriesWatcher;

/// Owns one [`SeriesWatcher`] task per registered series and runs them all
/// until the shutdown signal fires.
pub struct WatcherSupervisor {
    store: Arc<dyn Store>,
    fetcher: Arc<dyn ChapterFetcher>,
    notifier: Arc<dyn Notifier>,
    retry_backoff: Duration,
}

impl WatcherSupervisor {
    pub fn new(
        store: Arc<dyn Store>,
        fetcher: Arc<dyn ChapterFetcher>,
        notifier: Arc<dyn Notifier>,
        retry_backoff: Duration,
    ) -> Self {
        Self {
            store,
            fetcher,
            notifier,
            retry_backoff,
        }
    }

    /// Load the series registry and watch every entry until `shutdown`
    /// fires.
    ///
    /// Fails only when the registry itself cannot be read; individual
    /// series failures stay inside their watcher.
    pub async fn run(&self, shutdown: watch::Receiver<bool>) -> Result<()> {
        let series_list = self.store.get_all_series()?;

        if series_list.is_empty() {
            warn!("No series registered; nothing to watch");
            return Ok(());
        }

        info!(count = series_list.len(), "Starting series watchers");

        let mut handles: Vec<JoinHandle<()>> = Vec::new();
        for series in series_list {
            let watcher = SeriesWatcher::new(
                series,
                self.store.clone(),
                self.fetcher.clone(),
                self.notifier.clone(),
                self.retry_backoff,
            );
            handles.push(tokio::spawn(watcher.run(shutdown.clone())));
        }

        for handle in handles {
            if let Err(e) = handle.await {
                error!("Watcher task join error: {e}");
            }
        }

        info!("All watchers stopped");
        Ok(())
    }
}
