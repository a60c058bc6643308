use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::{Result, WatchError};
use crate::config::Config;
use crate::fetcher::{ChapterFetcher, HttpFetcher};
use crate::notify::{DiscordNotifier, LogNotifier, Notifier};
use crate::store::sqlite::SqliteStore;
use crate::store::Store;

/// Wires the store, fetcher and notifier together from configuration.
///
/// Everything hangs off trait objects so tests can substitute fakes for
/// any of the three capabilities.
pub struct AppContext {
    pub config: Config,
    pub store: Arc<dyn Store>,
    pub fetcher: Arc<dyn ChapterFetcher>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let db_path = match config.database_path.clone() {
            Some(p) => p,
            None => Self::default_db_path()?,
        };

        let store: Arc<dyn Store> = Arc::new(SqliteStore::new(&db_path)?);
        let fetcher: Arc<dyn ChapterFetcher> = Arc::new(HttpFetcher::new(&config.http)?);
        let notifier: Arc<dyn Notifier> = match config.webhook_url() {
            Some(url) => Arc::new(DiscordNotifier::new(url)?),
            None => Arc::new(LogNotifier),
        };

        Ok(Self {
            config,
            store,
            fetcher,
            notifier,
        })
    }

    pub fn in_memory(config: Config) -> Result<Self> {
        let store: Arc<dyn Store> = Arc::new(SqliteStore::in_memory()?);
        let fetcher: Arc<dyn ChapterFetcher> = Arc::new(HttpFetcher::new(&config.http)?);
        let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);

        Ok(Self {
            config,
            store,
            fetcher,
            notifier,
        })
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| WatchError::Config("Could not find data directory".into()))?;
        let watch_dir = data_dir.join("chapterwatch");
        std::fs::create_dir_all(&watch_dir)?;
        Ok(watch_dir.join("chapterwatch.db"))
    }
}
