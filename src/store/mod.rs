pub mod sqlite;

use crate::app::error::Result;
use crate::domain::{ChapterDescriptor, Series};

pub use sqlite::SqliteStore;

/// Durable state: the series registry and the last-known chapter per series.
///
/// `set_last_chapter` must be atomic per key; a read that finds nothing is
/// `Ok(None)`, distinct from a read that fails.
pub trait Store: Send + Sync {
    // Series registry
    fn add_series(&self, series: &Series) -> Result<()>;
    fn get_series(&self, id: &str) -> Result<Option<Series>>;
    fn get_all_series(&self) -> Result<Vec<Series>>;
    fn remove_series(&self, id: &str) -> Result<()>;

    // Last-known chapter, keyed by series id
    fn get_last_chapter(&self, series_id: &str) -> Result<Option<ChapterDescriptor>>;
    fn set_last_chapter(&self, series_id: &str, chapter: &ChapterDescriptor) -> Result<()>;
}
