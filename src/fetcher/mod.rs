pub mod http;

use async_trait::async_trait;

use crate::app::error::Result;
use crate::domain::{ChapterDescriptor, Series};

pub use http::HttpFetcher;

/// Capability to resolve the latest chapter published for a series.
///
/// Per-site differences live in [`SiteScan`](crate::domain::SiteScan)
/// selectors, not in implementations of this trait.
#[async_trait]
pub trait ChapterFetcher: Send + Sync {
    async fn fetch_last_chapter(&self, series: &Series) -> Result<ChapterDescriptor>;
}
