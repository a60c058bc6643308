//! The per-series detection loop and its supervisor.

mod series_watcher;
mod supervisor;

pub use series_watcher::{CheckOutcome, SeriesWatcher};
pub use supervisor::WatcherSupervisor;
