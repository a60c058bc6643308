//! # chapterwatch
//!
//! Watches manga/manhua series pages for new chapter releases and posts a
//! notification when one appears.
//!
//! ## Architecture
//!
//! ```text
//! WatcherSupervisor → one SeriesWatcher task per registered series
//!                       └─ sleep until check hour → fetch → compare → notify + store
//! ```
//!
//! Each series runs its own independent, cancellable loop. The store is the
//! only shared state, and it is partitioned by series id, so detection never
//! races across watchers.
//!
//! ## Modules
//!
//! - [`app`]: application context and error types
//! - [`cli`]: command-line interface definitions
//! - [`config`]: TOML configuration with commented defaults
//! - [`domain`]: core domain models (Series, ChapterDescriptor)
//! - [`schedule`]: next-check-time computation
//! - [`fetcher`]: HTTP fetching and per-site chapter extraction
//! - [`notify`]: best-effort outbound notifications
//! - [`store`]: SQLite persistence
//! - [`watcher`]: the per-series detection loop and its supervisor

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod fetcher;
pub mod notify;
pub mod schedule;
pub mod store;
pub mod watcher;
