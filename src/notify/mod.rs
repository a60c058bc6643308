pub mod discord;

use async_trait::async_trait;

use crate::domain::{ChapterDescriptor, Series};

pub use discord::DiscordNotifier;

/// Best-effort delivery of a text message to the configured channel.
///
/// Implementations swallow delivery failures; a lost message never affects
/// scheduling or detection state.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, text: &str);
}

/// Fallback notifier used when no webhook is configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, text: &str) {
        tracing::info!("{text}");
    }
}

/// Message announcing a detected chapter increase.
pub fn new_chapter_message(
    series: &Series,
    old_number: i64,
    chapter: &ChapterDescriptor,
) -> String {
    format!(
        ">>> **[ {} ] New Chapter Available [{} => {}]**\n{}\n{}",
        series.title, old_number, chapter.number, chapter.description, chapter.url
    )
}
