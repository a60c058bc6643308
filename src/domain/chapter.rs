use serde::{Deserialize, Serialize};

/// The fetched representation of "latest chapter" for a series.
///
/// Only `number` participates in comparisons; description and URL are
/// opaque display payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterDescriptor {
    pub number: i64,
    pub description: String,
    pub url: String,
}
