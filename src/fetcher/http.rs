use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};

use crate::app::error::{Result, WatchError};
use crate::config::HttpConfig;
use crate::domain::{ChapterDescriptor, Series, SiteScan};
use crate::fetcher::ChapterFetcher;

/// CSS selector locating the newest chapter link on a series page.
fn chapter_selector(scan: SiteScan) -> &'static str {
    match scan {
        SiteScan::Manhuaplus => ".wp-manga-chapter:nth-child(1) a",
        SiteScan::Asurascans => "#chapterlist > ul > li:nth-child(1) > div > div > a",
    }
}

/// Fetches series pages over HTTP and extracts the newest chapter entry.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ChapterFetcher for HttpFetcher {
    async fn fetch_last_chapter(&self, series: &Series) -> Result<ChapterDescriptor> {
        let response = self.client.get(&series.url).send().await?;

        if !response.status().is_success() {
            return Err(WatchError::UnexpectedStatus(response.status()));
        }

        let body = response.text().await?;
        parse_chapter(&body, chapter_selector(series.scan))
    }
}

/// Extract the newest chapter entry from a series page.
///
/// The chapter number is the first whitespace-separated token of the entry
/// text that parses as an integer ("Chapter 42 - ..." yields 42).
fn parse_chapter(html: &str, selector: &str) -> Result<ChapterDescriptor> {
    let selector = Selector::parse(selector)
        .map_err(|e| WatchError::ChapterParse(format!("invalid selector: {e}")))?;

    let document = Html::parse_document(html);
    let entry = document
        .select(&selector)
        .next()
        .ok_or_else(|| WatchError::ChapterParse("no chapter entry matched the selector".into()))?;

    let description = entry
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ");

    let number = description
        .split_whitespace()
        .find_map(|token| token.parse::<i64>().ok())
        .ok_or_else(|| {
            WatchError::ChapterParse(format!("no chapter number in {description:?}"))
        })?;

    let url = entry
        .value()
        .attr("href")
        .ok_or_else(|| WatchError::ChapterParse("chapter entry has no href".into()))?
        .to_string();

    Ok(ChapterDescriptor {
        number,
        description,
        url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANHUAPLUS_PAGE: &str = r#"
        <html><body>
          <ul class="chapters">
            <li class="wp-manga-chapter">
              <a href="https://example.com/manga/martial-peak/chapter-3412/">
                Chapter 3412 - The Peak
              </a>
            </li>
            <li class="wp-manga-chapter">
              <a href="https://example.com/manga/martial-peak/chapter-3411/">Chapter 3411</a>
            </li>
          </ul>
        </body></html>
    "#;

    const ASURA_PAGE: &str = r#"
        <html><body>
          <div id="chapterlist">
            <ul>
              <li><div><div>
                <a href="https://example.com/solo-leveling-chapter-179/">Chapter 179</a>
              </div></div></li>
              <li><div><div>
                <a href="https://example.com/solo-leveling-chapter-178/">Chapter 178</a>
              </div></div></li>
            </ul>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_parses_newest_manhuaplus_chapter() {
        let chapter =
            parse_chapter(MANHUAPLUS_PAGE, chapter_selector(SiteScan::Manhuaplus)).unwrap();
        assert_eq!(chapter.number, 3412);
        assert_eq!(chapter.description, "Chapter 3412 - The Peak");
        assert_eq!(
            chapter.url,
            "https://example.com/manga/martial-peak/chapter-3412/"
        );
    }

    #[test]
    fn test_parses_newest_asurascans_chapter() {
        let chapter = parse_chapter(ASURA_PAGE, chapter_selector(SiteScan::Asurascans)).unwrap();
        assert_eq!(chapter.number, 179);
        assert_eq!(chapter.url, "https://example.com/solo-leveling-chapter-179/");
    }

    #[test]
    fn test_missing_selector_match_is_an_error() {
        let result = parse_chapter("<html><body></body></html>", ".wp-manga-chapter a");
        assert!(matches!(result, Err(WatchError::ChapterParse(_))));
    }

    #[test]
    fn test_entry_without_number_is_an_error() {
        let page = r#"<li class="wp-manga-chapter"><a href="/x">Extra oneshot</a></li>"#;
        let result = parse_chapter(page, ".wp-manga-chapter a");
        assert!(matches!(result, Err(WatchError::ChapterParse(_))));
    }

    #[test]
    fn test_entry_without_href_is_an_error() {
        let page = r#"<li class="wp-manga-chapter"><a>Chapter 7</a></li>"#;
        let result = parse_chapter(page, ".wp-manga-chapter a");
        assert!(matches!(result, Err(WatchError::ChapterParse(_))));
    }
}
