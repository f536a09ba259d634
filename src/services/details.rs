// src/services/details.rs

//! Item detail fetcher.
//!
//! Scrapes metadata for a single workshop item from its public page using
//! configured CSS selectors. Per-item failure is captured as a sentinel
//! record so one bad item never aborts a batch.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Config, ItemDetail, ScraperConfig};
use crate::utils::http::create_client;
use crate::utils::resolve_url;

/// Source of per-item metadata.
///
/// Infallible by contract: network failure, timeout, or an unparseable page
/// is encoded in the returned record, not propagated. Retries are a
/// scheduling-level concern since the whole cycle re-runs periodically.
#[async_trait]
pub trait DetailSource: Send + Sync {
    /// Fetch metadata for one item.
    async fn fetch_detail(&self, id: &str) -> ItemDetail;
}

/// Compiled selectors for the workshop item page.
struct PageSelectors {
    title: Selector,
    image: Selector,
    stat: Selector,
    changelog: Selector,
}

impl PageSelectors {
    fn compile() -> Result<Self> {
        Ok(Self {
            title: parse_selector(".workshopItemTitle")?,
            image: parse_selector(r#"meta[property="og:image"]"#)?,
            stat: parse_selector(".detailsStatsContainerRight .detailsStatRight")?,
            changelog: parse_selector(r#"a[href*="/changelog/"]"#)?,
        })
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Detail source that scrapes the public workshop item page.
pub struct WorkshopPageScraper {
    client: Client,
    config: ScraperConfig,
    selectors: PageSelectors,
}

impl WorkshopPageScraper {
    /// Create a new page scraper from the application config.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: create_client(&config.scraper.user_agent, config.scraper.timeout_secs)?,
            config: config.scraper.clone(),
            selectors: PageSelectors::compile()?,
        })
    }

    async fn try_fetch(&self, id: &str) -> Result<ItemDetail> {
        let page_url = self.config.item_page_url(id);
        let html = self
            .client
            .get(&page_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        self.parse_item_page(id, &page_url, &html)
    }

    /// Parse the item page into a detail record.
    ///
    /// Kept synchronous so the parsed document never lives across an await.
    fn parse_item_page(&self, id: &str, page_url: &str, html: &str) -> Result<ItemDetail> {
        let document = Html::parse_document(html);

        let title: String = document
            .select(&self.selectors.title)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::validation(format!("item {id}: page has no title")))?;

        let image_url = document
            .select(&self.selectors.image)
            .next()
            .and_then(|el| el.value().attr("content"))
            .map(str::to_string);

        // The right-hand stats column lists file size, posted date and
        // updated date in that order; the updated cell is absent for items
        // that were never updated.
        let stats: Vec<String> = document
            .select(&self.selectors.stat)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .collect();
        let stat = |i: usize| stats.get(i).filter(|s| !s.is_empty()).cloned();

        let changelog_url = document
            .select(&self.selectors.changelog)
            .next()
            .and_then(|el| el.value().attr("href"))
            .and_then(|href| Url::parse(page_url).ok().map(|base| resolve_url(&base, href)))
            .or_else(|| Some(format!("{page_url}&section=changelog")));

        Ok(ItemDetail {
            id: id.to_string(),
            title,
            file_size: stat(0),
            posted_date: stat(1),
            updated_date: stat(2),
            image_url,
            changelog_url,
            last_checked: Utc::now(),
        })
    }
}

#[async_trait]
impl DetailSource for WorkshopPageScraper {
    async fn fetch_detail(&self, id: &str) -> ItemDetail {
        match self.try_fetch(id).await {
            Ok(detail) => detail,
            Err(error) => {
                log::warn!("Failed to fetch details for item {}: {}", id, error);
                ItemDetail::unavailable(id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scraper() -> WorkshopPageScraper {
        WorkshopPageScraper::new(&Config::default()).unwrap()
    }

    const PAGE: &str = r#"
        <html>
          <head>
            <meta property="og:image" content="https://cdn.example.com/preview.jpg">
          </head>
          <body>
            <div class="workshopItemTitle">  Dust Valley  </div>
            <div class="detailsStatsContainerRight">
              <div class="detailsStatRight">10.512 MB</div>
              <div class="detailsStatRight">1 Jan, 2026 @ 10:14am</div>
              <div class="detailsStatRight">5 Feb, 2026 @ 8:03pm</div>
            </div>
            <a href="/sharedfiles/filedetails/changelog/42">Change Notes</a>
          </body>
        </html>
    "#;

    #[test]
    fn test_parse_item_page() {
        let url = "https://steamcommunity.com/sharedfiles/filedetails/?id=42";
        let detail = scraper().parse_item_page("42", url, PAGE).unwrap();

        assert_eq!(detail.title, "Dust Valley");
        assert_eq!(detail.file_size.as_deref(), Some("10.512 MB"));
        assert_eq!(detail.posted_date.as_deref(), Some("1 Jan, 2026 @ 10:14am"));
        assert_eq!(detail.updated_date.as_deref(), Some("5 Feb, 2026 @ 8:03pm"));
        assert_eq!(
            detail.image_url.as_deref(),
            Some("https://cdn.example.com/preview.jpg")
        );
        assert_eq!(
            detail.changelog_url.as_deref(),
            Some("https://steamcommunity.com/sharedfiles/filedetails/changelog/42")
        );
        assert!(!detail.fetch_failed());
    }

    #[test]
    fn test_parse_page_without_title_fails() {
        let url = "https://steamcommunity.com/sharedfiles/filedetails/?id=42";
        let result = scraper().parse_item_page("42", url, "<html><body></body></html>");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_page_without_update_stat() {
        let page = r#"
            <div class="workshopItemTitle">Fresh Map</div>
            <div class="detailsStatsContainerRight">
              <div class="detailsStatRight">2 MB</div>
              <div class="detailsStatRight">1 Jan, 2026 @ 10:14am</div>
            </div>
        "#;
        let url = "https://steamcommunity.com/sharedfiles/filedetails/?id=7";
        let detail = scraper().parse_item_page("7", url, page).unwrap();

        assert_eq!(detail.updated_date, None);
        // No changelog tab on the page falls back to the section link
        assert_eq!(
            detail.changelog_url.as_deref(),
            Some("https://steamcommunity.com/sharedfiles/filedetails/?id=7&section=changelog")
        );
    }
}
