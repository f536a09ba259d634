// src/models/item.rs

//! Item detail data structures.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel title recorded when a detail fetch fails.
pub const UNAVAILABLE_TITLE: &str = "Error fetching data";

/// Scraped metadata for a single workshop item.
///
/// All upstream-formatted fields are kept as the upstream renders them;
/// they are compared for equality, never parsed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemDetail {
    /// Workshop item identifier
    pub id: String,

    /// Item title, or [`UNAVAILABLE_TITLE`] if the fetch failed
    pub title: String,

    /// Declared file size, upstream-formatted (e.g. "10.512 MB")
    pub file_size: Option<String>,

    /// Posted date, upstream-formatted
    pub posted_date: Option<String>,

    /// Last-updated date, upstream-formatted
    pub updated_date: Option<String>,

    /// Preview image URL
    pub image_url: Option<String>,

    /// Change notes URL
    pub changelog_url: Option<String>,

    /// When this record was fetched (set by the watcher)
    pub last_checked: DateTime<Utc>,
}

impl ItemDetail {
    /// Build the sentinel record for a failed fetch.
    ///
    /// A failed fetch is a result, not an error: the record is kept in the
    /// mirror so the item is not re-classified as "new" every cycle.
    pub fn unavailable(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: UNAVAILABLE_TITLE.to_string(),
            file_size: None,
            posted_date: None,
            updated_date: None,
            image_url: None,
            changelog_url: None,
            last_checked: Utc::now(),
        }
    }

    /// Whether this record is the sentinel for a failed fetch.
    pub fn fetch_failed(&self) -> bool {
        self.title == UNAVAILABLE_TITLE
    }

    /// Whether the fields used for update classification differ.
    pub fn differs_from(&self, other: &ItemDetail) -> bool {
        self.file_size != other.file_size || self.updated_date != other.updated_date
    }
}

/// Durable mirror of everything known about every tracked item, keyed by id.
///
/// `BTreeMap` keeps the persisted document stable across rewrites.
pub type DetailMap = BTreeMap<String, ItemDetail>;

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_detail(id: &str, file_size: &str, updated: &str) -> ItemDetail {
        ItemDetail {
            id: id.to_string(),
            title: "Test Map".to_string(),
            file_size: Some(file_size.to_string()),
            posted_date: Some("1 Jan, 2026 @ 10:00am".to_string()),
            updated_date: Some(updated.to_string()),
            image_url: Some("https://example.com/preview.jpg".to_string()),
            changelog_url: None,
            last_checked: Utc::now(),
        }
    }

    #[test]
    fn test_unavailable_is_sentinel() {
        let detail = ItemDetail::unavailable("123");
        assert!(detail.fetch_failed());
        assert_eq!(detail.id, "123");
        assert!(detail.file_size.is_none());
        assert!(detail.updated_date.is_none());
    }

    #[test]
    fn test_differs_on_file_size() {
        let a = sample_detail("1", "10 MB", "2 Jan, 2026 @ 9:00am");
        let b = sample_detail("1", "12 MB", "2 Jan, 2026 @ 9:00am");
        assert!(a.differs_from(&b));
    }

    #[test]
    fn test_differs_on_updated_date() {
        let a = sample_detail("1", "10 MB", "2 Jan, 2026 @ 9:00am");
        let b = sample_detail("1", "10 MB", "3 Jan, 2026 @ 9:00am");
        assert!(a.differs_from(&b));
    }

    #[test]
    fn test_no_difference() {
        let a = sample_detail("1", "10 MB", "2 Jan, 2026 @ 9:00am");
        let mut b = a.clone();
        // last_checked is bookkeeping, not an update signal
        b.last_checked = Utc::now();
        assert!(!a.differs_from(&b));
    }
}
