// src/services/collection.rs

//! Upstream collection membership source.
//!
//! Fetches the watched collection's member list from the Steam Web API.
//! The raw `response` object is carried along opaquely so the reconciliation
//! engine can detect collection changes by structural equality alone.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{CollectionConfig, CollectionSnapshot, Config};
use crate::utils::http::create_client;

/// Source of collection membership snapshots.
///
/// A failed fetch is the one error that aborts a reconciliation cycle:
/// without a trustworthy member list no diff can be computed safely.
#[async_trait]
pub trait CollectionSource: Send + Sync {
    /// Fetch the current collection snapshot from upstream.
    async fn fetch_collection(&self) -> Result<CollectionSnapshot>;
}

/// Collection source backed by the `GetCollectionDetails` endpoint.
pub struct SteamCollectionSource {
    client: Client,
    config: CollectionConfig,
}

impl SteamCollectionSource {
    /// Create a new collection source from the application config.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: create_client(&config.scraper.user_agent, config.scraper.timeout_secs)?,
            config: config.collection.clone(),
        })
    }

    /// Extract member ids from the upstream `response` object.
    fn extract_member_ids(response: &serde_json::Value) -> Result<Vec<String>> {
        let details = response
            .get("collectiondetails")
            .and_then(|d| d.get(0))
            .ok_or_else(|| AppError::collection("response has no collectiondetails"))?;

        let children = match details.get("children").and_then(|c| c.as_array()) {
            Some(children) => children,
            // A collection with no members has no children array
            None => return Ok(Vec::new()),
        };

        children
            .iter()
            .map(|child| {
                child
                    .get("publishedfileid")
                    .and_then(|id| id.as_str())
                    .map(str::to_string)
                    .ok_or_else(|| AppError::collection("child entry has no publishedfileid"))
            })
            .collect()
    }
}

#[async_trait]
impl CollectionSource for SteamCollectionSource {
    async fn fetch_collection(&self) -> Result<CollectionSnapshot> {
        let params = [
            ("key", self.config.api_key.as_str()),
            ("collectioncount", "1"),
            ("publishedfileids[0]", self.config.collection_id.as_str()),
        ];

        let body: serde_json::Value = self
            .client
            .post(&self.config.api_url)
            .form(&params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let response = body
            .get("response")
            .cloned()
            .ok_or_else(|| AppError::collection("upstream body has no response object"))?;

        let ids = Self::extract_member_ids(&response)?;
        Ok(CollectionSnapshot::new(ids, response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_member_ids() {
        let response = json!({
            "collectiondetails": [{
                "publishedfileid": "999",
                "children": [
                    { "publishedfileid": "111", "sortorder": 1 },
                    { "publishedfileid": "222", "sortorder": 2 },
                ]
            }]
        });
        let ids = SteamCollectionSource::extract_member_ids(&response).unwrap();
        assert_eq!(ids, vec!["111", "222"]);
    }

    #[test]
    fn test_extract_empty_collection() {
        let response = json!({
            "collectiondetails": [{ "publishedfileid": "999" }]
        });
        let ids = SteamCollectionSource::extract_member_ids(&response).unwrap();
        assert!(ids.is_empty());
    }

    #[test]
    fn test_extract_missing_details() {
        let response = json!({ "result": 1 });
        assert!(SteamCollectionSource::extract_member_ids(&response).is_err());
    }
}
