// src/services/notify.rs

//! Change notification fan-out.
//!
//! Converts a change set into one outbound message per changed item and
//! delivers them sequentially with a fixed pacing delay. Delivery is
//! non-transactional: one failed message is logged and does not block the
//! rest of the fan-out.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::error::Result;
use crate::models::{ChangeKind, ChangeSet, Config, DetailMap, ItemDetail, ScraperConfig};
use crate::utils::http::create_client;

/// One outbound notification, annotated with the detected change kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeMessage {
    pub kind: ChangeKind,
    pub id: String,
    pub title: String,
    /// Item page URL (absent for removed items)
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub file_size: Option<String>,
    pub posted_date: Option<String>,
    pub updated_date: Option<String>,
    pub changelog_url: Option<String>,
}

impl ChangeMessage {
    fn from_detail(kind: ChangeKind, detail: &ItemDetail, scraper: &ScraperConfig) -> Self {
        Self {
            kind,
            id: detail.id.clone(),
            title: detail.title.clone(),
            url: Some(scraper.item_page_url(&detail.id)),
            image_url: detail.image_url.clone(),
            file_size: detail.file_size.clone(),
            posted_date: detail.posted_date.clone(),
            updated_date: detail.updated_date.clone(),
            changelog_url: detail.changelog_url.clone(),
        }
    }

    fn removed(id: &str, prior: &DetailMap) -> Self {
        let title = prior
            .get(id)
            .map(|detail| detail.title.clone())
            .unwrap_or_else(|| "Unknown".to_string());
        Self {
            kind: ChangeKind::Removed,
            id: id.to_string(),
            title,
            url: None,
            image_url: None,
            file_size: None,
            posted_date: None,
            updated_date: None,
            changelog_url: None,
        }
    }
}

/// Build one message per element of the change set.
///
/// Removed-item titles are resolved from the prior detail map since the item
/// no longer has live detail.
pub fn build_messages(
    changes: &ChangeSet,
    prior: &DetailMap,
    scraper: &ScraperConfig,
) -> Vec<ChangeMessage> {
    let mut messages = Vec::with_capacity(changes.change_count());
    for detail in &changes.added {
        messages.push(ChangeMessage::from_detail(ChangeKind::Added, detail, scraper));
    }
    for detail in &changes.updated {
        messages.push(ChangeMessage::from_detail(ChangeKind::Updated, detail, scraper));
    }
    for id in &changes.removed {
        messages.push(ChangeMessage::removed(id, prior));
    }
    messages
}

/// Outbound message transport.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one message. Failure is logged by the caller, never retried.
    async fn deliver(&self, message: &ChangeMessage) -> Result<()>;
}

/// Discord webhook sink, one embed per message.
pub struct DiscordWebhook {
    client: Client,
    webhook_url: String,
}

/// Embed accent colors per change kind.
const COLOR_ADDED: u32 = 0x2ECC71;
const COLOR_UPDATED: u32 = 0xF1C40F;
const COLOR_REMOVED: u32 = 0xE74C3C;

impl DiscordWebhook {
    /// Create a new webhook sink from the application config.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: create_client(&config.scraper.user_agent, config.scraper.timeout_secs)?,
            webhook_url: config.notifier.webhook_url.clone(),
        })
    }

    fn embed_for(message: &ChangeMessage) -> serde_json::Value {
        let unknown = || "Unknown".to_string();

        match message.kind {
            ChangeKind::Removed => json!({
                "title": format!("Removed: {}", message.title),
                "color": COLOR_REMOVED,
            }),
            kind => {
                let mut fields = vec![
                    json!({ "name": "File Size",
                            "value": message.file_size.clone().unwrap_or_else(unknown),
                            "inline": true }),
                    json!({ "name": "Posted Date",
                            "value": message.posted_date.clone().unwrap_or_else(unknown),
                            "inline": true }),
                    json!({ "name": "Updated Date",
                            "value": message.updated_date.clone().unwrap_or_else(unknown),
                            "inline": true }),
                ];

                let color = match kind {
                    ChangeKind::Updated => {
                        if let Some(changelog) = &message.changelog_url {
                            fields.push(json!({
                                "name": "Changelog",
                                "value": format!("[View Change Notes]({changelog})"),
                                "inline": false,
                            }));
                        }
                        COLOR_UPDATED
                    }
                    _ => COLOR_ADDED,
                };

                json!({
                    "title": format!("{}: {}", kind.as_str(), message.title),
                    "url": message.url,
                    "image": { "url": message.image_url },
                    "fields": fields,
                    "color": color,
                })
            }
        }
    }
}

#[async_trait]
impl NotificationSink for DiscordWebhook {
    async fn deliver(&self, message: &ChangeMessage) -> Result<()> {
        let payload = json!({ "embeds": [Self::embed_for(message)] });
        self.client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Sequential, paced fan-out of one notification per changed item.
pub struct Notifier {
    sink: Arc<dyn NotificationSink>,
    scraper: ScraperConfig,
    delay: Duration,
}

impl Notifier {
    /// Create a notifier over the given sink.
    pub fn new(sink: Arc<dyn NotificationSink>, config: &Config) -> Self {
        Self {
            sink,
            scraper: config.scraper.clone(),
            delay: Duration::from_millis(config.notifier.message_delay_ms),
        }
    }

    /// Deliver one message per change, pacing between sends.
    pub async fn dispatch(&self, changes: &ChangeSet, prior: &DetailMap) {
        let messages = build_messages(changes, prior, &self.scraper);
        for (i, message) in messages.iter().enumerate() {
            if i > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match self.sink.deliver(message).await {
                Ok(()) => log::info!(
                    "Notification sent: {} {} ({})",
                    message.kind.as_str(),
                    message.title,
                    message.id
                ),
                Err(error) => log::error!(
                    "Failed to deliver notification for {} ({}): {}",
                    message.title,
                    message.id,
                    error
                ),
            }
        }
    }
}
