//! Service layer for the watcher application.
//!
//! This module contains the external-interface adapters:
//! - Collection membership fetching (`CollectionSource`)
//! - Item detail scraping (`DetailSource`)
//! - Notification delivery (`NotificationSink`, `Notifier`)

mod collection;
mod details;
mod notify;

pub use collection::{CollectionSource, SteamCollectionSource};
pub use details::{DetailSource, WorkshopPageScraper};
pub use notify::{ChangeMessage, DiscordWebhook, NotificationSink, Notifier, build_messages};
