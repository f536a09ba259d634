// src/models/mod.rs

//! Domain models for the watcher application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod changeset;
mod config;
mod item;
mod snapshot;

// Re-export all public types
pub use changeset::{ChangeKind, ChangeSet};
pub use config::{
    CollectionConfig, Config, LoggingConfig, NotifierConfig, PathsConfig, ScheduleConfig,
    ScraperConfig,
};
pub use item::{DetailMap, ItemDetail, UNAVAILABLE_TITLE};
pub use snapshot::CollectionSnapshot;
