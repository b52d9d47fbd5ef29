// src/models/mod.rs

//! Domain models for the archiver.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod date;
mod gazette;
mod manifest;
mod report;

// Re-export all public types
pub use config::{
    ApiConfig, ArchiveConfig, Backoff, Config, RetryConfig, StorageBackend, StorageConfig,
};
pub use date::PublicationDate;
pub use gazette::{
    Edition, IssueEntry, IssueId, IssueLookup, IssuesResponse, NoticeEntry, NoticeId,
    NoticesResponse, RawId,
};
pub use manifest::{EditionRecord, Manifest};
pub use report::{RunReport, RunStatus, StageStats};
