//! Per-run summary of what the pipeline did.

use serde::Serialize;

use super::date::PublicationDate;

/// Outcome of the issue lookup for the run's date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    NotFound,
    Archived,
}

/// Counters for one archiving stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StageStats {
    pub uploaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Summary of a pipeline run for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub date: PublicationDate,
    pub status: RunStatus,

    /// Editions whose notice lookup gave up
    pub unresolved_editions: usize,
    pub notices: StageStats,
    pub pdfs: StageStats,

    /// Storage key of the persisted manifest
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_key: Option<String>,
}

impl RunReport {
    pub fn not_found(date: PublicationDate) -> Self {
        Self {
            date,
            status: RunStatus::NotFound,
            unresolved_editions: 0,
            notices: StageStats::default(),
            pdfs: StageStats::default(),
            manifest_key: None,
        }
    }

    /// Whether every step of the run succeeded.
    pub fn is_complete(&self) -> bool {
        self.unresolved_editions == 0
            && self.notices.failed == 0
            && self.pdfs.failed == 0
            && (self.status == RunStatus::NotFound || self.manifest_key.is_some())
    }
}
