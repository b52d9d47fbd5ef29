//! Deterministic storage keys.

use crate::models::{IssueId, NoticeId, PublicationDate};

/// Computes object keys under a fixed prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLayout {
    prefix: String,
}

impl KeyLayout {
    pub fn new(prefix: impl AsRef<str>) -> Self {
        Self {
            prefix: prefix.as_ref().trim_matches('/').to_string(),
        }
    }

    /// `{prefix}/{date}/`
    pub fn date_prefix(&self, date: &PublicationDate) -> String {
        format!("{}/{}/", self.prefix, date)
    }

    /// `{prefix}/{date}/nota_{notice}.doc`
    pub fn document_key(&self, date: &PublicationDate, notice: &NoticeId) -> String {
        format!("{}nota_{}.doc", self.date_prefix(date), notice)
    }

    /// `{prefix}/{date}/diario_{issue}.pdf`
    pub fn pdf_key(&self, date: &PublicationDate, issue: &IssueId) -> String {
        format!("{}diario_{}.pdf", self.date_prefix(date), issue)
    }

    /// `{prefix}/{date}/diario_{date}.json`
    pub fn manifest_key(&self, date: &PublicationDate) -> String {
        format!("{}diario_{}.json", self.date_prefix(date), date)
    }
}

impl Default for KeyLayout {
    fn default() -> Self {
        Self::new("dof")
    }
}
