//! The resolved record of one date's issues and notices.

use serde::{Serialize, Serializer};

use super::date::PublicationDate;
use super::gazette::{Edition, IssueId, IssueLookup, NoticeId};

/// One edition's issue and, once resolved, its notices in publication order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditionRecord {
    pub issue_id: IssueId,

    /// `None` until the notice lookup for this issue succeeds
    pub notices: Option<Vec<NoticeId>>,
}

impl EditionRecord {
    pub fn new(issue_id: IssueId) -> Self {
        Self {
            issue_id,
            notices: None,
        }
    }

    pub fn notices(&self) -> &[NoticeId] {
        self.notices.as_deref().unwrap_or_default()
    }
}

/// Manifest for a single publication date.
///
/// Each pipeline stage consumes the manifest produced by the previous one
/// and returns an extended copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub date: PublicationDate,
    found: bool,
    pub morning: Option<EditionRecord>,
    pub evening: Option<EditionRecord>,
}

impl Manifest {
    /// Manifest for a date with no published issue.
    pub fn not_found(date: PublicationDate) -> Self {
        Self {
            date,
            found: false,
            morning: None,
            evening: None,
        }
    }

    /// Build the first-stage manifest from an issue lookup.
    pub fn from_lookup(date: PublicationDate, lookup: IssueLookup) -> Self {
        match lookup {
            IssueLookup::NotFound => Self::not_found(date),
            IssueLookup::Found { morning, evening } => Self {
                date,
                found: true,
                morning: morning.map(EditionRecord::new),
                evening: evening.map(EditionRecord::new),
            },
        }
    }

    /// Whether upstream had an issue for this date, i.e. whether there is
    /// anything worth persisting.
    pub fn has_content(&self) -> bool {
        self.found
    }

    pub fn edition(&self, edition: Edition) -> Option<&EditionRecord> {
        match edition {
            Edition::Morning => self.morning.as_ref(),
            Edition::Evening => self.evening.as_ref(),
        }
    }

    /// Present editions in processing order.
    pub fn editions(&self) -> impl Iterator<Item = (Edition, &EditionRecord)> {
        Edition::ALL
            .into_iter()
            .filter_map(|edition| self.edition(edition).map(|record| (edition, record)))
    }

    /// Return a copy with `notices` recorded under `edition`.
    ///
    /// Editions absent from the manifest are left absent.
    pub fn with_notices(mut self, edition: Edition, notices: Vec<NoticeId>) -> Self {
        let slot = match edition {
            Edition::Morning => &mut self.morning,
            Edition::Evening => &mut self.evening,
        };
        if let Some(record) = slot {
            record.notices = Some(notices);
        }
        self
    }

    pub fn notice_count(&self) -> usize {
        self.editions().map(|(_, r)| r.notices().len()).sum()
    }
}

/// Persisted JSON shape; edition fields are omitted when absent.
#[derive(Serialize)]
struct ManifestDocument<'a> {
    fecha: &'a PublicationDate,
    #[serde(rename = "codDiario_vespertino", skip_serializing_if = "Option::is_none")]
    evening_issue: Option<&'a IssueId>,
    #[serde(rename = "codDiario_matutino", skip_serializing_if = "Option::is_none")]
    morning_issue: Option<&'a IssueId>,
    #[serde(rename = "notas_vesp", skip_serializing_if = "Option::is_none")]
    evening_notices: Option<&'a [NoticeId]>,
    #[serde(rename = "notas_mat", skip_serializing_if = "Option::is_none")]
    morning_notices: Option<&'a [NoticeId]>,
}

impl Serialize for Manifest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ManifestDocument {
            fecha: &self.date,
            evening_issue: self.evening.as_ref().map(|r| &r.issue_id),
            morning_issue: self.morning.as_ref().map(|r| &r.issue_id),
            evening_notices: resolved_notices(self.evening.as_ref()),
            morning_notices: resolved_notices(self.morning.as_ref()),
        }
        .serialize(serializer)
    }
}

fn resolved_notices(record: Option<&EditionRecord>) -> Option<&[NoticeId]> {
    record.and_then(|r| r.notices.as_deref())
}
