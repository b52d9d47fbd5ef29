//! Scripted gazette client for pipeline tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{IssueId, IssueLookup, NoticeEntry, NoticeId, PublicationDate};
use crate::services::GazetteClient;

pub struct FakeGazette {
    lookup: IssueLookup,
    notices: HashMap<IssueId, Vec<NoticeId>>,
    broken_issues: HashSet<IssueId>,
    issue_failures: Mutex<u32>,
    document_failures: Mutex<HashMap<NoticeId, u32>>,
    calls: Mutex<Vec<String>>,
}

impl FakeGazette {
    pub fn not_found() -> Self {
        Self::with_lookup(IssueLookup::NotFound)
    }

    pub fn found(morning: Option<u64>, evening: Option<u64>) -> Self {
        Self::with_lookup(IssueLookup::Found {
            morning: morning.map(IssueId::from),
            evening: evening.map(IssueId::from),
        })
    }

    fn with_lookup(lookup: IssueLookup) -> Self {
        Self {
            lookup,
            notices: HashMap::new(),
            broken_issues: HashSet::new(),
            issue_failures: Mutex::new(0),
            document_failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_notices(mut self, issue: u64, notices: &[u64]) -> Self {
        self.notices.insert(
            IssueId::from(issue),
            notices.iter().copied().map(NoticeId::from).collect(),
        );
        self
    }

    /// Notice lookups for `issue` always fail.
    pub fn with_broken_issue(mut self, issue: u64) -> Self {
        self.broken_issues.insert(IssueId::from(issue));
        self
    }

    /// The issue lookup fails `times` times before answering.
    pub fn with_flaky_issue_lookup(self, times: u32) -> Self {
        *self.issue_failures.lock().unwrap() = times;
        self
    }

    /// Fetching `notice` fails `times` times before succeeding.
    pub fn with_flaky_document(self, notice: u64, times: u32) -> Self {
        self.document_failures
            .lock()
            .unwrap()
            .insert(NoticeId::from(notice), times);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn take_failure(counter: &mut u32) -> bool {
        if *counter > 0 {
            *counter -= 1;
            true
        } else {
            false
        }
    }
}

#[async_trait]
impl GazetteClient for FakeGazette {
    async fn lookup_issues(&self, date: &PublicationDate) -> Result<IssueLookup> {
        self.record(format!("issues {date}"));
        if Self::take_failure(&mut self.issue_failures.lock().unwrap()) {
            return Err(AppError::upstream("issues", "connection reset"));
        }
        Ok(self.lookup.clone())
    }

    async fn lookup_notices(&self, issue: &IssueId) -> Result<Vec<NoticeEntry>> {
        self.record(format!("notices {issue}"));
        if self.broken_issues.contains(issue) {
            return Err(AppError::upstream("notices", "502 Bad Gateway"));
        }
        Ok(self
            .notices
            .get(issue)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|id| NoticeEntry { id })
            .collect())
    }

    async fn fetch_notice_document(&self, notice: &NoticeId) -> Result<Vec<u8>> {
        self.record(format!("doc {notice}"));
        let failed = self
            .document_failures
            .lock()
            .unwrap()
            .get_mut(notice)
            .is_some_and(Self::take_failure);
        if failed {
            return Err(AppError::upstream("doc", "timed out"));
        }
        Ok(format!("doc-{notice}").into_bytes())
    }

    async fn fetch_issue_pdf(&self, issue: &IssueId) -> Result<Vec<u8>> {
        self.record(format!("pdf {issue}"));
        Ok(format!("pdf-{issue}").into_bytes())
    }
}
