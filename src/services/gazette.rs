// src/services/gazette.rs

//! Remote gazette client.
//!
//! Talks to the four DOF endpoints the archiver depends on:
//!
//! | Operation               | Path                                      |
//! |-------------------------|-------------------------------------------|
//! | issues for a date       | `diarios/porFecha/{dd-mm-yyyy}`           |
//! | notices of an issue     | `notas/obtenerNotasPorDiario/{codDiario}` |
//! | notice source document  | `documentos/doc/{codNota}`                |
//! | full issue PDF          | `documentos/pdf/{codDiario}`              |

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{
    ApiConfig, IssueId, IssueLookup, IssuesResponse, NoticeEntry, NoticeId, NoticesResponse,
    PublicationDate,
};
use crate::utils::http::{create_async_client, fetch_bytes};

/// Read-only access to the upstream gazette API.
#[async_trait]
pub trait GazetteClient: Send + Sync {
    /// Issues published on `date`; `NotFound` is a normal outcome.
    async fn lookup_issues(&self, date: &PublicationDate) -> Result<IssueLookup>;

    /// Notices of one issue, in publication order.
    async fn lookup_notices(&self, issue: &IssueId) -> Result<Vec<NoticeEntry>>;

    /// Source document of a notice.
    async fn fetch_notice_document(&self, notice: &NoticeId) -> Result<Vec<u8>>;

    /// Full PDF of an issue.
    async fn fetch_issue_pdf(&self, issue: &IssueId) -> Result<Vec<u8>>;
}

/// Request builder for the gazette endpoints.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(AppError::config(format!(
                "API base URL cannot carry a path: {base_url}"
            )));
        }
        Ok(Self { base })
    }

    pub fn issues_by_date(&self, date: &PublicationDate) -> Url {
        self.build(&["diarios", "porFecha", &date.to_string()])
    }

    pub fn notices_by_issue(&self, issue: &IssueId) -> Url {
        self.build(&["notas", "obtenerNotasPorDiario", &issue.to_string()])
    }

    pub fn notice_document(&self, notice: &NoticeId) -> Url {
        self.build(&["documentos", "doc", &notice.to_string()])
    }

    pub fn issue_pdf(&self, issue: &IssueId) -> Url {
        self.build(&["documentos", "pdf", &issue.to_string()])
    }

    fn build(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // `new` rejects cannot-be-a-base URLs, so this always succeeds
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// [`GazetteClient`] over HTTP.
#[derive(Clone)]
pub struct HttpGazetteClient {
    client: Client,
    endpoints: Endpoints,
}

impl HttpGazetteClient {
    pub fn new(client: Client, endpoints: Endpoints) -> Self {
        Self { client, endpoints }
    }

    /// Build a client from API settings.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let client = create_async_client(config)?;
        let endpoints = Endpoints::new(&config.base_url)?;
        Ok(Self::new(client, endpoints))
    }
}

#[async_trait]
impl GazetteClient for HttpGazetteClient {
    async fn lookup_issues(&self, date: &PublicationDate) -> Result<IssueLookup> {
        let url = self.endpoints.issues_by_date(date);
        log::debug!("GET {}", url);
        let body = fetch_bytes(&self.client, url).await?;
        let response: IssuesResponse = serde_json::from_slice(&body)?;
        Ok(response.into_lookup())
    }

    async fn lookup_notices(&self, issue: &IssueId) -> Result<Vec<NoticeEntry>> {
        let url = self.endpoints.notices_by_issue(issue);
        log::debug!("GET {}", url);
        let body = fetch_bytes(&self.client, url).await?;
        let response: NoticesResponse = serde_json::from_slice(&body)?;
        Ok(response.notices.unwrap_or_default())
    }

    async fn fetch_notice_document(&self, notice: &NoticeId) -> Result<Vec<u8>> {
        let url = self.endpoints.notice_document(notice);
        log::debug!("GET {}", url);
        fetch_bytes(&self.client, url).await
    }

    async fn fetch_issue_pdf(&self, issue: &IssueId) -> Result<Vec<u8>> {
        let url = self.endpoints.issue_pdf(issue);
        log::debug!("GET {}", url);
        fetch_bytes(&self.client, url).await
    }
}
