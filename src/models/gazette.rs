//! Gazette identifiers, editions and upstream payloads.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An identifier exactly as the upstream API returned it.
///
/// The API hands out numeric codes, but nothing guarantees it; keeping the
/// original JSON kind means the manifest echoes back what we received.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(u64),
    Text(String),
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawId::Number(n) => write!(f, "{n}"),
            RawId::Text(s) => f.write_str(s),
        }
    }
}

/// Canonical decimal text becomes a number, anything else stays text.
impl FromStr for RawId {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.parse::<u64>() {
            Ok(n) if n.to_string() == s => RawId::Number(n),
            _ => RawId::Text(s.to_string()),
        })
    }
}

/// Upstream `codDiario`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueId(pub RawId);

/// Upstream `codNota`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoticeId(pub RawId);

impl From<u64> for IssueId {
    fn from(value: u64) -> Self {
        Self(RawId::Number(value))
    }
}

impl From<u64> for NoticeId {
    fn from(value: u64) -> Self {
        Self(RawId::Number(value))
    }
}

impl FromStr for IssueId {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl FromStr for NoticeId {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for NoticeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Daily edition of the gazette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edition {
    Morning,
    Evening,
}

impl Edition {
    /// Processing order: evening first, then morning.
    pub const ALL: [Edition; 2] = [Edition::Evening, Edition::Morning];

    /// Spanish label used in logs and manifest field names.
    pub fn label(&self) -> &'static str {
        match self {
            Edition::Morning => "matutino",
            Edition::Evening => "vespertino",
        }
    }
}

impl fmt::Display for Edition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of looking up the issues published on a date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueLookup {
    /// Nothing was published that day. A normal outcome, never retried.
    NotFound,
    Found {
        morning: Option<IssueId>,
        evening: Option<IssueId>,
    },
}

/// Body of `diarios/porFecha/{date}`.
#[derive(Debug, Deserialize)]
pub struct IssuesResponse {
    /// `"NOT_FOUND"` when no issue exists for the date
    #[serde(default)]
    pub response: Option<String>,

    #[serde(rename = "Matutina", default)]
    pub morning: Option<Vec<IssueEntry>>,

    #[serde(rename = "Vespertina", default)]
    pub evening: Option<Vec<IssueEntry>>,
}

#[derive(Debug, Deserialize)]
pub struct IssueEntry {
    #[serde(rename = "codDiario")]
    pub id: IssueId,
}

impl IssuesResponse {
    const NOT_FOUND: &'static str = "NOT_FOUND";

    /// Reduce the payload to the first issue of each edition.
    pub fn into_lookup(self) -> IssueLookup {
        if self.response.as_deref() == Some(Self::NOT_FOUND) {
            return IssueLookup::NotFound;
        }

        let first = |entries: Option<Vec<IssueEntry>>| {
            entries.and_then(|e| e.into_iter().next()).map(|e| e.id)
        };

        IssueLookup::Found {
            morning: first(self.morning),
            evening: first(self.evening),
        }
    }
}

/// Body of `notas/obtenerNotasPorDiario/{issue}`.
#[derive(Debug, Deserialize)]
pub struct NoticesResponse {
    #[serde(rename = "Notas", default)]
    pub notices: Option<Vec<NoticeEntry>>,
}

/// One notice reference inside an issue.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NoticeEntry {
    #[serde(rename = "codNota")]
    pub id: NoticeId,
}
