//! Publication date of a gazette issue.

use std::fmt;
use std::str::FromStr;

use chrono::{FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{AppError, Result};

/// Wire format used by the upstream API and by storage keys.
const FORMAT: &str = "%d-%m-%Y";

/// The calendar date a pipeline run is scoped to.
///
/// Always rendered as `dd-mm-yyyy`, which is both the upstream lookup
/// parameter and the storage key segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PublicationDate(NaiveDate);

impl PublicationDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Today's date at a fixed offset from UTC.
    pub fn today(utc_offset_hours: i32) -> Result<Self> {
        let offset = utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                AppError::config(format!("Invalid UTC offset: {utc_offset_hours} hours"))
            })?;
        Ok(Self::new(Utc::now().with_timezone(&offset).date_naive()))
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for PublicationDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(FORMAT))
    }
}

impl FromStr for PublicationDate {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        // chrono accepts unpadded fields; the upstream does not
        let trimmed = s.trim();
        if trimmed.len() != 10 {
            return Err(AppError::InvalidDate {
                input: s.to_string(),
            });
        }
        NaiveDate::parse_from_str(trimmed, FORMAT)
            .map(Self::new)
            .map_err(|_| AppError::InvalidDate {
                input: s.to_string(),
            })
    }
}

impl Serialize for PublicationDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PublicationDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
