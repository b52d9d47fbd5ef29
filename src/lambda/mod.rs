// src/lambda/mod.rs

//! AWS Lambda handler for the archiver.
//!
//! Each invocation archives one publication date into S3:
//! 1. Builds the configuration from defaults and environment variables
//! 2. Resolves the issues and notices for the requested date (or today)
//! 3. Uploads missing notice documents, the issue PDFs and the manifest

use lambda_runtime::{Error as LambdaError, LambdaEvent};

use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::error::Result;
use crate::models::{Config, PublicationDate, RunReport, StorageBackend};
use crate::pipeline::run_pipeline;
use crate::storage::S3Storage;

/// Lambda invocation payload.
#[derive(Debug, Default, Deserialize)]
pub struct ArchiveRequest {
    /// Publication date as `dd-mm-yyyy` (defaults to today in Mexico City)
    #[serde(default)]
    pub date: Option<String>,
}

/// Lambda response payload.
#[derive(Debug, Default, Serialize)]
pub struct ArchiveResponse {
    /// Whether the run completed (individual object failures are in `report`)
    pub success: bool,

    #[serde(flatten)]
    pub report: Option<RunReport>,

    /// Error message if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

/// Main Lambda handler function.
#[instrument(skip(event))]
pub async fn handler(
    event: LambdaEvent<ArchiveRequest>,
) -> std::result::Result<ArchiveResponse, LambdaError> {
    let start = std::time::Instant::now();
    let (request, _context) = event.into_parts();

    info!("Starting archive: date={:?}", request.date);

    match run_archive(&request).await {
        Ok(report) => {
            let execution_time_ms = start.elapsed().as_millis() as u64;
            info!(
                "Archive of {} finished: {} notices uploaded, {} failed in {}ms",
                report.date, report.notices.uploaded, report.notices.failed, execution_time_ms
            );
            Ok(ArchiveResponse {
                success: true,
                report: Some(report),
                error: None,
                execution_time_ms,
            })
        }
        Err(e) => {
            error!("Archive failed: {}", e);
            Ok(ArchiveResponse {
                success: false,
                error: Some(e.to_string()),
                execution_time_ms: start.elapsed().as_millis() as u64,
                ..Default::default()
            })
        }
    }
}

/// Internal archive logic.
async fn run_archive(request: &ArchiveRequest) -> Result<RunReport> {
    let config = load_lambda_config()?;
    let date = request_date(request, &config)?;

    let storage = S3Storage::from_config(&config.storage).await?;
    run_pipeline(&config, &storage, date).await
}

/// Load configuration suitable for Lambda environment.
fn load_lambda_config() -> Result<Config> {
    let mut config = Config::default();
    config.storage.backend = StorageBackend::S3;
    config.apply_env();
    config.validate()?;
    Ok(config)
}

fn request_date(request: &ArchiveRequest, config: &Config) -> Result<PublicationDate> {
    match request.date.as_deref() {
        Some(date) => date.parse(),
        None => PublicationDate::today(config.archive.utc_offset_hours),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RunStatus;

    #[test]
    fn test_archive_request_defaults() {
        let req: ArchiveRequest = serde_json::from_str("{}").unwrap();
        assert!(req.date.is_none());
    }

    #[test]
    fn test_archive_request_with_date() {
        let req: ArchiveRequest = serde_json::from_str(r#"{"date": "01-06-2024"}"#).unwrap();
        let date = request_date(&req, &Config::default()).unwrap();
        assert_eq!(date.to_string(), "01-06-2024");
    }

    #[test]
    fn test_archive_request_rejects_bad_date() {
        let req = ArchiveRequest {
            date: Some("2024-06-01".to_string()),
        };
        assert!(request_date(&req, &Config::default()).is_err());
    }

    #[test]
    fn test_response_flattens_report() {
        let date: PublicationDate = "01-06-2024".parse().unwrap();
        let response = ArchiveResponse {
            success: true,
            report: Some(RunReport::not_found(date)),
            error: None,
            execution_time_ms: 12,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["date"], "01-06-2024");
        assert_eq!(json["status"], serde_json::json!(RunStatus::NotFound));
        assert!(json.get("error").is_none());
    }
}
