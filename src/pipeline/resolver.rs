// src/pipeline/resolver.rs

//! Gazette resolver: drives one publication date through the pipeline.
//!
//! ```text
//! ResolveIssues ──not found──▶ done
//!      │
//! ResolveNotices ─▶ ArchiveNotices ─▶ ArchivePdfs ─▶ PersistManifest ─▶ done
//! ```
//!
//! Only individual remote calls are retried. A notice, PDF or edition that
//! cannot be processed is counted in the [`RunReport`] and the run moves on.

use crate::error::Result;
use crate::models::{ArchiveConfig, Config, PublicationDate, RunReport, RunStatus};
use crate::services::{GazetteClient, HttpGazetteClient, Retrier, RetryPolicy};
use crate::storage::{KeyLayout, ObjectStore};

/// Orchestrates the archive of one date at a time.
pub struct GazetteResolver<'a> {
    pub(super) client: &'a dyn GazetteClient,
    pub(super) store: &'a dyn ObjectStore,
    pub(super) retrier: Retrier,
    pub(super) keys: KeyLayout,
    pub(super) options: ArchiveConfig,
}

impl<'a> GazetteResolver<'a> {
    /// Resolver with default retry, key and archive settings.
    pub fn new(client: &'a dyn GazetteClient, store: &'a dyn ObjectStore) -> Self {
        Self {
            client,
            store,
            retrier: Retrier::default(),
            keys: KeyLayout::default(),
            options: ArchiveConfig::default(),
        }
    }

    /// Resolver configured from the application config.
    pub fn from_config(
        config: &Config,
        client: &'a dyn GazetteClient,
        store: &'a dyn ObjectStore,
    ) -> Self {
        Self::new(client, store)
            .with_retrier(Retrier::new(RetryPolicy::from(&config.retry)))
            .with_keys(KeyLayout::new(&config.storage.prefix))
            .with_options(config.archive.clone())
    }

    pub fn with_retrier(mut self, retrier: Retrier) -> Self {
        self.retrier = retrier;
        self
    }

    pub fn with_keys(mut self, keys: KeyLayout) -> Self {
        self.keys = keys;
        self
    }

    pub fn with_options(mut self, options: ArchiveConfig) -> Self {
        self.options = options;
        self
    }

    /// Run every stage for `date`.
    ///
    /// Fails only when the issue lookup itself cannot be completed; every
    /// later fault is recorded in the report instead.
    pub async fn run(&self, date: PublicationDate) -> Result<RunReport> {
        log::info!("Archiving gazette for {}", date);

        let manifest = self.resolve_issues(date).await?;
        if !manifest.has_content() {
            log::info!("Diario not found for {}, nothing to archive", date);
            return Ok(RunReport::not_found(date));
        }

        let manifest = self.resolve_notices(manifest).await;
        let unresolved_editions = manifest
            .editions()
            .filter(|(_, record)| record.notices.is_none())
            .count();

        let notices = self.archive_notices(&manifest).await;
        log::info!(
            "Notices for {}: {} uploaded, {} already stored, {} failed",
            date,
            notices.uploaded,
            notices.skipped,
            notices.failed
        );

        let pdfs = self.archive_pdfs(&manifest).await;

        let manifest_key = match self.persist_manifest(&manifest).await {
            Ok(key) => key,
            Err(e) => {
                log::error!("Failed to upload manifest for {}: {}", date, e);
                None
            }
        };

        let report = RunReport {
            date,
            status: RunStatus::Archived,
            unresolved_editions,
            notices,
            pdfs,
            manifest_key,
        };

        if report.is_complete() {
            log::info!("Finished {}", date);
        } else {
            log::warn!("Finished {} with failures: {:?}", date, report);
        }
        Ok(report)
    }
}

/// Archive `date` using the HTTP client described by `config`.
pub async fn run_pipeline(
    config: &Config,
    store: &dyn ObjectStore,
    date: PublicationDate,
) -> Result<RunReport> {
    let client = HttpGazetteClient::from_config(&config.api)?;
    GazetteResolver::from_config(config, &client, store)
        .run(date)
        .await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::pipeline::fake::FakeGazette;
    use crate::storage::memory::MemoryStore;

    fn date() -> PublicationDate {
        "01-06-2024".parse().unwrap()
    }

    fn resolver<'a>(client: &'a FakeGazette, store: &'a MemoryStore) -> GazetteResolver<'a> {
        GazetteResolver::new(client, store)
            .with_retrier(Retrier::new(RetryPolicy::fixed(Duration::ZERO, 3)))
            .with_options(ArchiveConfig {
                throttle_ms: 0,
                ..ArchiveConfig::default()
            })
    }

    #[tokio::test]
    async fn test_end_to_end_morning_issue() {
        let client = FakeGazette::found(Some(5001), None).with_notices(5001, &[7001, 7002]);
        let store = MemoryStore::new();

        let report = resolver(&client, &store).run(date()).await.unwrap();

        let uploads = store.uploads();
        let keys: Vec<&str> = uploads.iter().map(|u| u.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "dof/01-06-2024/nota_7001.doc",
                "dof/01-06-2024/nota_7002.doc",
                "dof/01-06-2024/diario_5001.pdf",
                "dof/01-06-2024/diario_01-06-2024.json",
            ]
        );
        assert!(uploads[0].public_read && uploads[1].public_read);
        assert!(!uploads[2].public_read);

        let manifest = store.get("dof/01-06-2024/diario_01-06-2024.json").unwrap();
        assert_eq!(
            String::from_utf8(manifest).unwrap(),
            r#"{"fecha":"01-06-2024","codDiario_matutino":5001,"notas_mat":[7001,7002]}"#
        );
        assert_eq!(
            store.get("dof/01-06-2024/nota_7002.doc").unwrap(),
            b"doc-7002".to_vec()
        );

        assert_eq!(report.status, RunStatus::Archived);
        assert_eq!(report.notices.uploaded, 2);
        assert_eq!(report.pdfs.uploaded, 1);
        assert_eq!(
            report.manifest_key.as_deref(),
            Some("dof/01-06-2024/diario_01-06-2024.json")
        );
        assert!(report.is_complete());
    }

    #[tokio::test]
    async fn test_second_run_skips_stored_notices() {
        let client = FakeGazette::found(Some(5001), None).with_notices(5001, &[7001, 7002]);
        let store = MemoryStore::new();
        let resolver = resolver(&client, &store);

        resolver.run(date()).await.unwrap();
        store.clear_uploads();
        let report = resolver.run(date()).await.unwrap();

        assert_eq!(report.notices.uploaded, 0);
        assert_eq!(report.notices.skipped, 2);
        // issue PDFs are re-uploaded on every run, the manifest is overwritten
        assert_eq!(
            store.uploaded_keys(),
            vec![
                "dof/01-06-2024/diario_5001.pdf",
                "dof/01-06-2024/diario_01-06-2024.json",
            ]
        );
        assert_eq!(client.count_calls("doc "), 2);
    }

    #[tokio::test]
    async fn test_not_found_writes_nothing() {
        let client = FakeGazette::not_found();
        let store = MemoryStore::new();

        let report = resolver(&client, &store).run(date()).await.unwrap();

        assert_eq!(report, RunReport::not_found(date()));
        assert!(store.uploads().is_empty());
        assert_eq!(client.calls(), vec!["issues 01-06-2024"]);
        assert!(report.is_complete());
    }

    #[tokio::test]
    async fn test_evening_only_touches_evening_ids() {
        let client = FakeGazette::found(None, Some(6001)).with_notices(6001, &[8001]);
        let store = MemoryStore::new();

        resolver(&client, &store).run(date()).await.unwrap();

        assert_eq!(
            store.uploaded_keys(),
            vec![
                "dof/01-06-2024/nota_8001.doc",
                "dof/01-06-2024/diario_6001.pdf",
                "dof/01-06-2024/diario_01-06-2024.json",
            ]
        );
        let manifest: serde_json::Value = serde_json::from_slice(
            &store.get("dof/01-06-2024/diario_01-06-2024.json").unwrap(),
        )
        .unwrap();
        assert_eq!(
            manifest,
            serde_json::json!({
                "fecha": "01-06-2024",
                "codDiario_vespertino": 6001,
                "notas_vesp": [8001]
            })
        );
    }

    #[tokio::test]
    async fn test_broken_edition_does_not_block_the_other() {
        let client = FakeGazette::found(Some(5001), Some(6001))
            .with_notices(5001, &[7001])
            .with_broken_issue(6001);
        let store = MemoryStore::new();

        let report = resolver(&client, &store).run(date()).await.unwrap();

        // three bounded attempts on the broken edition
        assert_eq!(client.count_calls("notices 6001"), 3);
        assert_eq!(report.unresolved_editions, 1);
        assert_eq!(report.notices.uploaded, 1);
        assert_eq!(report.pdfs.uploaded, 2);
        assert!(!report.is_complete());

        let manifest: serde_json::Value = serde_json::from_slice(
            &store.get("dof/01-06-2024/diario_01-06-2024.json").unwrap(),
        )
        .unwrap();
        assert_eq!(manifest["codDiario_vespertino"], 6001);
        assert_eq!(manifest["notas_mat"], serde_json::json!([7001]));
        assert!(manifest.get("notas_vesp").is_none());
    }

    #[tokio::test]
    async fn test_transient_issue_lookup_is_retried() {
        let client = FakeGazette::found(Some(5001), None)
            .with_notices(5001, &[])
            .with_flaky_issue_lookup(2);
        let store = MemoryStore::new();

        let report = resolver(&client, &store).run(date()).await.unwrap();

        assert_eq!(client.count_calls("issues "), 3);
        assert_eq!(report.status, RunStatus::Archived);
    }

    #[tokio::test]
    async fn test_exhausted_issue_lookup_fails_the_run() {
        let client = FakeGazette::found(Some(5001), None).with_flaky_issue_lookup(10);
        let store = MemoryStore::new();

        let result = resolver(&client, &store).run(date()).await;

        assert!(matches!(
            result,
            Err(crate::error::AppError::ExhaustedRetries { attempts: 3, .. })
        ));
        assert!(store.uploads().is_empty());
    }
}
