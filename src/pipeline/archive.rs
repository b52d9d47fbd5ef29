// src/pipeline/archive.rs

//! Archive stages: notice documents, issue PDFs and the manifest.

use std::collections::HashSet;

use futures::stream::{self, StreamExt};

use crate::error::Result;
use crate::models::{Edition, Manifest, NoticeId, PublicationDate, StageStats};
use crate::storage::{CONTENT_TYPE_DOC, CONTENT_TYPE_PDF, PutOptions, put_json};

use super::resolver::GazetteResolver;

/// What happened to a single object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Uploaded,
    Skipped,
    Failed,
}

fn tally(stats: &mut StageStats, outcome: Outcome) {
    match outcome {
        Outcome::Uploaded => stats.uploaded += 1,
        Outcome::Skipped => stats.skipped += 1,
        Outcome::Failed => stats.failed += 1,
    }
}

impl GazetteResolver<'_> {
    /// Stage 3: upload every notice document not yet in storage.
    ///
    /// Jobs run in publication order, `max_concurrent` at a time. The
    /// throttle pause follows each upload and is taken by this loop, so it
    /// applies to the whole stage rather than per job.
    pub async fn archive_notices(&self, manifest: &Manifest) -> StageStats {
        let date = manifest.date;
        let jobs: Vec<(Edition, &NoticeId)> = manifest
            .editions()
            .flat_map(|(edition, record)| record.notices().iter().map(move |n| (edition, n)))
            .collect();

        let throttle = self.options.throttle();
        let concurrency = self.options.max_concurrent.max(1);
        let mut stats = StageStats::default();

        // one job per key, so concurrent jobs never race on the same object
        let mut seen = HashSet::new();
        let mut deduped = Vec::with_capacity(jobs.len());
        for (edition, notice) in jobs {
            if seen.insert(notice) {
                deduped.push((edition, notice));
            } else {
                log::info!("Nota {} listed twice, archiving once", notice);
                tally(&mut stats, Outcome::Skipped);
            }
        }

        let mut results = stream::iter(deduped)
            .map(|(edition, notice)| self.archive_notice(date, edition, notice))
            .buffered(concurrency);

        while let Some(outcome) = results.next().await {
            tally(&mut stats, outcome);
            if outcome == Outcome::Uploaded && !throttle.is_zero() {
                tokio::time::sleep(throttle).await;
            }
        }
        stats
    }

    async fn archive_notice(
        &self,
        date: PublicationDate,
        edition: Edition,
        notice: &NoticeId,
    ) -> Outcome {
        let key = self.keys.document_key(&date, notice);
        if self.store.exists(&key).await {
            log::info!("File {} already exists", key);
            return Outcome::Skipped;
        }

        log::info!("Downloading nota {} ({})", notice, edition);
        let target = format!("nota {notice}");
        let bytes = match self
            .retrier
            .run(&target, || self.client.fetch_notice_document(notice))
            .await
        {
            Ok(bytes) => bytes,
            Err(e) => {
                log::error!("Skipping nota {}: {}", notice, e);
                return Outcome::Failed;
            }
        };

        log::info!("Uploading nota {}", notice);
        let options = PutOptions::new(CONTENT_TYPE_DOC).public_read();
        match self.store.put_bytes(&key, bytes, &options).await {
            Ok(()) => Outcome::Uploaded,
            Err(e) => {
                log::error!("Upload failed for {}: {}", self.store.location(&key), e);
                Outcome::Failed
            }
        }
    }

    /// Stage 4: upload the full PDF of every issue.
    ///
    /// PDFs are re-uploaded on every run unless `skip_existing_pdfs` is set.
    pub async fn archive_pdfs(&self, manifest: &Manifest) -> StageStats {
        let mut stats = StageStats::default();
        for (edition, record) in manifest.editions() {
            let issue = &record.issue_id;
            let key = self.keys.pdf_key(&manifest.date, issue);

            if self.options.skip_existing_pdfs && self.store.exists(&key).await {
                log::info!("File {} already exists", key);
                tally(&mut stats, Outcome::Skipped);
                continue;
            }

            log::info!("Downloading diario pdf {} ({})", issue, edition);
            let target = format!("diario pdf {issue}");
            let outcome = match self
                .retrier
                .run(&target, || self.client.fetch_issue_pdf(issue))
                .await
            {
                Ok(bytes) => {
                    log::info!("Uploading diario {}", issue);
                    match self
                        .store
                        .put_bytes(&key, bytes, &PutOptions::new(CONTENT_TYPE_PDF))
                        .await
                    {
                        Ok(()) => Outcome::Uploaded,
                        Err(e) => {
                            log::error!("Upload failed for {}: {}", self.store.location(&key), e);
                            Outcome::Failed
                        }
                    }
                }
                Err(e) => {
                    log::error!("Skipping diario pdf {}: {}", issue, e);
                    Outcome::Failed
                }
            };
            tally(&mut stats, outcome);
        }
        stats
    }

    /// Stage 5: write the manifest as JSON, overwriting any previous copy.
    ///
    /// Returns the key written, or `None` when there was nothing to persist.
    pub async fn persist_manifest(&self, manifest: &Manifest) -> Result<Option<String>> {
        if !manifest.has_content() {
            return Ok(None);
        }
        let key = self.keys.manifest_key(&manifest.date);
        put_json(self.store, &key, manifest).await?;
        log::info!("Uploaded diario {} as json", manifest.date);
        Ok(Some(key))
    }
}
