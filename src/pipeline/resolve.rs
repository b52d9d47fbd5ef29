// src/pipeline/resolve.rs

//! Resolution stages: issue identifiers for a date, then notice identifiers
//! for each issue.

use crate::error::Result;
use crate::models::{Edition, IssueId, Manifest, PublicationDate};

use super::resolver::GazetteResolver;

impl GazetteResolver<'_> {
    /// Stage 1: look up the issues published on `date`.
    ///
    /// A "not found" answer is a normal outcome and yields a manifest
    /// without content. Transient faults are retried.
    pub async fn resolve_issues(&self, date: PublicationDate) -> Result<Manifest> {
        let target = format!("issues of {date}");
        let lookup = self
            .retrier
            .run(&target, || self.client.lookup_issues(&date))
            .await?;

        let manifest = Manifest::from_lookup(date, lookup);
        for (edition, record) in manifest.editions() {
            log::info!("Found {} issue {} for {}", edition, record.issue_id, date);
        }
        Ok(manifest)
    }

    /// Stage 2: look up the notices of every issue in `manifest`.
    ///
    /// Editions are resolved independently. An edition whose lookup keeps
    /// failing stays in the manifest without notices.
    pub async fn resolve_notices(&self, manifest: Manifest) -> Manifest {
        let pending: Vec<(Edition, IssueId)> = manifest
            .editions()
            .map(|(edition, record)| (edition, record.issue_id.clone()))
            .collect();

        let mut manifest = manifest;
        for (edition, issue) in pending {
            let target = format!("notices of {} issue {}", edition, issue);
            match self
                .retrier
                .run(&target, || self.client.lookup_notices(&issue))
                .await
            {
                Ok(entries) => {
                    log::info!(
                        "Success for {} - notas {}: {} notices",
                        manifest.date,
                        edition,
                        entries.len()
                    );
                    let ids = entries.into_iter().map(|entry| entry.id).collect();
                    manifest = manifest.with_notices(edition, ids);
                }
                Err(e) => {
                    log::error!(
                        "Could not resolve {} notices for {}: {}",
                        edition,
                        manifest.date,
                        e
                    );
                }
            }
        }
        manifest
    }

    /// Stages 1 and 2 without touching storage.
    pub async fn resolve(&self, date: PublicationDate) -> Result<Manifest> {
        let manifest = self.resolve_issues(date).await?;
        if !manifest.has_content() {
            return Ok(manifest);
        }
        Ok(self.resolve_notices(manifest).await)
    }
}
