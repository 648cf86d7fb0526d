use futures::future::try_join_all;
use indexmap::IndexMap;
use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::auth::Token;
use crate::error::Result;
use crate::output::{write_csv, PhaseProgress};

use super::client::SentryClient;
use super::enrichment::Enrichment;
use super::query::issue_filter;
use super::types::Issue;

/// Outcome of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub issue_count: usize,
}

/// Exports the unresolved issues of one Sentry project.
pub struct SentryProvider {
    pub client: SentryClient,
    pub organization: String,
    pub project: String,
}

impl SentryProvider {
    /// Creates a provider for `organization/project` on the given Sentry host.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is not a valid URL or the token cannot be
    /// used as a header value.
    pub fn new(
        host: &str,
        token: &Token,
        organization: String,
        project: String,
        max_concurrent_requests: usize,
    ) -> Result<Self> {
        let client = SentryClient::new(host, token, max_concurrent_requests)?;

        Ok(Self {
            client,
            organization,
            project,
        })
    }

    /// `{organization}-{project}-export.csv` in the working directory.
    pub fn default_output_path(&self) -> PathBuf {
        PathBuf::from(format!("{}-{}-export.csv", self.organization, self.project))
    }

    /// Adds the configured enrichments to every issue.
    ///
    /// Latest events are fetched concurrently, bounded by the client's request
    /// limit. Each task writes only to its own issue. The first failure aborts
    /// the remaining tasks and is returned.
    pub async fn enrich_issues(&self, issues: &mut [Issue], enrichments: &[Enrichment]) -> Result<()> {
        info!("Enriching {} issues with event data...", issues.len());

        try_join_all(
            issues
                .iter_mut()
                .map(|issue| self.enrich_issue(issue, enrichments)),
        )
        .await?;

        info!("Enriched {} issues", issues.len());

        Ok(())
    }

    async fn enrich_issue(&self, issue: &mut Issue, enrichments: &[Enrichment]) -> Result<()> {
        let event = self.client.fetch_latest_event(&issue.id()?).await?;

        let values = enrichments
            .iter()
            .map(|enrichment| {
                enrichment
                    .extract(&event)
                    .map(|value| (enrichment.csv_field.clone(), value))
            })
            .collect::<Result<IndexMap<_, _>>>()?;

        issue.enrichments = Some(values);

        Ok(())
    }

    /// Runs the whole export: fetch all pages, enrich, write the CSV file.
    ///
    /// Progress is displayed in three phases:
    /// 1. Fetching unresolved issues (optionally for one environment)
    /// 2. Enriching issues from their latest events (skipped without enrichments)
    /// 3. Writing the CSV file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Sentry denies access or rejects the query
    /// - An issue or event lacks a field the export needs
    /// - Network, decoding or file errors occur
    pub async fn export(
        &self,
        environment: Option<&str>,
        enrichments: &[Enrichment],
        output: &Path,
    ) -> Result<ExportSummary> {
        info!(
            "Starting export for project: {}/{}",
            self.organization, self.project
        );

        // Phase 1: Fetching issues
        let progress = PhaseProgress::start_phase_1();

        let mut issues = self
            .client
            .fetch_issues(&self.organization, &self.project, &issue_filter(environment))
            .await?;

        if issues.is_empty() {
            warn!(
                "No unresolved issues found for project: {}/{}",
                self.organization, self.project
            );
        }

        // Phase 2: Enriching issues
        let progress = progress.finish_phase_1_start_phase_2(issues.len(), enrichments.len());

        if !enrichments.is_empty() {
            self.enrich_issues(&mut issues, enrichments).await?;
        }

        // Phase 3: Writing CSV
        let progress = progress.finish_phase_2_start_phase_3();

        write_csv(output, &issues)?;
        info!("Exported to {}", output.display());

        progress.finish_phase_3(output);

        Ok(ExportSummary {
            path: output.to_path_buf(),
            issue_count: issues.len(),
        })
    }
}
