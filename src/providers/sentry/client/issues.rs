use log::{debug, info};

use super::core::SentryClient;
use crate::error::{ExportError, Result};
use crate::providers::sentry::query::{join_query, QueryParam};
use crate::providers::sentry::types::{Issue, PageBody};

impl SentryClient {
    /// Fetches every issue of a project matching `query`, following cursors
    /// until Sentry reports no further results.
    ///
    /// Pages are requested one after another since each cursor comes from the
    /// previous response. Issues keep Sentry's order.
    pub async fn fetch_issues(
        &self,
        organization: &str,
        project: &str,
        query: &[QueryParam],
    ) -> Result<Vec<Issue>> {
        let url = self.endpoint(&format!("projects/{organization}/{project}/issues/"))?;
        let query = join_query(query);

        let mut issues = Vec::new();
        let mut cursor = String::new();
        let mut page_count = 1;

        loop {
            info!("Fetching issues page {page_count}");

            let (body, links) = self
                .fetch(
                    url.clone(),
                    &[
                        ("cursor", cursor.as_str()),
                        ("statsPeriod", ""),
                        ("query", query.as_str()),
                    ],
                )
                .await?;

            let page = match PageBody::from(body) {
                PageBody::Page(page) => page,
                PageBody::ApiErrorBody(detail) => return Err(ExportError::Api(detail)),
                PageBody::Unexpected(body) => {
                    return Err(ExportError::MalformedRecord(format!(
                        "expected a list of issues, got {body}"
                    )))
                }
            };

            debug!("Received page {page_count} with {} issues", page.len());
            issues.extend(page.into_iter().map(Issue::from));

            let Some(next) = links
                .get("next")
                .filter(|next| next.get("results").map(String::as_str) == Some("true"))
            else {
                break;
            };

            cursor = next
                .get("cursor")
                .cloned()
                .ok_or_else(|| {
                    ExportError::MalformedRecord(
                        "pagination link announces more results without a cursor".to_string(),
                    )
                })?;
            page_count += 1;
        }

        info!("Fetched {} issues in {page_count} pages", issues.len());

        Ok(issues)
    }
}
