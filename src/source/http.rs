use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use super::SubmissionSource;
use crate::fetch::{HttpClient, fetch_bytes};
use crate::parser::parse_submissions;
use crate::submission::RawSubmission;

/// Submissions served by the data API as a JSON array.
pub struct ApiSource<C> {
    client: C,
    url: String,
}

impl<C: HttpClient> ApiSource<C> {
    pub fn new(client: C, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl<C: HttpClient> SubmissionSource for ApiSource<C> {
    async fn list_submissions(&self) -> Result<Vec<RawSubmission>> {
        let bytes = fetch_bytes(&self.client, &self.url).await?;
        debug!(url = %self.url, bytes = bytes.len(), "Submission payload received");
        parse_submissions(&bytes).with_context(|| format!("unexpected payload from {}", self.url))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
