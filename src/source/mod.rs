//! Where submissions come from.
//!
//! The pipeline only ever sees a [`SubmissionSource`]; whether the records
//! live in a local key-value file, behind the data API, or in memory is
//! decided once, by [`open_source`].

mod http;
mod local;

pub use http::ApiSource;
pub use local::{DEFAULT_STORE_KEY, LocalStore};

use anyhow::Result;
use async_trait::async_trait;

use crate::config::Settings;
use crate::fetch::BasicClient;
use crate::fetch::auth::ApiKey;
use crate::submission::RawSubmission;

/// Read access to the stored submissions.
#[async_trait]
pub trait SubmissionSource: Send + Sync {
    /// Returns a snapshot of every stored submission.
    async fn list_submissions(&self) -> Result<Vec<RawSubmission>>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

/// A fixed set of submissions held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    submissions: Vec<RawSubmission>,
}

impl InMemorySource {
    pub fn new(submissions: Vec<RawSubmission>) -> Self {
        Self { submissions }
    }
}

#[async_trait]
impl SubmissionSource for InMemorySource {
    async fn list_submissions(&self) -> Result<Vec<RawSubmission>> {
        Ok(self.submissions.clone())
    }

    fn describe(&self) -> String {
        format!("memory ({} submissions)", self.submissions.len())
    }
}

/// Opens the data API for `http(s)://` locations and a [`LocalStore`]
/// otherwise. A configured API token is sent as a bearer credential.
pub fn open_source(location: &str, settings: &Settings) -> Result<Box<dyn SubmissionSource>> {
    if location.starts_with("http://") || location.starts_with("https://") {
        let client = BasicClient::with_timeout(settings.http_timeout)?;
        let source: Box<dyn SubmissionSource> = match settings.api_token.as_deref() {
            Some(token) => Box::new(ApiSource::new(ApiKey::bearer(client, token)?, location)),
            None => Box::new(ApiSource::new(client, location)),
        };
        Ok(source)
    } else {
        Ok(Box::new(LocalStore::new(location, &settings.store_key)))
    }
}
