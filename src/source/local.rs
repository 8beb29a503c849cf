use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::SubmissionSource;
use crate::parser::submissions_from_value;
use crate::submission::RawSubmission;

/// Key the submission array is stored under unless configured otherwise.
pub const DEFAULT_STORE_KEY: &str = "esgData";

/// A JSON file used as a key-value store, with the submissions under one key.
///
/// Stored as a plain JSON object on disk:
/// ```json
/// {
///   "esgData": [ { "companyName": "Acme", "reportingYear": 2023, ... } ]
/// }
/// ```
/// The value may also be a JSON-encoded string holding the array, the way a
/// browser's local storage persists it. A file whose top level is already an
/// array is read as the submission list itself.
pub struct LocalStore {
    path: PathBuf,
    key: String,
}

impl LocalStore {
    pub fn new(path: impl Into<PathBuf>, key: &str) -> Self {
        Self {
            path: path.into(),
            key: key.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the current submissions. A missing file or key is an empty store.
    pub async fn load(&self) -> Result<Vec<RawSubmission>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Store file not found, treating as empty");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read store {}", self.path.display()));
            }
        };
        self.decode(&content)
    }

    fn decode(&self, content: &str) -> Result<Vec<RawSubmission>> {
        let root: Value = serde_json::from_str(content)
            .with_context(|| format!("store {} is not valid JSON", self.path.display()))?;

        let stored = match root {
            Value::Array(items) => Value::Array(items),
            Value::Object(mut map) => match map.remove(&self.key) {
                Some(v) => v,
                None => {
                    debug!(key = %self.key, "Store key not set, treating as empty");
                    return Ok(Vec::new());
                }
            },
            _ => bail!("store {} must hold a JSON object", self.path.display()),
        };

        let stored = match stored {
            Value::String(encoded) => serde_json::from_str(&encoded)
                .with_context(|| format!("value under '{}' is not valid JSON", self.key))?,
            Value::Null => return Ok(Vec::new()),
            other => other,
        };

        submissions_from_value(stored).with_context(|| format!("bad value under '{}'", self.key))
    }
}

#[async_trait]
impl SubmissionSource for LocalStore {
    async fn list_submissions(&self) -> Result<Vec<RawSubmission>> {
        self.load().await
    }

    fn describe(&self) -> String {
        format!("{}#{}", self.path.display(), self.key)
    }
}
