use crate::fetch::client::HttpClient;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue};

/// An [`HttpClient`] wrapper that injects a credential as an HTTP header.
///
/// The header is validated once at construction, so `execute` cannot fail on
/// a malformed name or value.
pub struct ApiKey<C> {
    inner: C,
    header_name: HeaderName,
    value: HeaderValue,
}

impl<C> ApiKey<C> {
    pub fn new(inner: C, header_name: &str, value: &str) -> Result<Self> {
        let header_name = HeaderName::from_bytes(header_name.as_bytes())
            .with_context(|| format!("invalid header name '{header_name}'"))?;
        let mut value =
            HeaderValue::from_str(value).context("credential is not a valid header value")?;
        value.set_sensitive(true);
        Ok(Self {
            inner,
            header_name,
            value,
        })
    }

    /// Uses `Authorization: Bearer <token>`, the scheme the data API issues
    /// tokens for.
    pub fn bearer(inner: C, token: &str) -> Result<Self> {
        Self::new(inner, AUTHORIZATION.as_str(), &format!("Bearer {token}"))
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for ApiKey<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.headers_mut()
            .insert(self.header_name.clone(), self.value.clone());
        self.inner.execute(req).await
    }
}
