use async_trait::async_trait;
use reqwest::{Request, Response};

/// The seam every outbound HTTP request goes through.
///
/// Wrappers such as [`ApiKey`](super::auth::ApiKey) decorate an inner client,
/// so authentication stays out of the code that builds requests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
