mod basic;
mod client;
pub mod auth;

pub use basic::{BasicClient, DEFAULT_TIMEOUT};
pub use client::HttpClient;

use anyhow::{Context, Result};

/// GETs `url` through `client` and returns the body.
///
/// # Errors
///
/// Fails on an invalid URL, a transport error, or a non-2xx status.
pub async fn fetch_bytes<C: HttpClient + ?Sized>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(
        reqwest::Method::GET,
        url.parse().with_context(|| format!("invalid URL '{url}'"))?,
    );

    let resp = client
        .execute(req)
        .await
        .with_context(|| format!("GET {url} failed"))?
        .error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}
