//! Parallel page fetching.
//!
//! Every URL is fetched on its own tokio task. Results are collected in
//! input order and a failure only affects its own slot.

use std::time::Duration;

use futures::future::join_all;
use reqwest::{Client, RequestBuilder, StatusCode, header::HeaderMap};
use tracing::{debug, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{Result, UqloadError};

#[derive(Debug, Clone)]
pub struct ConcurrentFetcher {
    client: Client,
    headers: HeaderMap,
    timeout: Duration,
}

impl ConcurrentFetcher {
    pub fn new(client: Client, config: &ClientConfig) -> Self {
        Self {
            client,
            headers: config.page_headers(),
            timeout: config.page_timeout,
        }
    }

    /// Fetches all `urls` concurrently and waits for every one of them.
    ///
    /// The body is `Some` only for a `200 OK` response whose body could be
    /// read. Transport errors and any other status map to `None`.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_all(&self, urls: &[String]) -> Result<Vec<Option<String>>> {
        validate_urls(urls)?;

        let tasks = urls
            .iter()
            .map(|url| {
                let request = self
                    .client
                    .get(url.as_str())
                    .headers(self.headers.clone())
                    .timeout(self.timeout);
                tokio::spawn(fetch_one(url.clone(), request))
            })
            .collect::<Vec<_>>();

        let bodies = join_all(tasks)
            .await
            .into_iter()
            .zip(urls)
            .map(|(joined, url)| {
                joined.unwrap_or_else(|e| {
                    warn!(url = %url, error = %e, "Fetch task did not complete");
                    None
                })
            })
            .collect();

        Ok(bodies)
    }
}

fn validate_urls(urls: &[String]) -> Result<()> {
    if urls.is_empty() || urls.iter().any(|url| url.trim().is_empty()) {
        return Err(UqloadError::invalid_argument(
            "the URL list must contain non-empty strings",
        ));
    }
    Ok(())
}

async fn fetch_one(url: String, request: RequestBuilder) -> Option<String> {
    let response = match request.send().await {
        Ok(response) => response,
        Err(e) => {
            warn!(url = %url, error = %e, "Page request failed");
            return None;
        }
    };

    let status = response.status();
    if status != StatusCode::OK {
        warn!(url = %url, status = %status, "Page request returned non-200 status");
        return None;
    }

    match response.text().await {
        Ok(body) => {
            debug!(url = %url, len = body.len(), "Fetched page");
            Some(body)
        }
        Err(e) => {
            warn!(url = %url, error = %e, "Failed to read page body");
            None
        }
    }
}
