//! Warm-up requests

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Client;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrefetchError {
    #[error("prefetch request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("prefetch answered {0}")]
    Status(u16),
}

/// Issues one low-priority GET for a URL
#[async_trait]
pub trait PrefetchFetcher: Send + Sync {
    async fn warm(&self, url: &str) -> Result<(), PrefetchError>;
}

/// Prefetcher backed by `reqwest`, resolving paths against a site origin
#[derive(Clone)]
pub struct HttpPrefetcher {
    http: Client,
    origin: String,
}

impl HttpPrefetcher {
    pub fn new(origin: impl Into<String>) -> Self {
        Self::with_client(Client::new(), origin)
    }

    pub fn with_client(http: Client, origin: impl Into<String>) -> Self {
        Self {
            http,
            origin: origin.into().trim_end_matches('/').to_string(),
        }
    }

    fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}/{}", self.origin, url.trim_start_matches('/'))
        }
    }
}

#[async_trait]
impl PrefetchFetcher for HttpPrefetcher {
    async fn warm(&self, url: &str) -> Result<(), PrefetchError> {
        let response = self
            .http
            .get(self.resolve(url))
            // RFC 9218: lowest urgency
            .header(HeaderName::from_static("priority"), HeaderValue::from_static("u=7"))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PrefetchError::Status(status.as_u16()));
        }

        // Read the body through so caches along the way keep the full object
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            chunk?;
        }

        Ok(())
    }
}
