//! Object-store client
//!
//! Plain `reqwest` client against the bucket's public HTTP endpoint. There is
//! no response cache in front of it, so every forwarded request observes the
//! bucket's current state, and decompression is off so byte ranges and
//! lengths reach the browser untouched.

use reqwest::{Client, Response, Url};

use crate::config::UpstreamConfig;
use crate::document::DocumentRef;
use crate::error::UpstreamError;

use super::request::ProxyRequest;

/// Client for the upstream object store
#[derive(Clone)]
pub struct UpstreamClient {
    http: Client,
    base_url: String,
}

impl UpstreamClient {
    /// Create a new upstream client from configuration
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let http = Client::builder()
            .connect_timeout(config.connect_timeout())
            .user_agent(concat!("manuals-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(UpstreamError::Unreachable)?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    /// Get the base URL documents are resolved against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a document to its upstream URL
    pub fn document_url(&self, document: &DocumentRef) -> Result<Url, UpstreamError> {
        let raw = document.upstream_url(&self.base_url);
        Url::parse(&raw).map_err(|_| UpstreamError::InvalidUrl(raw))
    }

    /// Issue the forwarded GET.
    ///
    /// Any response is returned, including error statuses; deciding what to
    /// pass on is the caller's business. Only transport failures are errors.
    pub async fn fetch(
        &self,
        document: &DocumentRef,
        request: &ProxyRequest,
    ) -> Result<Response, UpstreamError> {
        let url = self.document_url(document)?;

        tracing::debug!(
            %url,
            range = ?request.range,
            conditional = request.is_conditional(),
            "Forwarding document request"
        );

        self.http
            .get(url)
            .headers(request.upstream_headers())
            .send()
            .await
            .map_err(UpstreamError::Unreachable)
    }
}
