//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::error::UpstreamError;
use crate::proxy::UpstreamClient;

/// Error type for state initialization
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Failed to initialize upstream client: {0}")]
    UpstreamInit(#[from] UpstreamError),
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    upstream: UpstreamClient,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config) -> Result<Self, StateError> {
        let upstream = UpstreamClient::new(&config.upstream)?;

        Ok(Self {
            inner: Arc::new(AppStateInner { config, upstream }),
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the upstream client
    pub fn upstream(&self) -> &UpstreamClient {
        &self.inner.upstream
    }
}
