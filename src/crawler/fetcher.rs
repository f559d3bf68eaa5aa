//! Page fetcher
//!
//! This module fetches archive listing pages:
//! - Sends the identifying User-Agent header on every request
//! - Treats any status >= 400 as a failed fetch
//! - Keeps transport failures distinct from status failures
//!
//! No retries happen at this layer.

use crate::crawler::transport::Transport;
use crate::FetchError;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::sync::Arc;

/// Fetches listing pages as text
#[derive(Clone)]
pub struct PageFetcher {
    transport: Arc<dyn Transport>,
    user_agent: String,
}

impl PageFetcher {
    /// Creates a fetcher sending `user_agent` with every request
    pub fn new(transport: Arc<dyn Transport>, user_agent: impl Into<String>) -> Self {
        Self {
            transport,
            user_agent: user_agent.into(),
        }
    }

    /// Fetches a page and returns its body
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - Page body, decoded as UTF-8 (lossy)
    /// * `Err(FetchError::Status)` - Server answered with status >= 400
    /// * `Err(FetchError::Transport)` - DNS, connection, timeout or read failure
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut headers = HeaderMap::new();
        let user_agent =
            HeaderValue::from_str(&self.user_agent).map_err(|e| FetchError::Transport {
                url: url.to_string(),
                message: format!("Invalid user agent: {}", e),
            })?;
        headers.insert(USER_AGENT, user_agent);

        let response = self
            .transport
            .get(url, headers, None)
            .await
            .map_err(|e| {
                tracing::warn!("Error when fetching URL {}: {}", url, e);
                e
            })?
            .error_for_status(url)?;

        Ok(String::from_utf8_lossy(&response.body).into_owned())
    }
}
