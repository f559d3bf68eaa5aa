//! HTTP transport abstraction
//!
//! Every outbound GET goes through the `Transport` trait so the crawl
//! components can be handed a real `reqwest` client or an in-process fake.
//! The production implementation wraps a single shared `reqwest::Client`.

use crate::config::CrawlerConfig;
use crate::FetchError;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::header::HeaderMap;
use reqwest::{Client, Response};
use std::time::Duration;

/// Status and body of an HTTP response
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,

    /// Response body; empty for error statuses
    pub body: Bytes,
}

impl RawResponse {
    /// Converts statuses >= 400 into `FetchError::Status`
    pub fn error_for_status(self, url: &str) -> Result<Self, FetchError> {
        if self.status >= 400 {
            Err(FetchError::Status {
                url: url.to_string(),
                status: self.status,
            })
        } else {
            Ok(self)
        }
    }
}

/// A capability to perform HTTP GET requests
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a GET request with the given headers
    ///
    /// When `body_limit` is set, at most that many body bytes are read and the
    /// rest of the response is discarded.
    async fn get(
        &self,
        url: &str,
        headers: HeaderMap,
        body_limit: Option<usize>,
    ) -> Result<RawResponse, FetchError>;
}

/// `Transport` backed by a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the client from the crawler configuration and wraps it
    pub fn from_config(config: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        headers: HeaderMap,
        body_limit: Option<usize>,
    ) -> Result<RawResponse, FetchError> {
        let mut response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status().as_u16();
        if status >= 400 {
            return Ok(RawResponse {
                status,
                body: Bytes::new(),
            });
        }

        let body = match body_limit {
            Some(limit) => read_limited(&mut response, limit).await,
            None => response.bytes().await,
        }
        .map_err(|e| classify_error(url, e))?;

        Ok(RawResponse { status, body })
    }
}

/// Builds an HTTP client with proper configuration
///
/// The configured user agent is installed as the client default; the page
/// fetcher still sets it explicitly on every request.
///
/// # Example
///
/// ```no_run
/// use kaenguru_crawler::config::CrawlerConfig;
/// use kaenguru_crawler::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.request_timeout())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Reads the response body up to `limit` bytes
async fn read_limited(response: &mut Response, limit: usize) -> Result<Bytes, reqwest::Error> {
    let mut buf = BytesMut::with_capacity(limit);

    while buf.len() < limit {
        match response.chunk().await? {
            Some(chunk) => {
                let take = (limit - buf.len()).min(chunk.len());
                buf.extend_from_slice(&chunk[..take]);
            }
            None => break,
        }
    }

    Ok(buf.freeze())
}

/// Maps a reqwest error to a transport error with a short description
fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    let message = if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        "Connection refused".to_string()
    } else {
        error.to_string()
    };

    FetchError::Transport {
        url: url.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transport() -> ReqwestTransport {
        ReqwestTransport::from_config(&CrawlerConfig::default()).unwrap()
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&CrawlerConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_error_for_status() {
        let ok = RawResponse {
            status: 206,
            body: Bytes::from_static(b"abc"),
        };
        assert!(ok.error_for_status("https://example.com").is_ok());

        let failed = RawResponse {
            status: 404,
            body: Bytes::new(),
        };
        let err = failed.error_for_status("https://example.com").unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn test_get_reads_full_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string("the body"))
            .mount(&server)
            .await;

        let response = transport()
            .get(&format!("{}/page", server.uri()), HeaderMap::new(), None)
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(&response.body[..], b"the body");
    }

    #[tokio::test]
    async fn test_get_respects_body_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/image"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 4096]))
            .mount(&server)
            .await;

        let response = transport()
            .get(&format!("{}/image", server.uri()), HeaderMap::new(), Some(64))
            .await
            .unwrap();

        assert_eq!(response.body.len(), 64);
        assert!(response.body.iter().all(|b| *b == 7));
    }

    #[tokio::test]
    async fn test_error_status_has_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&server)
            .await;

        let response = transport()
            .get(&server.uri(), HeaderMap::new(), None)
            .await
            .unwrap();

        assert_eq!(response.status, 500);
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Bind and release a port so nothing is listening on it
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = transport()
            .get(&format!("http://{}/", addr), HeaderMap::new(), None)
            .await;

        assert!(matches!(result, Err(FetchError::Transport { .. })));
    }
}
