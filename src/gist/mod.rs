//! GitHub gist publishing
//!
//! Publishes crawl results by replacing one file of an existing gist through
//! the GitHub REST API (`PATCH /gists/{id}`).

use crate::config::GistConfig;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Environment variable holding the GitHub token
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// Errors raised while updating a gist
#[derive(Debug, Error)]
pub enum GistError {
    #[error("Gist ID is undefined")]
    MissingGistId,

    #[error("Environment variable 'GITHUB_TOKEN' must be set")]
    MissingToken,

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gist update failed, status code: {status}")]
    Status { status: u16 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Request body of a gist update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gist {
    pub description: String,
    pub files: BTreeMap<String, GistFile>,
}

/// One file inside a gist
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GistFile {
    pub content: String,
    pub filename: String,
}

impl Gist {
    /// Creates an update replacing a single file
    pub fn single_file(
        description: impl Into<String>,
        filename: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let filename = filename.into();
        let mut files = BTreeMap::new();
        files.insert(
            filename.clone(),
            GistFile {
                content: content.into(),
                filename,
            },
        );

        Self {
            description: description.into(),
            files,
        }
    }

    /// Creates the update described by the gist configuration
    pub fn from_config(config: &GistConfig, content: impl Into<String>) -> Self {
        Self::single_file(&config.description, &config.filename, content)
    }
}

/// Client for the gist endpoint of the GitHub API
#[derive(Debug, Clone)]
pub struct GistClient {
    client: Client,
    api_base: String,
    token: String,
}

impl GistClient {
    /// Creates a client authenticating with `token`
    pub fn new(api_base: impl Into<String>, token: impl Into<String>) -> Result<Self, GistError> {
        let token = token.into();
        if token.is_empty() {
            return Err(GistError::MissingToken);
        }

        Ok(Self {
            client: Client::builder().build()?,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Creates a client with the token taken from `GITHUB_TOKEN`
    pub fn from_env(config: &GistConfig) -> Result<Self, GistError> {
        let token = std::env::var(TOKEN_ENV_VAR).map_err(|_| GistError::MissingToken)?;
        Self::new(&config.api_base, token)
    }

    pub fn gist_url(&self, gist_id: &str) -> String {
        format!("{}/gists/{}", self.api_base, gist_id)
    }

    /// Sends the update and returns the response status
    ///
    /// # Returns
    ///
    /// * `Ok(u16)` - The gist was updated
    /// * `Err(GistError::MissingGistId)` - `gist_id` is empty; nothing was sent
    /// * `Err(GistError::Status)` - GitHub answered with status >= 400
    pub async fn update(&self, gist_id: &str, gist: &Gist) -> Result<u16, GistError> {
        if gist_id.trim().is_empty() {
            return Err(GistError::MissingGistId);
        }

        let url = self.gist_url(gist_id);
        let body = serde_json::to_string(gist)?;

        tracing::info!("Updating gist {}", gist_id);
        let response = self
            .client
            .patch(&url)
            .header(AUTHORIZATION, format!("token {}", self.token))
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(USER_AGENT, concat!("kaenguru-crawler/", env!("CARGO_PKG_VERSION")))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        // Drain the body so the connection can be reused
        let _ = response.bytes().await?;

        if status >= 400 {
            return Err(GistError::Status { status });
        }

        tracing::info!("Gist {} updated (status {})", gist_id, status);
        Ok(status)
    }
}
