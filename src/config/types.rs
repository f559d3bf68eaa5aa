use serde::Deserialize;
use std::time::Duration;

/// Default archive listing, paginated through the `p` query parameter
pub const DEFAULT_BASE_URL: &str = "https://www.zeit.de/serie/die-kaenguru-comics";

/// The archive only serves the plain listing to command-line HTTP clients.
/// Browser-looking user agents get an ads/consent wall instead.
pub const DEFAULT_USER_AGENT: &str = "curl/7.82.0";

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

pub const DEFAULT_GIST_API_BASE: &str = "https://api.github.com";

pub const DEFAULT_GIST_FILENAME: &str = "comics.json";

pub const DEFAULT_GIST_DESCRIPTION: &str =
    "Alle Kaenguru Comics von zeit.de (https://www.zeit.de/serie/die-kaenguru-comics)";

/// Main configuration structure
///
/// Every section is optional in the TOML file; missing values fall back to
/// the defaults above.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub gist: GistConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Archive listing URL, without the page parameter
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// How long the coordinator waits for each page result (seconds)
    #[serde(rename = "timeout-seconds")]
    pub timeout_seconds: u64,

    /// Transport-level timeout for a single HTTP request (seconds)
    #[serde(rename = "request-timeout-seconds")]
    pub request_timeout_seconds: u64,

    /// Upper bound on concurrently running page workers (unbounded if unset)
    #[serde(rename = "max-concurrent-pages")]
    pub max_concurrent_pages: Option<u32>,

    /// User-Agent header sent with page fetches
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl CrawlerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECONDS,
            max_concurrent_pages: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// File the JSON result is written to; stdout when unset
    pub path: Option<String>,
}

/// Gist upload configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GistConfig {
    /// Description set on the gist
    pub description: String,

    /// Name of the file inside the gist
    pub filename: String,

    /// GitHub API base URL
    #[serde(rename = "api-base")]
    pub api_base: String,
}

impl Default for GistConfig {
    fn default() -> Self {
        Self {
            description: DEFAULT_GIST_DESCRIPTION.to_string(),
            filename: DEFAULT_GIST_FILENAME.to_string(),
            api_base: DEFAULT_GIST_API_BASE.to_string(),
        }
    }
}
