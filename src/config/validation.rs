use crate::config::types::{Config, CrawlerConfig, GistConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

const MAX_CONCURRENT_PAGES: u32 = 1000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    validate_gist_config(&config.gist)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    validate_http_url("base_url", &config.base_url)?;

    if config.timeout_seconds < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_seconds must be >= 1, got {}",
            config.timeout_seconds
        )));
    }

    if config.request_timeout_seconds < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_seconds must be >= 1, got {}",
            config.request_timeout_seconds
        )));
    }

    if let Some(limit) = config.max_concurrent_pages {
        if limit < 1 || limit > MAX_CONCURRENT_PAGES {
            return Err(ConfigError::Validation(format!(
                "max_concurrent_pages must be between 1 and {}, got {}",
                MAX_CONCURRENT_PAGES, limit
            )));
        }
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if let Some(path) = &config.path {
        if path.is_empty() {
            return Err(ConfigError::Validation(
                "output path cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates gist configuration
fn validate_gist_config(config: &GistConfig) -> Result<(), ConfigError> {
    validate_http_url("api_base", &config.api_base)?;

    if config.filename.is_empty() {
        return Err(ConfigError::Validation(
            "gist filename cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates that a value parses as an http(s) URL
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(())
}
